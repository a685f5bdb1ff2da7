//! Linear step computation for one Newton iteration.

use crate::jacobian::SparseMatrix;

/// Below this many variables a steepest-descent step is cheaper and
/// robust enough; above it we run conjugate gradient on the normal
/// equations.
pub const DENSE_LIMIT: usize = 100;

/// CG early-exit threshold on the residual norm.
const CG_TOLERANCE: f64 = 1e-6;

/// Compute the damped update Δx for the current iteration.
///
/// Small systems take a steepest-descent step `−damping · Jᵗr`. Larger
/// systems solve the normal equations `JᵗJ x = −Jᵗr` with conjugate
/// gradient, capped at `min(20, n)` iterations, then scale by the
/// damping factor.
pub fn solve_step(jac: &SparseMatrix, residuals: &[f64], damping: f64) -> Vec<f64> {
    let n = jac.cols();
    let grad = jac.transpose_mul(residuals);

    if n < DENSE_LIMIT {
        return grad.iter().map(|g| -damping * g).collect();
    }

    let gram = jac.gram();
    let rhs: Vec<f64> = grad.iter().map(|g| -g).collect();
    let x = conjugate_gradient(&gram, &rhs);
    x.iter().map(|v| damping * v).collect()
}

/// Conjugate gradient on a symmetric positive semi-definite system,
/// starting from zero. Exits early once the residual norm drops below
/// [`CG_TOLERANCE`] or the search direction degenerates.
fn conjugate_gradient(a: &SparseMatrix, b: &[f64]) -> Vec<f64> {
    let n = b.len();
    let max_iters = n.min(20);

    let mut x = vec![0.0; n];
    let mut r = b.to_vec();
    let mut p = r.clone();
    let mut rsq: f64 = r.iter().map(|v| v * v).sum();

    for _ in 0..max_iters {
        if rsq.sqrt() < CG_TOLERANCE {
            break;
        }
        let ap = a.mul(&p);
        let pap: f64 = p.iter().zip(&ap).map(|(pi, api)| pi * api).sum();
        if pap.abs() < 1e-30 {
            // Rank-deficient direction; stop rather than blow up.
            break;
        }
        let alpha = rsq / pap;
        for i in 0..n {
            x[i] += alpha * p[i];
            r[i] -= alpha * ap[i];
        }
        let rsq_next: f64 = r.iter().map(|v| v * v).sum();
        let beta = rsq_next / rsq;
        for i in 0..n {
            p[i] = r[i] + beta * p[i];
        }
        rsq = rsq_next;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_system_is_steepest_descent() {
        // J = [1, 2] (1×2), r = [3] → Jᵗr = [3, 6], Δx = −0.5·Jᵗr
        let mut jac = SparseMatrix::new(1, 2);
        jac.insert(0, 0, 1.0);
        jac.insert(0, 1, 2.0);
        let step = solve_step(&jac, &[3.0], 0.5);
        assert!((step[0] + 1.5).abs() < 1e-12);
        assert!((step[1] + 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cg_solves_diagonal_system() {
        // Diagonal A with entries 1..n solves exactly within the cap.
        let n = 150;
        let mut a = SparseMatrix::new(n, n);
        let mut b = vec![0.0; n];
        for i in 0..n {
            a.insert(i, i, (i + 1) as f64);
            b[i] = (i + 1) as f64 * 2.0;
        }
        let x = conjugate_gradient(&a, &b);
        for xi in &x {
            assert!((xi - 2.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cg_handles_zero_rhs() {
        let a = SparseMatrix::new(120, 120);
        let x = conjugate_gradient(&a, &vec![0.0; 120]);
        assert!(x.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_large_system_step_scaled_by_damping() {
        // 120 independent rows J[i][i] = 1, r[i] = 1 → exact normal-equation
        // solution x = −1, damped step = −damping.
        let n = 120;
        let mut jac = SparseMatrix::new(n, n);
        for i in 0..n {
            jac.insert(i, i, 1.0);
        }
        let step = solve_step(&jac, &vec![1.0; n], 0.25);
        for s in &step {
            assert!((s + 0.25).abs() < 1e-6);
        }
    }
}
