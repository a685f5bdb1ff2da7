//! Sparse Jacobian construction by finite differences.

use std::collections::HashMap;

use pcad_sketch::{ConstraintKind, Sketch};

/// Finite-difference perturbation step.
pub const FD_STEP: f64 = 1e-8;

/// Entries below this magnitude are numerical noise and are dropped.
pub const NOISE_FLOOR: f64 = 1e-12;

/// A sparse matrix stored as a `(row, col) → value` map.
///
/// Sketch Jacobians are overwhelmingly zero: each constraint touches
/// only the 2–8 variables of its own entities, so for sketches beyond
/// a few dozen entities the dense matrix would be >95% zeros.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    entries: HashMap<(usize, usize), f64>,
}

impl SparseMatrix {
    /// An empty `rows × cols` matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: HashMap::new(),
        }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored (non-noise) entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Stored value at `(row, col)`, zero if absent.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries.get(&(row, col)).copied().unwrap_or(0.0)
    }

    /// Insert an entry, dropping values below the noise floor.
    pub fn insert(&mut self, row: usize, col: usize, value: f64) {
        if value.abs() >= NOISE_FLOOR {
            self.entries.insert((row, col), value);
        }
    }

    /// `Jᵗ r`: project a residual vector onto variable space.
    pub fn transpose_mul(&self, r: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.cols];
        for (&(row, col), &v) in &self.entries {
            out[col] += v * r[row];
        }
        out
    }

    /// `J x`: apply the matrix to a variable-space vector.
    pub fn mul(&self, x: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.rows];
        for (&(row, col), &v) in &self.entries {
            out[row] += v * x[col];
        }
        out
    }

    /// The Gram matrix `JᵗJ`, built sparsely (noise entries dropped).
    pub fn gram(&self) -> SparseMatrix {
        // Group entries by row so each row contributes its column pairs.
        let mut by_row: HashMap<usize, Vec<(usize, f64)>> = HashMap::new();
        for (&(row, col), &v) in &self.entries {
            by_row.entry(row).or_default().push((col, v));
        }

        let mut accum: HashMap<(usize, usize), f64> = HashMap::new();
        for cols in by_row.values() {
            for &(c1, v1) in cols {
                for &(c2, v2) in cols {
                    *accum.entry((c1, c2)).or_insert(0.0) += v1 * v2;
                }
            }
        }

        let mut gram = SparseMatrix::new(self.cols, self.cols);
        for ((c1, c2), v) in accum {
            gram.insert(c1, c2, v);
        }
        gram
    }
}

/// Build the sparse Jacobian ∂residual_i/∂variable_j by forward finite
/// differences, visiting only each constraint's dependency set.
///
/// Each variable is perturbed by [`FD_STEP`], only the owning constraint
/// is re-evaluated, and the variable is restored before moving on, so the
/// sketch leaves this function in the state it entered.
pub fn build_jacobian(
    sketch: &mut Sketch,
    kinds: &[ConstraintKind],
    deps: &[Vec<usize>],
    residuals: &[f64],
) -> SparseMatrix {
    let mut jac = SparseMatrix::new(kinds.len(), sketch.variable_count());
    for (row, kind) in kinds.iter().enumerate() {
        let base = residuals[row];
        for &col in &deps[row] {
            let original = sketch.variable_value(col);
            sketch.set_variable(col, original + FD_STEP);
            let perturbed = kind.residual(sketch);
            sketch.set_variable(col, original);
            jac.insert(row, col, (perturbed - base) / FD_STEP);
        }
    }
    jac
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcad_math::Point2;
    use pcad_sketch::EntityGeometry;

    #[test]
    fn test_horizontal_jacobian_entries() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(5.0, 3.0),
        });
        let kind = ConstraintKind::Horizontal { line };
        let deps = vec![sketch.dependencies_of(&kind)];
        let residuals = vec![kind.residual(&sketch)];
        let jac = build_jacobian(&mut sketch, &[kind], &deps, &residuals);

        // residual = end.y − start.y → ∂/∂start.y = −1, ∂/∂end.y = +1,
        // x derivatives are below the noise floor and dropped
        assert_eq!(jac.nnz(), 2);
        assert!((jac.get(0, 1) + 1.0).abs() < 1e-6);
        assert!((jac.get(0, 3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_jacobian_restores_sketch_state() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(1.0, 2.0),
            end: Point2::new(3.0, 4.0),
        });
        let before: Vec<f64> = (0..4).map(|i| sketch.variable_value(i)).collect();
        let kind = ConstraintKind::Length { line, target: 5.0 };
        let deps = vec![sketch.dependencies_of(&kind)];
        let residuals = vec![kind.residual(&sketch)];
        build_jacobian(&mut sketch, &[kind], &deps, &residuals);
        let after: Vec<f64> = (0..4).map(|i| sketch.variable_value(i)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_noise_entries_dropped() {
        let mut m = SparseMatrix::new(2, 2);
        m.insert(0, 0, 1e-13);
        m.insert(0, 1, 0.5);
        assert_eq!(m.nnz(), 1);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn test_transpose_mul() {
        let mut m = SparseMatrix::new(2, 3);
        m.insert(0, 0, 2.0);
        m.insert(1, 2, -1.0);
        let out = m.transpose_mul(&[3.0, 4.0]);
        assert_eq!(out, vec![6.0, 0.0, -4.0]);
    }

    #[test]
    fn test_gram_matrix() {
        // J = [[1, 2], [0, 3]] → JᵗJ = [[1, 2], [2, 13]]
        let mut m = SparseMatrix::new(2, 2);
        m.insert(0, 0, 1.0);
        m.insert(0, 1, 2.0);
        m.insert(1, 1, 3.0);
        let g = m.gram();
        assert!((g.get(0, 0) - 1.0).abs() < 1e-12);
        assert!((g.get(0, 1) - 2.0).abs() < 1e-12);
        assert!((g.get(1, 0) - 2.0).abs() < 1e-12);
        assert!((g.get(1, 1) - 13.0).abs() < 1e-12);
    }
}
