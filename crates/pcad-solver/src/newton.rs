//! Damped Newton-Raphson driver.

use pcad_sketch::Sketch;

use crate::jacobian::build_jacobian;
use crate::linear::solve_step;

/// Updates smaller than this are numerical noise and are not applied.
const STEP_FLOOR: f64 = 1e-9;

/// Tuning knobs for [`NewtonSolver`].
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    /// RMS residual below which the sketch counts as solved.
    pub tolerance: f64,
    /// Hard cap on accepted iterations.
    pub max_iterations: usize,
    /// Damping factor applied to the first step.
    pub initial_damping: f64,
    /// Abort once damping shrinks below this.
    pub min_damping: f64,
    /// Damping growth ceiling.
    pub max_damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 50,
            initial_damping: 0.5,
            min_damping: 0.1,
            max_damping: 1.0,
        }
    }
}

/// Why the solve loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// RMS residual dropped below tolerance.
    Converged,
    /// Iteration cap reached with residual still above tolerance.
    MaxIterations,
    /// Residual stopped moving before converging.
    Stagnated,
    /// Residual grew past twice the previous value after a warm-up.
    Diverged,
    /// Every step made things worse until damping collapsed.
    DampingCollapsed,
}

/// Result of a solve, successful or not.
///
/// On failure the sketch is left at the best state reached: worsening
/// steps are reverted before the loop exits, so geometry never ends on
/// a rejected step.
#[derive(Debug, Clone)]
pub struct SolveResult {
    /// True iff the outcome is [`SolveOutcome::Converged`].
    pub success: bool,
    /// Accepted iterations (retries after a reverted step do not count).
    pub iterations: usize,
    /// Final RMS residual.
    pub error: f64,
    /// Variable indices changed by accepted steps, deduplicated and sorted.
    pub modified_variables: Vec<usize>,
    /// Why the loop ended.
    pub outcome: SolveOutcome,
}

/// Newton-Raphson solver with adaptive damping.
///
/// Each iteration builds the sparse Jacobian by finite differences,
/// computes a damped update, and accepts it only if the RMS residual
/// improves. Worsening steps are reverted and retried with half the
/// damping; improving steps grow damping by 1.2× up to the ceiling.
#[derive(Debug, Clone, Default)]
pub struct NewtonSolver {
    config: SolverConfig,
}

impl NewtonSolver {
    /// Solver with the given configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Drive the sketch toward zero residuals, writing results back
    /// into entity geometry as it goes.
    pub fn solve(&self, sketch: &mut Sketch) -> SolveResult {
        let cfg = &self.config;
        let kinds: Vec<_> = sketch.constraints().map(|c| c.kind.clone()).collect();
        let deps: Vec<Vec<usize>> = kinds.iter().map(|k| sketch.dependencies_of(k)).collect();

        let mut residuals: Vec<f64> = kinds.iter().map(|k| k.residual(sketch)).collect();
        let mut error = rms(&residuals);
        if error < cfg.tolerance {
            return SolveResult {
                success: true,
                iterations: 0,
                error,
                modified_variables: Vec::new(),
                outcome: SolveOutcome::Converged,
            };
        }

        let mut damping = cfg.initial_damping;
        let mut iterations = 0;
        let mut improving_steps = 0;
        let mut modified: Vec<usize> = Vec::new();

        while iterations < cfg.max_iterations {
            let jac = build_jacobian(sketch, &kinds, &deps, &residuals);
            let step = solve_step(&jac, &residuals, damping);

            // Apply the step, remembering prior values for a revert.
            let mut applied: Vec<(usize, f64)> = Vec::new();
            for (col, &delta) in step.iter().enumerate() {
                if delta.abs() > STEP_FLOOR {
                    let old = sketch.variable_value(col);
                    sketch.set_variable(col, old + delta);
                    applied.push((col, old));
                }
            }

            let next: Vec<f64> = kinds.iter().map(|k| k.residual(sketch)).collect();
            let next_error = rms(&next);

            if iterations >= 5 && next_error > 2.0 * error {
                for (col, old) in applied {
                    sketch.set_variable(col, old);
                }
                return self.finish(iterations, error, modified, SolveOutcome::Diverged);
            }

            // A pair of consecutive errors closer than 1% of tolerance
            // means the step budget is being spent on noise; without at
            // least two improving steps behind us, give up immediately.
            let flat = (error - next_error).abs() < 0.01 * cfg.tolerance;

            if next_error < error {
                improving_steps += 1;
                damping = (damping * 1.2).min(cfg.max_damping);
                for (col, _) in &applied {
                    modified.push(*col);
                }
                residuals = next;
                error = next_error;
                iterations += 1;

                if error < cfg.tolerance {
                    return self.finish(iterations, error, modified, SolveOutcome::Converged);
                }
                if flat && improving_steps < 2 {
                    return self.finish(iterations, error, modified, SolveOutcome::Stagnated);
                }
            } else {
                // Revert and retry with heavier damping; the iteration
                // counter only advances on accepted steps.
                for (col, old) in applied {
                    sketch.set_variable(col, old);
                }
                damping *= 0.5;
                if damping < cfg.min_damping {
                    return self.finish(
                        iterations,
                        error,
                        modified,
                        SolveOutcome::DampingCollapsed,
                    );
                }
                if flat && improving_steps < 2 {
                    return self.finish(iterations, error, modified, SolveOutcome::Stagnated);
                }
            }
        }

        self.finish(iterations, error, modified, SolveOutcome::MaxIterations)
    }

    fn finish(
        &self,
        iterations: usize,
        error: f64,
        mut modified: Vec<usize>,
        outcome: SolveOutcome,
    ) -> SolveResult {
        modified.sort_unstable();
        modified.dedup();
        SolveResult {
            success: outcome == SolveOutcome::Converged,
            iterations,
            error,
            modified_variables: modified,
            outcome,
        }
    }
}

fn rms(residuals: &[f64]) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let sum: f64 = residuals.iter().map(|r| r * r).sum();
    (sum / residuals.len() as f64).sqrt()
}
