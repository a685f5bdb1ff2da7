//! Numerical constraint solving for 2D sketches.
//!
//! The solver drives a sketch's scalar variables toward zero constraint
//! residuals using damped Newton-Raphson iteration:
//!
//! - the Jacobian is built sparsely by finite differences, visiting only
//!   each constraint's own variables ([`jacobian`]),
//! - each step is a steepest-descent update for small systems or a
//!   conjugate-gradient solve of the normal equations for large ones
//!   ([`linear`]),
//! - adaptive damping accepts only improving steps and halves the step
//!   size after a reverted one ([`newton`]).
//!
//! ```
//! use pcad_math::Point2;
//! use pcad_sketch::{ConstraintKind, EntityGeometry, Sketch};
//! use pcad_solver::NewtonSolver;
//!
//! let mut sketch = Sketch::new();
//! let line = sketch.add_entity(EntityGeometry::Line {
//!     start: Point2::new(0.0, 0.0),
//!     end: Point2::new(5.0, 3.0),
//! });
//! sketch.add_constraint(ConstraintKind::Horizontal { line }).unwrap();
//!
//! let result = NewtonSolver::default().solve(&mut sketch);
//! assert!(result.success);
//! ```

#![warn(missing_docs)]

pub mod jacobian;
pub mod linear;
pub mod newton;

pub use jacobian::{build_jacobian, SparseMatrix};
pub use newton::{NewtonSolver, SolveOutcome, SolveResult, SolverConfig};
