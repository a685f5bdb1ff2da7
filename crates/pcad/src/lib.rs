//! pcad — parametric 2D sketch solving and feature modeling.
//!
//! A constraint-based sketcher (entities, constraints, dimensions, a
//! damped Newton-Raphson solver) plus a feature/history kernel that turns
//! solved sketches into 3D geometry. This crate re-exports the member
//! crates and adds [`SketchSession`], the editing-session type wiring
//! sketch, solver, and dimension binding together.
//!
//! # Example
//!
//! ```rust
//! use pcad::{ConstraintKind, EntityGeometry, Point2, SketchSession};
//!
//! let mut session = SketchSession::new();
//! let line = session.add_entity(EntityGeometry::Line {
//!     start: Point2::new(0.0, 0.0),
//!     end: Point2::new(5.0, 3.0),
//! });
//! session.add_constraint(ConstraintKind::Horizontal { line }).unwrap();
//!
//! let result = session.solve();
//! assert!(result.success);
//! ```

#![warn(missing_docs)]

pub use pcad_dimension::{
    measure, BindingState, Dimension, DimensionBinding, DimensionError, DimensionId,
    DimensionKind, Units,
};
pub use pcad_feature::{
    extrude_profile, profile_from_sketch, revolve_profile, BlendResult, BlendType, BooleanOp,
    BrepEngine, ChamferOptions, ChamferType, Continuity, DelegateError, Feature, FeatureError,
    FeatureId, FeatureKernel, FeatureKind, FeatureRecord, FilletOptions, MeshCsg, PatternKind,
    Profile, ProfileError, Representation, SketchId, TriangleMesh,
};
pub use pcad_math::{Point2, Point3, Tolerance, Transform, Vec2, Vec3};
pub use pcad_sketch::{
    Constraint, ConstraintId, ConstraintKind, Entity, EntityGeometry, EntityId, PointRef, Sketch,
    SketchError, VarKind, Variable,
};
pub use pcad_solver::{NewtonSolver, SolveOutcome, SolveResult, SolverConfig};

/// One sketch-editing session: the sketch, its dimensions, and a solver.
///
/// Mirrors the UI data flow: edits mutate the sketch, dimension edits
/// update/create constraints, [`SketchSession::solve`] resolves the
/// constraints and then refreshes dimension display values from the
/// solved geometry.
#[derive(Debug, Clone, Default)]
pub struct SketchSession {
    sketch: Sketch,
    dimensions: DimensionBinding,
    solver: NewtonSolver,
}

impl SketchSession {
    /// A session with default solver settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session with custom solver settings.
    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            sketch: Sketch::new(),
            dimensions: DimensionBinding::new(),
            solver: NewtonSolver::new(config),
        }
    }

    /// The underlying sketch.
    pub fn sketch(&self) -> &Sketch {
        &self.sketch
    }

    /// Mutable access to the sketch for edits the passthroughs don't
    /// cover.
    pub fn sketch_mut(&mut self) -> &mut Sketch {
        &mut self.sketch
    }

    /// The dimension binding.
    pub fn dimensions(&self) -> &DimensionBinding {
        &self.dimensions
    }

    // =========================================================================
    // Entity and constraint CRUD
    // =========================================================================

    /// Add an entity.
    pub fn add_entity(&mut self, geometry: EntityGeometry) -> EntityId {
        self.sketch.add_entity(geometry)
    }

    /// Remove an entity, cascading constraint removal. Driving dimensions
    /// whose constraint was cascaded away are demoted to reference.
    pub fn remove_entity(&mut self, id: EntityId) -> Result<(), SketchError> {
        self.sketch.remove_entity(id)?;
        self.dimensions.prune_dangling(&self.sketch);
        Ok(())
    }

    /// Add a constraint.
    pub fn add_constraint(&mut self, kind: ConstraintKind) -> Result<ConstraintId, SketchError> {
        self.sketch.add_constraint(kind)
    }

    /// Remove a constraint.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), SketchError> {
        self.sketch.remove_constraint(id)
    }

    // =========================================================================
    // Dimension CRUD
    // =========================================================================

    /// Add a dimension; driving dimensions synthesize their constraint,
    /// targeting `nominal_value` when given and `value` otherwise.
    pub fn add_dimension(
        &mut self,
        kind: DimensionKind,
        value: f64,
        is_driving: bool,
        nominal_value: Option<f64>,
    ) -> Result<DimensionId, DimensionError> {
        self.dimensions
            .add_dimension(&mut self.sketch, kind, value, is_driving, nominal_value)
    }

    /// Edit a dimension's value and driving state.
    pub fn update_dimension_value(
        &mut self,
        id: DimensionId,
        value: f64,
        is_driving: bool,
    ) -> Result<(), DimensionError> {
        self.dimensions
            .update_dimension_value(&mut self.sketch, id, value, is_driving)
    }

    /// Remove a dimension and its backing constraint.
    pub fn remove_dimension(&mut self, id: DimensionId) -> Result<(), DimensionError> {
        self.dimensions.remove_dimension(&mut self.sketch, id)
    }

    // =========================================================================
    // Solving
    // =========================================================================

    /// Solve the sketch, then refresh dimension display values from the
    /// solved geometry.
    pub fn solve(&mut self) -> SolveResult {
        let result = self.solver.solve(&mut self.sketch);
        self.dimensions.update_dimensions_from_geometry(&self.sketch);
        result
    }
}
