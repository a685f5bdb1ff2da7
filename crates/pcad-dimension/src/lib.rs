//! Dimension annotations layered over sketch constraints.
//!
//! A dimension is the user-visible measurement label on a sketch. A
//! *driving* dimension owns a backing constraint and writes its value
//! into geometry through the solver; a *reference* dimension only reads
//! geometry and displays what it measures. [`DimensionBinding`] keeps
//! the two-way dimension↔constraint mapping consistent through every
//! add, edit, toggle, and removal.
//!
//! The central invariant: a dimension carries a constraint id **iff**
//! it is driving. No public operation can leave the binding in a state
//! that violates this.

#![warn(missing_docs)]

use std::collections::HashMap;

use pcad_math::angle_between_deg;
use pcad_sketch::{
    ConstraintId, ConstraintKind, EntityId, PointRef, Sketch, SketchError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Post-solve settling tolerance: a driving dimension's display value is
/// re-synced from geometry only when it drifts by more than this.
pub const DRIFT_TOLERANCE: f64 = 0.001;

// ============================================================================
// Errors
// ============================================================================

/// Errors from dimension operations.
#[derive(Debug, Error)]
pub enum DimensionError {
    /// The dimension id is not registered.
    #[error("unknown dimension {0:?}")]
    UnknownDimension(DimensionId),
    /// The underlying sketch rejected a constraint operation.
    #[error(transparent)]
    Sketch(#[from] SketchError),
}

// ============================================================================
// Dimension model
// ============================================================================

/// Stable identifier of a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DimensionId(pub u64);

/// Display units of a dimension value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Units {
    /// Linear millimeters.
    #[default]
    Millimeters,
    /// Linear inches.
    Inches,
    /// Angular degrees.
    Degrees,
}

/// What a dimension measures.
///
/// Each variant maps onto exactly one constraint kind when driving:
/// single-entity linear ⇒ length, two-point linear ⇒ distance, radial ⇒
/// radius or diameter, angular ⇒ angle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DimensionKind {
    /// Length of one line.
    Length {
        /// The measured line.
        line: EntityId,
    },
    /// Separation of two points.
    Between {
        /// First point.
        a: PointRef,
        /// Second point.
        b: PointRef,
    },
    /// Radius or diameter of a circle or arc.
    Radial {
        /// The measured circle or arc.
        entity: EntityId,
        /// True to display and constrain the diameter instead.
        diameter: bool,
    },
    /// Angle between two lines, in degrees.
    Angular {
        /// First line.
        a: EntityId,
        /// Second line.
        b: EntityId,
    },
}

impl DimensionKind {
    /// The constraint a driving dimension of this kind synthesizes.
    fn to_constraint(self, target: f64) -> ConstraintKind {
        match self {
            Self::Length { line } => ConstraintKind::Length { line, target },
            Self::Between { a, b } => ConstraintKind::Distance { a, b, target },
            Self::Radial { entity, diameter } => {
                if diameter {
                    ConstraintKind::Diameter { entity, target }
                } else {
                    ConstraintKind::Radius { entity, target }
                }
            }
            Self::Angular { a, b } => ConstraintKind::Angle {
                a,
                b,
                degrees: target,
            },
        }
    }
}

/// A dimension annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    /// Stable identifier.
    pub id: DimensionId,
    /// What is measured.
    pub kind: DimensionKind,
    /// Display value. Driving: the commanded value; reference: the last
    /// measurement.
    pub value: f64,
    /// The commanded value of a driving dimension. Always `None` for
    /// reference dimensions.
    pub nominal_value: Option<f64>,
    /// Driving dimensions constrain geometry; reference dimensions only
    /// display it.
    pub is_driving: bool,
    /// Locked dimensions are skipped by geometry re-measurement.
    pub locked: bool,
    /// Decimal places for display.
    pub precision: u32,
    /// Display units.
    pub units: Units,
    /// Optional ± display tolerance.
    pub tolerance: Option<f64>,
    /// Backing constraint. `Some` iff `is_driving`.
    pub constraint: Option<ConstraintId>,
    /// Bumped on every edit.
    pub version: u64,
}

/// Measure a dimension kind against current sketch geometry.
///
/// Missing or degenerate entities measure as zero, matching the residual
/// conventions of the constraint layer.
pub fn measure(kind: &DimensionKind, sketch: &Sketch) -> f64 {
    match kind {
        DimensionKind::Length { line } => match line_points(sketch, *line) {
            Some((start, end)) => (end - start).norm(),
            None => 0.0,
        },
        DimensionKind::Between { a, b } => {
            let pa = sketch.entity(a.entity).and_then(|e| e.point(a.index));
            let pb = sketch.entity(b.entity).and_then(|e| e.point(b.index));
            match (pa, pb) {
                (Some(pa), Some(pb)) => (pa - pb).norm(),
                _ => 0.0,
            }
        }
        DimensionKind::Radial { entity, diameter } => {
            let r = sketch.entity(*entity).and_then(|e| e.radius()).unwrap_or(0.0);
            if *diameter {
                2.0 * r
            } else {
                r
            }
        }
        DimensionKind::Angular { a, b } => {
            match (line_points(sketch, *a), line_points(sketch, *b)) {
                (Some((sa, ea)), Some((sb, eb))) => {
                    let da = ea - sa;
                    let db = eb - sb;
                    if da.norm() < 1e-9 || db.norm() < 1e-9 {
                        0.0
                    } else {
                        angle_between_deg(&da.normalize(), &db.normalize())
                    }
                }
                _ => 0.0,
            }
        }
    }
}

fn line_points(sketch: &Sketch, line: EntityId) -> Option<(pcad_math::Point2, pcad_math::Point2)> {
    let e = sketch.entity(line)?;
    Some((e.point(0)?, e.point(1)?))
}

// ============================================================================
// Binding
// ============================================================================

/// Serializable snapshot of a binding: the dimension set plus the
/// dimension→constraint map (the reverse map is rebuilt on import).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingState {
    /// All registered dimensions.
    pub dimensions: Vec<Dimension>,
    /// Dimension→constraint pairs for driving dimensions.
    pub dimension_to_constraint: Vec<(DimensionId, ConstraintId)>,
}

/// Owns all dimensions of one sketch and their constraint bindings.
#[derive(Debug, Clone, Default)]
pub struct DimensionBinding {
    dimensions: Vec<Dimension>,
    dimension_to_constraint: HashMap<DimensionId, ConstraintId>,
    constraint_to_dimension: HashMap<ConstraintId, DimensionId>,
    next_id: u64,
}

impl DimensionBinding {
    /// An empty binding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a dimension. Driving dimensions synthesize their backing
    /// constraint in the sketch before the dimension is recorded, so a
    /// constraint failure leaves the binding untouched.
    ///
    /// The constraint targets `nominal_value` when given, falling back to
    /// the display `value`. Reference dimensions ignore `nominal_value`.
    pub fn add_dimension(
        &mut self,
        sketch: &mut Sketch,
        kind: DimensionKind,
        value: f64,
        is_driving: bool,
        nominal_value: Option<f64>,
    ) -> Result<DimensionId, DimensionError> {
        let target = nominal_value.unwrap_or(value);
        let constraint = if is_driving {
            Some(sketch.add_constraint(kind.to_constraint(target))?)
        } else {
            None
        };

        let id = DimensionId(self.next_id);
        self.next_id += 1;
        if let Some(cid) = constraint {
            self.dimension_to_constraint.insert(id, cid);
            self.constraint_to_dimension.insert(cid, id);
        }
        self.dimensions.push(Dimension {
            id,
            kind,
            value,
            nominal_value: is_driving.then_some(target),
            is_driving,
            locked: false,
            precision: 2,
            units: Units::default(),
            tolerance: None,
            constraint,
            version: 0,
        });
        Ok(id)
    }

    /// Edit a dimension's value and driving state. Four cases:
    ///
    /// - reference → driving: synthesizes the backing constraint;
    /// - driving → reference: removes the constraint and clears the
    ///   nominal value;
    /// - driving stays driving: pushes the value into the constraint;
    /// - reference stays reference: display-only write, the solver is
    ///   never touched.
    pub fn update_dimension_value(
        &mut self,
        sketch: &mut Sketch,
        id: DimensionId,
        value: f64,
        is_driving: bool,
    ) -> Result<(), DimensionError> {
        let index = self.index_of(id)?;
        let was_driving = self.dimensions[index].is_driving;

        match (was_driving, is_driving) {
            (false, true) => {
                let kind = self.dimensions[index].kind;
                let cid = sketch.add_constraint(kind.to_constraint(value))?;
                self.dimension_to_constraint.insert(id, cid);
                self.constraint_to_dimension.insert(cid, id);
                let dim = &mut self.dimensions[index];
                dim.constraint = Some(cid);
                dim.is_driving = true;
                dim.nominal_value = Some(value);
                dim.value = value;
            }
            (true, false) => {
                if let Some(cid) = self.dimensions[index].constraint {
                    if sketch.constraint(cid).is_some() {
                        sketch.remove_constraint(cid)?;
                    }
                    self.dimension_to_constraint.remove(&id);
                    self.constraint_to_dimension.remove(&cid);
                }
                let dim = &mut self.dimensions[index];
                dim.constraint = None;
                dim.is_driving = false;
                dim.nominal_value = None;
                dim.value = value;
            }
            (true, true) => {
                let cid = self.dimensions[index]
                    .constraint
                    .ok_or(DimensionError::UnknownDimension(id))?;
                sketch.set_constraint_target(cid, value)?;
                let dim = &mut self.dimensions[index];
                dim.value = value;
                dim.nominal_value = Some(value);
            }
            (false, false) => {
                self.dimensions[index].value = value;
            }
        }
        self.dimensions[index].version += 1;
        Ok(())
    }

    /// Remove a dimension, tearing down its backing constraint if driving.
    ///
    /// A constraint that entity removal already cascaded away is not an
    /// error: the stale binding entries are dropped all the same.
    pub fn remove_dimension(
        &mut self,
        sketch: &mut Sketch,
        id: DimensionId,
    ) -> Result<(), DimensionError> {
        let index = self.index_of(id)?;
        if let Some(cid) = self.dimensions[index].constraint {
            if sketch.constraint(cid).is_some() {
                sketch.remove_constraint(cid)?;
            }
            self.dimension_to_constraint.remove(&id);
            self.constraint_to_dimension.remove(&cid);
        }
        self.dimensions.remove(index);
        Ok(())
    }

    /// Demote driving dimensions whose backing constraint no longer
    /// exists in the sketch, typically because removing an entity
    /// cascaded the constraint away. Demoted dimensions become reference
    /// dimensions; the ids of the demoted dimensions are returned.
    pub fn prune_dangling(&mut self, sketch: &Sketch) -> Vec<DimensionId> {
        let mut demoted = Vec::new();
        for dim in &mut self.dimensions {
            let Some(cid) = dim.constraint else {
                continue;
            };
            if sketch.constraint(cid).is_some() {
                continue;
            }
            self.dimension_to_constraint.remove(&dim.id);
            self.constraint_to_dimension.remove(&cid);
            dim.constraint = None;
            dim.is_driving = false;
            dim.nominal_value = None;
            dim.version += 1;
            demoted.push(dim.id);
        }
        demoted
    }

    /// Refresh display values from solved geometry.
    ///
    /// Reference dimensions re-measure whenever the measurement differs;
    /// driving dimensions re-sync only when it has drifted past
    /// [`DRIFT_TOLERANCE`]. Locked dimensions are left alone, and a
    /// measurement that matches the displayed value is not an edit: the
    /// version stays put.
    pub fn update_dimensions_from_geometry(&mut self, sketch: &Sketch) {
        for dim in &mut self.dimensions {
            if dim.locked {
                continue;
            }
            let measured = measure(&dim.kind, sketch);
            if measured == dim.value {
                continue;
            }
            if !dim.is_driving || (dim.value - measured).abs() > DRIFT_TOLERANCE {
                dim.value = measured;
                dim.version += 1;
            }
        }
    }

    /// Lock or unlock a dimension against geometry re-measurement.
    pub fn set_locked(&mut self, id: DimensionId, locked: bool) -> Result<(), DimensionError> {
        let index = self.index_of(id)?;
        self.dimensions[index].locked = locked;
        self.dimensions[index].version += 1;
        Ok(())
    }

    /// Look up a dimension.
    pub fn dimension(&self, id: DimensionId) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.id == id)
    }

    /// All dimensions, in insertion order.
    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    /// Number of registered dimensions.
    pub fn dimension_count(&self) -> usize {
        self.dimensions.len()
    }

    /// The backing constraint of a driving dimension.
    pub fn constraint_for(&self, id: DimensionId) -> Option<ConstraintId> {
        self.dimension_to_constraint.get(&id).copied()
    }

    /// The dimension driving a constraint, if any.
    pub fn dimension_for(&self, id: ConstraintId) -> Option<DimensionId> {
        self.constraint_to_dimension.get(&id).copied()
    }

    /// True when every dimension satisfies the binding invariant:
    /// `is_driving` ⇔ a constraint id is recorded, and the two id maps
    /// mirror each other exactly.
    pub fn is_consistent(&self) -> bool {
        let mut driving = 0;
        for dim in &self.dimensions {
            if dim.is_driving != dim.constraint.is_some() {
                return false;
            }
            if dim.is_driving != dim.nominal_value.is_some() {
                return false;
            }
            if let Some(cid) = dim.constraint {
                driving += 1;
                if self.dimension_to_constraint.get(&dim.id) != Some(&cid) {
                    return false;
                }
                if self.constraint_to_dimension.get(&cid) != Some(&dim.id) {
                    return false;
                }
            }
        }
        driving == self.dimension_to_constraint.len()
            && driving == self.constraint_to_dimension.len()
    }

    /// Snapshot the binding for persistence.
    pub fn export_state(&self) -> BindingState {
        let mut pairs: Vec<_> = self
            .dimension_to_constraint
            .iter()
            .map(|(d, c)| (*d, *c))
            .collect();
        pairs.sort_unstable();
        BindingState {
            dimensions: self.dimensions.clone(),
            dimension_to_constraint: pairs,
        }
    }

    /// Restore a binding from a snapshot, rebuilding the reverse map and
    /// the id counter.
    pub fn import_state(state: BindingState) -> Self {
        let dimension_to_constraint: HashMap<_, _> =
            state.dimension_to_constraint.iter().copied().collect();
        let constraint_to_dimension = state
            .dimension_to_constraint
            .iter()
            .map(|&(d, c)| (c, d))
            .collect();
        let next_id = state
            .dimensions
            .iter()
            .map(|d| d.id.0 + 1)
            .max()
            .unwrap_or(0);
        Self {
            dimensions: state.dimensions,
            dimension_to_constraint,
            constraint_to_dimension,
            next_id,
        }
    }

    fn index_of(&self, id: DimensionId) -> Result<usize, DimensionError> {
        self.dimensions
            .iter()
            .position(|d| d.id == id)
            .ok_or(DimensionError::UnknownDimension(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcad_math::Point2;
    use pcad_sketch::EntityGeometry;

    fn sketch_with_circle() -> (Sketch, EntityId) {
        let mut sketch = Sketch::new();
        let circle = sketch.add_entity(EntityGeometry::Circle {
            center: Point2::origin(),
            radius: 10.0,
        });
        (sketch, circle)
    }

    #[test]
    fn test_driving_dimension_synthesizes_constraint() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                25.0,
                true,
                None,
            )
            .unwrap();

        assert_eq!(sketch.constraint_count(), 1);
        let dim = binding.dimension(id).unwrap();
        assert_eq!(dim.nominal_value, Some(25.0));
        assert!(binding.is_consistent());

        let cid = binding.constraint_for(id).unwrap();
        assert_eq!(sketch.constraint(cid).unwrap().kind.target(), Some(25.0));
    }

    #[test]
    fn test_reference_dimension_never_touches_solver() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: true,
                },
                20.0,
                false,
                None,
            )
            .unwrap();
        assert_eq!(sketch.constraint_count(), 0);

        binding
            .update_dimension_value(&mut sketch, id, 99.0, false)
            .unwrap();
        assert_eq!(sketch.constraint_count(), 0);
        assert_eq!(binding.dimension(id).unwrap().value, 99.0);
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_toggle_driving_to_reference_removes_constraint() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                25.0,
                true,
                None,
            )
            .unwrap();
        assert_eq!(sketch.constraint_count(), 1);

        binding
            .update_dimension_value(&mut sketch, id, 10.0, false)
            .unwrap();
        assert_eq!(sketch.constraint_count(), 0);
        let dim = binding.dimension(id).unwrap();
        assert_eq!(dim.nominal_value, None);
        assert!(!dim.is_driving);
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_toggle_reference_to_driving_creates_constraint() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(4.0, 0.0),
        });
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(&mut sketch, DimensionKind::Length { line }, 4.0, false, None)
            .unwrap();
        assert_eq!(sketch.constraint_count(), 0);

        binding
            .update_dimension_value(&mut sketch, id, 6.0, true)
            .unwrap();
        assert_eq!(sketch.constraint_count(), 1);
        let dim = binding.dimension(id).unwrap();
        assert_eq!(dim.nominal_value, Some(6.0));
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_driving_update_pushes_into_constraint() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                12.0,
                true,
                None,
            )
            .unwrap();

        binding
            .update_dimension_value(&mut sketch, id, 25.0, true)
            .unwrap();
        let cid = binding.constraint_for(id).unwrap();
        assert_eq!(sketch.constraint(cid).unwrap().kind.target(), Some(25.0));
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_remove_dimension_tears_down_constraint() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                25.0,
                true,
                None,
            )
            .unwrap();

        binding.remove_dimension(&mut sketch, id).unwrap();
        assert_eq!(sketch.constraint_count(), 0);
        assert_eq!(binding.dimension_count(), 0);
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_nominal_value_seeds_constraint_target() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                10.0,
                true,
                Some(30.0),
            )
            .unwrap();

        // The display value keeps the current measurement; the constraint
        // drives toward the nominal.
        let dim = binding.dimension(id).unwrap();
        assert_eq!(dim.value, 10.0);
        assert_eq!(dim.nominal_value, Some(30.0));
        let cid = binding.constraint_for(id).unwrap();
        assert_eq!(sketch.constraint(cid).unwrap().kind.target(), Some(30.0));
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_prune_demotes_dimension_after_constraint_cascade() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                25.0,
                true,
                None,
            )
            .unwrap();

        // Deleting the circle cascades the radius constraint away behind
        // the binding's back.
        sketch.remove_entity(circle).unwrap();
        assert_eq!(sketch.constraint_count(), 0);

        let demoted = binding.prune_dangling(&sketch);
        assert_eq!(demoted, vec![id]);
        let dim = binding.dimension(id).unwrap();
        assert!(!dim.is_driving);
        assert_eq!(dim.constraint, None);
        assert_eq!(dim.nominal_value, None);
        assert!(binding.is_consistent());

        // A second pass finds nothing left to demote.
        assert!(binding.prune_dangling(&sketch).is_empty());
    }

    #[test]
    fn test_remove_dimension_tolerates_cascaded_constraint() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                25.0,
                true,
                None,
            )
            .unwrap();
        sketch.remove_entity(circle).unwrap();

        // The backing constraint is already gone; removal still succeeds
        // and leaves the binding clean.
        binding.remove_dimension(&mut sketch, id).unwrap();
        assert_eq!(binding.dimension_count(), 0);
        assert!(binding.is_consistent());
    }

    #[test]
    fn test_geometry_refresh_remeasures_reference() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(3.0, 4.0),
        });
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(&mut sketch, DimensionKind::Length { line }, 0.0, false, None)
            .unwrap();

        binding.update_dimensions_from_geometry(&sketch);
        assert!((binding.dimension(id).unwrap().value - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_unchanged_measurement_does_not_bump_version() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(3.0, 4.0),
        });
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(&mut sketch, DimensionKind::Length { line }, 0.0, false, None)
            .unwrap();

        binding.update_dimensions_from_geometry(&sketch);
        let version = binding.dimension(id).unwrap().version;
        assert_eq!(binding.dimension(id).unwrap().value, 5.0);

        // Re-measuring static geometry is not an edit.
        binding.update_dimensions_from_geometry(&sketch);
        binding.update_dimensions_from_geometry(&sketch);
        assert_eq!(binding.dimension(id).unwrap().version, version);
        assert_eq!(binding.dimension(id).unwrap().value, 5.0);
    }

    #[test]
    fn test_driving_resync_only_past_drift_tolerance() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                10.0005,
                true,
                None,
            )
            .unwrap();

        // Geometry is at 10.0: within tolerance, the commanded value stays.
        binding.update_dimensions_from_geometry(&sketch);
        assert_eq!(binding.dimension(id).unwrap().value, 10.0005);

        // Push the command far from geometry and the display re-syncs.
        binding
            .update_dimension_value(&mut sketch, id, 25.0, true)
            .unwrap();
        binding.update_dimensions_from_geometry(&sketch);
        assert_eq!(binding.dimension(id).unwrap().value, 10.0);
    }

    #[test]
    fn test_locked_dimension_is_not_remeasured() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(3.0, 4.0),
        });
        let mut binding = DimensionBinding::new();
        let id = binding
            .add_dimension(&mut sketch, DimensionKind::Length { line }, 1.0, false, None)
            .unwrap();
        binding.set_locked(id, true).unwrap();

        binding.update_dimensions_from_geometry(&sketch);
        assert_eq!(binding.dimension(id).unwrap().value, 1.0);
    }

    #[test]
    fn test_state_round_trip() {
        let (mut sketch, circle) = sketch_with_circle();
        let mut binding = DimensionBinding::new();
        binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                25.0,
                true,
                None,
            )
            .unwrap();
        binding
            .add_dimension(
                &mut sketch,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: true,
                },
                20.0,
                false,
                None,
            )
            .unwrap();

        let json = serde_json::to_string(&binding.export_state()).unwrap();
        let state: BindingState = serde_json::from_str(&json).unwrap();
        let restored = DimensionBinding::import_state(state);

        assert!(restored.is_consistent());
        assert_eq!(restored.dimensions(), binding.dimensions());
        assert_eq!(restored.export_state(), binding.export_state());

        // The id counter resumes past the imported ids.
        let mut sketch2 = sketch.clone();
        let mut restored = restored;
        let next = restored
            .add_dimension(
                &mut sketch2,
                DimensionKind::Radial {
                    entity: circle,
                    diameter: false,
                },
                1.0,
                false,
                None,
            )
            .unwrap();
        assert_eq!(next, DimensionId(2));
    }

    #[test]
    fn test_angular_measure() {
        let mut sketch = Sketch::new();
        let a = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1.0, 0.0),
        });
        let b = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(0.0, 1.0),
        });
        let kind = DimensionKind::Angular { a, b };
        assert!((measure(&kind, &sketch) - 90.0).abs() < 1e-9);
    }
}
