//! Geometric constraints and their residual functions.

use pcad_math::{angle_between_deg, cross2, Vec2};
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, PointRef};
use crate::Sketch;

/// Directions shorter than this are treated as degenerate and contribute
/// a zero residual instead of dividing by near-zero.
const DIR_EPS: f64 = 1e-9;

/// Stable identifier of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConstraintId(pub u64);

/// A constraint instance with its scalar target folded into the variant.
///
/// The residual of each variant is zero exactly when the constraint is
/// satisfied; its sign is only meaningful as a gradient direction.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstraintKind {
    /// Line endpoints share a y coordinate.
    Horizontal {
        /// The constrained line.
        line: EntityId,
    },
    /// Line endpoints share an x coordinate.
    Vertical {
        /// The constrained line.
        line: EntityId,
    },
    /// Two line directions are parallel (2D cross product zero).
    Parallel {
        /// First line.
        a: EntityId,
        /// Second line.
        b: EntityId,
    },
    /// Two line directions are perpendicular (dot product zero).
    Perpendicular {
        /// First line.
        a: EntityId,
        /// Second line.
        b: EntityId,
    },
    /// Two points occupy the same location.
    Coincident {
        /// First point.
        a: PointRef,
        /// Second point.
        b: PointRef,
    },
    /// Two points lie at a fixed separation.
    Distance {
        /// First point.
        a: PointRef,
        /// Second point.
        b: PointRef,
        /// Target separation.
        target: f64,
    },
    /// Two line directions span a fixed angle, folded into `[0°, 180°]`.
    Angle {
        /// First line.
        a: EntityId,
        /// Second line.
        b: EntityId,
        /// Target angle in degrees.
        degrees: f64,
    },
    /// A circle or arc has a fixed radius.
    Radius {
        /// The constrained circle or arc.
        entity: EntityId,
        /// Target radius.
        target: f64,
    },
    /// A circle or arc has a fixed diameter.
    Diameter {
        /// The constrained circle or arc.
        entity: EntityId,
        /// Target diameter.
        target: f64,
    },
    /// A line segment has a fixed length.
    Length {
        /// The constrained line.
        line: EntityId,
        /// Target length.
        target: f64,
    },
}

impl ConstraintKind {
    /// Entities this constraint reads. Drives the dependency set and
    /// removal cascade.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        match self {
            Self::Horizontal { line } | Self::Vertical { line } | Self::Length { line, .. } => {
                vec![*line]
            }
            Self::Parallel { a, b }
            | Self::Perpendicular { a, b }
            | Self::Angle { a, b, .. } => vec![*a, *b],
            Self::Coincident { a, b } | Self::Distance { a, b, .. } => {
                if a.entity == b.entity {
                    vec![a.entity]
                } else {
                    vec![a.entity, b.entity]
                }
            }
            Self::Radius { entity, .. } | Self::Diameter { entity, .. } => vec![*entity],
        }
    }

    /// The scalar target, for kinds that carry one.
    pub fn target(&self) -> Option<f64> {
        match self {
            Self::Distance { target, .. }
            | Self::Radius { target, .. }
            | Self::Diameter { target, .. }
            | Self::Length { target, .. } => Some(*target),
            Self::Angle { degrees, .. } => Some(*degrees),
            _ => None,
        }
    }

    /// Replace the scalar target. Returns false for kinds without one.
    pub fn set_target(&mut self, value: f64) -> bool {
        match self {
            Self::Distance { target, .. }
            | Self::Radius { target, .. }
            | Self::Diameter { target, .. }
            | Self::Length { target, .. } => *target = value,
            Self::Angle { degrees, .. } => *degrees = value,
            _ => return false,
        }
        true
    }

    /// Evaluate the residual against the current sketch state.
    ///
    /// Read-only and side-effect-free. Degenerate inputs (missing points,
    /// zero-length directions) evaluate to zero so one bad entity cannot
    /// derail the whole solve.
    pub fn residual(&self, sketch: &Sketch) -> f64 {
        match self {
            Self::Horizontal { line } => match endpoints(sketch, *line) {
                Some((start, end)) => end.y - start.y,
                None => 0.0,
            },
            Self::Vertical { line } => match endpoints(sketch, *line) {
                Some((start, end)) => end.x - start.x,
                None => 0.0,
            },
            Self::Parallel { a, b } => match (unit_dir(sketch, *a), unit_dir(sketch, *b)) {
                (Some(da), Some(db)) => cross2(&da, &db),
                _ => 0.0,
            },
            Self::Perpendicular { a, b } => match (unit_dir(sketch, *a), unit_dir(sketch, *b)) {
                (Some(da), Some(db)) => da.dot(&db),
                _ => 0.0,
            },
            Self::Coincident { a, b } => separation(sketch, a, b),
            Self::Distance { a, b, target } => separation(sketch, a, b) - target,
            Self::Angle { a, b, degrees } => {
                match (unit_dir(sketch, *a), unit_dir(sketch, *b)) {
                    (Some(da), Some(db)) => angle_between_deg(&da, &db) - degrees,
                    _ => 0.0,
                }
            }
            Self::Radius { entity, target } => {
                sketch.entity(*entity).and_then(|e| e.radius()).unwrap_or(*target) - target
            }
            Self::Diameter { entity, target } => {
                match sketch.entity(*entity).and_then(|e| e.radius()) {
                    Some(r) => 2.0 * r - target,
                    None => 0.0,
                }
            }
            Self::Length { line, target } => match endpoints(sketch, *line) {
                Some((start, end)) => (end - start).norm() - target,
                None => 0.0,
            },
        }
    }
}

/// A registered constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Stable identifier.
    pub id: ConstraintId,
    /// The constraint function and its parameters.
    pub kind: ConstraintKind,
    /// Locked constraints are protected from interactive edits.
    pub locked: bool,
    /// Caller-assigned ordering hint for conflict resolution UIs.
    pub priority: i32,
    /// Bumped on every target change.
    pub version: u64,
}

fn endpoints(sketch: &Sketch, line: EntityId) -> Option<(pcad_math::Point2, pcad_math::Point2)> {
    let e = sketch.entity(line)?;
    Some((e.point(0)?, e.point(1)?))
}

/// Normalized direction of a line, or None when degenerate.
fn unit_dir(sketch: &Sketch, line: EntityId) -> Option<Vec2> {
    let (start, end) = endpoints(sketch, line)?;
    let dir = end - start;
    let norm = dir.norm();
    if norm < DIR_EPS {
        return None;
    }
    Some(dir / norm)
}

fn separation(sketch: &Sketch, a: &PointRef, b: &PointRef) -> f64 {
    let pa = sketch.entity(a.entity).and_then(|e| e.point(a.index));
    let pb = sketch.entity(b.entity).and_then(|e| e.point(b.index));
    match (pa, pb) {
        (Some(pa), Some(pb)) => (pa - pb).norm(),
        _ => 0.0,
    }
}
