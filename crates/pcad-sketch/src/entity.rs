//! Sketch entities and the scalar variables they contribute.

use pcad_math::Point2;
use serde::{Deserialize, Serialize};

/// Minimum radius a circle or arc may be driven to.
///
/// Radius write-back clamps here instead of erroring so that one degenerate
/// entity cannot abort an otherwise valid solve.
pub const MIN_RADIUS: f64 = 0.01;

/// Stable identifier of a sketch entity.
///
/// Allocated by a per-sketch counter; never reused within a sketch's
/// lifetime, even after the entity is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Reference to one point of an entity.
///
/// Lines expose index 0 (start) and 1 (end); circles and arcs expose
/// their center at index 0; point entities expose index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PointRef {
    /// The owning entity.
    pub entity: EntityId,
    /// Point index within the entity.
    pub index: usize,
}

impl PointRef {
    /// Reference point `index` of `entity`.
    pub fn new(entity: EntityId, index: usize) -> Self {
        Self { entity, index }
    }
}

/// Geometry of a 2D sketch primitive.
///
/// This is the solver-visible taxonomy: every variant decomposes into a
/// fixed set of scalar variables. Higher-order primitives (splines,
/// ellipses, polygons) live outside the solver and are not represented.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityGeometry {
    /// A free point (2 variables: x, y).
    Point {
        /// Position.
        pos: Point2,
    },
    /// A line segment (4 variables: both endpoints).
    Line {
        /// Start point.
        start: Point2,
        /// End point.
        end: Point2,
    },
    /// A circle (3 variables: center x/y, radius).
    Circle {
        /// Center point.
        center: Point2,
        /// Radius.
        radius: f64,
    },
    /// A circular arc (5 variables: center x/y, radius, start/end angle).
    Arc {
        /// Center point.
        center: Point2,
        /// Radius.
        radius: f64,
        /// Start angle in radians.
        start_angle: f64,
        /// End angle in radians.
        end_angle: f64,
    },
}

/// One scalar degree of freedom of an entity.
///
/// The kind tag fully disambiguates which field a variable maps to; there
/// is no name-based dispatch anywhere in the write-back path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarKind {
    /// X coordinate of the point at `Variable::point`.
    X,
    /// Y coordinate of the point at `Variable::point`.
    Y,
    /// Circle or arc radius.
    Radius,
    /// Arc start angle (radians).
    StartAngle,
    /// Arc end angle (radians).
    EndAngle,
}

/// A solver variable: one scalar extracted from an entity.
///
/// Its index in the sketch's variable vector is the solver's column
/// number. Indices are stable while the entity set is stable, and are
/// rebuilt (not reused) after any entity removal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Variable {
    /// The owning entity.
    pub entity: EntityId,
    /// Which field of the entity this variable drives.
    pub kind: VarKind,
    /// Point index within the entity, for `X`/`Y` kinds.
    pub point: usize,
    /// Current scalar value (mirrors the entity field).
    pub value: f64,
}

/// A sketch primitive with identity, construction flag, and edit version.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Stable identifier.
    pub id: EntityId,
    /// The geometric payload.
    pub geometry: EntityGeometry,
    /// Construction geometry is visual-only but still constrainable.
    pub construction: bool,
    /// Bumped on every mutation, including solver write-back.
    pub version: u64,
}

impl Entity {
    /// The point at `index`, if the geometry exposes one there.
    pub fn point(&self, index: usize) -> Option<Point2> {
        match (&self.geometry, index) {
            (EntityGeometry::Point { pos }, 0) => Some(*pos),
            (EntityGeometry::Line { start, .. }, 0) => Some(*start),
            (EntityGeometry::Line { end, .. }, 1) => Some(*end),
            (EntityGeometry::Circle { center, .. }, 0) => Some(*center),
            (EntityGeometry::Arc { center, .. }, 0) => Some(*center),
            _ => None,
        }
    }

    /// The radius, for circles and arcs.
    pub fn radius(&self) -> Option<f64> {
        match &self.geometry {
            EntityGeometry::Circle { radius, .. } => Some(*radius),
            EntityGeometry::Arc { radius, .. } => Some(*radius),
            _ => None,
        }
    }

    /// Decompose into `(kind, point index, value)` triples, in the fixed
    /// order the solver allocates variable indices.
    pub fn variables(&self) -> Vec<(VarKind, usize, f64)> {
        match &self.geometry {
            EntityGeometry::Point { pos } => {
                vec![(VarKind::X, 0, pos.x), (VarKind::Y, 0, pos.y)]
            }
            EntityGeometry::Line { start, end } => vec![
                (VarKind::X, 0, start.x),
                (VarKind::Y, 0, start.y),
                (VarKind::X, 1, end.x),
                (VarKind::Y, 1, end.y),
            ],
            EntityGeometry::Circle { center, radius } => vec![
                (VarKind::X, 0, center.x),
                (VarKind::Y, 0, center.y),
                (VarKind::Radius, 0, *radius),
            ],
            EntityGeometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
            } => vec![
                (VarKind::X, 0, center.x),
                (VarKind::Y, 0, center.y),
                (VarKind::Radius, 0, *radius),
                (VarKind::StartAngle, 0, *start_angle),
                (VarKind::EndAngle, 0, *end_angle),
            ],
        }
    }

    /// Write one scalar back into the owning field.
    ///
    /// Radius values clamp to [`MIN_RADIUS`]. Returns false when the
    /// geometry has no matching field (stale variable descriptor).
    pub(crate) fn apply_variable(&mut self, kind: VarKind, point: usize, value: f64) -> bool {
        match (&mut self.geometry, kind, point) {
            (EntityGeometry::Point { pos }, VarKind::X, 0) => pos.x = value,
            (EntityGeometry::Point { pos }, VarKind::Y, 0) => pos.y = value,
            (EntityGeometry::Line { start, .. }, VarKind::X, 0) => start.x = value,
            (EntityGeometry::Line { start, .. }, VarKind::Y, 0) => start.y = value,
            (EntityGeometry::Line { end, .. }, VarKind::X, 1) => end.x = value,
            (EntityGeometry::Line { end, .. }, VarKind::Y, 1) => end.y = value,
            (EntityGeometry::Circle { center, .. }, VarKind::X, 0) => center.x = value,
            (EntityGeometry::Circle { center, .. }, VarKind::Y, 0) => center.y = value,
            (EntityGeometry::Circle { radius, .. }, VarKind::Radius, _) => {
                *radius = value.max(MIN_RADIUS)
            }
            (EntityGeometry::Arc { center, .. }, VarKind::X, 0) => center.x = value,
            (EntityGeometry::Arc { center, .. }, VarKind::Y, 0) => center.y = value,
            (EntityGeometry::Arc { radius, .. }, VarKind::Radius, _) => {
                *radius = value.max(MIN_RADIUS)
            }
            (EntityGeometry::Arc { start_angle, .. }, VarKind::StartAngle, _) => {
                *start_angle = value
            }
            (EntityGeometry::Arc { end_angle, .. }, VarKind::EndAngle, _) => *end_angle = value,
            _ => return false,
        }
        self.version += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(start: (f64, f64), end: (f64, f64)) -> Entity {
        Entity {
            id: EntityId(0),
            geometry: EntityGeometry::Line {
                start: Point2::new(start.0, start.1),
                end: Point2::new(end.0, end.1),
            },
            construction: false,
            version: 0,
        }
    }

    #[test]
    fn test_line_variable_order() {
        let e = line((1.0, 2.0), (3.0, 4.0));
        let vars = e.variables();
        assert_eq!(vars.len(), 4);
        assert_eq!(vars[0], (VarKind::X, 0, 1.0));
        assert_eq!(vars[3], (VarKind::Y, 1, 4.0));
    }

    #[test]
    fn test_arc_contributes_five_variables() {
        let e = Entity {
            id: EntityId(1),
            geometry: EntityGeometry::Arc {
                center: Point2::new(0.0, 0.0),
                radius: 5.0,
                start_angle: 0.0,
                end_angle: 1.0,
            },
            construction: false,
            version: 0,
        };
        assert_eq!(e.variables().len(), 5);
    }

    #[test]
    fn test_point_lookup() {
        let e = line((0.0, 0.0), (5.0, 3.0));
        assert_eq!(e.point(1), Some(Point2::new(5.0, 3.0)));
        assert_eq!(e.point(2), None);
    }

    #[test]
    fn test_radius_write_back_clamps() {
        let mut e = Entity {
            id: EntityId(2),
            geometry: EntityGeometry::Circle {
                center: Point2::origin(),
                radius: 10.0,
            },
            construction: false,
            version: 0,
        };
        assert!(e.apply_variable(VarKind::Radius, 0, -4.0));
        assert_eq!(e.radius(), Some(MIN_RADIUS));
        assert_eq!(e.version, 1);
    }

    #[test]
    fn test_stale_variable_is_rejected() {
        let mut e = line((0.0, 0.0), (1.0, 0.0));
        assert!(!e.apply_variable(VarKind::Radius, 0, 3.0));
        assert_eq!(e.version, 0);
    }
}
