#![warn(missing_docs)]

//! Math types for the pcad sketch solver and feature kernel.
//!
//! Thin wrappers around nalgebra providing the types the 2D constraint
//! solver and the mesh-producing feature layer share: 2D sketch points
//! and vectors, a 3D transform for pattern placement, angle folding,
//! and tolerance constants.

use nalgebra::{Matrix4, Unit, Vector2, Vector3, Vector4};

/// A point in 2D sketch space.
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D sketch space.
pub type Vec2 = Vector2<f64>;

/// A point in 3D model space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D model space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D model space.
pub type Dir3 = Unit<Vector3<f64>>;

/// 2D cross product (z component of the 3D cross of two in-plane vectors).
///
/// Zero exactly when the vectors are parallel; the sign gives the turn
/// direction, which the solver uses as a gradient.
pub fn cross2(a: &Vec2, b: &Vec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Angle between two 2D directions in degrees, folded into `[0, 180]`.
///
/// Direction sense is ignored: a line and its reversal span an angle of
/// either 0 or 180 degrees depending on orientation, and both folds are
/// meaningful targets for an angular constraint.
pub fn angle_between_deg(a: &Vec2, b: &Vec2) -> f64 {
    cross2(a, b).atan2(a.dot(b)).to_degrees().abs()
}

/// A 4x4 affine transformation matrix for mesh placement.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// The underlying 4x4 matrix.
    pub matrix: Matrix4<f64>,
}

impl Transform {
    /// Identity transform.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Translation by `(dx, dy, dz)`.
    pub fn translation(dx: f64, dy: f64, dz: f64) -> Self {
        let mut m = Matrix4::identity();
        m[(0, 3)] = dx;
        m[(1, 3)] = dy;
        m[(2, 3)] = dz;
        Self { matrix: m }
    }

    /// Rotation about an arbitrary axis through the origin by `angle` radians.
    ///
    /// Uses Rodrigues' rotation formula.
    pub fn rotation_about_axis(axis: &Dir3, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.as_ref().x, axis.as_ref().y, axis.as_ref().z);
        let mut m = Matrix4::identity();
        m[(0, 0)] = t * x * x + c;
        m[(0, 1)] = t * x * y - s * z;
        m[(0, 2)] = t * x * z + s * y;
        m[(1, 0)] = t * x * y + s * z;
        m[(1, 1)] = t * y * y + c;
        m[(1, 2)] = t * y * z - s * x;
        m[(2, 0)] = t * x * z - s * y;
        m[(2, 1)] = t * y * z + s * x;
        m[(2, 2)] = t * z * z + c;
        Self { matrix: m }
    }

    /// Compose: `self` then `other` (self * other).
    ///
    /// `a.then(&b)` applies `b` first, then `a`, matching matrix order.
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// Transform a point.
    pub fn apply_point(&self, p: &Point3) -> Point3 {
        let v = self.matrix * Vector4::new(p.x, p.y, p.z, 1.0);
        Point3::new(v.x, v.y, v.z)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in mm.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default CAD tolerances (1e-6 mm linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Check if two 2D points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
