//! Delegate boundaries to the external BREP engine and mesh CSG.
//!
//! The kernel performs no BREP topology math and no mesh boolean math of
//! its own; both are consumed through these traits. Production builds
//! plug in real engines, tests plug in mocks.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mesh::TriangleMesh;

/// A delegate (BREP engine or mesh CSG) reported failure.
///
/// Delegates accumulate human-readable messages rather than structured
/// causes; the kernel re-raises them verbatim.
#[derive(Debug, Clone, Error)]
#[error("delegate failed: {}", errors.join("; "))]
pub struct DelegateError {
    /// Messages reported by the delegate, in occurrence order.
    pub errors: Vec<String>,
}

impl DelegateError {
    /// A failure with a single message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            errors: vec![message.into()],
        }
    }
}

/// The three CSG booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanOp {
    /// A ∪ B.
    Union,
    /// A − B.
    Subtract,
    /// A ∩ B.
    Intersect,
}

/// Blend surface shape for fillets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendType {
    /// Circular cross-section.
    Circular,
    /// Conic cross-section.
    Conic,
}

/// Surface continuity at the blend boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuity {
    /// Tangent continuity.
    G1,
    /// Curvature continuity.
    G2,
}

/// Chamfer sizing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChamferType {
    /// Equal setback on both faces.
    Symmetric,
    /// Independent setback per face.
    TwoDistances,
    /// Setback on one face plus an angle.
    DistanceAngle,
}

/// Fillet request passed to the BREP engine.
#[derive(Debug, Clone)]
pub struct FilletOptions<E> {
    /// Edges to blend.
    pub edges: Vec<E>,
    /// Constant blend radius.
    pub radius: f64,
    /// Optional per-edge radii overriding `radius`.
    pub variable_radii: Option<Vec<f64>>,
    /// Blend cross-section shape.
    pub blend_type: BlendType,
    /// Continuity at the blend boundary.
    pub continuity: Continuity,
}

/// Chamfer request passed to the BREP engine.
#[derive(Debug, Clone)]
pub struct ChamferOptions<E> {
    /// Edges to cut.
    pub edges: Vec<E>,
    /// First setback distance.
    pub distance1: f64,
    /// Second setback, for [`ChamferType::TwoDistances`].
    pub distance2: Option<f64>,
    /// Angle in degrees, for [`ChamferType::DistanceAngle`].
    pub angle: Option<f64>,
    /// Sizing mode.
    pub chamfer_type: ChamferType,
}

/// External BREP topology, boolean, and blending engine.
///
/// The associated `Solid` and `Edge` types are opaque to the kernel;
/// edge selection is positional into [`BrepEngine::all_edges`], which is
/// recomputed per call (edge numbering stability is the engine's
/// problem, not guaranteed here).
pub trait BrepEngine {
    /// Opaque BREP solid handle.
    type Solid: Clone;
    /// Opaque topological edge handle.
    type Edge: Clone;

    /// Boolean of two solids.
    fn boolean_operation(
        &self,
        a: &Self::Solid,
        b: &Self::Solid,
        op: BooleanOp,
    ) -> Result<Self::Solid, DelegateError>;

    /// Blend the given edges.
    fn fillet(
        &self,
        solid: &Self::Solid,
        options: &FilletOptions<Self::Edge>,
    ) -> Result<Self::Solid, DelegateError>;

    /// Chamfer the given edges.
    fn chamfer(
        &self,
        solid: &Self::Solid,
        options: &ChamferOptions<Self::Edge>,
    ) -> Result<Self::Solid, DelegateError>;

    /// Flattened edge list of a solid's topology.
    fn all_edges(&self, solid: &Self::Solid) -> Vec<Self::Edge>;

    /// Whether an edge's topology admits a blend.
    fn is_filletable_edge(&self, edge: &Self::Edge, solid: &Self::Solid) -> bool;

    /// Convert a solid to a display mesh.
    fn solid_to_mesh(&self, solid: &Self::Solid) -> TriangleMesh;
}

/// Mesh-level CSG fallback used when BREP solids are unavailable.
pub trait MeshCsg {
    /// A ∪ B.
    fn union(&self, a: &TriangleMesh, b: &TriangleMesh) -> Result<TriangleMesh, DelegateError>;
    /// A − B.
    fn subtract(&self, a: &TriangleMesh, b: &TriangleMesh) -> Result<TriangleMesh, DelegateError>;
    /// A ∩ B.
    fn intersect(&self, a: &TriangleMesh, b: &TriangleMesh)
        -> Result<TriangleMesh, DelegateError>;

    /// Dispatch on a [`BooleanOp`].
    fn apply(
        &self,
        op: BooleanOp,
        a: &TriangleMesh,
        b: &TriangleMesh,
    ) -> Result<TriangleMesh, DelegateError> {
        match op {
            BooleanOp::Union => self.union(a, b),
            BooleanOp::Subtract => self.subtract(a, b),
            BooleanOp::Intersect => self.intersect(a, b),
        }
    }
}
