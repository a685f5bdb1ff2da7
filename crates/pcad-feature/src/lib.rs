//! Feature/history kernel over solved 2D sketches.
//!
//! Turns solved sketches into 3D geometry and keeps the feature history:
//! extrude and revolve generate meshes directly; booleans, fillets, and
//! chamfers delegate to an external BREP engine (with mesh-CSG fallback
//! for booleans); patterns clone meshes. The kernel itself does no BREP
//! math — [`BrepEngine`] and [`MeshCsg`] are its entire geometric
//! footprint beyond profile sweeping.

#![warn(missing_docs)]

mod brep;
mod extrude;
mod kernel;
mod mesh;
mod profile;
mod revolve;

pub use brep::{
    BlendType, BooleanOp, BrepEngine, ChamferOptions, ChamferType, Continuity, DelegateError,
    FilletOptions, MeshCsg,
};
pub use extrude::extrude_profile;
pub use kernel::{
    BlendResult, Feature, FeatureError, FeatureId, FeatureKernel, FeatureKind, FeatureRecord,
    PatternKind, Representation, SketchId,
};
pub use mesh::TriangleMesh;
pub use profile::{profile_from_sketch, Profile, ProfileError, CIRCLE_SEGMENTS};
pub use revolve::revolve_profile;
