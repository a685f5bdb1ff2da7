//! Feature history registry and the modeling operations over it.

use pcad_math::{Dir3, Point3, Transform, Vec3};
use pcad_sketch::Sketch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::brep::{
    BlendType, BooleanOp, BrepEngine, ChamferOptions, ChamferType, Continuity, DelegateError,
    FilletOptions, MeshCsg,
};
use crate::extrude::extrude_profile;
use crate::mesh::TriangleMesh;
use crate::profile::{profile_from_sketch, ProfileError};
use crate::revolve::revolve_profile;

// ============================================================================
// Identifiers and errors
// ============================================================================

/// Stable identifier of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FeatureId(pub u64);

/// Stable identifier of a registered sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SketchId(pub u64);

/// Errors from feature operations.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// The feature id is not registered.
    #[error("unknown feature {0:?}")]
    UnknownFeature(FeatureId),
    /// The sketch id is not registered.
    #[error("unknown sketch {0:?}")]
    UnknownSketch(SketchId),
    /// The sketch yields no usable profile.
    #[error(transparent)]
    Profile(#[from] ProfileError),
    /// Fillet/chamfer was requested on a feature without a BREP solid.
    #[error("feature {0:?} carries no BREP solid; blending needs one")]
    MissingBrep(FeatureId),
    /// An edge index does not exist in the solid's edge list.
    #[error("edge {index} out of range for feature {feature:?} ({available} edges)")]
    EdgeOutOfRange {
        /// The targeted feature.
        feature: FeatureId,
        /// The offending index.
        index: usize,
        /// Edge count of the solid.
        available: usize,
    },
    /// The kernel was built without a BREP engine.
    #[error("no BREP engine is configured")]
    EngineUnavailable,
    /// The BREP engine or mesh CSG reported failure.
    #[error(transparent)]
    Delegate(#[from] DelegateError),
}

// ============================================================================
// Feature model
// ============================================================================

/// Instance layout of a pattern feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatternKind {
    /// Instances along a fixed offset vector.
    Linear {
        /// Total instance count, original included.
        count: u32,
        /// Offset between consecutive instances.
        offset: [f64; 3],
    },
    /// Instances rotated about an axis.
    Circular {
        /// Total instance count, original included.
        count: u32,
        /// A point on the rotation axis.
        axis_origin: [f64; 3],
        /// Axis direction.
        axis_dir: [f64; 3],
        /// Rotation between consecutive instances, degrees.
        step_deg: f64,
    },
}

/// The parameters of a feature, by operation.
///
/// `Shell` and `Hole` are part of the persisted taxonomy for documents
/// authored by richer kernels; this kernel does not construct them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureKind {
    /// Linear extrusion of a sketch profile.
    Extrude {
        /// Extrusion vector; its length is the distance.
        direction: [f64; 3],
    },
    /// Revolution of a sketch profile about an axis.
    Revolve {
        /// A point on the axis.
        axis_origin: [f64; 3],
        /// Axis direction.
        axis_dir: [f64; 3],
        /// Swept angle in degrees.
        angle_deg: f64,
    },
    /// Boolean of two prior features.
    Boolean {
        /// The operation.
        op: BooleanOp,
        /// First operand.
        a: FeatureId,
        /// Second operand.
        b: FeatureId,
    },
    /// Edge blend on a prior feature.
    Fillet {
        /// The blended feature.
        source: FeatureId,
        /// Edge indices into the solid's flattened edge list.
        edges: Vec<usize>,
        /// Blend radius.
        radius: f64,
    },
    /// Edge chamfer on a prior feature.
    Chamfer {
        /// The chamfered feature.
        source: FeatureId,
        /// Edge indices into the solid's flattened edge list.
        edges: Vec<usize>,
        /// Setback distance.
        distance: f64,
    },
    /// Hollowing of a prior feature.
    Shell {
        /// The hollowed feature.
        source: FeatureId,
        /// Wall thickness.
        thickness: f64,
    },
    /// Repeated instances of a prior feature.
    Pattern {
        /// The repeated feature.
        source: FeatureId,
        /// Instance layout.
        layout: PatternKind,
    },
    /// Drilled hole in a prior feature.
    Hole {
        /// The drilled feature.
        source: FeatureId,
        /// Hole center.
        center: [f64; 3],
        /// Hole diameter.
        diameter: f64,
        /// Hole depth.
        depth: f64,
    },
}

/// Geometry payload of a feature.
///
/// Which representation is authoritative is a type-level fact, not a
/// runtime flag: a `Brep` feature's mesh is always a cache derived from
/// the solid, never the other way around. Every feature can therefore
/// always supply a mesh, and mesh-CSG fallback can never be left without
/// inputs.
#[derive(Debug, Clone)]
pub enum Representation<S> {
    /// Mesh-only feature.
    Mesh(TriangleMesh),
    /// BREP-backed feature with its display mesh cache.
    Brep {
        /// The authoritative solid.
        solid: S,
        /// Display mesh derived from `solid`.
        cached_mesh: TriangleMesh,
    },
}

impl<S> Representation<S> {
    /// The display mesh, whichever representation backs it.
    pub fn mesh(&self) -> &TriangleMesh {
        match self {
            Self::Mesh(mesh) => mesh,
            Self::Brep { cached_mesh, .. } => cached_mesh,
        }
    }

    /// The BREP solid, when this feature carries one.
    pub fn solid(&self) -> Option<&S> {
        match self {
            Self::Mesh(_) => None,
            Self::Brep { solid, .. } => Some(solid),
        }
    }

    /// True for BREP-backed features.
    pub fn is_brep(&self) -> bool {
        matches!(self, Self::Brep { .. })
    }
}

/// One entry of the feature history.
#[derive(Debug, Clone)]
pub struct Feature<S> {
    /// Stable identifier.
    pub id: FeatureId,
    /// Operation and parameters.
    pub kind: FeatureKind,
    /// Display name.
    pub name: String,
    /// Source sketch, for sketch-based features.
    pub sketch: Option<SketchId>,
    /// Geometry payload.
    pub repr: Representation<S>,
    /// Suppressed features stay registered; consumers must check this
    /// flag themselves.
    pub suppressed: bool,
    /// Bumped on suppression toggles.
    pub version: u64,
}

/// Serializable snapshot of one feature: parameters only, geometry
/// payloads are regenerated on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Stable identifier.
    pub id: FeatureId,
    /// Operation and parameters.
    pub kind: FeatureKind,
    /// Display name.
    pub name: String,
    /// Suppression flag.
    pub suppressed: bool,
    /// Whether the live feature was BREP-backed.
    pub uses_brep: bool,
}

/// Outcome of a fillet or chamfer: the new feature plus per-edge
/// warnings for edges the engine considers unsuitable (the operation
/// still runs on them).
#[derive(Debug, Clone)]
pub struct BlendResult {
    /// The created feature.
    pub feature: FeatureId,
    /// Human-readable warnings, one per flagged edge.
    pub warnings: Vec<String>,
}

// ============================================================================
// Kernel
// ============================================================================

/// Owns the feature history and sketch registry of one modeling session.
///
/// All BREP math and mesh CSG is delegated through the `E` and `C` type
/// parameters; the kernel sequences operations and maintains history.
/// The engine is optional because it is an external dependency that may
/// not be loaded; mesh-path operations work without it.
pub struct FeatureKernel<E: BrepEngine, C: MeshCsg> {
    engine: Option<E>,
    csg: C,
    features: Vec<Feature<E::Solid>>,
    sketches: Vec<(SketchId, Sketch)>,
    next_feature: u64,
    next_sketch: u64,
}

impl<E: BrepEngine, C: MeshCsg> FeatureKernel<E, C> {
    /// A kernel with mesh CSG only; BREP operations report
    /// [`FeatureError::EngineUnavailable`].
    pub fn new(csg: C) -> Self {
        Self {
            engine: None,
            csg,
            features: Vec::new(),
            sketches: Vec::new(),
            next_feature: 0,
            next_sketch: 0,
        }
    }

    /// A kernel with both delegates available.
    pub fn with_engine(engine: E, csg: C) -> Self {
        Self {
            engine: Some(engine),
            ..Self::new(csg)
        }
    }

    // =========================================================================
    // Sketch registry
    // =========================================================================

    /// Register a sketch for use as a feature input.
    pub fn add_sketch(&mut self, sketch: Sketch) -> SketchId {
        let id = SketchId(self.next_sketch);
        self.next_sketch += 1;
        self.sketches.push((id, sketch));
        id
    }

    /// Look up a registered sketch.
    pub fn sketch(&self, id: SketchId) -> Option<&Sketch> {
        self.sketches.iter().find(|(s, _)| *s == id).map(|(_, s)| s)
    }

    /// Mutable access to a registered sketch (editing between features).
    pub fn sketch_mut(&mut self, id: SketchId) -> Option<&mut Sketch> {
        self.sketches
            .iter_mut()
            .find(|(s, _)| *s == id)
            .map(|(_, s)| s)
    }

    // =========================================================================
    // Modeling operations
    // =========================================================================

    /// Extrude a sketch profile along `direction`.
    pub fn extrude(
        &mut self,
        sketch: SketchId,
        direction: Vec3,
        name: &str,
    ) -> Result<FeatureId, FeatureError> {
        let s = self.sketch(sketch).ok_or(FeatureError::UnknownSketch(sketch))?;
        let profile = profile_from_sketch(s)?;
        let mesh = extrude_profile(&profile, &direction);
        Ok(self.push_feature(
            FeatureKind::Extrude {
                direction: [direction.x, direction.y, direction.z],
            },
            name,
            Some(sketch),
            Representation::Mesh(mesh),
        ))
    }

    /// Revolve a sketch profile about an axis.
    pub fn revolve(
        &mut self,
        sketch: SketchId,
        axis_origin: Point3,
        axis_dir: Vec3,
        angle_deg: f64,
        name: &str,
    ) -> Result<FeatureId, FeatureError> {
        let s = self.sketch(sketch).ok_or(FeatureError::UnknownSketch(sketch))?;
        let profile = profile_from_sketch(s)?;
        let mesh = revolve_profile(&profile, &axis_origin, &axis_dir, angle_deg);
        Ok(self.push_feature(
            FeatureKind::Revolve {
                axis_origin: [axis_origin.x, axis_origin.y, axis_origin.z],
                axis_dir: [axis_dir.x, axis_dir.y, axis_dir.z],
                angle_deg,
            },
            name,
            Some(sketch),
            Representation::Mesh(mesh),
        ))
    }

    /// Boolean of two features.
    ///
    /// With `prefer_brep` and both operands BREP-backed (and an engine
    /// configured), the boolean runs in the engine and the result stays
    /// BREP. Otherwise it falls back to mesh CSG on the operands' display
    /// meshes, which every feature carries by construction.
    pub fn boolean_operation(
        &mut self,
        op: BooleanOp,
        a: FeatureId,
        b: FeatureId,
        prefer_brep: bool,
        name: &str,
    ) -> Result<FeatureId, FeatureError> {
        let fa = self.feature(a).ok_or(FeatureError::UnknownFeature(a))?;
        let fb = self.feature(b).ok_or(FeatureError::UnknownFeature(b))?;

        let repr = match (&self.engine, fa.repr.solid(), fb.repr.solid()) {
            (Some(engine), Some(sa), Some(sb)) if prefer_brep => {
                let solid = engine.boolean_operation(sa, sb, op)?;
                let cached_mesh = engine.solid_to_mesh(&solid);
                Representation::Brep { solid, cached_mesh }
            }
            _ => Representation::Mesh(self.csg.apply(op, fa.repr.mesh(), fb.repr.mesh())?),
        };
        Ok(self.push_feature(FeatureKind::Boolean { op, a, b }, name, None, repr))
    }

    /// Blend edges of a BREP-backed feature.
    ///
    /// Edge indices are positional into the solid's freshly recomputed
    /// edge list. Mesh-only features fail fast without mutating history;
    /// unsuitable edges are warned about but still passed to the engine.
    pub fn fillet_edges(
        &mut self,
        feature: FeatureId,
        edge_indices: &[usize],
        radius: f64,
        name: &str,
    ) -> Result<BlendResult, FeatureError> {
        let (solid, edges, warnings) = self.select_edges(feature, edge_indices, "fillet")?;
        let engine = self.engine.as_ref().ok_or(FeatureError::EngineUnavailable)?;
        let options = FilletOptions {
            edges,
            radius,
            variable_radii: None,
            blend_type: BlendType::Circular,
            continuity: Continuity::G1,
        };
        let new_solid = engine.fillet(&solid, &options)?;
        let cached_mesh = engine.solid_to_mesh(&new_solid);
        let id = self.push_feature(
            FeatureKind::Fillet {
                source: feature,
                edges: edge_indices.to_vec(),
                radius,
            },
            name,
            None,
            Representation::Brep {
                solid: new_solid,
                cached_mesh,
            },
        );
        Ok(BlendResult {
            feature: id,
            warnings,
        })
    }

    /// Chamfer edges of a BREP-backed feature. Same preconditions and
    /// edge handling as [`FeatureKernel::fillet_edges`].
    pub fn chamfer_edges(
        &mut self,
        feature: FeatureId,
        edge_indices: &[usize],
        distance: f64,
        name: &str,
    ) -> Result<BlendResult, FeatureError> {
        let (solid, edges, warnings) = self.select_edges(feature, edge_indices, "chamfer")?;
        let engine = self.engine.as_ref().ok_or(FeatureError::EngineUnavailable)?;
        let options = ChamferOptions {
            edges,
            distance1: distance,
            distance2: None,
            angle: None,
            chamfer_type: ChamferType::Symmetric,
        };
        let new_solid = engine.chamfer(&solid, &options)?;
        let cached_mesh = engine.solid_to_mesh(&new_solid);
        let id = self.push_feature(
            FeatureKind::Chamfer {
                source: feature,
                edges: edge_indices.to_vec(),
                distance,
            },
            name,
            None,
            Representation::Brep {
                solid: new_solid,
                cached_mesh,
            },
        );
        Ok(BlendResult {
            feature: id,
            warnings,
        })
    }

    /// Resolve edge indices against a feature's solid, collecting
    /// warnings for edges the engine flags as unsuitable for blending.
    fn select_edges(
        &self,
        feature: FeatureId,
        edge_indices: &[usize],
        verb: &str,
    ) -> Result<(E::Solid, Vec<E::Edge>, Vec<String>), FeatureError> {
        let f = self
            .feature(feature)
            .ok_or(FeatureError::UnknownFeature(feature))?;
        let solid = f
            .repr
            .solid()
            .ok_or(FeatureError::MissingBrep(feature))?
            .clone();
        let engine = self.engine.as_ref().ok_or(FeatureError::EngineUnavailable)?;

        let all = engine.all_edges(&solid);
        let mut edges = Vec::with_capacity(edge_indices.len());
        let mut warnings = Vec::new();
        for &index in edge_indices {
            let edge = all
                .get(index)
                .ok_or(FeatureError::EdgeOutOfRange {
                    feature,
                    index,
                    available: all.len(),
                })?
                .clone();
            if !engine.is_filletable_edge(&edge, &solid) {
                warnings.push(format!("edge {index} is unsuitable for {verb}, applying anyway"));
            }
            edges.push(edge);
        }
        Ok((solid, edges, warnings))
    }

    /// Repeat a feature's mesh in a linear or circular layout.
    ///
    /// Instances are mesh clones only: feature history is not replayed
    /// per instance, so instances are visual and not independently
    /// editable. The result is always mesh-backed, even for a BREP
    /// source.
    pub fn pattern(
        &mut self,
        source: FeatureId,
        layout: PatternKind,
        name: &str,
    ) -> Result<FeatureId, FeatureError> {
        let base = self
            .feature(source)
            .ok_or(FeatureError::UnknownFeature(source))?
            .repr
            .mesh()
            .clone();

        let mut mesh = TriangleMesh::new();
        match layout {
            PatternKind::Linear { count, offset } => {
                for i in 0..count.max(1) {
                    let k = i as f64;
                    let t = Transform::translation(offset[0] * k, offset[1] * k, offset[2] * k);
                    mesh.merge(&base.transformed(&t));
                }
            }
            PatternKind::Circular {
                count,
                axis_origin,
                axis_dir,
                step_deg,
            } => {
                let dir = Vec3::new(axis_dir[0], axis_dir[1], axis_dir[2]);
                if dir.norm() < 1e-9 {
                    mesh.merge(&base);
                } else {
                    let axis = Dir3::new_normalize(dir);
                    let to_origin = Transform::translation(
                        -axis_origin[0],
                        -axis_origin[1],
                        -axis_origin[2],
                    );
                    let from_origin =
                        Transform::translation(axis_origin[0], axis_origin[1], axis_origin[2]);
                    for i in 0..count.max(1) {
                        let theta = (step_deg * i as f64).to_radians();
                        // Applied right-to-left: onto the axis, rotate, back.
                        let t = from_origin
                            .then(&Transform::rotation_about_axis(&axis, theta))
                            .then(&to_origin);
                        mesh.merge(&base.transformed(&t));
                    }
                }
            }
        }
        Ok(self.push_feature(
            FeatureKind::Pattern { source, layout },
            name,
            None,
            Representation::Mesh(mesh),
        ))
    }

    // =========================================================================
    // History management
    // =========================================================================

    /// Flip a feature's suppression flag, returning the new state.
    /// Dependents are not touched; they must check the flag themselves.
    pub fn toggle_suppress(&mut self, id: FeatureId) -> Result<bool, FeatureError> {
        let feature = self
            .features
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or(FeatureError::UnknownFeature(id))?;
        feature.suppressed = !feature.suppressed;
        feature.version += 1;
        Ok(feature.suppressed)
    }

    /// Remove a feature from history. Deliberately does not cascade:
    /// dependents referencing the deleted id are the caller's problem.
    pub fn delete_feature(&mut self, id: FeatureId) -> Result<(), FeatureError> {
        let pos = self
            .features
            .iter()
            .position(|f| f.id == id)
            .ok_or(FeatureError::UnknownFeature(id))?;
        self.features.remove(pos);
        Ok(())
    }

    /// Look up a feature.
    pub fn feature(&self, id: FeatureId) -> Option<&Feature<E::Solid>> {
        self.features.iter().find(|f| f.id == id)
    }

    /// The feature history, in creation order.
    pub fn features(&self) -> &[Feature<E::Solid>] {
        &self.features
    }

    /// Number of features in history.
    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    /// Serializable parameter snapshots of the whole history. Geometry
    /// payloads are regenerated on load, never serialized.
    pub fn records(&self) -> Vec<FeatureRecord> {
        self.features
            .iter()
            .map(|f| FeatureRecord {
                id: f.id,
                kind: f.kind.clone(),
                name: f.name.clone(),
                suppressed: f.suppressed,
                uses_brep: f.repr.is_brep(),
            })
            .collect()
    }

    fn push_feature(
        &mut self,
        kind: FeatureKind,
        name: &str,
        sketch: Option<SketchId>,
        repr: Representation<E::Solid>,
    ) -> FeatureId {
        let id = FeatureId(self.next_feature);
        self.next_feature += 1;
        self.features.push(Feature {
            id,
            kind,
            name: name.to_string(),
            sketch,
            repr,
            suppressed: false,
            version: 0,
        });
        id
    }
}
