//! Triangle mesh payload produced by modeling operations.

use pcad_math::{Point3, Transform};

/// Output triangle mesh for rendering and downstream CSG.
///
/// Vertex normals are deliberately absent: they are a renderer concern
/// and are recomputed on upload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Flat array of vertex positions: `[x0, y0, z0, x1, y1, z1, ...]` (f32).
    pub vertices: Vec<f32>,
    /// Flat array of triangle indices: `[i0, i1, i2, ...]` (u32).
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len() / 3
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append one vertex, returning its index.
    pub fn push_vertex(&mut self, p: &Point3) -> u32 {
        let index = self.num_vertices() as u32;
        self.vertices
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        index
    }

    /// Append one triangle by vertex indices.
    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Merge another mesh into this one.
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.num_vertices() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices
            .extend(other.indices.iter().map(|&i| i + offset));
    }

    /// A copy of this mesh with every vertex transformed.
    pub fn transformed(&self, transform: &Transform) -> TriangleMesh {
        let mut out = TriangleMesh {
            vertices: Vec::with_capacity(self.vertices.len()),
            indices: self.indices.clone(),
        };
        for chunk in self.vertices.chunks_exact(3) {
            let p = Point3::new(chunk[0] as f64, chunk[1] as f64, chunk[2] as f64);
            let q = transform.apply_point(&p);
            out.vertices
                .extend_from_slice(&[q.x as f32, q.y as f32, q.z as f32]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let a = mesh.push_vertex(&Point3::new(0.0, 0.0, 0.0));
        let b = mesh.push_vertex(&Point3::new(1.0, 0.0, 0.0));
        let c = mesh.push_vertex(&Point3::new(0.0, 1.0, 0.0));
        mesh.push_triangle(a, b, c);
        mesh
    }

    #[test]
    fn test_merge_offsets_indices() {
        let mut mesh = unit_triangle();
        mesh.merge(&unit_triangle());
        assert_eq!(mesh.num_vertices(), 6);
        assert_eq!(mesh.num_triangles(), 2);
        assert_eq!(&mesh.indices[3..], &[3, 4, 5]);
    }

    #[test]
    fn test_transformed_moves_vertices() {
        let mesh = unit_triangle();
        let moved = mesh.transformed(&Transform::translation(10.0, 0.0, 2.0));
        assert_eq!(moved.num_triangles(), 1);
        assert!((moved.vertices[0] - 10.0).abs() < 1e-6);
        assert!((moved.vertices[2] - 2.0).abs() < 1e-6);
        // Indices are untouched.
        assert_eq!(moved.indices, mesh.indices);
    }
}
