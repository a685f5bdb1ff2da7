//! Linear extrusion of a profile into a prism mesh.

use pcad_math::{Point3, Vec3};

use crate::mesh::TriangleMesh;
use crate::profile::Profile;

/// Extrude a profile along `direction` (its length is the extrusion
/// distance). The profile lies in the z=0 plane.
///
/// Side walls are emitted for every chain segment; a closed profile
/// additionally gets fan-triangulated caps at both ends. Always succeeds
/// for a non-empty profile; an empty one produces an empty mesh.
pub fn extrude_profile(profile: &Profile, direction: &Vec3) -> TriangleMesh {
    let points = profile.points();
    let mut mesh = TriangleMesh::new();
    if points.len() < 2 {
        return mesh;
    }

    let bottom: Vec<u32> = points
        .iter()
        .map(|p| mesh.push_vertex(&Point3::new(p.x, p.y, 0.0)))
        .collect();
    let top: Vec<u32> = points
        .iter()
        .map(|p| mesh.push_vertex(&Point3::new(p.x + direction.x, p.y + direction.y, direction.z)))
        .collect();

    let n = points.len();
    let segments = if profile.is_closed() { n } else { n - 1 };
    for i in 0..segments {
        let j = (i + 1) % n;
        mesh.push_triangle(bottom[i], bottom[j], top[j]);
        mesh.push_triangle(bottom[i], top[j], top[i]);
    }

    if profile.is_closed() && n >= 3 {
        for i in 1..n - 1 {
            mesh.push_triangle(bottom[0], bottom[i + 1], bottom[i]);
            mesh.push_triangle(top[0], top[i], top[i + 1]);
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::profile_from_sketch;
    use pcad_math::Point2;
    use pcad_sketch::{EntityGeometry, Sketch};

    fn unit_square_profile() -> Profile {
        let mut sketch = Sketch::new();
        let corners = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for i in 0..4 {
            let (sx, sy) = corners[i];
            let (ex, ey) = corners[(i + 1) % 4];
            sketch.add_entity(EntityGeometry::Line {
                start: Point2::new(sx, sy),
                end: Point2::new(ex, ey),
            });
        }
        profile_from_sketch(&sketch).unwrap()
    }

    #[test]
    fn test_closed_extrusion_has_walls_and_caps() {
        let mesh = extrude_profile(&unit_square_profile(), &Vec3::new(0.0, 0.0, 2.0));
        // 4 wall quads (8 triangles) + 2 fan caps (2 × 2 triangles).
        assert_eq!(mesh.num_triangles(), 12);
        assert_eq!(mesh.num_vertices(), 8);
        let max_z = mesh.vertices.chunks(3).map(|v| v[2]).fold(f32::MIN, f32::max);
        assert!((max_z - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_open_profile_extrudes_walls_only() {
        let mut sketch = Sketch::new();
        sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1.0, 0.0),
        });
        let profile = profile_from_sketch(&sketch).unwrap();
        let mesh = extrude_profile(&profile, &Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(mesh.num_triangles(), 2);
    }

    #[test]
    fn test_slanted_direction_offsets_top_ring() {
        let mesh = extrude_profile(&unit_square_profile(), &Vec3::new(3.0, 0.0, 1.0));
        let max_x = mesh.vertices.chunks(3).map(|v| v[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 4.0).abs() < 1e-6);
    }
}
