//! Revolution of a profile about an axis into a surface-of-revolution mesh.

use pcad_math::{Dir3, Point3, Transform, Vec3};

use crate::mesh::TriangleMesh;
use crate::profile::{Profile, CIRCLE_SEGMENTS};

/// Revolve a profile (in the z=0 plane) about an axis through
/// `axis_origin` along `axis_dir`, sweeping `angle_deg` degrees.
///
/// The ring count scales with the swept angle so a full revolution uses
/// [`CIRCLE_SEGMENTS`] steps. A degenerate axis direction yields an
/// empty mesh rather than an error, matching the solver's clamping
/// conventions for bad geometry.
pub fn revolve_profile(
    profile: &Profile,
    axis_origin: &Point3,
    axis_dir: &Vec3,
    angle_deg: f64,
) -> TriangleMesh {
    let points = profile.points();
    let mut mesh = TriangleMesh::new();
    if points.len() < 2 || axis_dir.norm() < 1e-9 {
        return mesh;
    }
    let axis = Dir3::new_normalize(*axis_dir);
    let angle = angle_deg.to_radians();
    let full_turn = (angle_deg.abs() - 360.0).abs() < 1e-9;

    let steps = ((CIRCLE_SEGMENTS as f64 * angle_deg.abs() / 360.0).ceil() as usize).max(3);
    let rings = if full_turn { steps } else { steps + 1 };

    let to_origin = Transform::translation(-axis_origin.x, -axis_origin.y, -axis_origin.z);
    let from_origin = Transform::translation(axis_origin.x, axis_origin.y, axis_origin.z);

    // Ring-major vertex grid.
    let mut grid: Vec<Vec<u32>> = Vec::with_capacity(rings);
    for ring in 0..rings {
        let theta = angle * ring as f64 / steps as f64;
        // Applied right-to-left: move onto the axis, rotate, move back.
        let transform = from_origin
            .then(&Transform::rotation_about_axis(&axis, theta))
            .then(&to_origin);
        let indices = points
            .iter()
            .map(|p| mesh.push_vertex(&transform.apply_point(&Point3::new(p.x, p.y, 0.0))))
            .collect();
        grid.push(indices);
    }

    let n = points.len();
    let wall_segments = if profile.is_closed() { n } else { n - 1 };
    for ring in 0..steps {
        let next = (ring + 1) % rings;
        for i in 0..wall_segments {
            let j = (i + 1) % n;
            mesh.push_triangle(grid[ring][i], grid[ring][j], grid[next][j]);
            mesh.push_triangle(grid[ring][i], grid[next][j], grid[next][i]);
        }
    }

    // Partial sweeps of a closed profile get flat end caps.
    if !full_turn && profile.is_closed() && n >= 3 {
        for i in 1..n - 1 {
            mesh.push_triangle(grid[0][0], grid[0][i + 1], grid[0][i]);
            let last = rings - 1;
            mesh.push_triangle(grid[last][0], grid[last][i], grid[last][i + 1]);
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

    fn offset_square_profile() -> Profile {
        let mut sketch = Sketch::new();
        let corners = [(2.0, 0.0), (3.0, 0.0), (3.0, 1.0), (2.0, 1.0)];
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
    fn test_full_revolution_makes_a_torus_like_mesh() {
        let mesh = revolve_profile(
            &offset_square_profile(),
            &Point3::origin(),
            &Vec3::new(0.0, 1.0, 0.0),
            360.0,
        );
        // Square section × CIRCLE_SEGMENTS rings, no caps, no seam dupes.
        assert_eq!(mesh.num_vertices(), 4 * CIRCLE_SEGMENTS);
        assert_eq!(mesh.num_triangles(), 2 * 4 * CIRCLE_SEGMENTS);
    }

    #[test]
    fn test_partial_revolution_has_end_caps() {
        let mesh = revolve_profile(
            &offset_square_profile(),
            &Point3::origin(),
            &Vec3::new(0.0, 1.0, 0.0),
            90.0,
        );
        let steps = (CIRCLE_SEGMENTS as f64 * 0.25).ceil() as usize;
        assert_eq!(mesh.num_vertices(), 4 * (steps + 1));
        assert_eq!(mesh.num_triangles(), 2 * 4 * steps + 4);
    }

    #[test]
    fn test_degenerate_axis_yields_empty_mesh() {
        let mesh = revolve_profile(
            &offset_square_profile(),
            &Point3::origin(),
            &Vec3::new(0.0, 0.0, 0.0),
            360.0,
        );
        assert!(mesh.is_empty());
    }
}
