//! Extraction of extrudable profiles from solved sketches.

use pcad_math::Point2;
use pcad_sketch::{EntityGeometry, Sketch};
use thiserror::Error;

/// Segment count used when a circle is polygonized into a profile.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Endpoint matching tolerance while chaining line segments.
const CHAIN_TOLERANCE: f64 = 1e-6;

/// Structural problems extracting a profile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileError {
    /// The sketch contains no non-construction lines or circles.
    #[error("sketch has no profile entities")]
    NoProfileEntities,
}

/// An ordered polyline in the sketch plane, open or closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    points: Vec<Point2>,
    closed: bool,
}

impl Profile {
    /// The profile vertices, in chain order. A closed profile does not
    /// repeat its first point at the end.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// True when the chain loops back onto its first point.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Extract a profile from the sketch's current (solved) geometry.
///
/// Line entities are chained end-to-end into a single polyline, reversing
/// segments as needed; the profile is closed when the chain returns to its
/// first point. A sketch without lines but with a circle yields the circle
/// polygonized into [`CIRCLE_SEGMENTS`] segments. Construction geometry is
/// skipped.
pub fn profile_from_sketch(sketch: &Sketch) -> Result<Profile, ProfileError> {
    let mut segments: Vec<(Point2, Point2)> = Vec::new();
    let mut circle: Option<(Point2, f64)> = None;

    for entity in sketch.entities() {
        if entity.construction {
            continue;
        }
        match &entity.geometry {
            EntityGeometry::Line { start, end } => segments.push((*start, *end)),
            EntityGeometry::Circle { center, radius } => {
                if circle.is_none() {
                    circle = Some((*center, *radius));
                }
            }
            _ => {}
        }
    }

    if !segments.is_empty() {
        return Ok(chain_segments(segments));
    }
    if let Some((center, radius)) = circle {
        let points = (0..CIRCLE_SEGMENTS)
            .map(|i| {
                let theta = 2.0 * std::f64::consts::PI * i as f64 / CIRCLE_SEGMENTS as f64;
                Point2::new(center.x + radius * theta.cos(), center.y + radius * theta.sin())
            })
            .collect();
        return Ok(Profile {
            points,
            closed: true,
        });
    }
    Err(ProfileError::NoProfileEntities)
}

/// Greedily chain segments end-to-end starting from the first one.
/// Segments that cannot be reached from the chain are dropped.
fn chain_segments(mut segments: Vec<(Point2, Point2)>) -> Profile {
    let (start, end) = segments.remove(0);
    let mut points = vec![start, end];

    loop {
        let tail = *points.last().unwrap();
        let next = segments.iter().position(|(s, e)| {
            (s - tail).norm() < CHAIN_TOLERANCE || (e - tail).norm() < CHAIN_TOLERANCE
        });
        let Some(index) = next else {
            break;
        };
        let (s, e) = segments.remove(index);
        if (s - tail).norm() < CHAIN_TOLERANCE {
            points.push(e);
        } else {
            points.push(s);
        }
    }

    let closed = points.len() > 2
        && (*points.last().unwrap() - points[0]).norm() < CHAIN_TOLERANCE;
    if closed {
        points.pop();
    }
    Profile { points, closed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_line(sketch: &mut Sketch, start: (f64, f64), end: (f64, f64)) {
        sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(start.0, start.1),
            end: Point2::new(end.0, end.1),
        });
    }

    #[test]
    fn test_square_chains_closed() {
        let mut sketch = Sketch::new();
        add_line(&mut sketch, (0.0, 0.0), (1.0, 0.0));
        add_line(&mut sketch, (1.0, 0.0), (1.0, 1.0));
        add_line(&mut sketch, (1.0, 1.0), (0.0, 1.0));
        add_line(&mut sketch, (0.0, 1.0), (0.0, 0.0));

        let profile = profile_from_sketch(&sketch).unwrap();
        assert!(profile.is_closed());
        assert_eq!(profile.points().len(), 4);
    }

    #[test]
    fn test_reversed_segment_is_flipped_while_chaining() {
        let mut sketch = Sketch::new();
        add_line(&mut sketch, (0.0, 0.0), (1.0, 0.0));
        // Stored end-to-start relative to the chain direction.
        add_line(&mut sketch, (1.0, 1.0), (1.0, 0.0));

        let profile = profile_from_sketch(&sketch).unwrap();
        assert!(!profile.is_closed());
        assert_eq!(profile.points().len(), 3);
        assert_eq!(profile.points()[2], Point2::new(1.0, 1.0));
    }

    #[test]
    fn test_circle_becomes_polygon() {
        let mut sketch = Sketch::new();
        sketch.add_entity(EntityGeometry::Circle {
            center: Point2::new(2.0, 0.0),
            radius: 3.0,
        });
        let profile = profile_from_sketch(&sketch).unwrap();
        assert!(profile.is_closed());
        assert_eq!(profile.points().len(), CIRCLE_SEGMENTS);
        for p in profile.points() {
            let r = (p - Point2::new(2.0, 0.0)).norm();
            assert!((r - 3.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_construction_geometry_is_skipped() {
        let mut sketch = Sketch::new();
        let line = sketch.add_entity(EntityGeometry::Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(1.0, 0.0),
        });
        sketch.set_construction(line, true).unwrap();
        assert_eq!(
            profile_from_sketch(&sketch),
            Err(ProfileError::NoProfileEntities)
        );
    }
}
