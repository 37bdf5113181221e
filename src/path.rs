//! The fixed route enemies follow.
//!
//! A [`Path`] is an ordered polyline of waypoints, immutable once a run
//! starts. Enemies carry a fractional progress value in `0..1` over the whole
//! polyline; [`Path::point_at`] maps that fraction to a world point. The same
//! struct answers placement queries (how close is a candidate tower site to
//! the track).

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error constructing a path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    /// A route needs at least two waypoints; enemies cannot move on less.
    #[error("a path needs at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),
}

/// Ordered waypoint polyline in world coordinates.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    points: Vec<(f32, f32)>,
}

impl Path {
    /// Build a path from world-coordinate waypoints.
    ///
    /// Fails on fewer than two points - spawning enemies against a
    /// degenerate route is a precondition violation, not a recoverable
    /// state, so the run must not start.
    pub fn new(points: Vec<(f32, f32)>) -> Result<Self, PathError> {
        if points.len() < 2 {
            return Err(PathError::TooFewWaypoints(points.len()));
        }
        Ok(Self { points })
    }

    pub fn waypoints(&self) -> &[(f32, f32)] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// World point at fraction `t` of the whole polyline.
    ///
    /// `t` is clamped to `[0, 1]`. The fraction is split uniformly across
    /// segments: segment index is `floor(t * segments)` clamped to the last
    /// segment, and the remainder interpolates linearly within it.
    pub fn point_at(&self, t: f32) -> (f32, f32) {
        let t = t.clamp(0.0, 1.0);
        let segments = self.segment_count();
        let seg = ((t * segments as f32) as usize).min(segments - 1);
        let local = t * segments as f32 - seg as f32;
        let (ax, ay) = self.points[seg];
        let (bx, by) = self.points[seg + 1];
        (ax + (bx - ax) * local, ay + (by - ay) * local)
    }

    /// Shortest distance from a world point to any segment of the path.
    ///
    /// Used for placement clearance checks.
    pub fn distance_to(&self, x: f32, y: f32) -> f32 {
        let mut best = f32::MAX;
        for w in self.points.windows(2) {
            let d = point_segment_distance(x, y, w[0], w[1]);
            if d < best {
                best = d;
            }
        }
        best
    }
}

fn point_segment_distance(px: f32, py: f32, (ax, ay): (f32, f32), (bx, by): (f32, f32)) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq > 0.0 {
        (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let cx = ax + dx * t;
    let cy = ay + dy * t;
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn zigzag() -> Path {
        Path::new(vec![(0.0, 0.0), (100.0, 0.0), (100.0, 50.0), (200.0, 50.0)]).unwrap()
    }

    #[test]
    fn test_rejects_degenerate_path() {
        assert_eq!(Path::new(vec![]), Err(PathError::TooFewWaypoints(0)));
        assert_eq!(
            Path::new(vec![(1.0, 1.0)]),
            Err(PathError::TooFewWaypoints(1))
        );
    }

    #[test]
    fn test_endpoints_match_waypoints() {
        let path = zigzag();
        assert_eq!(path.point_at(0.0), (0.0, 0.0));
        assert_eq!(path.point_at(1.0), (200.0, 50.0));
    }

    #[test]
    fn test_interpolates_within_segment() {
        let path = Path::new(vec![(0.0, 0.0), (100.0, 0.0)]).unwrap();
        let (x, y) = path.point_at(0.25);
        assert!((x - 25.0).abs() < 1e-4);
        assert!(y.abs() < 1e-4);
    }

    #[test]
    fn test_segment_boundary() {
        // t = 1/3 of a 3-segment path lands exactly on the second waypoint.
        let path = zigzag();
        let (x, y) = path.point_at(1.0 / 3.0);
        assert!((x - 100.0).abs() < 1e-3);
        assert!(y.abs() < 1e-3);
    }

    #[test]
    fn test_clamps_out_of_range_fractions() {
        let path = zigzag();
        assert_eq!(path.point_at(-0.5), path.point_at(0.0));
        assert_eq!(path.point_at(1.5), path.point_at(1.0));
    }

    #[test]
    fn test_distance_to_segments() {
        let path = Path::new(vec![(0.0, 0.0), (100.0, 0.0)]).unwrap();
        assert!((path.distance_to(50.0, 40.0) - 40.0).abs() < 1e-4);
        // Beyond the endpoint, distance is to the endpoint itself.
        assert!((path.distance_to(130.0, 40.0) - 50.0).abs() < 1e-4);
        assert!(path.distance_to(50.0, 0.0) < 1e-4);
    }

    proptest! {
        #[test]
        fn prop_point_at_is_idempotent(t in -0.5f32..1.5) {
            let path = zigzag();
            prop_assert_eq!(path.point_at(t), path.point_at(t));
        }

        #[test]
        fn prop_point_stays_on_bounding_box(t in 0.0f32..1.0) {
            let path = zigzag();
            let (x, y) = path.point_at(t);
            prop_assert!((0.0..=200.0).contains(&x));
            prop_assert!((0.0..=50.0).contains(&y));
        }
    }
}
