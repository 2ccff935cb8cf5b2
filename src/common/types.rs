//! Common types used throughout rust_rrt

use std::iter::FromIterator;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::common::error::{RoboticsError, RoboticsResult};

/// A point in the planning state space.
///
/// The meaning of each component is fixed by the steering model:
/// `(x, y)` for straight-line steering, `(x, y, yaw)` for Dubins steering.
pub type Configuration = DVector<f64>;

/// 2D point representation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Position components of a configuration. Expects at least two components.
    pub fn from_configuration(q: &Configuration) -> Self {
        Self { x: q[0], y: q[1] }
    }
}

impl From<(f64, f64)> for Point2D {
    fn from(tuple: (f64, f64)) -> Self {
        Self { x: tuple.0, y: tuple.1 }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from(a: [f64; 2]) -> Self {
        Self { x: a[0], y: a[1] }
    }
}

/// 2D pose (position + orientation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, yaw: f64) -> Self {
        Self { x, y, yaw }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, yaw: 0.0 }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// Pose stored in the first three components of a configuration.
    pub fn from_configuration(q: &Configuration) -> Self {
        Self { x: q[0], y: q[1], yaw: q[2] }
    }

    pub fn to_configuration(&self) -> Configuration {
        DVector::from_vec(vec![self.x, self.y, self.yaw])
    }
}

/// A wall: straight line segment between two points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point2D,
    pub end: Point2D,
}

impl LineSegment {
    pub fn new(start: Point2D, end: Point2D) -> Self {
        Self { start, end }
    }

    /// Build a segment from raw points, rejecting anything that is not
    /// exactly two finite points.
    pub fn try_from_points(points: &[Point2D]) -> RoboticsResult<Self> {
        match points {
            [start, end] if start.is_finite() && end.is_finite() => Ok(Self::new(*start, *end)),
            [_, _] => Err(RoboticsError::MalformedObstacle(
                "segment endpoints must be finite".to_string(),
            )),
            _ => Err(RoboticsError::MalformedObstacle(format!(
                "expected 2 points, got {}",
                points.len()
            ))),
        }
    }
}

impl From<((f64, f64), (f64, f64))> for LineSegment {
    fn from(s: ((f64, f64), (f64, f64))) -> Self {
        Self::new(s.0.into(), s.1.into())
    }
}

/// Obstacle set: an ordered collection of wall segments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Obstacles {
    pub segments: Vec<LineSegment>,
}

impl Obstacles {
    pub fn new() -> Self {
        Self { segments: Vec::new() }
    }

    pub fn from_segments(segments: Vec<LineSegment>) -> Self {
        Self { segments }
    }

    /// Build from raw point lists, one list per wall.
    pub fn try_from_point_lists(walls: &[Vec<Point2D>]) -> RoboticsResult<Self> {
        let segments = walls
            .iter()
            .map(|w| LineSegment::try_from_points(w))
            .collect::<RoboticsResult<Vec<_>>>()?;
        Ok(Self { segments })
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineSegment> {
        self.segments.iter()
    }
}

impl FromIterator<LineSegment> for Obstacles {
    fn from_iter<I: IntoIterator<Item = LineSegment>>(iter: I) -> Self {
        Self { segments: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance(&p2) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_pose2d_configuration_roundtrip() {
        let pose = Pose2D::new(1.0, -2.0, 0.5);
        let q = pose.to_configuration();
        assert_eq!(q.len(), 3);
        assert_eq!(Pose2D::from_configuration(&q), pose);
        assert_eq!(Point2D::from_configuration(&q), Point2D::new(1.0, -2.0));
    }

    #[test]
    fn test_segment_rejects_wrong_arity() {
        let three = [Point2D::origin(), Point2D::new(1.0, 0.0), Point2D::new(2.0, 0.0)];
        assert!(matches!(
            LineSegment::try_from_points(&three),
            Err(RoboticsError::MalformedObstacle(_))
        ));
        assert!(LineSegment::try_from_points(&three[..1]).is_err());
        assert!(LineSegment::try_from_points(&three[..2]).is_ok());
    }

    #[test]
    fn test_segment_rejects_non_finite() {
        let pts = [Point2D::origin(), Point2D::new(f64::NAN, 1.0)];
        assert!(LineSegment::try_from_points(&pts).is_err());
    }

    #[test]
    fn test_obstacles_from_point_lists() {
        let walls = vec![
            vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)],
            vec![Point2D::new(1.0, 0.0), Point2D::new(1.0, 1.0)],
        ];
        let obstacles = Obstacles::try_from_point_lists(&walls).unwrap();
        assert_eq!(obstacles.len(), 2);

        let bad = vec![vec![Point2D::new(0.0, 0.0)]];
        assert!(Obstacles::try_from_point_lists(&bad).is_err());
    }
}
