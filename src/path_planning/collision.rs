//! Segment-segment collision checking against wall obstacles
//!
//! Touching and collinear-overlapping segments count as colliding: a motion
//! that grazes a wall is treated as unsafe.

use itertools::Itertools;

use crate::common::{LineSegment, Obstacles, Point2D};

/// Signed area of the triangle (a, b, c); > 0 when c lies left of a->b
fn orientation(a: &Point2D, b: &Point2D, c: &Point2D) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// For p collinear with the segment, whether p lies within its bounding box
fn on_segment(segment: &LineSegment, p: &Point2D) -> bool {
    let (a, b) = (&segment.start, &segment.end);
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

fn straddles(o1: f64, o2: f64) -> bool {
    (o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0)
}

/// Whether two closed line segments share at least one point
pub fn segments_intersect(a: &LineSegment, b: &LineSegment) -> bool {
    let o1 = orientation(&a.start, &a.end, &b.start);
    let o2 = orientation(&a.start, &a.end, &b.end);
    let o3 = orientation(&b.start, &b.end, &a.start);
    let o4 = orientation(&b.start, &b.end, &a.end);

    if straddles(o1, o2) && straddles(o3, o4) {
        return true;
    }

    (o1 == 0.0 && on_segment(a, &b.start))
        || (o2 == 0.0 && on_segment(a, &b.end))
        || (o3 == 0.0 && on_segment(b, &a.start))
        || (o4 == 0.0 && on_segment(b, &a.end))
}

/// Whether a single motion segment avoids every wall
pub fn segment_is_free(motion: &LineSegment, obstacles: &Obstacles) -> bool {
    !obstacles.iter().any(|wall| segments_intersect(motion, wall))
}

/// Whether every leg of a polyline avoids every wall.
///
/// A polyline with fewer than two points has no legs and is free.
pub fn polyline_is_free(points: &[Point2D], obstacles: &Obstacles) -> bool {
    points
        .iter()
        .tuple_windows()
        .all(|(p, q)| segment_is_free(&LineSegment::new(*p, *q), obstacles))
}
