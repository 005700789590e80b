//! Intersection tests for the edge cut gesture
//!
//! A cut line is a polyline drawn by the user; an edge is cut when any of
//! its segments crosses any segment of its flattened curve.

use crate::consts::EPSILON;
use crate::vector::Vec2;

/// Test whether segments `a0-a1` and `b0-b1` intersect (touching counts).
pub fn segments_intersect(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> bool {
    let d1 = orientation(b0, b1, a0);
    let d2 = orientation(b0, b1, a1);
    let d3 = orientation(a0, a1, b0);
    let d4 = orientation(a0, a1, b1);

    if ((d1 > EPSILON && d2 < -EPSILON) || (d1 < -EPSILON && d2 > EPSILON))
        && ((d3 > EPSILON && d4 < -EPSILON) || (d3 < -EPSILON && d4 > EPSILON))
    {
        return true;
    }

    // Collinear / touching cases
    (d1.abs() <= EPSILON && on_segment(b0, b1, a0))
        || (d2.abs() <= EPSILON && on_segment(b0, b1, a1))
        || (d3.abs() <= EPSILON && on_segment(a0, a1, b0))
        || (d4.abs() <= EPSILON && on_segment(a0, a1, b1))
}

/// Test whether any segment of `polyline` intersects `a-b`.
pub fn polyline_intersects_segment(polyline: &[Vec2], a: Vec2, b: Vec2) -> bool {
    polyline
        .windows(2)
        .any(|pair| segments_intersect(pair[0], pair[1], a, b))
}

#[inline]
fn orientation(p: Vec2, q: Vec2, r: Vec2) -> f32 {
    (q - p).perp_dot(r - p)
}

#[inline]
fn on_segment(p: Vec2, q: Vec2, r: Vec2) -> bool {
    r.x >= p.x.min(q.x) - EPSILON
        && r.x <= p.x.max(q.x) + EPSILON
        && r.y >= p.y.min(q.y) - EPSILON
        && r.y <= p.y.max(q.y) + EPSILON
}
