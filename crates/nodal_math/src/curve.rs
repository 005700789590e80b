//! Curves rendered for edges
//!
//! Edges are drawn either as straight lines or as cubic bezier curves. For
//! hit testing the curve is flattened into a polyline; the renderer is free
//! to draw it however it likes.

use crate::vector::Vec2;

/// Cubic bezier curve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBezier {
    pub from: Vec2,
    pub ctrl1: Vec2,
    pub ctrl2: Vec2,
    pub to: Vec2,
}

impl CubicBezier {
    #[inline]
    pub const fn new(from: Vec2, ctrl1: Vec2, ctrl2: Vec2, to: Vec2) -> Self {
        Self { from, ctrl1, ctrl2, to }
    }

    /// Evaluate the curve at `t` in [0, 1]
    pub fn point_at(&self, t: f32) -> Vec2 {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        self.from * a + self.ctrl1 * b + self.ctrl2 * c + self.to * d
    }

    /// Sample the curve into `segments` straight pieces.
    ///
    /// Always returns at least the two end points.
    pub fn flatten(&self, segments: usize) -> Vec<Vec2> {
        let segments = segments.max(1);
        let mut points = Vec::with_capacity(segments + 1);
        points.push(self.from);
        for i in 1..segments {
            points.push(self.point_at(i as f32 / segments as f32));
        }
        points.push(self.to);
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bezier_endpoints() {
        let curve = CubicBezier::new(
            Vec2::new(0.0, 0.0),
            Vec2::new(50.0, 0.0),
            Vec2::new(50.0, 100.0),
            Vec2::new(100.0, 100.0),
        );
        assert_eq!(curve.point_at(0.0), curve.from);
        assert_eq!(curve.point_at(1.0), curve.to);

        let mid = curve.point_at(0.5);
        assert!((mid.x - 50.0).abs() < 1e-4);
        assert!((mid.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_flatten_point_count() {
        let end = Vec2::new(1.0, 1.0);
        let curve = CubicBezier::new(Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0), end);
        let points = curve.flatten(16);
        assert_eq!(points.len(), 17);
        assert_eq!(points[0], Vec2::ZERO);
        assert_eq!(points[16], end);
        assert_eq!(curve.flatten(0).len(), 2);
    }
}
