//! Axis-aligned rectangles

use crate::vector::Vec2;

/// Axis-aligned rectangle in scene space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// An empty (inverted) rectangle that any point expands
    pub const EMPTY: Self = Self {
        min: Vec2::new(f32::MAX, f32::MAX),
        max: Vec2::new(f32::MIN, f32::MIN),
    };

    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Smallest rectangle containing every point, `None` when empty
    pub fn from_points(points: impl IntoIterator<Item = Vec2>) -> Option<Self> {
        let rect = points
            .into_iter()
            .fold(Self::EMPTY, |rect, p| rect.expand_to_include(p));
        rect.is_valid().then_some(rect)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Check if min <= max on both axes
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    #[inline]
    pub fn expand_to_include(self, p: Vec2) -> Self {
        Self::new(self.min.min(p), self.max.max(p))
    }
}
