//! # nodal_math - 2D geometry
//!
//! Scene-space math for the graph editor: vectors, bounding rectangles,
//! cubic curves flattened into polylines, and the segment intersection
//! tests that back the edge cut gesture.

pub mod vector;
pub mod bounds;
pub mod curve;
pub mod intersect;

pub use vector::*;
pub use bounds::*;
pub use curve::*;
pub use intersect::*;

/// Common math constants
pub mod consts {
    pub const EPSILON: f32 = 1e-6;
}
