//! Edge - links between sockets
//!
//! An edge always has a start socket. The end socket is only missing while
//! the edge is being dragged out of a socket (a provisional edge); such
//! edges are never persisted.

use core::fmt;
use nodal_core::Id;
use nodal_math::{polyline_intersects_segment, CubicBezier, Vec2};
use serde::{Deserialize, Serialize};

use crate::socket::{Anchor, SocketId};

/// Vertical control-point offset used when a bezier edge runs backwards
pub const EDGE_CP_ROUNDNESS: f32 = 100.0;

/// Unique identifier for an edge
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub Id);

impl EdgeId {
    pub fn new(id: u64) -> Self {
        Self(Id::from_raw(id))
    }

    pub fn id(&self) -> Id {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// Render hint for an edge. Has no effect on topology.
///
/// Persisted as its integer code (1 = direct, 2 = bezier).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EdgeStyle {
    Direct,
    #[default]
    Bezier,
}

impl EdgeStyle {
    pub const fn code(self) -> u8 {
        match self {
            EdgeStyle::Direct => 1,
            EdgeStyle::Bezier => 2,
        }
    }
}

impl TryFrom<u8> for EdgeStyle {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(EdgeStyle::Direct),
            2 => Ok(EdgeStyle::Bezier),
            other => Err(format!("unknown edge style {}", other)),
        }
    }
}

impl From<EdgeStyle> for u8 {
    fn from(style: EdgeStyle) -> Self {
        style.code()
    }
}

/// A link between two sockets
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    id: EdgeId,
    style: EdgeStyle,
    start: SocketId,
    end: Option<SocketId>,
}

impl Edge {
    pub(crate) fn new(id: EdgeId, start: SocketId, end: Option<SocketId>, style: EdgeStyle) -> Self {
        Self { id, style, start, end }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn style(&self) -> EdgeStyle {
        self.style
    }

    pub fn start(&self) -> SocketId {
        self.start
    }

    pub fn end(&self) -> Option<SocketId> {
        self.end
    }

    /// Edge still being dragged (no end socket)
    pub fn is_provisional(&self) -> bool {
        self.end.is_none()
    }

    /// Check whether either endpoint is `socket`
    pub fn touches(&self, socket: SocketId) -> bool {
        self.start == socket || self.end == Some(socket)
    }

    pub(crate) fn set_style(&mut self, style: EdgeStyle) {
        self.style = style;
    }

    pub(crate) fn set_start(&mut self, start: SocketId) {
        self.start = start;
    }

    pub(crate) fn set_end(&mut self, end: Option<SocketId>) {
        self.end = end;
    }
}

/// Scene-space endpoints of an edge, as consumed by the renderer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeGeometry {
    pub edge: EdgeId,
    pub style: EdgeStyle,
    pub source: Vec2,
    pub destination: Vec2,
    /// Anchor of the start socket; bends bezier curves that run backwards
    pub source_anchor: Anchor,
}

impl EdgeGeometry {
    /// Bezier control layout: horizontal handles of half the x-distance,
    /// flipped and given vertical roundness when the curve leaves its
    /// start socket towards the wrong side.
    pub fn bezier(&self) -> CubicBezier {
        let s = self.source;
        let d = self.destination;
        let dist = (d.x - s.x) * 0.5;

        let mut cpx_s = dist;
        let mut cpx_d = -dist;
        let mut cpy_s = 0.0;
        let mut cpy_d = 0.0;

        let backwards = (s.x > d.x && !self.source_anchor.is_left())
            || (s.x < d.x && self.source_anchor.is_left());
        if backwards {
            cpx_s = -cpx_s;
            cpx_d = -cpx_d;
            cpy_d = signum_or_zero(s.y - d.y) * EDGE_CP_ROUNDNESS;
            cpy_s = signum_or_zero(d.y - s.y) * EDGE_CP_ROUNDNESS;
        }

        CubicBezier::new(
            s,
            Vec2::new(s.x + cpx_s, s.y + cpy_s),
            Vec2::new(d.x + cpx_d, d.y + cpy_d),
            d,
        )
    }

    /// The rendered path as a polyline
    pub fn path(&self, segments: usize) -> Vec<Vec2> {
        match self.style {
            EdgeStyle::Direct => vec![self.source, self.destination],
            EdgeStyle::Bezier => self.bezier().flatten(segments),
        }
    }

    /// Check whether the rendered path crosses segment `a-b`
    pub fn intersects_segment(&self, a: Vec2, b: Vec2, segments: usize) -> bool {
        polyline_intersects_segment(&self.path(segments), a, b)
    }
}

fn signum_or_zero(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
