//! Socket - connection points on a node
//!
//! Sockets are owned by their node and hold the ids of the edges attached
//! to them. The ids are resolved through the scene, so a socket never keeps
//! an edge alive on its own.

use core::fmt;
use nodal_core::Id;
use nodal_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::edge::EdgeId;
use crate::node::NodeId;

/// Application-defined socket tag
pub type SocketKind = u32;

/// Unique identifier for a socket
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SocketId(pub Id);

impl SocketId {
    pub fn new(id: u64) -> Self {
        Self(Id::from_raw(id))
    }

    pub fn id(&self) -> Id {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Socket({})", self.0)
    }
}

/// Corner of the node a socket group is laid out against.
///
/// Persisted as its integer code (1-4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Anchor {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Anchor {
    /// Integer code used in documents
    pub const fn code(self) -> u8 {
        match self {
            Anchor::TopLeft => 1,
            Anchor::BottomLeft => 2,
            Anchor::TopRight => 3,
            Anchor::BottomRight => 4,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Anchor::TopLeft),
            2 => Some(Anchor::BottomLeft),
            3 => Some(Anchor::TopRight),
            4 => Some(Anchor::BottomRight),
            _ => None,
        }
    }

    pub const fn is_left(self) -> bool {
        matches!(self, Anchor::TopLeft | Anchor::BottomLeft)
    }

    pub const fn is_bottom(self) -> bool {
        matches!(self, Anchor::BottomLeft | Anchor::BottomRight)
    }
}

impl TryFrom<u8> for Anchor {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Anchor::from_code(code).ok_or_else(|| format!("unknown socket anchor {}", code))
    }
}

impl From<Anchor> for u8 {
    fn from(anchor: Anchor) -> Self {
        anchor.code()
    }
}

/// Fixed node box dimensions used by the socket layout rule.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub width: f32,
    pub height: f32,
    pub title_height: f32,
    pub padding: f32,
    pub edge_size: f32,
    pub socket_spacing: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 180.0,
            height: 240.0,
            title_height: 24.0,
            padding: 4.0,
            edge_size: 10.0,
            socket_spacing: 22.0,
        }
    }
}

impl NodeMetrics {
    /// Offset of a socket relative to its node's top-left corner.
    ///
    /// Top groups grow downward from just below the title band, bottom
    /// groups grow upward from the bottom edge.
    pub fn socket_offset(&self, anchor: Anchor, index: usize) -> Vec2 {
        let x = if anchor.is_left() { 0.0 } else { self.width };
        let step = index as f32 * self.socket_spacing;
        let y = if anchor.is_bottom() {
            self.height - self.edge_size - self.padding - step
        } else {
            self.title_height + self.padding + self.edge_size + step
        };
        Vec2::new(x, y)
    }
}

/// A connection point owned by a node
#[derive(Clone, Debug, PartialEq)]
pub struct Socket {
    id: SocketId,
    node: NodeId,
    index: usize,
    anchor: Anchor,
    kind: SocketKind,
    allows_multiple_edges: bool,
    edges: Vec<EdgeId>,
}

impl Socket {
    pub(crate) fn new(
        id: SocketId,
        node: NodeId,
        index: usize,
        anchor: Anchor,
        kind: SocketKind,
        allows_multiple_edges: bool,
    ) -> Self {
        Self {
            id,
            node,
            index,
            anchor,
            kind,
            allows_multiple_edges,
            edges: Vec::new(),
        }
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    /// Owning node
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn kind(&self) -> SocketKind {
        self.kind
    }

    /// Advisory: enforced by whoever attaches edges, not by the socket
    pub fn allows_multiple_edges(&self) -> bool {
        self.allows_multiple_edges
    }

    /// Attached edges in attachment order
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub fn has_edge(&self) -> bool {
        !self.edges.is_empty()
    }

    pub fn contains_edge(&self, edge: EdgeId) -> bool {
        self.edges.contains(&edge)
    }

    /// Record an attached edge. Attaching twice is a no-op.
    pub(crate) fn add_edge(&mut self, edge: EdgeId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Forget an attached edge. Returns false when it was not attached.
    pub(crate) fn remove_edge(&mut self, edge: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|&e| e != edge);
        before != self.edges.len()
    }

    /// Sort key used to lay out sockets deterministically on load
    pub(crate) fn order_key(index: usize, anchor: Anchor) -> usize {
        index + anchor.code() as usize * 10_000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn socket() -> Socket {
        Socket::new(SocketId::new(1), NodeId::new(1), 0, Anchor::TopRight, 3, true)
    }

    #[test]
    fn test_add_remove_edge_idempotent() {
        let mut s = socket();
        s.add_edge(EdgeId::new(10));
        s.add_edge(EdgeId::new(10));
        assert_eq!(s.edges(), &[EdgeId::new(10)]);

        assert!(s.remove_edge(EdgeId::new(10)));
        assert!(!s.remove_edge(EdgeId::new(10)));
        assert!(!s.has_edge());
    }

    #[test]
    fn test_anchor_codes() {
        for anchor in [Anchor::TopLeft, Anchor::BottomLeft, Anchor::TopRight, Anchor::BottomRight] {
            assert_eq!(Anchor::from_code(anchor.code()), Some(anchor));
        }
        assert_eq!(Anchor::from_code(0), None);
        assert!(serde_json::from_str::<Anchor>("9").is_err());
        assert_eq!(serde_json::to_string(&Anchor::BottomLeft).unwrap(), "2");
    }

    #[test]
    fn test_socket_layout() {
        let m = NodeMetrics::default();

        let top = m.socket_offset(Anchor::TopRight, 0);
        assert_eq!(top, Vec2::new(180.0, 38.0));
        let top_next = m.socket_offset(Anchor::TopRight, 1);
        assert_eq!(top_next.y - top.y, 22.0);

        let bottom = m.socket_offset(Anchor::BottomLeft, 0);
        assert_eq!(bottom, Vec2::new(0.0, 226.0));
        let bottom_next = m.socket_offset(Anchor::BottomLeft, 1);
        assert_eq!(bottom.y - bottom_next.y, 22.0);
    }

    #[test]
    fn test_order_key_groups_by_anchor() {
        assert!(Socket::order_key(5, Anchor::TopLeft) < Socket::order_key(0, Anchor::BottomLeft));
        assert!(Socket::order_key(0, Anchor::TopRight) < Socket::order_key(1, Anchor::TopRight));
    }
}
