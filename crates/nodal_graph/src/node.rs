//! Node - titled containers of sockets
//!
//! Nodes own their input and output sockets. Inputs hang off the bottom
//! left corner and accept a single edge by default; outputs hang off the
//! top right corner and may feed any number of edges.

use core::fmt;
use nodal_core::Id;
use nodal_math::Vec2;
use serde::{Deserialize, Serialize};

use crate::content::NodeContent;
use crate::socket::{Anchor, Socket, SocketId};

/// Anchor used for input sockets
pub const INPUT_ANCHOR: Anchor = Anchor::BottomLeft;
/// Anchor used for output sockets
pub const OUTPUT_ANCHOR: Anchor = Anchor::TopRight;

/// Unique identifier for a node
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Id);

impl NodeId {
    pub fn new(id: u64) -> Self {
        Self(Id::from_raw(id))
    }

    pub fn id(&self) -> Id {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Which side of the node a socket sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SocketSide {
    Input,
    Output,
}

/// Node instance in a scene
#[derive(Debug)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) title: String,
    pub(crate) position: Vec2,
    pub(crate) inputs: Vec<Socket>,
    pub(crate) outputs: Vec<Socket>,
    pub(crate) content: Box<dyn NodeContent>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Top-left corner in scene coordinates
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn inputs(&self) -> &[Socket] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Socket] {
        &self.outputs
    }

    pub fn content(&self) -> &dyn NodeContent {
        self.content.as_ref()
    }

    /// Inputs followed by outputs
    pub fn sockets(&self) -> impl Iterator<Item = &Socket> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        self.sockets().find(|s| s.id() == id)
    }

    pub(crate) fn socket_mut(&mut self, id: SocketId) -> Option<&mut Socket> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|s| s.id() == id)
    }

    /// Side the given socket belongs to
    pub fn socket_side(&self, id: SocketId) -> Option<SocketSide> {
        if self.inputs.iter().any(|s| s.id() == id) {
            Some(SocketSide::Input)
        } else if self.outputs.iter().any(|s| s.id() == id) {
            Some(SocketSide::Output)
        } else {
            None
        }
    }

    /// Every edge attached to any socket, without duplicates
    pub fn connected_edges(&self) -> Vec<crate::edge::EdgeId> {
        let mut edges = Vec::new();
        for socket in self.sockets() {
            for &edge in socket.edges() {
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }
        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::OpaqueContent;

    fn node() -> Node {
        let id = NodeId::new(1);
        Node {
            id,
            title: "Add".into(),
            position: Vec2::new(10.0, 20.0),
            inputs: vec![
                Socket::new(SocketId::new(2), id, 0, INPUT_ANCHOR, 1, false),
                Socket::new(SocketId::new(3), id, 1, INPUT_ANCHOR, 1, false),
            ],
            outputs: vec![Socket::new(SocketId::new(4), id, 0, OUTPUT_ANCHOR, 1, true)],
            content: Box::new(OpaqueContent::default()),
        }
    }

    #[test]
    fn test_socket_lookup() {
        let node = node();
        assert_eq!(node.sockets().count(), 3);
        assert_eq!(node.socket_side(SocketId::new(3)), Some(SocketSide::Input));
        assert_eq!(node.socket_side(SocketId::new(4)), Some(SocketSide::Output));
        assert_eq!(node.socket_side(SocketId::new(9)), None);
    }

    #[test]
    fn test_connected_edges_deduplicated() {
        let mut node = node();
        let edge = crate::edge::EdgeId::new(7);
        // A loop edge touches two sockets of the same node
        node.socket_mut(SocketId::new(2)).unwrap().add_edge(edge);
        node.socket_mut(SocketId::new(4)).unwrap().add_edge(edge);
        assert_eq!(node.connected_edges(), vec![edge]);
    }
}
