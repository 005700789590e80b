//! Serialized form of a scene
//!
//! The same documents back file save/load, undo/redo snapshots and
//! clipboard transfer. Field names are part of the file format; unknown
//! fields are ignored on read.

use std::collections::HashSet;

use nodal_core::Id;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::edge::{Edge, EdgeId, EdgeStyle};
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId};
use crate::socket::{Anchor, Socket, SocketId, SocketKind};

/// A whole scene
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDoc {
    pub id: Id,
    pub scene_width: f32,
    pub scene_height: f32,
    pub nodes: Vec<NodeDoc>,
    pub edges: Vec<EdgeDoc>,
}

/// One node with its sockets and content
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeDoc {
    pub id: NodeId,
    pub title: String,
    pub pos_x: f32,
    pub pos_y: f32,
    pub inputs: Vec<SocketDoc>,
    pub outputs: Vec<SocketDoc>,
    #[serde(default)]
    pub content: Value,
}

/// One socket
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SocketDoc {
    pub id: SocketId,
    pub index: usize,
    pub anchor: Anchor,
    pub kind: SocketKind,
    pub allows_multiple_edges: bool,
}

/// One edge, referring to sockets by id
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeDoc {
    pub id: EdgeId,
    pub style: EdgeStyle,
    pub start: SocketId,
    pub end: SocketId,
}

impl SceneDoc {
    /// Parse a document from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parse a document from an already-decoded JSON value
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Indented JSON text
    pub fn to_json_pretty(&self) -> Result<String> {
        to_json_indented(self)
    }

    /// Check the document is self-consistent
    pub fn validate(&self) -> Result<()> {
        validate_parts(&self.nodes, &self.edges)
    }
}

impl Node {
    /// Document form of this node, content included
    pub fn to_doc(&self) -> NodeDoc {
        NodeDoc {
            id: self.id,
            title: self.title.clone(),
            pos_x: self.position.x,
            pos_y: self.position.y,
            inputs: self.inputs.iter().map(Socket::to_doc).collect(),
            outputs: self.outputs.iter().map(Socket::to_doc).collect(),
            content: self.content.to_value(),
        }
    }
}

impl Socket {
    pub fn to_doc(&self) -> SocketDoc {
        SocketDoc {
            id: self.id(),
            index: self.index(),
            anchor: self.anchor(),
            kind: self.kind(),
            allows_multiple_edges: self.allows_multiple_edges(),
        }
    }
}

impl Edge {
    /// Document form of this edge; `None` while it is provisional
    pub fn to_doc(&self) -> Option<EdgeDoc> {
        Some(EdgeDoc {
            id: self.id(),
            style: self.style(),
            start: self.start(),
            end: self.end()?,
        })
    }
}

/// Serialize with four-space indentation
pub fn to_json_indented<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| GraphError::corrupt(e.to_string()))
}

/// Validate a node/edge list before anything is built from it.
///
/// Every id must be unique across nodes, sockets and edges, and every edge
/// must reference sockets declared in `nodes`.
pub fn validate_parts(nodes: &[NodeDoc], edges: &[EdgeDoc]) -> Result<()> {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut sockets: HashSet<SocketId> = HashSet::new();

    for node in nodes {
        if !seen.insert(node.id.0.raw()) {
            return Err(GraphError::corrupt(format!("duplicate id {} (node)", node.id.0)));
        }
        if !node.pos_x.is_finite() || !node.pos_y.is_finite() {
            return Err(GraphError::corrupt(format!("node {} has a non-finite position", node.id.0)));
        }
        for socket in node.inputs.iter().chain(node.outputs.iter()) {
            if !seen.insert(socket.id.0.raw()) {
                return Err(GraphError::corrupt(format!("duplicate id {} (socket)", socket.id.0)));
            }
            sockets.insert(socket.id);
        }
    }

    for edge in edges {
        if !seen.insert(edge.id.0.raw()) {
            return Err(GraphError::corrupt(format!("duplicate id {} (edge)", edge.id.0)));
        }
        for endpoint in [edge.start, edge.end] {
            if !sockets.contains(&endpoint) {
                return Err(GraphError::corrupt(format!(
                    "edge {} references unknown socket {}",
                    edge.id.0, endpoint.0
                )));
            }
        }
    }

    Ok(())
}
