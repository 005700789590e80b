//! # nodal_graph - Node graph document model
//!
//! The data model behind the node editor:
//! - **Nodes**: titled boxes carrying input and output sockets and an
//!   opaque content payload
//! - **Sockets**: typed connection points laid out along a node corner
//! - **Edges**: links from a start socket to an end socket, rendered as
//!   straight lines or bezier curves
//! - **Scene**: the aggregate that owns all of the above and keeps socket
//!   and edge membership consistent
//!
//! Scenes serialize to [`SceneDoc`] documents, which back file storage,
//! undo history and the clipboard alike.
//!
//! ## Example
//!
//! ```ignore
//! use nodal_graph::prelude::*;
//!
//! let mut scene = Scene::new(IdRegistry::shared());
//! let a = scene.add_node("Source", &[], &[1]);
//! let b = scene.add_node("Sink", &[1], &[]);
//!
//! let out = scene.node(a).unwrap().outputs()[0].id();
//! let inp = scene.node(b).unwrap().inputs()[0].id();
//! scene.add_edge(out, Some(inp), EdgeStyle::Bezier)?;
//!
//! let json = scene.serialize().to_json_pretty()?;
//! ```

pub mod error;
pub mod socket;
pub mod edge;
pub mod content;
pub mod node;
pub mod document;
pub mod scene;

// Re-exports
pub use error::{GraphError, Result};
pub use socket::{Anchor, NodeMetrics, Socket, SocketId, SocketKind};
pub use edge::{Edge, EdgeGeometry, EdgeId, EdgeStyle, EDGE_CP_ROUNDNESS};
pub use content::{opaque_content_factory, ContentFactory, NodeContent, OpaqueContent};
pub use node::{Node, NodeId, SocketSide, INPUT_ANCHOR, OUTPUT_ANCHOR};
pub use document::{to_json_indented, validate_parts, EdgeDoc, NodeDoc, SceneDoc, SocketDoc};
pub use scene::{Inserted, Scene, DEFAULT_SCENE_SIZE};

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Anchor, Edge, EdgeId, EdgeStyle, GraphError, Node, NodeContent, NodeId, Scene, SceneDoc,
        Socket, SocketId, SocketKind,
    };
    pub use nodal_core::{Id, IdRegistry, SharedIds};
    pub use nodal_math::Vec2;
}
