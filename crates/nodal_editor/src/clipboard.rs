//! Clipboard transfer of scene fragments.
//!
//! Copied fragments travel as JSON text (`{nodes, edges}`) so they can go
//! through the system clipboard and into another document. Pasting always
//! mints fresh ids and moves the fragment so its bounding-box center lands
//! on the paste point.

use std::collections::HashSet;

use nodal_graph::{EdgeDoc, GraphError, Inserted, NodeDoc, Scene, SocketId};
use nodal_math::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::core::Selection;

/// A copied fragment of a scene
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardDoc {
    pub nodes: Vec<NodeDoc>,
    #[serde(default)]
    pub edges: Vec<EdgeDoc>,
}

impl ClipboardDoc {
    /// Parse clipboard text. Anything that is not a fragment is corrupt.
    pub fn from_json(text: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, GraphError> {
        nodal_graph::to_json_indented(self)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Center of the box spanned by the node positions
    pub fn center(&self) -> Option<Vec2> {
        Rect::from_points(self.nodes.iter().map(|n| Vec2::new(n.pos_x, n.pos_y))).map(|r| r.center())
    }
}

/// Serialize the selected nodes, and the selected edges running between
/// them, into a clipboard fragment.
pub fn serialize_selected(scene: &Scene, selection: &Selection) -> ClipboardDoc {
    let mut nodes = Vec::new();
    let mut sockets: HashSet<SocketId> = HashSet::new();

    for id in selection.nodes() {
        let Some(node) = scene.node(id) else {
            log::warn!("Clipboard: selected {} is not in the scene", id);
            continue;
        };
        sockets.extend(node.sockets().map(|s| s.id()));
        nodes.push(node.to_doc());
    }

    let edges: Vec<EdgeDoc> = selection
        .edges()
        .filter_map(|id| scene.edge(id))
        .filter_map(|edge| edge.to_doc())
        .filter(|doc| {
            let keep = sockets.contains(&doc.start) && sockets.contains(&doc.end);
            if !keep {
                log::debug!("Clipboard: skipping edge {} with an end outside the selection", doc.id);
            }
            keep
        })
        .collect();

    log::debug!("Clipboard: copied {} nodes, {} edges", nodes.len(), edges.len());
    ClipboardDoc { nodes, edges }
}

/// Insert a fragment into `scene`, centered on `at`.
pub fn paste(scene: &mut Scene, doc: &ClipboardDoc, at: Vec2) -> Result<Inserted, GraphError> {
    let Some(center) = doc.center() else {
        return Ok(Inserted::default());
    };

    let offset = at - center;
    let inserted = scene.insert_fragment(&doc.nodes, &doc.edges, offset)?;
    log::debug!(
        "Clipboard: pasted {} nodes, {} edges at {:?}",
        inserted.nodes.len(),
        inserted.edges.len(),
        at
    );
    Ok(inserted)
}
