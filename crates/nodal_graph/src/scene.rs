//! Scene - the aggregate root of a graph document
//!
//! The scene owns every node (and through them every socket) and every
//! edge. Sockets only hold edge ids; all cross references are resolved
//! through the scene, which keeps the bidirectional socket/edge membership
//! consistent on every mutation.
//!
//! Listeners registered on the scene receive plain data and no scene
//! handle, so they cannot re-enter a mutation that is still running.

use std::collections::{HashMap, HashSet};
use core::fmt;

use nodal_core::{Id, SharedIds};
use nodal_math::Vec2;

use crate::content::{opaque_content_factory, ContentFactory, NodeContent};
use crate::document::{validate_parts, EdgeDoc, NodeDoc, SceneDoc, SocketDoc};
use crate::edge::{Edge, EdgeGeometry, EdgeId, EdgeStyle};
use crate::error::{GraphError, Result};
use crate::node::{Node, NodeId, INPUT_ANCHOR, OUTPUT_ANCHOR};
use crate::socket::{NodeMetrics, Socket, SocketId, SocketKind};

/// Default scene extent on both axes
pub const DEFAULT_SCENE_SIZE: f32 = 64_000.0;

type ModifiedListener = Box<dyn FnMut()>;
type GeometryListener = Box<dyn FnMut(&EdgeGeometry)>;

/// Entities created by [`Scene::insert_fragment`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Inserted {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeId>,
}

/// The node graph of one editor document
pub struct Scene {
    id: Id,
    width: f32,
    height: f32,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    socket_owners: HashMap<SocketId, NodeId>,
    ids: SharedIds,
    metrics: NodeMetrics,
    content_factory: ContentFactory,
    modified: bool,
    modified_listeners: Vec<ModifiedListener>,
    geometry_listeners: Vec<GeometryListener>,
}

impl Scene {
    /// Create an empty scene drawing ids from `ids`
    pub fn new(ids: SharedIds) -> Self {
        Self {
            id: ids.next_id(),
            width: DEFAULT_SCENE_SIZE,
            height: DEFAULT_SCENE_SIZE,
            nodes: Vec::new(),
            edges: Vec::new(),
            socket_owners: HashMap::new(),
            ids,
            metrics: NodeMetrics::default(),
            content_factory: opaque_content_factory(),
            modified: false,
            modified_listeners: Vec::new(),
            geometry_listeners: Vec::new(),
        }
    }

    pub fn with_bounds(mut self, width: f32, height: f32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_metrics(mut self, metrics: NodeMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_content_factory(mut self, factory: ContentFactory) -> Self {
        self.content_factory = factory;
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn id(&self) -> Id {
        self.id
    }

    /// Scene extent as (width, height)
    pub fn bounds(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn ids(&self) -> &SharedIds {
        &self.ids
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Edges in insertion order, provisional ones included
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id() == id)
    }

    pub fn socket(&self, id: SocketId) -> Option<&Socket> {
        let owner = self.socket_owners.get(&id)?;
        self.node(*owner)?.socket(id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_index(id).is_some()
    }

    pub fn contains_edge(&self, id: EdgeId) -> bool {
        self.edge_index(id).is_some()
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    fn node_index(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    fn edge_index(&self, id: EdgeId) -> Option<usize> {
        self.edges.iter().position(|e| e.id() == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    fn socket_mut(&mut self, id: SocketId) -> Option<&mut Socket> {
        let owner = *self.socket_owners.get(&id)?;
        self.node_mut(owner)?.socket_mut(id)
    }

    fn require_node(&self, id: NodeId) -> Result<&Node> {
        self.node(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))
    }

    fn require_edge(&self, id: EdgeId) -> Result<&Edge> {
        self.edge(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))
    }

    fn require_socket(&self, id: SocketId) -> Result<&Socket> {
        self.socket(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))
    }

    // ------------------------------------------------------------------
    // Modified flag and listeners
    // ------------------------------------------------------------------

    /// Set the modified flag. Listeners fire on the false -> true edge only.
    pub fn set_modified(&mut self, value: bool) {
        let was = self.modified;
        self.modified = value;
        if value && !was {
            for listener in &mut self.modified_listeners {
                listener();
            }
        }
    }

    pub fn add_modified_listener(&mut self, listener: impl FnMut() + 'static) {
        self.modified_listeners.push(Box::new(listener));
    }

    /// Called with fresh endpoint geometry whenever an edge moves or changes
    pub fn add_geometry_listener(&mut self, listener: impl FnMut(&EdgeGeometry) + 'static) {
        self.geometry_listeners.push(Box::new(listener));
    }

    fn notify_geometry(&mut self, edges: &[EdgeId]) {
        if self.geometry_listeners.is_empty() || edges.is_empty() {
            return;
        }
        let geometry: Vec<EdgeGeometry> = edges
            .iter()
            .filter_map(|&e| self.edge_geometry(e).ok())
            .collect();
        for listener in &mut self.geometry_listeners {
            for g in &geometry {
                listener(g);
            }
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Create a node with one input per entry of `inputs` and one output per
    /// entry of `outputs`, consecutively indexed.
    pub fn add_node(
        &mut self,
        title: impl Into<String>,
        inputs: &[SocketKind],
        outputs: &[SocketKind],
    ) -> NodeId {
        let title = title.into();
        let id = NodeId(self.ids.next_id());
        let ids = self.ids.clone();

        let inputs = inputs
            .iter()
            .enumerate()
            .map(|(i, &kind)| Socket::new(SocketId(ids.next_id()), id, i, INPUT_ANCHOR, kind, false))
            .collect();
        let outputs = outputs
            .iter()
            .enumerate()
            .map(|(i, &kind)| Socket::new(SocketId(ids.next_id()), id, i, OUTPUT_ANCHOR, kind, true))
            .collect();
        let content = (self.content_factory)(&title);

        log::debug!("Scene::add_node {} {:?}", id, title);
        self.insert_node(Node {
            id,
            title,
            position: Vec2::ZERO,
            inputs,
            outputs,
            content,
        });
        self.set_modified(true);
        id
    }

    /// Remove a node together with every edge touching its sockets.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        self.require_node(id)?;
        self.unlink_node(id);
        self.set_modified(true);
        Ok(())
    }

    /// Move a node; connected edges get their geometry recomputed.
    pub fn set_node_position(&mut self, id: NodeId, position: Vec2) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))?;
        node.position = position;
        let edges = node.connected_edges();
        self.set_modified(true);
        self.notify_geometry(&edges);
        Ok(())
    }

    pub fn set_node_title(&mut self, id: NodeId, title: impl Into<String>) -> Result<()> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))?;
        node.title = title.into();
        self.set_modified(true);
        Ok(())
    }

    /// Mutable access to a node's content payload
    pub fn node_content_mut(&mut self, id: NodeId) -> Result<&mut dyn NodeContent> {
        let node = self
            .node_mut(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))?;
        Ok(node.content.as_mut())
    }

    fn insert_node(&mut self, node: Node) {
        for socket in node.sockets() {
            self.socket_owners.insert(socket.id(), node.id);
        }
        self.nodes.push(node);
    }

    fn unlink_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.node_index(id)?;
        for edge in self.nodes[index].connected_edges() {
            self.unlink_edge(edge);
        }
        // Edge removal does not move nodes, the index is still valid
        let node = self.nodes.remove(index);
        for socket in node.sockets() {
            self.socket_owners.remove(&socket.id());
        }
        log::debug!("Scene: removed {}", id);
        Some(node)
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    /// Create an edge from `start` to `end`. A missing end makes a
    /// provisional edge, which does not count as a document change.
    ///
    /// A completed edge takes over single-edge endpoints: whatever
    /// completed edge they held before is removed.
    pub fn add_edge(&mut self, start: SocketId, end: Option<SocketId>, style: EdgeStyle) -> Result<EdgeId> {
        self.require_socket(start)?;
        if let Some(end) = end {
            self.require_socket(end)?;
            self.evict_single_edge(start, None);
            self.evict_single_edge(end, None);
        }

        let id = EdgeId(self.ids.next_id());
        self.attach_edge(Edge::new(id, start, end, style));
        if end.is_some() {
            self.set_modified(true);
        }
        self.notify_geometry(&[id]);
        Ok(id)
    }

    /// Remove an edge from the scene and from both of its sockets.
    ///
    /// Removing an edge that is not in the scene is tolerated and returns
    /// false; idempotent cleanup paths rely on this.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        match self.unlink_edge(id) {
            Some(edge) => {
                if !edge.is_provisional() {
                    self.set_modified(true);
                }
                true
            }
            None => {
                log::warn!("Scene::remove_edge: {} is not in the scene", id);
                false
            }
        }
    }

    /// Remove every edge attached to `socket`. Returns how many went away.
    pub fn remove_socket_edges(&mut self, socket: SocketId) -> Result<usize> {
        let edges = self.require_socket(socket)?.edges().to_vec();
        for &edge in &edges {
            self.remove_edge(edge);
        }
        Ok(edges.len())
    }

    /// Move the start of an edge to another socket
    pub fn set_edge_start(&mut self, id: EdgeId, socket: SocketId) -> Result<()> {
        self.require_socket(socket)?;
        let index = self
            .edge_index(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))?;

        let old = self.edges[index].start();
        self.edges[index].set_start(socket);
        self.relink(index, Some(old), Some(socket));
        if !self.edges[index].is_provisional() {
            self.evict_single_edge(socket, Some(id));
        }
        self.set_modified(true);
        self.notify_geometry(&[id]);
        Ok(())
    }

    /// Move (or clear) the end of an edge
    pub fn set_edge_end(&mut self, id: EdgeId, socket: Option<SocketId>) -> Result<()> {
        if let Some(socket) = socket {
            self.require_socket(socket)?;
        }
        let index = self
            .edge_index(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))?;

        let old = self.edges[index].end();
        let start = self.edges[index].start();
        self.edges[index].set_end(socket);
        self.relink(index, old, socket);
        if let Some(socket) = socket {
            self.evict_single_edge(start, Some(id));
            self.evict_single_edge(socket, Some(id));
        }
        self.set_modified(true);
        self.notify_geometry(&[id]);
        Ok(())
    }

    /// Change the render hint of an edge. Endpoints are untouched.
    pub fn set_edge_style(&mut self, id: EdgeId, style: EdgeStyle) -> Result<()> {
        let index = self
            .edge_index(id)
            .ok_or_else(|| GraphError::invalid_state(format!("{} is not in the scene", id)))?;
        self.edges[index].set_style(style);
        self.set_modified(true);
        self.notify_geometry(&[id]);
        Ok(())
    }

    fn attach_edge(&mut self, edge: Edge) {
        let id = edge.id();
        let start = edge.start();
        let end = edge.end();
        self.edges.push(edge);
        if let Some(socket) = self.socket_mut(start) {
            socket.add_edge(id);
        }
        if let Some(socket) = end.and_then(|end| self.socket_mut(end)) {
            socket.add_edge(id);
        }
    }

    fn unlink_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let index = self.edge_index(id)?;
        let edge = self.edges.remove(index);
        self.detach(id, edge.start());
        if let Some(end) = edge.end() {
            self.detach(id, end);
        }
        Some(edge)
    }

    fn detach(&mut self, edge: EdgeId, socket: SocketId) {
        if let Some(s) = self.socket_mut(socket) {
            s.remove_edge(edge);
        }
    }

    /// Fix socket membership after an endpoint of `edges[index]` changed
    fn relink(&mut self, index: usize, old: Option<SocketId>, new: Option<SocketId>) {
        let id = self.edges[index].id();
        if let Some(old) = old {
            if !self.edges[index].touches(old) {
                self.detach(id, old);
            }
        }
        if let Some(socket) = new.and_then(|new| self.socket_mut(new)) {
            socket.add_edge(id);
        }
    }

    // ------------------------------------------------------------------
    // Geometry queries for the renderer
    // ------------------------------------------------------------------

    /// Scene-space position of a socket
    pub fn socket_position(&self, id: SocketId) -> Result<Vec2> {
        let socket = self.require_socket(id)?;
        let node = self.require_node(socket.node())?;
        Ok(node.position + self.metrics.socket_offset(socket.anchor(), socket.index()))
    }

    /// Endpoints of an edge. A provisional edge ends on its start socket;
    /// the free end of a drag is tracked by whoever drives the drag.
    pub fn edge_geometry(&self, id: EdgeId) -> Result<EdgeGeometry> {
        let edge = self.require_edge(id)?;
        let start = self.require_socket(edge.start())?;
        let source = self.socket_position(edge.start())?;
        let destination = match edge.end() {
            Some(end) => self.socket_position(end)?,
            None => source,
        };
        Ok(EdgeGeometry {
            edge: id,
            style: edge.style(),
            source,
            destination,
            source_anchor: start.anchor(),
        })
    }

    /// Geometry of every edge attached to a node
    pub fn connected_edge_geometry(&self, node: NodeId) -> Result<Vec<EdgeGeometry>> {
        self.require_node(node)?
            .connected_edges()
            .into_iter()
            .map(|e| self.edge_geometry(e))
            .collect()
    }

    /// Completed edges whose rendered path crosses segment `a-b`
    pub fn edges_crossing(&self, a: Vec2, b: Vec2, segments: usize) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|e| !e.is_provisional())
            .filter_map(|e| self.edge_geometry(e.id()).ok())
            .filter(|g| g.intersects_segment(a, b, segments))
            .map(|g| g.edge)
            .collect()
    }

    // ------------------------------------------------------------------
    // Whole-scene operations
    // ------------------------------------------------------------------

    /// Remove everything and reset the modified flag
    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.nodes.iter().map(|n| n.id).collect();
        for id in ids {
            self.unlink_node(id);
        }
        if !self.edges.is_empty() {
            log::warn!("Scene::clear: {} edges outlived their nodes", self.edges.len());
            self.edges.clear();
        }
        self.socket_owners.clear();
        self.modified = false;
    }

    /// Snapshot the scene. Provisional edges are left out.
    pub fn serialize(&self) -> SceneDoc {
        SceneDoc {
            id: self.id,
            scene_width: self.width,
            scene_height: self.height,
            nodes: self.nodes.iter().map(Node::to_doc).collect(),
            edges: self.edges.iter().filter_map(Edge::to_doc).collect(),
        }
    }

    /// Replace the scene with the contents of `doc`.
    ///
    /// The document is validated before anything is touched. With
    /// `restore_ids` entity ids are taken from the document, otherwise new
    /// ones are minted and the document ids only resolve references.
    pub fn deserialize(&mut self, doc: &SceneDoc, restore_ids: bool) -> Result<()> {
        doc.validate()?;

        let backup = self.serialize();
        let was_modified = self.modified;

        self.clear();
        self.apply_header(doc, restore_ids);

        if let Err(e) = self.build_parts(&doc.nodes, &doc.edges, restore_ids, Vec2::ZERO) {
            log::warn!("Scene::deserialize failed, restoring previous contents: {}", e);
            self.clear();
            self.apply_header(&backup, true);
            if let Err(restore) = self.build_parts(&backup.nodes, &backup.edges, true, Vec2::ZERO) {
                log::error!("Scene::deserialize could not restore previous contents: {}", restore);
            }
            self.modified = was_modified;
            return Err(e);
        }

        self.modified = false;
        log::debug!(
            "Scene::deserialize {} nodes, {} edges (restore_ids={})",
            self.nodes.len(),
            self.edges.len(),
            restore_ids
        );
        Ok(())
    }

    /// Add a node/edge fragment next to the existing contents with fresh
    /// ids, shifting every node by `offset`.
    pub fn insert_fragment(&mut self, nodes: &[NodeDoc], edges: &[EdgeDoc], offset: Vec2) -> Result<Inserted> {
        validate_parts(nodes, edges)?;
        let inserted = self.build_parts(nodes, edges, false, offset)?;
        if !inserted.nodes.is_empty() || !inserted.edges.is_empty() {
            self.set_modified(true);
        }
        Ok(inserted)
    }

    fn apply_header(&mut self, doc: &SceneDoc, restore_ids: bool) {
        if restore_ids {
            self.ids.reserve(doc.id);
            self.id = doc.id;
        }
        self.width = doc.scene_width;
        self.height = doc.scene_height;
    }

    /// Build nodes first, then edges, so edges may reference sockets that
    /// appear later in node order. Either everything is built or nothing.
    fn build_parts(
        &mut self,
        nodes: &[NodeDoc],
        edges: &[EdgeDoc],
        restore_ids: bool,
        offset: Vec2,
    ) -> Result<Inserted> {
        let mut socket_map: HashMap<SocketId, SocketId> = HashMap::new();
        let mut inserted = Inserted::default();

        for doc in nodes {
            match self.build_node(doc, restore_ids, offset, &mut socket_map) {
                Ok(id) => inserted.nodes.push(id),
                Err(e) => {
                    for id in inserted.nodes {
                        self.unlink_node(id);
                    }
                    return Err(e);
                }
            }
        }

        for doc in edges {
            let (start, end) = match (socket_map.get(&doc.start), socket_map.get(&doc.end)) {
                (Some(&start), Some(&end)) => (start, end),
                _ => {
                    for id in inserted.nodes {
                        self.unlink_node(id);
                    }
                    return Err(GraphError::corrupt(format!(
                        "edge {} references a socket outside the document",
                        doc.id.0
                    )));
                }
            };

            let id = if restore_ids {
                self.ids.reserve(doc.id.0);
                doc.id
            } else {
                EdgeId(self.ids.next_id())
            };

            let evicted = self.evict_single_edge(start, None) + self.evict_single_edge(end, None);
            if evicted > 0 {
                log::warn!("Scene: edge {} displaced {} earlier edges on single-edge sockets", doc.id.0, evicted);
            }
            self.attach_edge(Edge::new(id, start, Some(end), doc.style));
            inserted.edges.push(id);
        }

        inserted.edges.retain(|&e| self.contains_edge(e));
        Ok(inserted)
    }

    fn build_node(
        &mut self,
        doc: &NodeDoc,
        restore_ids: bool,
        offset: Vec2,
        socket_map: &mut HashMap<SocketId, SocketId>,
    ) -> Result<NodeId> {
        let id = if restore_ids {
            self.ids.reserve(doc.id.0);
            doc.id
        } else {
            NodeId(self.ids.next_id())
        };

        let mut content = (self.content_factory)(&doc.title);
        content.restore(&doc.content)?;

        let inputs = self.build_sockets(id, &doc.inputs, restore_ids, socket_map);
        let outputs = self.build_sockets(id, &doc.outputs, restore_ids, socket_map);

        self.insert_node(Node {
            id,
            title: doc.title.clone(),
            position: Vec2::new(doc.pos_x, doc.pos_y) + offset,
            inputs,
            outputs,
            content,
        });
        Ok(id)
    }

    fn build_sockets(
        &self,
        node: NodeId,
        docs: &[SocketDoc],
        restore_ids: bool,
        socket_map: &mut HashMap<SocketId, SocketId>,
    ) -> Vec<Socket> {
        let mut ordered: Vec<&SocketDoc> = docs.iter().collect();
        ordered.sort_by_key(|s| Socket::order_key(s.index, s.anchor));

        ordered
            .into_iter()
            .map(|doc| {
                let id = if restore_ids {
                    self.ids.reserve(doc.id.0);
                    doc.id
                } else {
                    SocketId(self.ids.next_id())
                };
                socket_map.insert(doc.id, id);
                Socket::new(id, node, doc.index, doc.anchor, doc.kind, doc.allows_multiple_edges)
            })
            .collect()
    }

    /// Drop the completed edges of a single-edge socket, except `keep`.
    /// Provisional edges stay. Returns how many edges went away.
    fn evict_single_edge(&mut self, socket: SocketId, keep: Option<EdgeId>) -> usize {
        let evicted: Vec<EdgeId> = match self.socket(socket) {
            Some(s) if !s.allows_multiple_edges() => s
                .edges()
                .iter()
                .copied()
                .filter(|&e| Some(e) != keep)
                .filter(|&e| self.edge(e).is_some_and(|e| !e.is_provisional()))
                .collect(),
            _ => return 0,
        };
        for &edge in &evicted {
            self.unlink_edge(edge);
        }
        if !evicted.is_empty() {
            log::debug!("{} accepts a single edge, dropped {:?}", socket, evicted);
        }
        evicted.len()
    }

    // ------------------------------------------------------------------
    // Integrity
    // ------------------------------------------------------------------

    /// Check the scene-wide invariants. Used by tests and tooling.
    pub fn verify_integrity(&self) -> Result<()> {
        let fail = |msg: String| -> Result<()> { Err(GraphError::InvalidState(msg)) };
        let mut seen: HashSet<u64> = HashSet::new();

        for node in &self.nodes {
            if !seen.insert(node.id.0.raw()) {
                return fail(format!("duplicate id {}", node.id.0));
            }
            for socket in node.sockets() {
                if !seen.insert(socket.id().0.raw()) {
                    return fail(format!("duplicate id {}", socket.id().0));
                }
                if socket.node() != node.id || self.socket_owners.get(&socket.id()) != Some(&node.id) {
                    return fail(format!("{} has a stale owner", socket.id()));
                }
                for &edge in socket.edges() {
                    match self.edge(edge) {
                        Some(e) if e.touches(socket.id()) => {}
                        _ => return fail(format!("{} lists foreign {}", socket.id(), edge)),
                    }
                }
                let completed = socket
                    .edges()
                    .iter()
                    .filter(|&&e| self.edge(e).is_some_and(|e| !e.is_provisional()))
                    .count();
                if !socket.allows_multiple_edges() && completed > 1 {
                    return fail(format!("{} is single-edge but has {} edges", socket.id(), completed));
                }
            }
        }

        for edge in &self.edges {
            if !seen.insert(edge.id().0.raw()) {
                return fail(format!("duplicate id {}", edge.id().0));
            }
            let endpoints = std::iter::once(edge.start()).chain(edge.end());
            for socket in endpoints {
                match self.socket(socket) {
                    Some(s) if s.contains_edge(edge.id()) => {}
                    Some(_) => return fail(format!("{} missing from {}", edge.id(), socket)),
                    None => return fail(format!("{} references missing {}", edge.id(), socket)),
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("id", &self.id)
            .field("bounds", &(self.width, self.height))
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("modified", &self.modified)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodal_core::IdRegistry;
    use std::cell::Cell;
    use std::rc::Rc;

    fn scene() -> Scene {
        Scene::new(IdRegistry::shared())
    }

    fn pair(scene: &mut Scene) -> (NodeId, NodeId, SocketId, SocketId) {
        let a = scene.add_node("A", &[], &[1]);
        let b = scene.add_node("B", &[1], &[]);
        let out = scene.node(a).unwrap().outputs()[0].id();
        let inp = scene.node(b).unwrap().inputs()[0].id();
        (a, b, out, inp)
    }

    #[test]
    fn test_socket_defaults() {
        let mut scene = scene();
        let id = scene.add_node("Mix", &[1, 2], &[3]);
        let node = scene.node(id).unwrap();

        assert_eq!(node.inputs().len(), 2);
        assert!(node.inputs().iter().all(|s| !s.allows_multiple_edges()));
        assert!(node.outputs().iter().all(|s| s.allows_multiple_edges()));
        assert_eq!(node.inputs()[1].index(), 1);
        assert_eq!(node.inputs()[1].kind(), 2);
        assert!(scene.is_modified());
    }

    #[test]
    fn test_edge_membership() {
        let mut scene = scene();
        let (_, _, out, inp) = pair(&mut scene);
        let edge = scene.add_edge(out, Some(inp), EdgeStyle::Direct).unwrap();

        assert_eq!(scene.socket(out).unwrap().edges(), &[edge]);
        assert_eq!(scene.socket(inp).unwrap().edges(), &[edge]);
        scene.verify_integrity().unwrap();

        assert!(scene.remove_edge(edge));
        assert!(!scene.socket(out).unwrap().has_edge());
        assert!(!scene.socket(inp).unwrap().has_edge());

        // Second removal is tolerated, other uses are not
        assert!(!scene.remove_edge(edge));
        assert!(matches!(
            scene.set_edge_style(edge, EdgeStyle::Bezier),
            Err(GraphError::InvalidState(_))
        ));
    }

    #[test]
    fn test_retarget_edge_end() {
        let mut scene = scene();
        let (_, _, out, inp) = pair(&mut scene);
        let c = scene.add_node("C", &[1], &[]);
        let other = scene.node(c).unwrap().inputs()[0].id();

        let edge = scene.add_edge(out, None, EdgeStyle::Bezier).unwrap();
        scene.set_edge_end(edge, Some(inp)).unwrap();
        scene.set_edge_end(edge, Some(other)).unwrap();

        assert!(!scene.socket(inp).unwrap().has_edge());
        assert_eq!(scene.socket(other).unwrap().edges(), &[edge]);
        scene.verify_integrity().unwrap();
    }

    #[test]
    fn test_retarget_edge_start() {
        let mut scene = scene();
        let (_, _, out, inp) = pair(&mut scene);
        let c = scene.add_node("C", &[], &[1]);
        let other = scene.node(c).unwrap().outputs()[0].id();

        let edge = scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        scene.set_edge_start(edge, other).unwrap();

        assert_eq!(scene.edge(edge).unwrap().start(), other);
        assert!(!scene.socket(out).unwrap().has_edge());
        assert_eq!(scene.socket(other).unwrap().edges(), &[edge]);
        assert_eq!(scene.socket(inp).unwrap().edges(), &[edge]);
        scene.verify_integrity().unwrap();
    }

    #[test]
    fn test_add_edge_takes_over_single_socket() {
        let mut scene = scene();
        let (_, _, out, inp) = pair(&mut scene);
        let c = scene.add_node("C", &[], &[1]);
        let other = scene.node(c).unwrap().outputs()[0].id();

        let first = scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        let second = scene.add_edge(other, Some(inp), EdgeStyle::Bezier).unwrap();

        assert!(!scene.contains_edge(first));
        assert!(!scene.socket(out).unwrap().has_edge());
        assert_eq!(scene.socket(inp).unwrap().edges(), &[second]);
        scene.verify_integrity().unwrap();

        let doc = scene.serialize();
        scene.deserialize(&doc, true).unwrap();
        assert_eq!(scene.serialize(), doc);
    }

    #[test]
    fn test_completing_edge_onto_occupied_input_evicts() {
        let mut scene = scene();
        let (_, _, out, inp) = pair(&mut scene);
        let c = scene.add_node("C", &[], &[1]);
        let other = scene.node(c).unwrap().outputs()[0].id();

        let first = scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        let dragged = scene.add_edge(other, None, EdgeStyle::Bezier).unwrap();
        // Provisional edges do not compete for the socket
        assert!(scene.contains_edge(first));

        scene.set_edge_end(dragged, Some(inp)).unwrap();
        assert!(!scene.contains_edge(first));
        assert_eq!(scene.socket(inp).unwrap().edges(), &[dragged]);
        scene.verify_integrity().unwrap();
    }

    #[test]
    fn test_connected_edge_geometry() {
        let mut scene = scene();
        let (a, b, out, inp) = pair(&mut scene);
        scene.set_node_position(b, Vec2::new(400.0, 0.0)).unwrap();
        let edge = scene.add_edge(out, Some(inp), EdgeStyle::Direct).unwrap();

        let geometry = scene.connected_edge_geometry(a).unwrap();
        assert_eq!(geometry.len(), 1);
        assert_eq!(geometry[0].edge, edge);
        assert_eq!(geometry[0].style, EdgeStyle::Direct);
        assert_eq!(geometry[0].source, Vec2::new(180.0, 38.0));
        assert_eq!(geometry[0].destination, Vec2::new(400.0, 226.0));
        assert_eq!(scene.connected_edge_geometry(b).unwrap(), geometry);

        scene.remove_node(b).unwrap();
        assert!(scene.connected_edge_geometry(a).unwrap().is_empty());
        assert!(matches!(
            scene.connected_edge_geometry(b),
            Err(GraphError::InvalidState(_))
        ));
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut scene = scene();
        let (a, b, out, inp) = pair(&mut scene);
        let c = scene.add_node("C", &[1], &[]);
        let other = scene.node(c).unwrap().inputs()[0].id();
        scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        let kept = scene.add_edge(out, Some(other), EdgeStyle::Bezier).unwrap();

        scene.remove_node(b).unwrap();
        assert_eq!(scene.edge_count(), 1);
        assert_eq!(scene.socket(out).unwrap().edges(), &[kept]);
        scene.verify_integrity().unwrap();

        scene.remove_node(a).unwrap();
        assert_eq!(scene.edge_count(), 0);
        assert!(matches!(scene.remove_node(a), Err(GraphError::InvalidState(_))));
    }

    #[test]
    fn test_modified_listener_fires_once_per_transition() {
        let mut scene = scene();
        let count = Rc::new(Cell::new(0));
        let seen = count.clone();
        scene.add_modified_listener(move || seen.set(seen.get() + 1));

        scene.add_node("A", &[], &[]);
        scene.add_node("B", &[], &[]);
        assert_eq!(count.get(), 1);

        scene.set_modified(false);
        scene.add_node("C", &[], &[]);
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_position_change_notifies_geometry() {
        let mut scene = scene();
        let (a, _, out, inp) = pair(&mut scene);
        let edge = scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();

        let moved = Rc::new(Cell::new(None));
        let sink = moved.clone();
        scene.add_geometry_listener(move |g| sink.set(Some((g.edge, g.source))));

        scene.set_node_position(a, Vec2::new(10.0, 20.0)).unwrap();
        let (id, source) = moved.get().unwrap();
        assert_eq!(id, edge);
        assert_eq!(source, Vec2::new(190.0, 58.0));
    }

    #[test]
    fn test_provisional_edge_is_not_a_change() {
        let mut scene = scene();
        let (_, _, out, _) = pair(&mut scene);
        scene.set_modified(false);

        let edge = scene.add_edge(out, None, EdgeStyle::Bezier).unwrap();
        assert!(!scene.is_modified());
        assert!(scene.serialize().edges.is_empty());
        scene.remove_edge(edge);
        assert!(!scene.is_modified());
    }

    #[test]
    fn test_deserialize_rejects_dangling_edge_without_touching_scene() {
        let mut scene = scene();
        let (_, _, out, inp) = pair(&mut scene);
        scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        let before = scene.serialize();

        let mut broken = before.clone();
        broken.edges[0].end = SocketId::new(9999);
        let err = scene.deserialize(&broken, true).unwrap_err();

        assert!(matches!(err, GraphError::CorruptDocument(_)));
        assert_eq!(scene.serialize(), before);
    }

    /// Content that refuses the string "bad"
    #[derive(Debug, Default)]
    struct StrictContent(serde_json::Value);

    impl NodeContent for StrictContent {
        fn to_value(&self) -> serde_json::Value {
            self.0.clone()
        }

        fn restore(&mut self, data: &serde_json::Value) -> Result<()> {
            if data == "bad" {
                return Err(GraphError::corrupt("content refused"));
            }
            self.0 = data.clone();
            Ok(())
        }
    }

    #[test]
    fn test_failed_content_restore_keeps_previous_scene() {
        let factory: ContentFactory = Box::new(|_title| Box::new(StrictContent::default()));
        let mut scene = Scene::new(IdRegistry::shared()).with_content_factory(factory);
        let (_, _, out, inp) = pair(&mut scene);
        scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        let before = scene.serialize();

        let mut accepted = before.clone();
        accepted.nodes[0].content = serde_json::json!({"gain": 2});
        scene.deserialize(&accepted, true).unwrap();
        assert_eq!(scene.serialize(), accepted);
        assert!(!scene.is_modified());

        // The first node restores fine, the second one fails
        scene.set_modified(true);
        let mut refused = before.clone();
        refused.nodes[1].content = serde_json::json!("bad");
        let err = scene.deserialize(&refused, true).unwrap_err();

        assert!(matches!(err, GraphError::CorruptDocument(_)));
        assert_eq!(scene.serialize(), accepted);
        assert!(scene.is_modified());
        scene.verify_integrity().unwrap();
    }

    #[test]
    fn test_deserialize_sorts_sockets() {
        let mut scene = scene();
        let id = scene.add_node("Mix", &[1, 2, 3], &[]);
        let mut doc = scene.serialize();
        doc.nodes[0].inputs.reverse();

        scene.deserialize(&doc, true).unwrap();
        let kinds: Vec<_> = scene.node(id).unwrap().inputs().iter().map(|s| s.kind()).collect();
        assert_eq!(kinds, vec![1, 2, 3]);
    }

    #[test]
    fn test_restored_ids_are_reserved() {
        let ids = IdRegistry::shared();
        let mut scene = Scene::new(ids.clone());
        scene.add_node("A", &[1], &[1]);
        let mut doc = scene.serialize();
        doc.nodes[0].id = NodeId::new(500);

        scene.deserialize(&doc, true).unwrap();
        assert!(scene.contains_node(NodeId::new(500)));
        assert!(ids.next_id().raw() > 500);
    }

    #[test]
    fn test_insert_fragment_mints_fresh_ids() {
        let mut scene = scene();
        let (a, _, out, inp) = pair(&mut scene);
        scene.add_edge(out, Some(inp), EdgeStyle::Bezier).unwrap();
        let doc = scene.serialize();

        let inserted = scene
            .insert_fragment(&doc.nodes, &doc.edges, Vec2::new(5.0, 5.0))
            .unwrap();
        assert_eq!(inserted.nodes.len(), 2);
        assert_eq!(inserted.edges.len(), 1);
        assert!(!inserted.nodes.contains(&a));
        assert_eq!(scene.node_count(), 4);
        assert_eq!(scene.edge_count(), 2);
        assert_eq!(scene.node(inserted.nodes[0]).unwrap().position(), Vec2::new(5.0, 5.0));
        scene.verify_integrity().unwrap();
    }
}
