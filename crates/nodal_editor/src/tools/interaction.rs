//! Edge interaction: the pointer-driven state machine of the graph view.
//!
//! ```text
//! Idle --down(socket)--------> DraggingEdge --up(socket)--> Idle (edge created)
//! Idle --ctrl+down(empty)----> Cutting      --up----------> Idle (crossed edges removed)
//! DraggingEdge/Cutting --Escape--> Idle (nothing recorded)
//! ```
//!
//! Presses that start neither gesture pass through to selection handling.
//! Idle key presses cover the editor shortcuts (undo, redo, clipboard,
//! save, delete).

use nodal_graph::{EdgeGeometry, EdgeId, SocketId};
use nodal_math::Vec2;

use super::{InteractionMode, Modifiers, PointerEvent, PointerTarget, Tool, ToolResult};
use crate::core::EditorState;
use crate::error::Result;
use crate::scene::SceneSerializer;

/// History entry for a connection made by dragging
pub const HISTORY_EDGE_CREATED: &str = "Created new edge by dragging";
/// History entry for a cut gesture that removed edges
pub const HISTORY_EDGES_CUT: &str = "Delete cutted edges";
/// History entry for a finished rubber band
pub const HISTORY_SELECTION_CHANGED: &str = "Selection changed";

/// Edge drag in progress
#[derive(Clone, Copy, Debug, PartialEq)]
struct EdgeDrag {
    /// Provisional edge hanging off the origin
    edge: EdgeId,
    origin: SocketId,
    press: Vec2,
    cursor: Vec2,
}

/// Pointer and keyboard state machine for edge creation and cutting.
#[derive(Clone, Debug, Default)]
pub struct EdgeInteraction {
    mode: InteractionMode,
    drag: Option<EdgeDrag>,
    cut_line: Vec<Vec2>,
    /// Press position of a rubber band started on empty space
    rubber_band: Option<Vec2>,
    /// A text field has keyboard focus
    editing: bool,
}

impl EdgeInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Set while a text field inside a node has keyboard focus; shortcuts
    /// are left to the field.
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// Points of the cut line drawn so far
    pub fn cut_line(&self) -> &[Vec2] {
        &self.cut_line
    }

    /// Press position of the rubber band being dragged, if any
    pub fn rubber_band(&self) -> Option<Vec2> {
        self.rubber_band
    }

    /// Geometry of the dragged edge, from its origin socket to the cursor.
    pub fn provisional_geometry(&self, state: &EditorState) -> Option<EdgeGeometry> {
        let drag = self.drag?;
        let edge = state.scene.edge(drag.edge)?;
        let origin = state.scene.socket(drag.origin)?;
        let source = state.scene.socket_position(drag.origin).ok()?;
        Some(EdgeGeometry {
            edge: drag.edge,
            style: edge.style(),
            source,
            destination: drag.cursor,
            source_anchor: origin.anchor(),
        })
    }

    // ------------------------------------------------------------------
    // Edge drag
    // ------------------------------------------------------------------

    fn start_edge_drag(&mut self, origin: SocketId, at: Vec2, state: &mut EditorState) -> Result<ToolResult> {
        let style = state.preferences.default_edge_style;
        let edge = state.scene.add_edge(origin, None, style)?;

        log::debug!("Interaction: start dragging edge from {}", origin);
        self.drag = Some(EdgeDrag {
            edge,
            origin,
            press: at,
            cursor: at,
        });
        self.mode = InteractionMode::DraggingEdge;
        Ok(ToolResult::Handled)
    }

    fn end_edge_drag(&mut self, target: PointerTarget, state: &mut EditorState) -> Result<ToolResult> {
        self.mode = InteractionMode::Idle;
        let Some(drag) = self.drag.take() else {
            return Ok(ToolResult::None);
        };

        // The provisional edge goes away in every case
        state.scene.remove_edge(drag.edge);

        let target = match target {
            PointerTarget::Socket(socket) if socket != drag.origin => socket,
            _ => {
                log::debug!("Interaction: edge drag released off a socket");
                return Ok(ToolResult::Handled);
            }
        };

        // Single-edge endpoints give up their current edge inside add_edge
        let style = state.preferences.default_edge_style;
        let edge = state.scene.add_edge(drag.origin, Some(target), style)?;
        state.selection.prune(&state.scene);
        state.store_history(HISTORY_EDGE_CREATED, true);

        log::debug!("Interaction: connected {} -> {} as {}", drag.origin, target, edge);
        Ok(ToolResult::Completed)
    }

    /// Release within the threshold of the press is a click, not a drag
    fn is_click(&self, press: Vec2, release: Vec2, state: &EditorState) -> bool {
        let threshold = state.preferences.edge_drag_threshold;
        press.distance_squared(release) <= threshold * threshold
    }

    // ------------------------------------------------------------------
    // Cut gesture
    // ------------------------------------------------------------------

    fn finish_cut(&mut self, state: &mut EditorState) -> ToolResult {
        self.mode = InteractionMode::Idle;
        let line = std::mem::take(&mut self.cut_line);
        let segments = state.preferences.curve_segments;

        let mut crossed: Vec<EdgeId> = Vec::new();
        for pair in line.windows(2) {
            for edge in state.scene.edges_crossing(pair[0], pair[1], segments) {
                if !crossed.contains(&edge) {
                    crossed.push(edge);
                }
            }
        }

        if crossed.is_empty() {
            log::debug!("Interaction: cut line crossed no edges");
            return ToolResult::Handled;
        }

        for &edge in &crossed {
            state.scene.remove_edge(edge);
        }
        state.selection.prune(&state.scene);
        state.store_history(HISTORY_EDGES_CUT, true);

        log::debug!("Interaction: cut {} edges", crossed.len());
        ToolResult::Completed
    }

    // ------------------------------------------------------------------
    // Shortcuts
    // ------------------------------------------------------------------

    fn shortcut(&mut self, key: &str, modifiers: Modifiers, state: &mut EditorState) -> Result<ToolResult> {
        let key = key.to_ascii_lowercase();
        let done = |changed: bool| if changed { ToolResult::Completed } else { ToolResult::Handled };

        match key.as_str() {
            "delete" => Ok(done(state.delete_selected())),
            "z" if modifiers.ctrl && modifiers.shift => Ok(done(state.redo()?)),
            "z" if modifiers.ctrl => Ok(done(state.undo()?)),
            "c" if modifiers.ctrl => {
                state.copy()?;
                Ok(ToolResult::Handled)
            }
            "x" if modifiers.ctrl => {
                state.cut()?;
                Ok(ToolResult::Completed)
            }
            "v" if modifiers.ctrl => {
                let inserted = state.paste()?;
                Ok(done(!inserted.nodes.is_empty()))
            }
            "s" if modifiers.ctrl => {
                SceneSerializer::save_current(state)?;
                Ok(ToolResult::Handled)
            }
            _ => Ok(ToolResult::None),
        }
    }
}

impl Tool for EdgeInteraction {
    fn name(&self) -> &str {
        "Edge interaction"
    }

    fn mode(&self) -> InteractionMode {
        self.mode
    }

    fn on_pointer_down(&mut self, event: &PointerEvent, state: &mut EditorState) -> Result<ToolResult> {
        state.last_scene_mouse_position = event.position;

        if self.mode != InteractionMode::Idle {
            return Ok(ToolResult::Handled);
        }

        match event.target {
            PointerTarget::Socket(socket) => self.start_edge_drag(socket, event.position, state),
            target if target.is_empty_space() && event.modifiers.ctrl => {
                log::debug!("Interaction: start cutting");
                self.cut_line = vec![event.position];
                self.mode = InteractionMode::Cutting;
                Ok(ToolResult::Handled)
            }
            target if target.is_empty_space() && !event.modifiers.shift => {
                self.rubber_band = Some(event.position);
                Ok(ToolResult::Passthrough)
            }
            _ => Ok(ToolResult::Passthrough),
        }
    }

    fn on_pointer_move(&mut self, event: &PointerEvent, state: &mut EditorState) -> Result<ToolResult> {
        state.last_scene_mouse_position = event.position;

        match self.mode {
            InteractionMode::DraggingEdge => {
                if let Some(drag) = self.drag.as_mut() {
                    drag.cursor = event.position;
                }
                Ok(ToolResult::Handled)
            }
            InteractionMode::Cutting => {
                self.cut_line.push(event.position);
                Ok(ToolResult::Handled)
            }
            InteractionMode::Idle => Ok(ToolResult::None),
        }
    }

    fn on_pointer_up(&mut self, event: &PointerEvent, state: &mut EditorState) -> Result<ToolResult> {
        state.last_scene_mouse_position = event.position;

        match self.mode {
            InteractionMode::DraggingEdge => {
                let press = self.drag.map(|d| d.press).unwrap_or(event.position);
                if self.is_click(press, event.position, state) {
                    log::debug!("Interaction: click on socket, dropping drag");
                    self.abort(state);
                    return Ok(ToolResult::Handled);
                }
                self.end_edge_drag(event.target, state)
            }
            InteractionMode::Cutting => {
                self.cut_line.push(event.position);
                Ok(self.finish_cut(state))
            }
            InteractionMode::Idle => {
                if self.rubber_band.take().is_some() {
                    state.store_history(HISTORY_SELECTION_CHANGED, false);
                }
                Ok(ToolResult::Passthrough)
            }
        }
    }

    fn on_key(&mut self, key: &str, modifiers: Modifiers, state: &mut EditorState) -> Result<ToolResult> {
        if key.eq_ignore_ascii_case("escape") {
            if self.mode == InteractionMode::Idle {
                return Ok(ToolResult::None);
            }
            self.abort(state);
            return Ok(ToolResult::Handled);
        }

        // Gestures own the keyboard until they end; text fields own it while focused
        if self.mode != InteractionMode::Idle || self.editing {
            return Ok(ToolResult::None);
        }
        self.shortcut(key, modifiers, state)
    }

    fn abort(&mut self, state: &mut EditorState) {
        if let Some(drag) = self.drag.take() {
            state.scene.remove_edge(drag.edge);
        }
        if self.mode != InteractionMode::Idle {
            log::debug!("Interaction: abort {:?}", self.mode);
        }
        self.cut_line.clear();
        self.rubber_band = None;
        self.mode = InteractionMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EditorPreferences;
    use nodal_core::IdRegistry;
    use nodal_graph::NodeId;

    struct Fixture {
        state: EditorState,
        tool: EdgeInteraction,
        a: NodeId,
        out: SocketId,
        inp: SocketId,
    }

    fn fixture() -> Fixture {
        let mut state = EditorState::with_preferences(EditorPreferences::default(), IdRegistry::shared());
        let a = state.scene.add_node("A", &[], &[1]);
        let b = state.scene.add_node("B", &[1], &[]);
        state.scene.set_node_position(b, Vec2::new(400.0, 0.0)).unwrap();
        let out = state.scene.node(a).unwrap().outputs()[0].id();
        let inp = state.scene.node(b).unwrap().inputs()[0].id();
        state.store_initial_history_stamp();
        state.scene.set_modified(false);
        Fixture {
            state,
            tool: EdgeInteraction::new(),
            a,
            out,
            inp,
        }
    }

    fn drag(f: &mut Fixture, from: SocketId, to: SocketId) -> ToolResult {
        let start = f.state.scene.socket_position(from).unwrap();
        let end = f.state.scene.socket_position(to).unwrap();
        f.tool
            .on_pointer_down(&PointerEvent::new(start, PointerTarget::Socket(from)), &mut f.state)
            .unwrap();
        f.tool
            .on_pointer_move(&PointerEvent::new(end, PointerTarget::Socket(to)), &mut f.state)
            .unwrap();
        f.tool
            .on_pointer_up(&PointerEvent::new(end, PointerTarget::Socket(to)), &mut f.state)
            .unwrap()
    }

    fn connect(f: &mut Fixture) -> ToolResult {
        let (out, inp) = (f.out, f.inp);
        drag(f, out, inp)
    }

    #[test]
    fn test_drag_creates_edge() {
        let mut f = fixture();
        assert_eq!(connect(&mut f), ToolResult::Completed);

        assert_eq!(f.tool.mode(), InteractionMode::Idle);
        assert_eq!(f.state.scene.edge_count(), 1);
        let edge = &f.state.scene.edges()[0];
        assert_eq!((edge.start(), edge.end()), (f.out, Some(f.inp)));
        assert_eq!(f.state.history.undo_description(), Some(HISTORY_EDGE_CREATED));
        assert!(f.state.scene.is_modified());
    }

    #[test]
    fn test_provisional_edge_follows_cursor() {
        let mut f = fixture();
        let start = f.state.scene.socket_position(f.out).unwrap();
        f.tool
            .on_pointer_down(&PointerEvent::new(start, PointerTarget::Socket(f.out)), &mut f.state)
            .unwrap();
        assert_eq!(f.tool.mode(), InteractionMode::DraggingEdge);
        assert_eq!(f.state.scene.edge_count(), 1);
        assert!(f.state.scene.edges()[0].is_provisional());

        let cursor = Vec2::new(250.0, 90.0);
        f.tool
            .on_pointer_move(&PointerEvent::new(cursor, PointerTarget::Background), &mut f.state)
            .unwrap();
        let geometry = f.tool.provisional_geometry(&f.state).unwrap();
        assert_eq!(geometry.source, start);
        assert_eq!(geometry.destination, cursor);
    }

    #[test]
    fn test_release_on_background_creates_nothing() {
        let mut f = fixture();
        let start = f.state.scene.socket_position(f.out).unwrap();
        f.tool
            .on_pointer_down(&PointerEvent::new(start, PointerTarget::Socket(f.out)), &mut f.state)
            .unwrap();
        let far = start + Vec2::new(200.0, 0.0);
        let result = f
            .tool
            .on_pointer_up(&PointerEvent::new(far, PointerTarget::Background), &mut f.state)
            .unwrap();

        assert_eq!(result, ToolResult::Handled);
        assert_eq!(f.state.scene.edge_count(), 0);
        assert_eq!(f.state.history.len(), 1);
    }

    #[test]
    fn test_click_within_threshold_cancels() {
        let mut f = fixture();
        let start = f.state.scene.socket_position(f.out).unwrap();
        f.tool
            .on_pointer_down(&PointerEvent::new(start, PointerTarget::Socket(f.out)), &mut f.state)
            .unwrap();
        let near = start + Vec2::new(3.0, 4.0);
        f.tool
            .on_pointer_up(&PointerEvent::new(near, PointerTarget::Socket(f.inp)), &mut f.state)
            .unwrap();

        assert_eq!(f.tool.mode(), InteractionMode::Idle);
        assert_eq!(f.state.scene.edge_count(), 0);
    }

    #[test]
    fn test_press_after_click_starts_fresh_drag() {
        let mut f = fixture();
        let start = f.state.scene.socket_position(f.out).unwrap();
        let press = PointerEvent::new(start, PointerTarget::Socket(f.out));
        f.tool.on_pointer_down(&press, &mut f.state).unwrap();
        let result = f.tool.on_pointer_up(&press, &mut f.state).unwrap();
        assert_eq!(result, ToolResult::Handled);
        assert_eq!(f.tool.mode(), InteractionMode::Idle);
        assert_eq!(f.state.scene.edge_count(), 0);

        // The click left nothing behind; the next press begins its own drag
        let target = f.state.scene.socket_position(f.inp).unwrap();
        let result = f
            .tool
            .on_pointer_down(&PointerEvent::new(target, PointerTarget::Socket(f.inp)), &mut f.state)
            .unwrap();
        assert_eq!(result, ToolResult::Handled);
        assert_eq!(f.tool.mode(), InteractionMode::DraggingEdge);
        assert_eq!(f.state.scene.edge_count(), 1);
        let edge = &f.state.scene.edges()[0];
        assert_eq!((edge.start(), edge.end()), (f.inp, None));
        assert_eq!(f.state.history.len(), 1);
    }

    #[test]
    fn test_second_press_during_drag_is_swallowed() {
        let mut f = fixture();
        let start = f.state.scene.socket_position(f.out).unwrap();
        f.tool
            .on_pointer_down(&PointerEvent::new(start, PointerTarget::Socket(f.out)), &mut f.state)
            .unwrap();
        let target = f.state.scene.socket_position(f.inp).unwrap();
        let result = f
            .tool
            .on_pointer_down(&PointerEvent::new(target, PointerTarget::Socket(f.inp)), &mut f.state)
            .unwrap();

        assert_eq!(result, ToolResult::Handled);
        assert_eq!(f.tool.mode(), InteractionMode::DraggingEdge);
        assert_eq!(f.state.scene.edge_count(), 1);
        assert!(f.state.scene.edges()[0].is_provisional());
    }

    #[test]
    fn test_escape_aborts_drag_without_history() {
        let mut f = fixture();
        let start = f.state.scene.socket_position(f.out).unwrap();
        f.tool
            .on_pointer_down(&PointerEvent::new(start, PointerTarget::Socket(f.out)), &mut f.state)
            .unwrap();

        let result = f.tool.on_key("Escape", Modifiers::NONE, &mut f.state).unwrap();
        assert_eq!(result, ToolResult::Handled);
        assert_eq!(f.tool.mode(), InteractionMode::Idle);
        assert_eq!(f.state.scene.edge_count(), 0);
        assert_eq!(f.state.history.len(), 1);
        assert!(!f.state.scene.is_modified());
    }

    #[test]
    fn test_cut_line_removes_crossed_edge() {
        let mut f = fixture();
        connect(&mut f);
        let geometry = f.state.scene.edge_geometry(f.state.scene.edges()[0].id()).unwrap();
        let mid_x = (geometry.source.x + geometry.destination.x) * 0.5;

        let down = PointerEvent::new(Vec2::new(mid_x, -500.0), PointerTarget::Background)
            .with_modifiers(Modifiers::CTRL);
        f.tool.on_pointer_down(&down, &mut f.state).unwrap();
        assert_eq!(f.tool.mode(), InteractionMode::Cutting);

        f.tool
            .on_pointer_move(&PointerEvent::new(Vec2::new(mid_x, 0.0), PointerTarget::Background), &mut f.state)
            .unwrap();
        let result = f
            .tool
            .on_pointer_up(&PointerEvent::new(Vec2::new(mid_x, 800.0), PointerTarget::Background), &mut f.state)
            .unwrap();

        assert_eq!(result, ToolResult::Completed);
        assert_eq!(f.state.scene.edge_count(), 0);
        assert!(f.tool.cut_line().is_empty());
        assert_eq!(f.state.history.undo_description(), Some(HISTORY_EDGES_CUT));
    }

    #[test]
    fn test_cut_missing_everything_records_nothing() {
        let mut f = fixture();
        connect(&mut f);
        let entries = f.state.history.len();

        let down = PointerEvent::new(Vec2::new(-900.0, -900.0), PointerTarget::None)
            .with_modifiers(Modifiers::CTRL);
        f.tool.on_pointer_down(&down, &mut f.state).unwrap();
        f.tool
            .on_pointer_up(&PointerEvent::new(Vec2::new(-800.0, -900.0), PointerTarget::None), &mut f.state)
            .unwrap();

        assert_eq!(f.state.scene.edge_count(), 1);
        assert_eq!(f.state.history.len(), entries);
    }

    #[test]
    fn test_plain_presses_pass_through() {
        let mut f = fixture();
        let on_node = PointerEvent::new(Vec2::new(10.0, 10.0), PointerTarget::Node(f.a));
        assert_eq!(f.tool.on_pointer_down(&on_node, &mut f.state).unwrap(), ToolResult::Passthrough);
        assert_eq!(f.tool.mode(), InteractionMode::Idle);

        // Rubber band release records the selection
        let empty = PointerEvent::new(Vec2::new(-50.0, -50.0), PointerTarget::Background);
        f.tool.on_pointer_down(&empty, &mut f.state).unwrap();
        assert!(f.tool.rubber_band().is_some());
        f.tool.on_pointer_up(&empty, &mut f.state).unwrap();
        assert_eq!(f.state.history.undo_description(), Some(HISTORY_SELECTION_CHANGED));
    }

    #[test]
    fn test_shortcuts_blocked_while_editing() {
        let mut f = fixture();
        connect(&mut f);

        f.tool.set_editing(true);
        let result = f.tool.on_key("Z", Modifiers::CTRL, &mut f.state).unwrap();
        assert_eq!(result, ToolResult::None);
        assert_eq!(f.state.scene.edge_count(), 1);

        f.tool.set_editing(false);
        let result = f.tool.on_key("z", Modifiers::CTRL, &mut f.state).unwrap();
        assert_eq!(result, ToolResult::Completed);
        assert_eq!(f.state.scene.edge_count(), 0);

        let result = f.tool.on_key("Z", Modifiers::CTRL_SHIFT, &mut f.state).unwrap();
        assert_eq!(result, ToolResult::Completed);
        assert_eq!(f.state.scene.edge_count(), 1);
    }
}
