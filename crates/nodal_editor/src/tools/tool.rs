//! Tool trait and the pointer/keyboard input types it consumes.

use nodal_graph::{EdgeId, NodeId, SocketId};
use nodal_math::Vec2;

use crate::core::EditorState;
use crate::error::Result;

/// What the pointer is over, as resolved by the renderer's hit test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerTarget {
    Socket(SocketId),
    Edge(EdgeId),
    Node(NodeId),
    Background,
    /// Outside the scene or nothing resolved
    #[default]
    None,
}

impl PointerTarget {
    /// Empty space: background or nothing at all
    pub fn is_empty_space(&self) -> bool {
        matches!(self, PointerTarget::Background | PointerTarget::None)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self { shift: false, ctrl: false, alt: false };
    pub const SHIFT: Self = Self { shift: true, ctrl: false, alt: false };
    pub const CTRL: Self = Self { shift: false, ctrl: true, alt: false };
    pub const CTRL_SHIFT: Self = Self { shift: true, ctrl: true, alt: false };
}

/// Pointer event in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Vec2,
    pub target: PointerTarget,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(position: Vec2, target: PointerTarget) -> Self {
        Self {
            position,
            target,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Result of tool operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolResult {
    /// No action taken
    None,
    /// Tool handled the input, continue
    Handled,
    /// Tool completed an action that changed the document
    Completed,
    /// Input belongs to ordinary selection handling
    Passthrough,
}

/// Interaction state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InteractionMode {
    #[default]
    Idle,
    DraggingEdge,
    Cutting,
}

/// An input handler driven by the host's event loop.
pub trait Tool {
    /// Display name.
    fn name(&self) -> &str;

    /// Current interaction state.
    fn mode(&self) -> InteractionMode {
        InteractionMode::Idle
    }

    /// Handle pointer press.
    fn on_pointer_down(&mut self, _event: &PointerEvent, _state: &mut EditorState) -> Result<ToolResult> {
        Ok(ToolResult::None)
    }

    /// Handle pointer movement.
    fn on_pointer_move(&mut self, _event: &PointerEvent, _state: &mut EditorState) -> Result<ToolResult> {
        Ok(ToolResult::None)
    }

    /// Handle pointer release.
    fn on_pointer_up(&mut self, _event: &PointerEvent, _state: &mut EditorState) -> Result<ToolResult> {
        Ok(ToolResult::None)
    }

    /// Handle key press (e.g. "Escape", "Delete", "Z").
    fn on_key(&mut self, _key: &str, _modifiers: Modifiers, _state: &mut EditorState) -> Result<ToolResult> {
        Ok(ToolResult::None)
    }

    /// Cancel whatever gesture is in progress.
    fn abort(&mut self, _state: &mut EditorState) {}
}
