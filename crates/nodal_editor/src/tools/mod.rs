//! Editor tools for user interaction.
//!
//! Tools turn pointer and keyboard input from the graph view into scene
//! edits: dragging out edges, cutting them, and the editor shortcuts.

mod tool;
mod interaction;

pub use tool::{InteractionMode, Modifiers, PointerEvent, PointerTarget, Tool, ToolResult};
pub use interaction::{
    EdgeInteraction, HISTORY_EDGES_CUT, HISTORY_EDGE_CREATED, HISTORY_SELECTION_CHANGED,
};
