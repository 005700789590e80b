//! # nodal_editor - Node graph editing session
//!
//! Everything between raw input and the graph model:
//!
//! - **Undo/Redo**: bounded history of full scene snapshots
//! - **Selection**: node and edge selection with change listeners
//! - **Clipboard**: copy, cut and paste of scene fragments as JSON text
//! - **Edge interaction**: drag edges out of sockets, cut them with a line
//! - **Preferences**: TOML settings in the user config directory
//! - **Scene files**: indented JSON save/load
//!
//! ## Architecture
//!
//! ```text
//! Pointer/Key → Tool → Scene mutation → EditorState::store_history
//! ```
//!
//! Rendering stays with the host: it resolves hit targets, feeds
//! [`tools::PointerEvent`]s in, and reads geometry back out of the scene.

pub mod error;
pub mod core;
pub mod clipboard;
pub mod tools;
pub mod scene;

// Re-export commonly used types
pub use error::{EditorError, Result};

pub use crate::core::{
    EditorPreferences,
    EditorState,
    HistoryStamp,
    SceneHistory,
    Selection,
    SelectionItem,
    SelectionMode,
};

pub use clipboard::ClipboardDoc;

pub use tools::{
    EdgeInteraction,
    InteractionMode,
    Modifiers,
    PointerEvent,
    PointerTarget,
    Tool,
    ToolResult,
};

pub use scene::SceneSerializer;

/// Editor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Editor name
pub const NAME: &str = "Nodal";
