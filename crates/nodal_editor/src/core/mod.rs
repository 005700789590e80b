//! Core editor types and state management.
//!
//! This module contains the central `EditorState` and supporting types
//! that form the foundation of the editor.

pub mod editor_state;
mod selection;
mod history;
mod preferences;

pub use editor_state::{EditorState, INITIAL_HISTORY_STAMP};
pub use selection::{Selection, SelectionItem, SelectionMode};
pub use history::{HistoryStamp, SceneHistory};
pub use preferences::EditorPreferences;
