//! Central editor state - single source of truth.
//!
//! Wires the scene to its history, selection, clipboard buffer and
//! preferences. Every user-visible edit ends with [`EditorState::store_history`]
//! so it can be undone.

use std::path::PathBuf;

use nodal_core::{IdRegistry, SharedIds};
use nodal_graph::{GraphError, Inserted, Scene};
use nodal_math::Vec2;

use super::{EditorPreferences, HistoryStamp, SceneHistory, Selection};
use crate::clipboard::{self, ClipboardDoc};
use crate::error::Result;

/// Description of the baseline stamp stored on new/load
pub const INITIAL_HISTORY_STAMP: &str = "Initial history stamp";

/// Central editor state.
#[derive(Debug)]
pub struct EditorState {
    // Scene data
    pub scene: Scene,

    // Selection
    pub selection: Selection,

    // History
    pub history: SceneHistory,

    // Preferences
    pub preferences: EditorPreferences,

    // Scene file
    pub scene_path: Option<PathBuf>,

    // Last copied fragment, as clipboard text
    pub clipboard: Option<String>,

    /// Last pointer position in scene coordinates; paste target
    pub last_scene_mouse_position: Vec2,
}

impl Default for EditorState {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self::with_preferences(EditorPreferences::default(), IdRegistry::global())
    }

    /// Build an empty scene configured from `preferences`
    pub fn with_preferences(preferences: EditorPreferences, ids: SharedIds) -> Self {
        let scene = Scene::new(ids)
            .with_bounds(preferences.scene_width, preferences.scene_height)
            .with_metrics(preferences.node_metrics);
        Self::from_scene(scene, preferences)
    }

    /// Take over an existing scene, e.g. one with a custom content factory
    pub fn from_scene(scene: Scene, preferences: EditorPreferences) -> Self {
        let mut state = Self {
            scene,
            selection: Selection::new(),
            history: SceneHistory::with_limit(preferences.history_limit),
            preferences,
            scene_path: None,
            clipboard: None,
            last_scene_mouse_position: Vec2::ZERO,
        };
        state.store_initial_history_stamp();
        state
    }

    /// File name for window titles, starred when there are unsaved changes.
    pub fn display_name(&self) -> String {
        let name = self
            .scene_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "New Graph".to_string());
        if self.scene.is_modified() {
            format!("{}*", name)
        } else {
            name
        }
    }

    /// Discard the scene and start over.
    pub fn new_scene(&mut self) {
        self.scene.clear();
        self.selection.clear();
        self.scene_path = None;
        self.store_initial_history_stamp();
        log::info!("New scene");
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// Record the current scene and selection as a history entry.
    pub fn store_history(&mut self, description: &str, set_modified: bool) {
        if set_modified {
            self.scene.set_modified(true);
        }
        self.history.push(HistoryStamp {
            description: description.to_string(),
            snapshot: self.scene.serialize(),
            selection: self.selection.items().to_vec(),
        });
    }

    /// Reset history to a single stamp of the current scene.
    pub fn store_initial_history_stamp(&mut self) {
        self.history.clear();
        self.store_history(INITIAL_HISTORY_STAMP, false);
    }

    /// Go back one entry. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(step) = self.history.undo_step() else {
            return Ok(false);
        };
        let description = self.history.undo_description().unwrap_or_default().to_string();
        self.restore_step(step)?;
        log::info!("Undo: {}", description);
        Ok(true)
    }

    /// Go forward one entry. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(step) = self.history.redo_step() else {
            return Ok(false);
        };
        let description = self.history.redo_description().unwrap_or_default().to_string();
        self.restore_step(step)?;
        log::info!("Redo: {}", description);
        Ok(true)
    }

    fn restore_step(&mut self, step: usize) -> Result<()> {
        let stamp = self
            .history
            .stamp(step)
            .ok_or_else(|| GraphError::InvalidState(format!("no history step {}", step)))?;

        self.scene.deserialize(&stamp.snapshot, true)?;
        self.selection.restore(&stamp.selection, &self.scene);
        self.history.set_current_step(step);
        self.scene.set_modified(true);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Remove every selected edge and node. Returns false when nothing
    /// was removed.
    pub fn delete_selected(&mut self) -> bool {
        if !self.remove_selected() {
            return false;
        }
        self.store_history("Delete selected", true);
        true
    }

    /// Returns whether anything left the scene. Stale items are dropped
    /// from the selection either way.
    fn remove_selected(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }

        let edges: Vec<_> = self.selection.edges().collect();
        let nodes: Vec<_> = self.selection.nodes().collect();
        let mut removed = 0;

        for edge in edges {
            // May already be gone with a node removed earlier
            if self.scene.contains_edge(edge) && self.scene.remove_edge(edge) {
                removed += 1;
            }
        }
        for node in nodes {
            match self.scene.remove_node(node) {
                Ok(()) => removed += 1,
                Err(e) => log::warn!("Delete selected: {}", e),
            }
        }

        self.selection.clear();
        removed > 0
    }

    /// Copy the selection to the clipboard buffer and return its text.
    pub fn copy(&mut self) -> Result<String> {
        let text = clipboard::serialize_selected(&self.scene, &self.selection).to_json()?;
        self.clipboard = Some(text.clone());
        Ok(text)
    }

    /// Copy the selection, then remove it from the scene.
    pub fn cut(&mut self) -> Result<String> {
        let text = self.copy()?;
        if self.remove_selected() {
            self.store_history("Cut out elements from scene", true);
        }
        Ok(text)
    }

    /// Paste the clipboard buffer at the last pointer position.
    pub fn paste(&mut self) -> Result<Inserted> {
        let Some(text) = self.clipboard.clone() else {
            log::debug!("Paste: clipboard is empty");
            return Ok(Inserted::default());
        };
        self.paste_text(&text, self.last_scene_mouse_position)
    }

    /// Paste clipboard text centered on `at`.
    pub fn paste_text(&mut self, text: &str, at: Vec2) -> Result<Inserted> {
        let doc = ClipboardDoc::from_json(text)?;
        let inserted = clipboard::paste(&mut self.scene, &doc, at)?;
        if !inserted.nodes.is_empty() {
            self.store_history("Pasted elements in scene", true);
        }
        Ok(inserted)
    }
}
