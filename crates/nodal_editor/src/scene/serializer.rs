//! Scene files: indented JSON documents on disk.

use std::path::Path;

use nodal_graph::SceneDoc;

use crate::core::EditorState;
use crate::error::{EditorError, Result};

/// Scene serializer for save/load operations.
pub struct SceneSerializer;

impl SceneSerializer {
    /// Save the scene as indented JSON and clear the modified flag.
    pub fn save(state: &mut EditorState, path: &Path) -> Result<()> {
        let json = state
            .scene
            .serialize()
            .to_json_pretty()
            .map_err(|e| EditorError::invalid_file(path, e))?;

        std::fs::write(path, json).map_err(|e| EditorError::invalid_file(path, e))?;

        state.scene.set_modified(false);
        state.scene_path = Some(path.to_path_buf());
        log::info!("Saved scene to {:?}", path);
        Ok(())
    }

    /// Save to the file the scene came from. Returns false when the scene
    /// has never been saved.
    pub fn save_current(state: &mut EditorState) -> Result<bool> {
        let Some(path) = state.scene_path.clone() else {
            log::warn!("Save: scene has no file yet");
            return Ok(false);
        };
        Self::save(state, &path)?;
        Ok(true)
    }

    /// Load a scene file, keeping document ids.
    ///
    /// On failure the current scene is left as it was.
    pub fn load(state: &mut EditorState, path: &Path) -> Result<()> {
        let content = std::fs::read_to_string(path).map_err(|e| EditorError::invalid_file(path, e))?;

        let doc = SceneDoc::from_json(&content).map_err(|e| EditorError::invalid_file(path, e))?;

        state
            .scene
            .deserialize(&doc, true)
            .map_err(|e| EditorError::invalid_file(path, e))?;

        state.selection.clear();
        state.scene.set_modified(false);
        state.scene_path = Some(path.to_path_buf());
        state.store_initial_history_stamp();

        log::info!(
            "Loaded scene from {:?}: {} nodes, {} edges",
            path,
            state.scene.node_count(),
            state.scene.edge_count()
        );
        Ok(())
    }
}
