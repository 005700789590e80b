//! Editor preferences and settings.
//!
//! Persistent settings that survive editor restarts, stored as TOML.

use std::path::{Path, PathBuf};

use nodal_graph::{EdgeStyle, NodeMetrics, DEFAULT_SCENE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// Editor preferences and settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorPreferences {
    // History
    pub history_limit: usize,

    // Interaction
    pub edge_drag_threshold: f32,
    pub default_edge_style: EdgeStyle,
    /// Polyline segments per bezier edge when hit testing cuts
    pub curve_segments: usize,

    // Scene
    pub scene_width: f32,
    pub scene_height: f32,

    // Node layout
    pub node_metrics: NodeMetrics,
}

impl Default for EditorPreferences {
    fn default() -> Self {
        Self {
            history_limit: 32,

            edge_drag_threshold: 10.0,
            default_edge_style: EdgeStyle::Bezier,
            curve_segments: 32,

            scene_width: DEFAULT_SCENE_SIZE,
            scene_height: DEFAULT_SCENE_SIZE,

            node_metrics: NodeMetrics::default(),
        }
    }
}

impl EditorPreferences {
    /// Load preferences from a file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No preferences at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| EditorError::Preferences(format!("{}: {}", path.display(), e)))?;
        let prefs: Self = toml::from_str(&content)
            .map_err(|e| EditorError::Preferences(format!("{}: {}", path.display(), e)))?;

        log::info!("Loaded preferences from {:?}", path);
        Ok(prefs)
    }

    /// Save preferences to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EditorError::Preferences(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EditorError::Preferences(format!("{}: {}", parent.display(), e)))?;
        }
        std::fs::write(path, content)
            .map_err(|e| EditorError::Preferences(format!("{}: {}", path.display(), e)))?;

        log::info!("Saved preferences to {:?}", path);
        Ok(())
    }

    /// Get the default preferences path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("nodal");
            p.push("preferences.toml");
            p
        })
    }

    /// Load from the default path, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        match Self::default_path() {
            Some(path) => Self::load(&path).unwrap_or_else(|e| {
                log::warn!("{}; using default preferences", e);
                Self::default()
            }),
            None => Self::default(),
        }
    }
}
