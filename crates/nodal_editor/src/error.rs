//! Error types for the editing session

use std::path::PathBuf;

use nodal_graph::GraphError;
use thiserror::Error;

/// Editor errors
#[derive(Debug, Error)]
pub enum EditorError {
    /// Error from the graph model
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// File could not be read, parsed or written
    #[error("Invalid file {path:?}: {reason}")]
    InvalidFile { path: PathBuf, reason: String },

    /// Preferences could not be read or written
    #[error("Preferences error: {0}")]
    Preferences(String),
}

impl EditorError {
    pub fn invalid_file(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::InvalidFile {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for editor operations
pub type Result<T> = std::result::Result<T, EditorError>;
