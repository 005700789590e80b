//! Error types for the graph model

use thiserror::Error;

/// Graph model errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Operation on a removed or unknown entity
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Malformed or referentially inconsistent document
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),
}

impl GraphError {
    pub(crate) fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub(crate) fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptDocument(msg.into())
    }
}

impl From<serde_json::Error> for GraphError {
    fn from(e: serde_json::Error) -> Self {
        Self::CorruptDocument(e.to_string())
    }
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
