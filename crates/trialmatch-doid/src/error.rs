//! Errors raised while building a DOID model

use thiserror::Error;

/// Result type for ontology construction
pub type DoidResult<T> = Result<T, DoidError>;

/// Errors that can occur while loading the ontology or its manual configuration
#[derive(Debug, Error)]
pub enum DoidError {
    /// An `is_a` edge references something that is not a DOID
    #[error("Unresolvable DOID in ontology edge: {0}")]
    UnresolvableDoid(String),

    /// The dump did not contain a single graph
    #[error("Ontology dump contains no graphs")]
    EmptyDump,

    /// JSON syntax or structure error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The file could not be read
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl DoidError {
    /// Create an IO error for the given path
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}
