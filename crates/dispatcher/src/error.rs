//! Dispatcher error types

use std::path::PathBuf;

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Output files are write-once
    #[error("output already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    /// Nothing to write
    #[error("refusing to write an empty {what}")]
    EmptyBatch { what: &'static str },

    /// Window does not match the tensor shape expected downstream
    #[error("window has length {actual}, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// JSON encoding error
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DispatcherError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for dispatcher operations
pub type Result<T> = std::result::Result<T, DispatcherError>;
