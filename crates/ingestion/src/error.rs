//! Ingestion error types

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Too few fields or a non-numeric value. Line-level only: whole-file
    /// parsing absorbs and counts it.
    #[error("malformed data line {line}: {reason}")]
    MalformedLine {
        /// Line number, 1-based
        line: usize,
        reason: String,
    },

    /// Header does not declare the requested location
    #[error("location '{label}' not declared in header")]
    LocationNotFound {
        label: String,
    },

    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Headered CSV could not be read
    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// CSV lacks a required column
    #[error("{path} has no column '{column}'")]
    MissingColumn {
        path: PathBuf,
        column: String,
    },

    /// CSV cell is not a valid value
    #[error("row {row}, column '{column}': invalid value '{value}'")]
    InvalidValue {
        /// Data row, 1-based, header excluded
        row: usize,
        column: String,
        value: String,
    },
}

impl IngestionError {
    pub fn malformed(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedLine {
            line,
            reason: reason.into(),
        }
    }

    pub fn location_not_found(label: impl Into<String>) -> Self {
        Self::LocationNotFound {
            label: label.into(),
        }
    }
}

/// Result alias for ingestion
pub type Result<T> = std::result::Result<T, IngestionError>;
