//! Layered error definitions
//!
//! Only configuration failures live here. Stage-specific errors (parsing,
//! alignment, windowing, output) are owned by their crates.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration-level error type
#[derive(Debug, Error)]
pub enum ContractError {
    /// Content is not valid TOML/JSON for a blueprint, or the format is unknown
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Blueprint parsed but breaks a rule
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// Configuration file could not be read
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ContractError {
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Field path of a validation error
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::ConfigValidation { field, .. } => Some(field),
            _ => None,
        }
    }
}
