//! Error types for CLI operations.

use std::path::PathBuf;

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    /// Configuration validation error (after CLI overrides)
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    /// A command needs a location label and none was configured
    #[error("No body location configured; set [location] label or pass --location")]
    MissingLocation,

    /// A command needs an output directory and none was configured
    #[error("No output directory configured; set [dataset] output_dir or pass --output")]
    MissingOutput,

    /// A CLI override could not be parsed
    #[error("Invalid --{flag} value '{value}'")]
    InvalidOverride { flag: &'static str, value: String },

    /// Input directory could not be listed
    #[error("Failed to list input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    pub fn invalid_override(flag: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidOverride {
            flag,
            value: value.into(),
        }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
