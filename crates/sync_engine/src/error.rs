//! Sync engine error types.

use contracts::ActivityLabel;
use thiserror::Error;

/// Errors raised by alignment and windowing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Accelerometer and gyroscope share no sample index
    #[error("no alignable data: {accel} accelerometer and {gyro} gyroscope samples share no index")]
    NoAlignableData { accel: usize, gyro: usize },

    /// Stride must be strictly positive
    #[error("invalid stride {stride} for label {label}: must be > 0")]
    InvalidStride { label: ActivityLabel, stride: i64 },

    /// A label present in the series has no configured stride
    #[error("no stride configured for label {label}")]
    MissingStride { label: ActivityLabel },

    /// Stride table key is not an activity label
    #[error("stride key '{key}' is not an activity label")]
    InvalidLabel { key: String },

    /// Two stride table keys name the same label
    #[error("label {label} has more than one stride configured")]
    DuplicateLabel { label: ActivityLabel },

    /// Window length must be strictly positive
    #[error("invalid window length {0}: must be > 0")]
    InvalidWindowLength(usize),

    /// Only the single-device channel layout is supported
    #[error("expected {expected} channels, configuration asks for {actual}")]
    ChannelCountMismatch { expected: usize, actual: usize },
}

/// Result type alias for sync engine operations
pub type Result<T> = std::result::Result<T, SyncError>;
