//! # Dispatcher
//!
//! Output stage.
//!
//! Responsibilities:
//! - write `AlignedLog` into the output directory (write-once, atomic replace with `--force`)
//! - export window tensors `[n, L, 6]` with their labels
//! - build inference requests and prediction records

pub mod error;
pub mod metrics;
pub mod payload;
pub mod sink;
pub mod sinks;

pub use contracts::AlignedLog;
pub use error::{DispatcherError, Result};
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use payload::{is_fall, InferenceRequest, PredictionRecord, FALL_THRESHOLD};
pub use sink::{AlignedSink, SinkReceipt};
pub use sinks::{
    render_aligned, write_file, AlignedFileWriter, LogSink, WindowTensor, WriteMode,
    ALIGNED_COLUMNS,
};
