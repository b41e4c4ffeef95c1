//! # Sync Engine
//!
//! Accelerometer/gyroscope stream alignment and windowing.
//!
//! Responsibilities:
//! - intersect sample indices into `AlignedRecord`s (`StreamAligner`)
//! - corpus-level clock divergence audit (`SyncQualityChecker`)
//! - fixed-length windows with a per-label stride (`Windower`)
//!
//! ## Example
//!
//! ```ignore
//! use sync_engine::{StreamAligner, Windower};
//!
//! let records = StreamAligner::new().align(&filtered.streams)?;
//!
//! let windower = Windower::from_config(&blueprint.windowing)?;
//! let batch = windower.windows(&LabeledSeries::uniform(records, FALL))?;
//! ```

mod aligner;
mod error;
mod quality;
mod window;

// Re-exports
pub use aligner::StreamAligner;
pub use error::{Result, SyncError};
pub use quality::{sync_pairs, SyncQualityChecker, SyncReport};
pub use window::{window_count, window_starts, StridePolicy, Windower};

// Re-export contracts types
pub use contracts::{AlignedLog, AlignedRecord, LabeledSeries, SensorStreams, WindowBatch};
