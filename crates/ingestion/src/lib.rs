//! # Ingestion
//!
//! Per-file sensor log ingestion.
//!
//! Responsibilities:
//! - Parse one log file into typed `SensorEvent`s plus header metadata
//! - Resolve a body-location label to the device id declared in the header
//! - Restrict events to that device and to the accelerometer/gyroscope types
//! - Load labeled training series from headered CSV or aligned files
//!
//! Bad data lines never abort a file: they are skipped and counted in
//! `ParseStats`.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::{EventParser, SensorFilter};
//!
//! let log = EventParser::default().parse_path(path)?;
//! let filtered = SensorFilter::for_location("RIGHTPOCKET").apply(log)?;
//! // filtered.streams feeds the aligner
//! ```

mod aligned;
mod error;
mod filter;
mod header;
mod labeled;
mod location;
mod parser;

// Re-exports
pub use aligned::{parse_aligned_str, read_aligned, ALIGNED_FIELDS};
pub use error::{IngestionError, Result};
pub use filter::{FilteredLog, SensorFilter};
pub use labeled::{load_labeled_csv, LabeledColumns};
pub use location::LocationResolver;
pub use parser::{EventParser, MIN_DATA_FIELDS};
