//! Batch orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{
    discover_files, BatchReport, BatchRunner, FileOutcome, SkipKind, SkipReason,
};
pub use stats::{BatchStats, FileStats};
