//! AlignedSink - destination for aligned logs

use std::path::{Path, PathBuf};

use contracts::AlignedLog;

use crate::error::Result;

/// Where one aligned log ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReceipt {
    /// Written path, `None` when the sink does not persist
    pub path: Option<PathBuf>,
    pub records: usize,
    pub bytes: usize,
}

/// Destination for aligned logs.
///
/// Shared by every batch worker, so implementations take `&self` and must be
/// safe to call concurrently for distinct source files.
pub trait AlignedSink: Send + Sync {
    fn name(&self) -> &str;

    /// Persist the aligned form of `source`
    fn write(&self, source: &Path, log: &AlignedLog) -> Result<SinkReceipt>;
}
