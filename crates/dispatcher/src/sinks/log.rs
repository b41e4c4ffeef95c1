//! LogSink - logs aligned summaries via tracing, writes nothing

use std::path::Path;

use contracts::{AlignedLog, FormatConfig};
use tracing::info;

use super::aligned::render_aligned;
use crate::error::Result;
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sink::{AlignedSink, SinkReceipt};

/// Sink for dry runs: reports what would be written
#[derive(Debug)]
pub struct LogSink {
    name: String,
    format: FormatConfig,
    metrics: SinkMetrics,
}

impl LogSink {
    pub fn new(name: impl Into<String>, format: FormatConfig) -> Self {
        Self {
            name: name.into(),
            format,
            metrics: SinkMetrics::new(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl AlignedSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, source: &Path, log: &AlignedLog) -> Result<SinkReceipt> {
        let bytes = render_aligned(log, self.format).len();
        info!(
            sink = %self.name,
            file = %source.display(),
            device = log.device_id.as_deref().unwrap_or("-"),
            records = log.records.len(),
            bytes,
            "dry run: aligned log not written"
        );
        self.metrics.record_write(log.records.len(), bytes);
        Ok(SinkReceipt {
            path: None,
            records: log.records.len(),
            bytes,
        })
    }
}
