//! AlignedFileWriter - writes aligned logs next to their source name

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use contracts::{AlignedLog, FormatConfig};
use tracing::{debug, error};

use super::file::{write_file, WriteMode};
use crate::error::{DispatcherError, Result};
use crate::metrics::{MetricsSnapshot, SinkMetrics};
use crate::sink::{AlignedSink, SinkReceipt};

/// Column names of an aligned data line
pub const ALIGNED_COLUMNS: [&str; 8] = [
    "TimeStamp",
    "Sample No",
    "Accel-X",
    "Accel-Y",
    "Accel-Z",
    "Gyro-X",
    "Gyro-Y",
    "Gyro-Z",
];

/// Header line naming the input columns (`TimeStamp; Sample No; ...`)
fn is_column_description(line: &str, format: FormatConfig) -> bool {
    let Some(body) = line.strip_prefix(format.comment_marker) else {
        return false;
    };
    let mut fields = body.split(format.delimiter).map(str::trim);
    matches!(
        (fields.next(), fields.next()),
        (Some(a), Some(b)) if a.eq_ignore_ascii_case("TimeStamp") && b.eq_ignore_ascii_case("Sample No")
    )
}

fn column_description(format: FormatConfig) -> String {
    let separator = format!("{} ", format.delimiter);
    format!("{} {}", format.comment_marker, ALIGNED_COLUMNS.join(&separator))
}

/// Render an aligned log.
///
/// Header lines pass through unchanged except the column description, which
/// is rewritten for the eight-column layout.
pub fn render_aligned(log: &AlignedLog, format: FormatConfig) -> String {
    let d = format.delimiter;
    let mut out = String::new();

    for line in &log.header_lines {
        if is_column_description(line, format) {
            out.push_str(&column_description(format));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    for r in &log.records {
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
            r.timestamp_ms,
            r.sample_index,
            r.accel.x,
            r.accel.y,
            r.accel.z,
            r.gyro.x,
            r.gyro.y,
            r.gyro.z
        );
    }
    out
}

/// Writes `<output_dir>/<source file name>`, write-once unless replacing.
#[derive(Debug)]
pub struct AlignedFileWriter {
    name: String,
    output_dir: PathBuf,
    format: FormatConfig,
    mode: WriteMode,
    metrics: SinkMetrics,
}

impl AlignedFileWriter {
    pub fn new(output_dir: impl Into<PathBuf>, format: FormatConfig, mode: WriteMode) -> Self {
        Self {
            name: "aligned_file".to_string(),
            output_dir: output_dir.into(),
            format,
            mode,
            metrics: SinkMetrics::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Output path for a source file
    pub fn target_for(&self, source: &Path) -> Result<PathBuf> {
        let name = source.file_name().ok_or_else(|| {
            DispatcherError::io(
                source,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "source has no file name"),
            )
        })?;
        Ok(self.output_dir.join(name))
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn persist(&self, source: &Path, log: &AlignedLog) -> Result<SinkReceipt> {
        if log.records.is_empty() {
            return Err(DispatcherError::EmptyBatch {
                what: "aligned log",
            });
        }
        let target = self.target_for(source)?;
        let rendered = render_aligned(log, self.format);
        write_file(&target, rendered.as_bytes(), self.mode)?;

        debug!(
            sink = %self.name,
            source = %source.display(),
            target = %target.display(),
            records = log.records.len(),
            "aligned log written"
        );
        Ok(SinkReceipt {
            path: Some(target),
            records: log.records.len(),
            bytes: rendered.len(),
        })
    }
}

impl AlignedSink for AlignedFileWriter {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, source: &Path, log: &AlignedLog) -> Result<SinkReceipt> {
        match self.persist(source, log) {
            Ok(receipt) => {
                self.metrics.record_write(receipt.records, receipt.bytes);
                Ok(receipt)
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                error!(sink = %self.name, source = %source.display(), error = %e, "Write failed");
                Err(e)
            }
        }
    }
}
