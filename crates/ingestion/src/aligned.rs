//! Reader for aligned output files
//!
//! `timestamp; sampleIndex; ax; ay; az; gx; gy; gz`, header lines as in the
//! raw format.

use std::fs;
use std::path::Path;

use contracts::{AlignedLog, AlignedRecord, Axes, FormatConfig, ParseStats};
use tracing::{debug, trace};

use crate::error::{IngestionError, Result};

/// Fields in an aligned data line
pub const ALIGNED_FIELDS: usize = 8;

/// Parse an aligned log held in memory. Malformed rows are skipped and counted.
pub fn parse_aligned_str(content: &str, format: FormatConfig) -> (AlignedLog, ParseStats) {
    let mut log = AlignedLog::default();
    let mut stats = ParseStats::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = if idx == 0 {
            raw.trim_start_matches('\u{feff}')
        } else {
            raw
        };
        let line = line.trim_end_matches('\r');

        if line.starts_with(format.comment_marker) {
            stats.header_lines += 1;
            log.header_lines.push(line.to_string());
            continue;
        }
        if line.trim().is_empty() {
            continue;
        }

        match parse_aligned_line(line, format.delimiter) {
            Some(record) => {
                stats.records_parsed += 1;
                log.records.push(record);
            }
            None => {
                stats.records_skipped += 1;
                trace!(line = idx + 1, "skipping aligned line");
            }
        }
    }

    (log, stats)
}

/// Read an aligned file from disk
pub fn read_aligned(path: &Path, format: FormatConfig) -> Result<(AlignedLog, ParseStats)> {
    let content = fs::read_to_string(path).map_err(|source| IngestionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (log, stats) = parse_aligned_str(&content, format);
    debug!(
        file = %path.display(),
        records = stats.records_parsed,
        skipped = stats.records_skipped,
        "read aligned log"
    );
    Ok((log, stats))
}

fn parse_aligned_line(line: &str, delimiter: char) -> Option<AlignedRecord> {
    let fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    if fields.len() < ALIGNED_FIELDS {
        return None;
    }
    let mut axes = [0.0f64; 6];
    for (slot, raw) in axes.iter_mut().zip(&fields[2..ALIGNED_FIELDS]) {
        *slot = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
    }
    Some(AlignedRecord {
        timestamp_ms: fields[0].parse().ok()?,
        sample_index: fields[1].parse().ok()?,
        accel: Axes::new(axes[0], axes[1], axes[2]),
        gyro: Axes::new(axes[3], axes[4], axes[5]),
    })
}
