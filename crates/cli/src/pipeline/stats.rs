//! Batch statistics.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

use super::{BatchReport, SkipKind};

/// What one successfully processed file produced
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileStats {
    pub rows_parsed: u64,
    pub rows_skipped: u64,
    pub records_aligned: u64,
    /// Aligned file written, `None` for a dry run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Filtered log written, if requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filtered_output: Option<PathBuf>,
}

/// Statistics from an `align` batch
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchStats {
    /// Files discovered
    pub files_total: usize,

    /// Files parsed, filtered and aligned
    pub processed: usize,

    /// Aligned files written
    pub written: usize,

    /// Skipped files by reason
    pub skipped: BTreeMap<SkipKind, usize>,

    /// Data rows parsed over processed files
    pub rows_parsed: u64,

    /// Malformed data rows skipped over processed files
    pub rows_skipped: u64,

    /// Aligned records produced
    pub records_aligned: u64,

    /// Stopped early by Ctrl+C
    pub interrupted: bool,

    #[serde(rename = "duration_secs", serialize_with = "as_secs")]
    pub duration: Duration,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl BatchStats {
    pub fn from_report(files_total: usize, report: &BatchReport<FileStats>) -> Self {
        let mut stats = Self {
            files_total,
            skipped: report.skipped_by_kind(),
            interrupted: report.interrupted,
            duration: report.duration,
            ..Default::default()
        };
        for file in report.done() {
            stats.processed += 1;
            stats.written += usize::from(file.output.is_some());
            stats.rows_parsed += file.rows_parsed;
            stats.rows_skipped += file.rows_skipped;
            stats.records_aligned += file.records_aligned;
        }
        stats
    }

    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    /// Aligned records per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_aligned as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Alignment Statistics                      ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Files");
        println!("   ├─ Discovered: {}", self.files_total);
        println!("   ├─ Processed: {}", self.processed);
        println!("   ├─ Written: {}", self.written);
        println!("   └─ Skipped: {}", self.skipped_total());

        println!("\n📈 Rows");
        println!("   ├─ Parsed: {}", self.rows_parsed);
        println!("   ├─ Malformed (skipped): {}", self.rows_skipped);
        println!("   ├─ Aligned records: {}", self.records_aligned);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   └─ Records/s: {:.0}", self.throughput());

        if !self.skipped.is_empty() {
            println!("\n⚠️  Skipped Files");
            let last = self.skipped.len() - 1;
            for (i, (kind, count)) in self.skipped.iter().enumerate() {
                let prefix = if i == last { "└─" } else { "├─" };
                println!("   {} {}: {}", prefix, kind.as_str(), count);
            }
        }

        if self.interrupted {
            println!("\n⏹  Interrupted before all files were processed");
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FileOutcome, SkipReason};

    fn report() -> BatchReport<FileStats> {
        let done = |records: u64, written: bool| FileOutcome::Done(FileStats {
            rows_parsed: records * 2,
            rows_skipped: 1,
            records_aligned: records,
            output: written.then(|| PathBuf::from("out/x.csv")),
            filtered_output: None,
        });
        BatchReport {
            outcomes: vec![
                (PathBuf::from("a.csv"), done(10, true)),
                (
                    PathBuf::from("b.csv"),
                    FileOutcome::Skipped {
                        reason: SkipReason::new(SkipKind::LocationNotFound, "missing"),
                    },
                ),
                (PathBuf::from("c.csv"), done(5, false)),
            ],
            interrupted: false,
            duration: Duration::from_millis(500),
        }
    }

    #[test]
    fn test_from_report() {
        let stats = BatchStats::from_report(3, &report());
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.written, 1);
        assert_eq!(stats.skipped_total(), 1);
        assert_eq!(stats.rows_parsed, 30);
        assert_eq!(stats.rows_skipped, 2);
        assert_eq!(stats.records_aligned, 15);
        assert!((stats.throughput() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(BatchStats::from_report(3, &report())).unwrap();
        assert_eq!(json["skipped"]["location_not_found"], 1);
        assert_eq!(json["duration_secs"], 0.5);
        assert_eq!(json["written"], 1);
    }
}
