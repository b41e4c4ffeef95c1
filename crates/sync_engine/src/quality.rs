//! SyncQualityChecker - corpus-level accelerometer/gyroscope clock audit
//!
//! Uses the same index intersection as the aligner but keeps both
//! timestamps. Purely advisory: nothing is mutated.

use std::fmt;

use contracts::{SensorStreams, SyncPair};
use observability::{RunningStats, StatsSummary};
use serde::Serialize;

use crate::aligner::common_samples;

/// Timestamp pairs for every common sample index, ascending.
pub fn sync_pairs(streams: &SensorStreams) -> Vec<SyncPair> {
    common_samples(streams)
        .map(|(accel, gyro)| SyncPair {
            sample_index: accel.sample_index,
            accel_timestamp_ms: accel.timestamp_ms,
            gyro_timestamp_ms: gyro.timestamp_ms,
        })
        .collect()
}

/// Mergeable divergence accumulator.
///
/// Every field is a sum or a commutative statistic, so per-worker checkers can
/// be merged in any order.
#[derive(Debug, Clone, Default)]
pub struct SyncQualityChecker {
    files_checked: u64,
    files_ignored: u64,
    perfectly_synced: u64,
    divergence: RunningStats,
}

impl SyncQualityChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audit one file's streams.
    ///
    /// A file lacking either sensor type is ignored and not counted as
    /// checked. Returns whether the file was counted.
    pub fn check(&mut self, streams: &SensorStreams) -> bool {
        if !streams.has_both() {
            self.files_ignored += 1;
            return false;
        }

        self.files_checked += 1;
        for pair in sync_pairs(streams) {
            let divergence = pair.divergence_ms();
            if divergence == 0 {
                self.perfectly_synced += 1;
            }
            observability::record_sync_divergence_ms(divergence);
            self.divergence.push(divergence as f64);
        }
        true
    }

    /// Fold another checker's totals into this one
    pub fn merge(&mut self, other: &SyncQualityChecker) {
        self.files_checked += other.files_checked;
        self.files_ignored += other.files_ignored;
        self.perfectly_synced += other.perfectly_synced;
        self.divergence.merge(&other.divergence);
    }

    pub fn files_checked(&self) -> u64 {
        self.files_checked
    }

    pub fn report(&self) -> SyncReport {
        let pairs = self.divergence.count();
        SyncReport {
            files_checked: self.files_checked,
            files_ignored: self.files_ignored,
            pairs,
            divergence_ms: self.divergence.summary(),
            perfectly_synced: self.perfectly_synced,
            perfect_fraction: if pairs > 0 {
                self.perfectly_synced as f64 / pairs as f64
            } else {
                0.0
            },
        }
    }
}

/// Aggregate divergence statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncReport {
    /// Files with both accelerometer and gyroscope events
    pub files_checked: u64,
    /// Files lacking one of the two sensor types
    pub files_ignored: u64,
    /// Matching sample pairs across the corpus
    pub pairs: u64,
    /// |accel - gyro| over all pairs, in milliseconds
    pub divergence_ms: StatsSummary,
    /// Pairs with zero divergence
    pub perfectly_synced: u64,
    /// `perfectly_synced / pairs`, 0 when there are no pairs
    pub perfect_fraction: f64,
}

impl SyncReport {
    pub fn has_pairs(&self) -> bool {
        self.pairs > 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Checked {} files.", self.files_checked)?;
        if !self.has_pairs() {
            return writeln!(f, "No common samples found between Accel and Gyro.");
        }
        writeln!(f, "Total matching samples: {}", self.pairs)?;
        writeln!(
            f,
            "Average timestamp difference: {:.2} ms",
            self.divergence_ms.mean
        )?;
        writeln!(f, "Max timestamp difference: {} ms", self.divergence_ms.max)?;
        writeln!(f, "Min timestamp difference: {} ms", self.divergence_ms.min)?;
        writeln!(
            f,
            "Perfectly synced samples (0ms diff): {} ({:.2}%)",
            self.perfectly_synced,
            self.perfect_fraction * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Axes, SensorEvent, SensorType};
    use rand::Rng;

    fn event(index: i64, ts: i64, sensor_type: SensorType) -> SensorEvent {
        SensorEvent {
            timestamp_ms: ts,
            sample_index: index,
            axes: Axes::default(),
            sensor_type,
            sensor_id: None,
        }
    }

    fn streams(accel: &[(i64, i64)], gyro: &[(i64, i64)]) -> SensorStreams {
        let mut streams = SensorStreams::default();
        for &(i, ts) in accel {
            streams.accel.insert(i, event(i, ts, SensorType::Accel));
        }
        for &(i, ts) in gyro {
            streams.gyro.insert(i, event(i, ts, SensorType::Gyro));
        }
        streams
    }

    #[test]
    fn test_pairs_keep_both_timestamps() {
        let pairs = sync_pairs(&streams(&[(1, 100), (2, 110)], &[(2, 113), (3, 120)]));
        assert_eq!(
            pairs,
            vec![SyncPair {
                sample_index: 2,
                accel_timestamp_ms: 110,
                gyro_timestamp_ms: 113,
            }]
        );
    }

    #[test]
    fn test_report_aggregates() {
        let mut checker = SyncQualityChecker::new();
        assert!(checker.check(&streams(
            &[(1, 100), (2, 110), (3, 120)],
            &[(1, 100), (2, 115), (3, 110)],
        )));

        let report = checker.report();
        assert_eq!(report.files_checked, 1);
        assert_eq!(report.pairs, 3);
        assert_eq!(report.divergence_ms.min, 0.0);
        assert_eq!(report.divergence_ms.max, 10.0);
        assert!((report.divergence_ms.mean - 5.0).abs() < 1e-10);
        assert_eq!(report.perfectly_synced, 1);
        assert!((report.perfect_fraction - 1.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_single_type_file_not_counted() {
        let mut checker = SyncQualityChecker::new();
        assert!(!checker.check(&streams(&[(1, 100)], &[])));
        let report = checker.report();
        assert_eq!(report.files_checked, 0);
        assert_eq!(report.files_ignored, 1);
        assert!(!report.has_pairs());
        assert_eq!(report.perfect_fraction, 0.0);
        assert!(report.to_string().contains("No common samples"));
    }

    #[test]
    fn test_disjoint_file_counts_without_pairs() {
        let mut checker = SyncQualityChecker::new();
        assert!(checker.check(&streams(&[(1, 100)], &[(2, 100)])));
        assert_eq!(checker.report().files_checked, 1);
        assert_eq!(checker.report().pairs, 0);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = streams(&[(1, 0), (2, 10)], &[(1, 4), (2, 10)]);
        let b = streams(&[(5, 50)], &[(5, 58)]);

        let mut whole = SyncQualityChecker::new();
        whole.check(&a);
        whole.check(&b);

        let mut left = SyncQualityChecker::new();
        left.check(&b);
        let mut right = SyncQualityChecker::new();
        right.check(&a);
        left.merge(&right);

        let (x, y) = (whole.report(), left.report());
        assert_eq!(x.pairs, y.pairs);
        assert_eq!(x.perfectly_synced, y.perfectly_synced);
        assert_eq!(x.divergence_ms.min, y.divergence_ms.min);
        assert_eq!(x.divergence_ms.max, y.divergence_ms.max);
        assert!((x.divergence_ms.mean - y.divergence_ms.mean).abs() < 1e-10);
    }

    #[test]
    fn test_min_mean_max_ordering_random() {
        let mut rng = rand::rng();
        let mut checker = SyncQualityChecker::new();
        for _ in 0..20 {
            let accel: Vec<(i64, i64)> = (0..30).map(|i| (i, rng.random_range(0..1000))).collect();
            let gyro: Vec<(i64, i64)> = (0..30).map(|i| (i, rng.random_range(0..1000))).collect();
            checker.check(&streams(&accel, &gyro));
        }

        let summary = checker.report().divergence_ms;
        assert!(summary.min >= 0.0);
        assert!(summary.min <= summary.mean);
        assert!(summary.mean <= summary.max);
    }

    #[test]
    fn test_report_serializes() {
        let mut checker = SyncQualityChecker::new();
        checker.check(&streams(&[(1, 10)], &[(1, 10)]));
        let json = serde_json::to_value(checker.report()).unwrap();
        assert_eq!(json["files_checked"], 1);
        assert_eq!(json["perfect_fraction"], 1.0);
    }
}
