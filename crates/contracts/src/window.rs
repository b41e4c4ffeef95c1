//! Window - Windower output
//!
//! Fixed-length, six-channel windows cut from a labeled aligned series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::AlignedRecord;

/// Number of channels per window (single-device variant)
pub const CHANNEL_COUNT: usize = 6;

/// Fixed channel order shared by windowing and every tensor consumer
pub const CHANNEL_ORDER: [&str; CHANNEL_COUNT] =
    ["accel_x", "accel_y", "accel_z", "gyro_x", "gyro_y", "gyro_z"];

/// Window length expected by the classifier
pub const DEFAULT_WINDOW_LENGTH: usize = 200;

/// Activity label attached to every sample
pub type ActivityLabel = u8;

/// Everything that is not a fall
pub const NON_FALL: ActivityLabel = 0;

/// Fall event (rare class)
pub const FALL: ActivityLabel = 1;

/// One row of channel values in [`CHANNEL_ORDER`]
pub type ChannelRow = [f32; CHANNEL_COUNT];

/// Aligned records with a per-record activity label, ordered by sample index.
#[derive(Debug, Clone, Default)]
pub struct LabeledSeries {
    records: Vec<AlignedRecord>,
    labels: Vec<ActivityLabel>,
}

impl LabeledSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label every record of an aligned file with the same activity
    pub fn uniform(records: Vec<AlignedRecord>, label: ActivityLabel) -> Self {
        let labels = vec![label; records.len()];
        Self { records, labels }
    }

    pub fn push(&mut self, record: AlignedRecord, label: ActivityLabel) {
        self.records.push(record);
        self.labels.push(label);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AlignedRecord] {
        &self.records
    }

    pub fn labels(&self) -> &[ActivityLabel] {
        &self.labels
    }

    /// Stable partition into one contiguous sub-series per label.
    ///
    /// Rows keep their relative order inside each sub-series. Labels iterate in
    /// ascending order.
    pub fn split_by_label(&self) -> BTreeMap<ActivityLabel, Vec<ChannelRow>> {
        let mut split: BTreeMap<ActivityLabel, Vec<ChannelRow>> = BTreeMap::new();
        for (record, label) in self.records.iter().zip(&self.labels) {
            split.entry(*label).or_default().push(to_row(record));
        }
        split
    }
}

fn to_row(record: &AlignedRecord) -> ChannelRow {
    record.channels().map(|v| v as f32)
}

/// A fixed-length window.
///
/// `channels[c]` holds `len()` consecutive values of channel `c`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub channels: [Vec<f32>; CHANNEL_COUNT],
    pub label: ActivityLabel,
}

impl Window {
    /// Build a window from consecutive rows
    pub fn from_rows(rows: &[ChannelRow], label: ActivityLabel) -> Self {
        let channels = std::array::from_fn(|c| rows.iter().map(|row| row[c]).collect());
        Self { channels, label }
    }

    /// Window length (number of time steps)
    pub fn len(&self) -> usize {
        self.channels[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time-major view: `len()` rows of [`CHANNEL_COUNT`] values
    pub fn rows(&self) -> Vec<ChannelRow> {
        (0..self.len())
            .map(|t| std::array::from_fn(|c| self.channels[c][t]))
            .collect()
    }
}

/// All windows of one run, label-ordered and deterministic.
#[derive(Debug, Clone, Default)]
pub struct WindowBatch {
    pub window_length: usize,
    pub windows: Vec<Window>,
}

impl WindowBatch {
    pub fn new(window_length: usize) -> Self {
        Self {
            window_length,
            windows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Tensor shape `[num_windows, L, C]`
    pub fn shape(&self) -> [usize; 3] {
        [self.windows.len(), self.window_length, CHANNEL_COUNT]
    }

    /// Label vector parallel to the windows
    pub fn labels(&self) -> Vec<ActivityLabel> {
        self.windows.iter().map(|w| w.label).collect()
    }

    pub fn label_counts(&self) -> BTreeMap<ActivityLabel, usize> {
        let mut counts = BTreeMap::new();
        for window in &self.windows {
            *counts.entry(window.label).or_insert(0) += 1;
        }
        counts
    }

    /// Time-major tensor `[num_windows][L][C]`
    pub fn to_tensor(&self) -> Vec<Vec<ChannelRow>> {
        self.windows.iter().map(Window::rows).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Axes;

    fn record(i: i64) -> AlignedRecord {
        let v = i as f64;
        AlignedRecord {
            sample_index: i,
            timestamp_ms: i * 10,
            accel: Axes::new(v, v + 0.1, v + 0.2),
            gyro: Axes::new(-v, -v - 0.1, -v - 0.2),
        }
    }

    #[test]
    fn test_split_is_stable() {
        let mut series = LabeledSeries::new();
        series.push(record(0), NON_FALL);
        series.push(record(1), FALL);
        series.push(record(2), NON_FALL);
        series.push(record(3), FALL);

        let split = series.split_by_label();
        assert_eq!(split.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(split[&NON_FALL][0][0], 0.0);
        assert_eq!(split[&NON_FALL][1][0], 2.0);
        assert_eq!(split[&FALL][0][0], 1.0);
        assert_eq!(split[&FALL][1][0], 3.0);
    }

    #[test]
    fn test_window_rows_roundtrip_channel_order() {
        let rows: Vec<ChannelRow> = (0..3)
            .map(|t| std::array::from_fn(|c| (t * 10 + c) as f32))
            .collect();
        let window = Window::from_rows(&rows, FALL);

        assert_eq!(window.len(), 3);
        assert_eq!(window.channels[4], vec![4.0, 14.0, 24.0]);
        assert_eq!(window.rows(), rows);
    }

    #[test]
    fn test_batch_shape_and_counts() {
        let rows = vec![[0.0f32; CHANNEL_COUNT]; 4];
        let mut batch = WindowBatch::new(4);
        batch.windows.push(Window::from_rows(&rows, NON_FALL));
        batch.windows.push(Window::from_rows(&rows, NON_FALL));
        batch.windows.push(Window::from_rows(&rows, FALL));

        assert_eq!(batch.shape(), [3, 4, 6]);
        assert_eq!(batch.labels(), vec![0, 0, 1]);
        assert_eq!(batch.label_counts()[&NON_FALL], 2);
        assert_eq!(batch.to_tensor()[2].len(), 4);
    }
}
