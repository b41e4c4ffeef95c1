//! Windower - fixed-length windows with a per-label stride.
//!
//! Each label's sub-series is windowed on its own; the rare positive class is
//! given a smaller stride so it yields overlapping windows. Output order is
//! ascending label, then ascending start offset.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use contracts::{
    ActivityLabel, ChannelRow, LabeledSeries, Window, WindowBatch, WindowingConfig, CHANNEL_COUNT,
};
use tracing::debug;

use crate::error::{Result, SyncError};

/// Number of windows of length `window_length` and stride `stride` that fit in
/// `len` samples. Partial windows are never counted.
pub fn window_count(len: usize, window_length: usize, stride: NonZeroUsize) -> usize {
    if window_length == 0 || len < window_length {
        return 0;
    }
    (len - window_length) / stride.get() + 1
}

/// Start offsets of every full window
pub fn window_starts(
    len: usize,
    window_length: usize,
    stride: NonZeroUsize,
) -> impl Iterator<Item = usize> {
    let count = window_count(len, window_length, stride);
    (0..count).map(move |i| i * stride.get())
}

/// Label -> stride mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StridePolicy {
    strides: BTreeMap<ActivityLabel, NonZeroUsize>,
}

impl StridePolicy {
    /// # Errors
    /// `InvalidStride` for any stride `<= 0`.
    pub fn new(strides: impl IntoIterator<Item = (ActivityLabel, i64)>) -> Result<Self> {
        let strides = strides
            .into_iter()
            .map(|(label, stride)| {
                usize::try_from(stride)
                    .ok()
                    .and_then(NonZeroUsize::new)
                    .map(|s| (label, s))
                    .ok_or(SyncError::InvalidStride { label, stride })
            })
            .collect::<Result<_>>()?;
        Ok(Self { strides })
    }

    /// Build from the configuration table, whose keys are label strings.
    ///
    /// # Errors
    /// `InvalidLabel` for a key that is not a label, `DuplicateLabel` when two
    /// keys (e.g. `1` and `01`) name the same label.
    pub fn from_config(strides: &BTreeMap<String, i64>) -> Result<Self> {
        let mut parsed: BTreeMap<ActivityLabel, i64> = BTreeMap::new();
        for (key, stride) in strides {
            let label = key
                .trim()
                .parse::<ActivityLabel>()
                .map_err(|_| SyncError::InvalidLabel { key: key.clone() })?;
            if parsed.insert(label, *stride).is_some() {
                return Err(SyncError::DuplicateLabel { label });
            }
        }
        Self::new(parsed)
    }

    pub fn stride_for(&self, label: ActivityLabel) -> Result<NonZeroUsize> {
        self.strides
            .get(&label)
            .copied()
            .ok_or(SyncError::MissingStride { label })
    }

    pub fn labels(&self) -> impl Iterator<Item = ActivityLabel> + '_ {
        self.strides.keys().copied()
    }
}

/// Segments labeled series into fixed-length windows.
#[derive(Debug, Clone)]
pub struct Windower {
    window_length: usize,
    policy: StridePolicy,
}

impl Windower {
    pub fn new(window_length: usize, policy: StridePolicy) -> Result<Self> {
        if window_length == 0 {
            return Err(SyncError::InvalidWindowLength(window_length));
        }
        Ok(Self {
            window_length,
            policy,
        })
    }

    pub fn from_config(config: &WindowingConfig) -> Result<Self> {
        if config.channels != CHANNEL_COUNT {
            return Err(SyncError::ChannelCountMismatch {
                expected: CHANNEL_COUNT,
                actual: config.channels,
            });
        }
        Self::new(
            config.window_length,
            StridePolicy::from_config(&config.strides)?,
        )
    }

    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn policy(&self) -> &StridePolicy {
        &self.policy
    }

    /// Window one contiguous single-label sub-series
    pub fn windows_for(&self, rows: &[ChannelRow], label: ActivityLabel) -> Result<Vec<Window>> {
        let stride = self.policy.stride_for(label)?;
        Ok(window_starts(rows.len(), self.window_length, stride)
            .map(|start| Window::from_rows(&rows[start..start + self.window_length], label))
            .collect())
    }

    /// Window a whole labeled series.
    ///
    /// The series is split by label (order preserved within each label), each
    /// part windowed independently, and the results concatenated in ascending
    /// label order.
    ///
    /// # Errors
    /// `MissingStride` when the series holds a label without a stride.
    pub fn windows(&self, series: &LabeledSeries) -> Result<WindowBatch> {
        let mut batch = WindowBatch::new(self.window_length);

        for (label, rows) in series.split_by_label() {
            let windows = self.windows_for(&rows, label)?;
            debug!(
                label,
                samples = rows.len(),
                windows = windows.len(),
                "windowed label sub-series"
            );
            observability::record_windows(label, windows.len());
            batch.windows.extend(windows);
        }

        Ok(batch)
    }
}
