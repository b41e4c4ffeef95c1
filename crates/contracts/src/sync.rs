//! AlignedRecord - StreamAligner output
//!
//! Synchronized accelerometer/gyroscope records and the per-type streams they
//! are built from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{Axes, DeviceId, SampleIndex, SensorEvent};

/// One synchronized sample.
///
/// Exists only for a `sample_index` present in both streams of the same
/// device. The timestamp comes from the accelerometer event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRecord {
    pub sample_index: SampleIndex,

    /// Accelerometer timestamp (canonical clock)
    pub timestamp_ms: i64,

    pub accel: Axes,

    pub gyro: Axes,
}

impl AlignedRecord {
    /// Channel values in tensor order: accel x/y/z, gyro x/y/z
    pub fn channels(&self) -> [f64; 6] {
        [
            self.accel.x,
            self.accel.y,
            self.accel.z,
            self.gyro.x,
            self.gyro.y,
            self.gyro.z,
        ]
    }
}

/// Per-type event maps restricted to one device.
///
/// Keyed by `sample_index`; a later event with the same index replaces the
/// earlier one (last write wins).
#[derive(Debug, Clone, Default)]
pub struct SensorStreams {
    /// Device the streams were restricted to; `None` for single-device logs
    pub device_id: Option<DeviceId>,

    pub accel: BTreeMap<SampleIndex, SensorEvent>,

    pub gyro: BTreeMap<SampleIndex, SensorEvent>,
}

impl SensorStreams {
    pub fn is_empty(&self) -> bool {
        self.accel.is_empty() && self.gyro.is_empty()
    }

    /// Whether both sensor types have at least one event
    pub fn has_both(&self) -> bool {
        !self.accel.is_empty() && !self.gyro.is_empty()
    }
}

/// Timestamps of both sensors for one common sample index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPair {
    pub sample_index: SampleIndex,
    pub accel_timestamp_ms: i64,
    pub gyro_timestamp_ms: i64,
}

impl SyncPair {
    /// Absolute clock divergence between the two sensors
    pub fn divergence_ms(&self) -> u64 {
        self.accel_timestamp_ms.abs_diff(self.gyro_timestamp_ms)
    }
}

/// Aligned file contents, ready to be written.
#[derive(Debug, Clone, Default)]
pub struct AlignedLog {
    /// Header lines carried over from the source file
    pub header_lines: Vec<String>,

    /// Device the records belong to
    pub device_id: Option<DeviceId>,

    /// Records in ascending sample order
    pub records: Vec<AlignedRecord>,
}
