//! SensorEvent - EventParser output
//!
//! One event is one physical sample from one sensor axis-triplet on one device.

use serde::{Deserialize, Serialize};

use crate::{DeviceId, HeaderMetadata};

/// Sensor type column of a data line.
///
/// Only accelerometer (`0`) and gyroscope (`1`) take part in alignment.
/// Other codes (magnetometer etc.) are parsed so the filter can account for
/// them, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorType {
    Accel,
    Gyro,
    Other(u8),
}

impl SensorType {
    /// Map the numeric code used in log files.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::Accel,
            1 => Self::Gyro,
            other => Self::Other(other),
        }
    }

    /// Numeric code used in log files.
    pub fn code(self) -> u8 {
        match self {
            Self::Accel => 0,
            Self::Gyro => 1,
            Self::Other(code) => code,
        }
    }
}

/// Axis triplet
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Axes {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Per-sensor sample counter, the alignment key. Signed: loggers may emit
/// negative counters and those rows are kept.
pub type SampleIndex = i64;

/// A single parsed data line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorEvent {
    /// Logger timestamp in milliseconds
    pub timestamp_ms: i64,

    /// Per-sensor sample counter (alignment key)
    pub sample_index: SampleIndex,

    /// Measured triplet
    pub axes: Axes,

    /// Sensor type column
    pub sensor_type: SensorType,

    /// Device id column; `None` for single-device files without the column
    pub sensor_id: Option<DeviceId>,
}

/// Per-file parse counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// Data lines that produced an event
    pub records_parsed: u64,

    /// Data lines dropped as malformed
    pub records_skipped: u64,

    /// Header (comment) lines seen
    pub header_lines: u64,
}

impl ParseStats {
    /// Combine counters from another file
    pub fn merge(&mut self, other: &ParseStats) {
        self.records_parsed += other.records_parsed;
        self.records_skipped += other.records_skipped;
        self.header_lines += other.header_lines;
    }
}

/// Complete output of parsing one log file.
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    /// Location -> device associations found in the header
    pub header: HeaderMetadata,

    /// Every header line in file order, verbatim (line ending stripped)
    pub header_lines: Vec<String>,

    /// Events in file order
    pub events: Vec<SensorEvent>,

    /// Parse counters
    pub stats: ParseStats,
}

impl ParsedLog {
    /// Whether any event carries a device id column.
    ///
    /// Logs without the column come from a single device; location filtering
    /// is a no-op for them.
    pub fn has_device_ids(&self) -> bool {
        self.events.iter().any(|e| e.sensor_id.is_some())
    }
}
