//! SensorFilter - restrict a parsed log to one device and the two aligned
//! sensor types

use std::collections::BTreeMap;
use std::fmt::Write as _;

use contracts::{
    DeviceId, FormatConfig, ParseStats, ParsedLog, SampleIndex, SensorEvent, SensorStreams,
    SensorType,
};
use tracing::debug;

use crate::error::Result;
use crate::location::LocationResolver;

/// Result of filtering one log.
#[derive(Debug, Clone, Default)]
pub struct FilteredLog {
    /// Header lines of the source file, verbatim
    pub header_lines: Vec<String>,

    /// Retained events in file order
    pub retained: Vec<SensorEvent>,

    /// Per-type maps keyed by sample index (last write wins)
    pub streams: SensorStreams,

    /// Events dropped because they belong to another device
    pub dropped_other_device: usize,

    /// Events dropped because their sensor type is not aligned
    pub dropped_other_type: usize,

    /// Retained events replaced by a later event with the same sample index
    pub overwritten: usize,

    /// Parse counters of the source file
    pub stats: ParseStats,
}

impl FilteredLog {
    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// Render the filtered, still unaligned log in the input schema.
    pub fn render(&self, format: FormatConfig) -> String {
        let mut out = String::new();
        for line in &self.header_lines {
            out.push_str(line);
            out.push('\n');
        }
        for event in &self.retained {
            render_event(&mut out, event, format.delimiter);
            out.push('\n');
        }
        out
    }
}

fn render_event(out: &mut String, event: &SensorEvent, d: char) {
    // Writing into a String cannot fail
    let _ = write!(
        out,
        "{}{d}{}{d}{}{d}{}{d}{}{d}{}",
        event.timestamp_ms,
        event.sample_index,
        event.axes.x,
        event.axes.y,
        event.axes.z,
        event.sensor_type.code()
    );
    if let Some(id) = &event.sensor_id {
        let _ = write!(out, "{d}{id}");
    }
}

/// Device/type restriction applied before alignment.
#[derive(Debug, Clone)]
pub struct SensorFilter {
    resolver: Option<LocationResolver>,
}

impl SensorFilter {
    /// Keep only the device declared for `label`
    pub fn for_location(label: impl Into<String>) -> Self {
        Self {
            resolver: Some(LocationResolver::new(label)),
        }
    }

    /// Keep every device; only the sensor type restriction applies
    pub fn any_device() -> Self {
        Self { resolver: None }
    }

    pub fn location(&self) -> Option<&str> {
        self.resolver.as_ref().map(LocationResolver::label)
    }

    /// Filter a parsed log.
    ///
    /// Logs without a sensor id column are single-device: the location
    /// restriction is a no-op for them.
    ///
    /// # Errors
    /// `LocationNotFound` when the log carries device ids but its header does
    /// not declare the requested location.
    pub fn apply(&self, log: ParsedLog) -> Result<FilteredLog> {
        let device = match &self.resolver {
            Some(resolver) if log.has_device_ids() => Some(resolver.resolve(&log.header)?),
            Some(resolver) => {
                debug!(
                    location = resolver.label(),
                    "log has no sensor id column, treating as single device"
                );
                None
            }
            None => None,
        };

        let mut filtered = FilteredLog {
            header_lines: log.header_lines,
            stats: log.stats,
            streams: SensorStreams {
                device_id: device.clone(),
                ..Default::default()
            },
            ..Default::default()
        };

        for event in log.events {
            if !belongs_to(&event, device.as_ref()) {
                filtered.dropped_other_device += 1;
                continue;
            }
            let stream: &mut BTreeMap<SampleIndex, SensorEvent> = match event.sensor_type {
                SensorType::Accel => &mut filtered.streams.accel,
                SensorType::Gyro => &mut filtered.streams.gyro,
                SensorType::Other(_) => {
                    filtered.dropped_other_type += 1;
                    continue;
                }
            };
            if stream.insert(event.sample_index, event.clone()).is_some() {
                filtered.overwritten += 1;
            }
            filtered.retained.push(event);
        }

        Ok(filtered)
    }
}

fn belongs_to(event: &SensorEvent, device: Option<&DeviceId>) -> bool {
    match device {
        Some(id) => event.sensor_id.as_ref() == Some(id),
        None => true,
    }
}
