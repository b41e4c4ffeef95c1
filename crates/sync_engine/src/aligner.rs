//! StreamAligner - intersect accelerometer and gyroscope streams by sample index.

use contracts::{AlignedLog, AlignedRecord, SensorEvent, SensorStreams};
use tracing::debug;

use crate::error::{Result, SyncError};

/// Event pairs sharing a sample index, ascending.
pub(crate) fn common_samples(
    streams: &SensorStreams,
) -> impl Iterator<Item = (&SensorEvent, &SensorEvent)> + '_ {
    streams
        .accel
        .iter()
        .filter_map(|(index, accel)| streams.gyro.get(index).map(|gyro| (accel, gyro)))
}

/// Merges two single-type streams into synchronized records.
///
/// A record is produced only for indices present in both streams. The
/// accelerometer timestamp is canonical; the gyroscope one is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamAligner;

impl StreamAligner {
    pub fn new() -> Self {
        Self
    }

    /// Align one device's streams.
    ///
    /// # Errors
    /// `NoAlignableData` when no sample index appears in both streams. An empty
    /// result is never returned as success.
    pub fn align(&self, streams: &SensorStreams) -> Result<Vec<AlignedRecord>> {
        let records: Vec<AlignedRecord> = common_samples(streams)
            .map(|(accel, gyro)| AlignedRecord {
                sample_index: accel.sample_index,
                timestamp_ms: accel.timestamp_ms,
                accel: accel.axes,
                gyro: gyro.axes,
            })
            .collect();

        if records.is_empty() {
            return Err(SyncError::NoAlignableData {
                accel: streams.accel.len(),
                gyro: streams.gyro.len(),
            });
        }

        debug!(
            accel = streams.accel.len(),
            gyro = streams.gyro.len(),
            aligned = records.len(),
            "aligned streams"
        );
        Ok(records)
    }

    /// Align and attach the source header, ready for writing
    pub fn align_log(
        &self,
        header_lines: Vec<String>,
        streams: &SensorStreams,
    ) -> Result<AlignedLog> {
        let records = self.align(streams)?;
        Ok(AlignedLog {
            header_lines,
            device_id: streams.device_id.clone(),
            records,
        })
    }
}
