//! Labeled training series from a headered CSV
//!
//! One row per aligned sample: six channel columns plus an activity label
//! column, selected by name.

use std::path::Path;

use contracts::{ActivityLabel, AlignedRecord, Axes, LabeledSeries, WindowingConfig};
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::{IngestionError, Result};

/// Column names to read, in tensor channel order
#[derive(Debug, Clone)]
pub struct LabeledColumns {
    pub channels: [String; 6],
    pub label: String,
}

impl LabeledColumns {
    pub fn from_config(config: &WindowingConfig) -> Option<Self> {
        let channels: [String; 6] = config.channel_columns.clone().try_into().ok()?;
        Some(Self {
            channels,
            label: config.label_column.clone(),
        })
    }
}

/// Load a labeled series. Rows keep file order; `sample_index` is the row
/// number and timestamps are zero since the format has no clock column.
pub fn load_labeled_csv(path: &Path, columns: &LabeledColumns) -> Result<LabeledSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|source| IngestionError::Csv {
            path: path.to_path_buf(),
            source,
        })?;

    let headers = reader
        .headers()
        .map_err(|source| IngestionError::Csv {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let position = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IngestionError::MissingColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };

    let mut channel_idx = [0usize; 6];
    for (slot, name) in channel_idx.iter_mut().zip(&columns.channels) {
        *slot = position(name)?;
    }
    let label_idx = position(&columns.label)?;

    let mut series = LabeledSeries::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|source| IngestionError::Csv {
            path: path.to_path_buf(),
            source,
        })?;
        let value = |c: usize| channel_value(&record, row + 1, channel_idx[c], &columns.channels[c]);

        let accel = Axes::new(value(0)?, value(1)?, value(2)?);
        let gyro = Axes::new(value(3)?, value(4)?, value(5)?);
        let label = label_value(&record, row + 1, label_idx, &columns.label)?;

        series.push(
            AlignedRecord {
                sample_index: row as i64,
                timestamp_ms: 0,
                accel,
                gyro,
            },
            label,
        );
    }

    debug!(file = %path.display(), rows = series.len(), "loaded labeled series");
    Ok(series)
}

fn cell<'a>(record: &'a StringRecord, row: usize, idx: usize, column: &str) -> Result<&'a str> {
    record.get(idx).ok_or_else(|| IngestionError::InvalidValue {
        row,
        column: column.to_string(),
        value: String::new(),
    })
}

fn channel_value(record: &StringRecord, row: usize, idx: usize, column: &str) -> Result<f64> {
    let raw = cell(record, row, idx, column)?;
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IngestionError::InvalidValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

/// Accepts `1` as well as `1.0`
fn label_value(
    record: &StringRecord,
    row: usize,
    idx: usize,
    column: &str,
) -> Result<ActivityLabel> {
    let raw = cell(record, row, idx, column)?;
    raw.parse::<ActivityLabel>()
        .ok()
        .or_else(|| {
            let v = raw.parse::<f64>().ok()?;
            (v.fract() == 0.0 && (0.0..=f64::from(ActivityLabel::MAX)).contains(&v))
                .then_some(v as ActivityLabel)
        })
        .ok_or_else(|| IngestionError::InvalidValue {
            row,
            column: column.to_string(),
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FALL, NON_FALL};
    use std::io::Write;

    fn columns() -> LabeledColumns {
        LabeledColumns::from_config(&WindowingConfig::default()).unwrap()
    }

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_columns_selected_by_name() {
        let file = csv_file(
            "activity,rp_gyro_z,rp_acc_x,rp_acc_y,rp_acc_z,rp_gyro_x,rp_gyro_y,extra\n\
             0,6,1,2,3,4,5,x\n\
             1.0, 16 ,11,12,13,14,15,y\n",
        );
        let series = load_labeled_csv(file.path(), &columns()).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.labels(), &[NON_FALL, FALL]);
        assert_eq!(
            series.records()[0].channels(),
            [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
        );
        assert_eq!(series.records()[1].gyro.z, 16.0);
        assert_eq!(series.records()[1].sample_index, 1);
    }

    #[test]
    fn test_missing_column() {
        let file = csv_file("rp_acc_x,activity\n1,0\n");
        let err = load_labeled_csv(file.path(), &columns()).unwrap_err();
        assert!(matches!(err, IngestionError::MissingColumn { column, .. } if column == "rp_acc_y"));
    }

    #[test]
    fn test_bad_label() {
        let file = csv_file(
            "rp_acc_x,rp_acc_y,rp_acc_z,rp_gyro_x,rp_gyro_y,rp_gyro_z,activity\n1,2,3,4,5,6,0.5\n",
        );
        let err = load_labeled_csv(file.path(), &columns()).unwrap_err();
        assert!(matches!(err, IngestionError::InvalidValue { row: 1, .. }));
    }

    #[test]
    fn test_config_with_wrong_column_count() {
        let config = WindowingConfig {
            channel_columns: vec!["a".to_string()],
            ..Default::default()
        };
        assert!(LabeledColumns::from_config(&config).is_none());
    }
}
