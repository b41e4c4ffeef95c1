//! Window tensor export

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use contracts::{ActivityLabel, ChannelRow, WindowBatch, CHANNEL_ORDER};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::file::{write_file, WriteMode};
use crate::error::{DispatcherError, Result};

/// `[n, L, C]` tensor plus parallel labels, as handed to the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowTensor {
    pub shape: [usize; 3],
    pub channel_order: Vec<String>,
    /// Time-major: `windows[i][t][c]`
    pub windows: Vec<Vec<ChannelRow>>,
    pub labels: Vec<ActivityLabel>,
    pub label_counts: BTreeMap<ActivityLabel, usize>,
    pub created_at: DateTime<Utc>,
}

impl WindowTensor {
    pub fn from_batch(batch: &WindowBatch, created_at: DateTime<Utc>) -> Result<Self> {
        if batch.is_empty() {
            return Err(DispatcherError::EmptyBatch {
                what: "window batch",
            });
        }
        if let Some(bad) = batch.windows.iter().find(|w| w.len() != batch.window_length) {
            return Err(DispatcherError::ShapeMismatch {
                expected: batch.window_length,
                actual: bad.len(),
            });
        }

        Ok(Self {
            shape: batch.shape(),
            channel_order: CHANNEL_ORDER.iter().map(|c| c.to_string()).collect(),
            windows: batch.to_tensor(),
            labels: batch.labels(),
            label_counts: batch.label_counts(),
            created_at,
        })
    }

    /// Write as JSON, write-once unless `mode` replaces
    pub fn write_to(&self, path: &Path, mode: WriteMode) -> Result<usize> {
        let json = serde_json::to_vec(self)?;
        write_file(path, &json, mode)?;
        info!(
            path = %path.display(),
            windows = self.shape[0],
            window_length = self.shape[1],
            "window tensor written"
        );
        Ok(json.len())
    }
}
