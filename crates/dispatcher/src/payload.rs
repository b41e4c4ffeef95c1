//! Payloads exchanged with the model-serving and storage collaborators

use chrono::{DateTime, Utc};
use contracts::{ChannelRow, Window};
use serde::{Deserialize, Serialize};

use crate::error::{DispatcherError, Result};

/// Probability at or above which a window is reported as a fall
pub const FALL_THRESHOLD: f64 = 0.5;

/// Whether a model probability crosses the fall threshold
pub fn is_fall(probability: f64) -> bool {
    probability >= FALL_THRESHOLD
}

/// A single window encoded as the `[1, L, C]` array the model endpoint accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InferenceRequest {
    batch: Vec<Vec<ChannelRow>>,
}

impl InferenceRequest {
    /// # Errors
    /// `ShapeMismatch` if the window is not exactly `window_length` long.
    pub fn from_window(window: &Window, window_length: usize) -> Result<Self> {
        if window.len() != window_length {
            return Err(DispatcherError::ShapeMismatch {
                expected: window_length,
                actual: window.len(),
            });
        }
        Ok(Self {
            batch: vec![window.rows()],
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        let len = self.batch.first().map_or(0, Vec::len);
        [self.batch.len(), len, contracts::CHANNEL_COUNT]
    }

    pub fn input(&self) -> &[Vec<ChannelRow>] {
        &self.batch
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Stored record of one inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub timestamp: DateTime<Utc>,
    pub input: Vec<Vec<ChannelRow>>,
    pub prediction: f64,
}

impl PredictionRecord {
    /// The timestamp is injected so records are reproducible in tests
    pub fn new(request: &InferenceRequest, prediction: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            input: request.batch.clone(),
            prediction,
        }
    }

    pub fn is_fall(&self) -> bool {
        is_fall(self.prediction)
    }

    /// Object key under which the record is stored
    pub fn object_key(&self, prefix: &str) -> String {
        format!(
            "{}/{}.json",
            prefix.trim_end_matches('/'),
            self.timestamp.format("%Y-%m-%d_%H-%M-%S-%6f")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{CHANNEL_COUNT, FALL};

    fn window(len: usize) -> Window {
        let rows: Vec<ChannelRow> = (0..len).map(|t| [t as f32; CHANNEL_COUNT]).collect();
        Window::from_rows(&rows, FALL)
    }

    fn at() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-05-01T12:30:45.123456Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_request_is_a_bare_nested_array() {
        let request = InferenceRequest::from_window(&window(2), 2).unwrap();
        assert_eq!(request.shape(), [1, 2, 6]);
        assert_eq!(
            request.to_json().unwrap(),
            "[[[0.0,0.0,0.0,0.0,0.0,0.0],[1.0,1.0,1.0,1.0,1.0,1.0]]]"
        );
    }

    #[test]
    fn test_request_rejects_wrong_length() {
        let err = InferenceRequest::from_window(&window(3), 200).unwrap_err();
        assert!(matches!(
            err,
            DispatcherError::ShapeMismatch {
                expected: 200,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(is_fall(0.5));
        assert!(is_fall(0.93));
        assert!(!is_fall(0.4999));
    }

    #[test]
    fn test_prediction_record() {
        let request = InferenceRequest::from_window(&window(1), 1).unwrap();
        let record = PredictionRecord::new(&request, 0.8, at());

        assert!(record.is_fall());
        assert_eq!(
            record.object_key("requests/"),
            "requests/2024-05-01_12-30-45-123456.json"
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["prediction"], 0.8);
        assert_eq!(json["input"][0][0][0], 0.0);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-05-01T12:30:45"));
    }
}
