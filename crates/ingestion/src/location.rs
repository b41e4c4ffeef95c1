//! LocationResolver - body location label to device id

use contracts::{DeviceId, HeaderMetadata};

use crate::error::{IngestionError, Result};

/// Resolves the device worn at one body location.
///
/// The label is chosen per call site; lookup is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationResolver {
    label: String,
}

impl LocationResolver {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Device id declared for this label.
    ///
    /// # Errors
    /// [`IngestionError::LocationNotFound`] when the header never declares the
    /// label. Callers skip the whole file in that case.
    pub fn resolve(&self, header: &HeaderMetadata) -> Result<DeviceId> {
        header
            .get(&self.label)
            .map(|entry| entry.device_id.clone())
            .ok_or_else(|| IngestionError::location_not_found(&self.label))
    }
}
