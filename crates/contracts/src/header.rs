//! HeaderMetadata - body location to device id associations

use serde::{Deserialize, Serialize};

use crate::DeviceId;

/// One `hardwareAddress; deviceId; LOCATION; model` header association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    /// Body location label, e.g. `WAIST`, `RIGHTPOCKET`
    pub label: String,

    /// Id used in the data lines' sensor id column
    pub device_id: DeviceId,

    /// MAC-style hardware address (first field)
    pub hardware_address: String,

    /// Device model, when declared
    pub model: Option<String>,
}

/// Location associations declared in a file header, in declaration order.
///
/// A label declared twice keeps its first association.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMetadata {
    entries: Vec<LocationEntry>,
}

impl HeaderMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an association. Returns `false` if the label was already declared.
    pub fn insert(&mut self, entry: LocationEntry) -> bool {
        if self.get(&entry.label).is_some() {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Exact, case-sensitive lookup by label
    pub fn get(&self, label: &str) -> Option<&LocationEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.label.as_str())
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(label: &str, id: &str) -> LocationEntry {
        LocationEntry {
            label: label.to_string(),
            device_id: id.into(),
            hardware_address: "C4:BE:84:71:A5:02".to_string(),
            model: Some("SensorTag".to_string()),
        }
    }

    #[test]
    fn test_first_declaration_wins() {
        let mut header = HeaderMetadata::new();
        assert!(header.insert(entry("WAIST", "2")));
        assert!(!header.insert(entry("WAIST", "9")));

        assert_eq!(header.len(), 1);
        assert_eq!(header.get("WAIST").unwrap().device_id, "2");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut header = HeaderMetadata::new();
        header.insert(entry("RIGHTPOCKET", "0"));

        assert!(header.get("RIGHTPOCKET").is_some());
        assert!(header.get("rightpocket").is_none());
        assert!(header.get("RIGHT").is_none());
        assert_eq!(header.labels().collect::<Vec<_>>(), vec!["RIGHTPOCKET"]);
    }
}
