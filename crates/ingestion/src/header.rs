//! Header line parsing
//!
//! Location association lines look like
//! `%C4:BE:84:71:A5:02; 2; WAIST; SensorTag`: hardware address, the device id
//! used in data lines, the body location label and an optional model.

use contracts::{DeviceId, LocationEntry};

/// Try to read a location association from a header line body
/// (comment marker already stripped).
pub(crate) fn parse_location_line(body: &str, delimiter: char) -> Option<LocationEntry> {
    let fields: Vec<&str> = body.split(delimiter).map(str::trim).collect();
    if fields.len() < 3 {
        return None;
    }

    let (address, device_id, label) = (fields[0], fields[1], fields[2]);
    if address.is_empty() || !is_device_id(device_id) || !is_location_label(label) {
        return None;
    }

    let model = fields
        .get(3)
        .filter(|m| !m.is_empty())
        .map(|m| m.to_string());

    Some(LocationEntry {
        label: label.to_string(),
        device_id: DeviceId::new(device_id),
        hardware_address: address.to_string(),
        model,
    })
}

fn is_device_id(field: &str) -> bool {
    !field.is_empty() && !field.chars().any(char::is_whitespace)
}

/// Labels are upper-case tokens such as `RIGHTPOCKET` or `LEFT_WRIST`.
fn is_location_label(field: &str) -> bool {
    field.chars().any(|c| c.is_ascii_uppercase())
        && field
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}
