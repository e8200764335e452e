use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::path::Path;

use crate::utils::error::Result;

/// Error codes reported per store by the availability feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NoTimeslotAvailable,
    /// Walk-ins are accepted, so the store counts as available right away.
    AppointmentNotNeeded,
    #[serde(other)]
    Unknown,
}

/// Explicit `null` decodes like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One record of the availability feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub store_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub appointments_available: bool,
    /// Epoch seconds; only meaningful when `appointments_available` is set.
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_available_appointment: i64,
    #[serde(default)]
    pub error_code: Option<ErrorCode>,
}

/// Store identifiers to look for, in configured order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSet {
    stores: Vec<String>,
}

impl WatchSet {
    pub fn new(stores: Vec<String>) -> Self {
        Self { stores }
    }

    /// One identifier per line; blank lines and `#` comments are skipped.
    pub fn parse(content: &str) -> Self {
        let stores = content
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { stores }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.stores.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.stores
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotReason {
    NotNeeded,
    FirstAvailable,
}

/// A positive availability decision for a watched store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub store_number: String,
    pub at: DateTime<Utc>,
    pub reason: SlotReason,
}

/// Outcome of a single check: when an appointment is available, if at all.
pub type CheckResult = Option<DateTime<Utc>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_deserializes_wire_names() {
        let body = r#"[{"storeNumber":"R123","appointmentsAvailable":true,"firstAvailableAppointment":1700000000,"errorCode":""}]"#;
        let entries: Vec<Entry> = serde_json::from_str(body).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].store_number, "R123");
        assert!(entries[0].appointments_available);
        assert_eq!(entries[0].first_available_appointment, 1_700_000_000);
        assert_eq!(entries[0].error_code, Some(ErrorCode::Unknown));
    }

    #[test]
    fn test_entry_missing_fields_default() {
        let body = r#"{"storeNumber":"R123","appointmentsAvailable":false,"errorCode":"APPOINTMENT_NOT_NEEDED"}"#;
        let entry: Entry = serde_json::from_str(body).unwrap();

        assert_eq!(entry.first_available_appointment, 0);
        assert_eq!(entry.error_code, Some(ErrorCode::AppointmentNotNeeded));

        let entry: Entry = serde_json::from_str(r#"{"storeNumber":"R1","errorCode":null}"#).unwrap();
        assert_eq!(entry.error_code, None);
        assert!(!entry.appointments_available);
    }

    #[test]
    fn test_entry_null_fields_default() {
        let body = r#"[
            {"storeNumber":"R999","appointmentsAvailable":null,"firstAvailableAppointment":null,"errorCode":null},
            {"storeNumber":null,"appointmentsAvailable":true,"firstAvailableAppointment":1700000000},
            {"storeNumber":"R123","appointmentsAvailable":true,"firstAvailableAppointment":1700000000,"errorCode":""}
        ]"#;
        let entries: Vec<Entry> = serde_json::from_str(body).unwrap();

        assert_eq!(entries.len(), 3);
        assert!(!entries[0].appointments_available);
        assert_eq!(entries[0].first_available_appointment, 0);
        assert_eq!(entries[1].store_number, "");
        assert_eq!(entries[2].store_number, "R123");
    }

    #[test]
    fn test_watch_set_parse_skips_comments_and_blanks() {
        let watch = WatchSet::parse("# Munich\nR123\n\nR456\r\n#R789\n");
        assert_eq!(watch.as_slice(), &["R123".to_string(), "R456".to_string()]);
        assert_eq!(watch.len(), 2);
    }

    #[test]
    fn test_watch_set_from_missing_file_fails() {
        assert!(WatchSet::from_file("/nonexistent/stores.conf").is_err());
    }
}
