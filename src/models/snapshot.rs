//! Snapshot container model
//!
//! A snapshot is the versioned, self-contained unit a backup produces and a
//! restore consumes. Each record list is optional: `None` records that the
//! category was not captured (no read access at backup time), while
//! `Some(vec![])` records a capture that found zero records. The codec
//! preserves that distinction on disk as JSON `null` vs `[]`.

use serde::{Deserialize, Serialize};

use super::{CallLogEntry, ContactRecord, Message};

/// Current snapshot format version
pub const FORMAT_VERSION: u32 = 1;

/// A full backup snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Captured messages, or `None` if the category was unreadable
    #[serde(default)]
    pub messages: Option<Vec<Message>>,

    /// Captured call log entries, or `None` if the category was unreadable
    #[serde(rename = "call_logs", alias = "callLogs", default)]
    pub call_logs: Option<Vec<CallLogEntry>>,

    /// Captured contacts, or `None` if the category was unreadable
    #[serde(default)]
    pub contacts: Option<Vec<ContactRecord>>,

    /// Capture time, epoch milliseconds
    #[serde(default)]
    pub timestamp: i64,

    /// Free-text device/OS/app-version string
    #[serde(rename = "device_info", alias = "deviceInfo", default)]
    pub device_info: String,

    /// Snapshot format version; files written before versioning decode as 1
    #[serde(rename = "format_version", default = "default_format_version")]
    pub format_version: u32,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

impl Snapshot {
    /// Create a snapshot with no captured categories
    pub fn empty(timestamp: i64, device_info: impl Into<String>) -> Self {
        Self {
            messages: None,
            call_logs: None,
            contacts: None,
            timestamp,
            device_info: device_info.into(),
            format_version: FORMAT_VERSION,
        }
    }

    /// Number of messages, counting a missing category as zero
    pub fn message_count(&self) -> usize {
        self.messages.as_ref().map_or(0, Vec::len)
    }

    /// Number of call log entries, counting a missing category as zero
    pub fn call_log_count(&self) -> usize {
        self.call_logs.as_ref().map_or(0, Vec::len)
    }

    /// Number of contacts, counting a missing category as zero
    pub fn contact_count(&self) -> usize {
        self.contacts.as_ref().map_or(0, Vec::len)
    }

    /// Total records across all captured categories
    pub fn record_count(&self) -> usize {
        self.message_count() + self.call_log_count() + self.contact_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_treat_missing_as_zero() {
        let snapshot = Snapshot::empty(0, "test");
        assert_eq!(snapshot.message_count(), 0);
        assert_eq!(snapshot.record_count(), 0);
    }

    #[test]
    fn test_null_and_empty_lists_are_distinct() {
        let mut snapshot = Snapshot::empty(0, "test");
        snapshot.messages = Some(Vec::new());

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["messages"].is_array());
        assert!(json["call_logs"].is_null());

        let decoded: Snapshot = serde_json::from_value(json).unwrap();
        assert_eq!(decoded.messages, Some(Vec::new()));
        assert_eq!(decoded.call_logs, None);
    }

    #[test]
    fn test_format_version_defaults_on_decode() {
        let decoded: Snapshot =
            serde_json::from_str(r#"{"messages": null, "timestamp": 5}"#).unwrap();
        assert_eq!(decoded.format_version, FORMAT_VERSION);
        assert_eq!(decoded.timestamp, 5);
    }
}
