//! Source reading
//!
//! Pulls raw records out of the three device stores into in-memory
//! collections. The three categories are fully independent: a store that
//! cannot be read (missing permission, unexpected failure) costs only its
//! own category, never the whole capture.

use chrono::Utc;

use crate::error::{VaultError, VaultResult};
use crate::models::{CallLogEntry, ContactRecord, Message};
use crate::store::{CallLogStore, ContactStore, ContactStub, MessageStore, TimeWindow};

/// Default number of call-log query windows
pub const DEFAULT_CALL_LOG_WINDOWS: u32 = 4;
/// Default call-log history depth in days
pub const DEFAULT_CALL_LOG_HISTORY_DAYS: u32 = 365;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The outcome of reading all three stores.
///
/// `None` for a category means "not captured" (the store was unreadable),
/// which a snapshot keeps distinct from "captured, zero records".
#[derive(Debug, Clone, Default)]
pub struct CapturedRecords {
    /// Messages, or `None` if the message store was unreadable
    pub messages: Option<Vec<Message>>,
    /// Call logs, or `None` if the call-log store was unreadable
    pub call_logs: Option<Vec<CallLogEntry>>,
    /// Contacts, or `None` if the contact store was unreadable
    pub contacts: Option<Vec<ContactRecord>>,
}

impl CapturedRecords {
    /// True if no category produced any record
    pub fn is_empty(&self) -> bool {
        self.messages.as_ref().map_or(true, Vec::is_empty)
            && self.call_logs.as_ref().map_or(true, Vec::is_empty)
            && self.contacts.as_ref().map_or(true, Vec::is_empty)
    }
}

/// Reads records from the device stores
pub struct SourceReader<'a> {
    messages: &'a dyn MessageStore,
    call_logs: &'a dyn CallLogStore,
    contacts: &'a dyn ContactStore,
    call_log_windows: u32,
    call_log_history_days: u32,
}

impl<'a> SourceReader<'a> {
    /// Create a reader over the three stores with default tunables
    pub fn new(
        messages: &'a dyn MessageStore,
        call_logs: &'a dyn CallLogStore,
        contacts: &'a dyn ContactStore,
    ) -> Self {
        Self {
            messages,
            call_logs,
            contacts,
            call_log_windows: DEFAULT_CALL_LOG_WINDOWS,
            call_log_history_days: DEFAULT_CALL_LOG_HISTORY_DAYS,
        }
    }

    /// Override the call-log windowing tunables.
    ///
    /// Window count only bounds per-query row volume on stores without
    /// server-side pagination; it never affects which records are captured.
    pub fn with_call_log_windowing(mut self, windows: u32, history_days: u32) -> Self {
        self.call_log_windows = windows.max(1);
        self.call_log_history_days = history_days.max(1);
        self
    }

    /// Read all three categories, degrading gracefully per category
    pub fn capture(&self) -> CapturedRecords {
        CapturedRecords {
            messages: absorb("messages", self.read_messages()),
            call_logs: absorb("call logs", self.read_call_logs()),
            contacts: absorb("contacts", self.read_contacts()),
        }
    }

    /// Read all messages from the message store
    pub fn read_messages(&self) -> VaultResult<Vec<Message>> {
        let messages = self.messages.query_messages()?;
        tracing::info!("read {} messages", messages.len());
        Ok(messages)
    }

    /// Read call logs, partitioned into bounded time windows.
    ///
    /// A denied first window denies the category; any later window failure
    /// is logged and skipped, keeping what was already collected.
    pub fn read_call_logs(&self) -> VaultResult<Vec<CallLogEntry>> {
        let now = Utc::now().timestamp_millis();
        let windows = time_windows(now, self.call_log_history_days, self.call_log_windows);

        let mut entries = Vec::new();
        for (index, window) in windows.iter().enumerate() {
            match self.call_logs.query_call_logs(Some(window)) {
                Ok(mut batch) => {
                    tracing::debug!(
                        "call-log window {}..{} returned {} entries",
                        window.start,
                        window.end,
                        batch.len()
                    );
                    entries.append(&mut batch);
                }
                Err(err @ VaultError::PermissionDenied { .. }) if index == 0 => return Err(err),
                Err(err) => {
                    tracing::warn!(
                        "call-log window {}..{} failed, skipping: {}",
                        window.start,
                        window.end,
                        err
                    );
                }
            }
        }

        tracing::info!("read {} call log entries", entries.len());
        Ok(entries)
    }

    /// Read the contact roster and attach satellite attributes.
    ///
    /// One query per contact per attribute; contact counts are small enough
    /// that the N+1 shape is not worth a joined query. A contact whose
    /// satellite reads fail is logged and skipped; fully empty contacts are
    /// dropped here, at capture time.
    pub fn read_contacts(&self) -> VaultResult<Vec<ContactRecord>> {
        let roster = self.contacts.roster()?;

        let mut contacts = Vec::new();
        for stub in roster {
            match self.assemble_contact(&stub) {
                Ok(contact) if contact.has_identity() => contacts.push(contact),
                Ok(_) => {
                    tracing::debug!("dropping contact {} with no identifying data", stub.id);
                }
                Err(err) => {
                    tracing::warn!("failed to read contact {}, skipping: {}", stub.id, err);
                }
            }
        }

        tracing::info!("read {} contacts", contacts.len());
        Ok(contacts)
    }

    fn assemble_contact(&self, stub: &ContactStub) -> VaultResult<ContactRecord> {
        let id = stub.id;
        Ok(ContactRecord {
            id,
            name: stub.name.clone(),
            phones: self.contacts.phones_of(id)?,
            emails: none_if_empty(self.contacts.emails_of(id)?),
            addresses: none_if_empty(self.contacts.addresses_of(id)?),
            note: self.contacts.note_of(id)?,
            groups: none_if_empty(self.contacts.groups_of(id)?),
            websites: none_if_empty(self.contacts.websites_of(id)?),
            events: none_if_empty(self.contacts.events_of(id)?),
            relationships: none_if_empty(self.contacts.relationships_of(id)?),
            social_profiles: none_if_empty(self.contacts.social_profiles_of(id)?),
        })
    }
}

/// Partition the trailing `history_days` before `end` into `count` adjacent
/// windows, oldest first
pub fn time_windows(end: i64, history_days: u32, count: u32) -> Vec<TimeWindow> {
    let count = count.max(1) as i64;
    let start = end - i64::from(history_days) * MILLIS_PER_DAY;
    let span = (end - start) / count;

    (0..count)
        .map(|i| TimeWindow {
            start: start + i * span,
            end: if i == count - 1 {
                end
            } else {
                start + (i + 1) * span - 1
            },
        })
        .collect()
}

fn absorb<T>(category: &str, result: VaultResult<Vec<T>>) -> Option<Vec<T>> {
    match result {
        Ok(records) => Some(records),
        Err(err) => {
            tracing::warn!("{} not captured: {}", category, err);
            None
        }
    }
}

fn none_if_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CallType;
    use crate::store::{MemoryCallLogStore, MemoryContactStore, MemoryMessageStore};

    #[test]
    fn test_time_windows_cover_span_without_gaps() {
        let windows = time_windows(1_000_000, 1, 4);
        assert_eq!(windows.len(), 4);
        assert_eq!(windows[0].start, 1_000_000 - MILLIS_PER_DAY);
        assert_eq!(windows[3].end, 1_000_000);
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end + 1, pair[1].start);
        }
    }

    #[test]
    fn test_capture_degrades_per_category() {
        let messages = MemoryMessageStore::new().deny_reads();
        let call_logs = MemoryCallLogStore::with_entries(vec![CallLogEntry {
            id: 1,
            number: "555".into(),
            kind: CallType::Outgoing,
            date: Utc::now().timestamp_millis() - 1000,
            duration: 10,
            cached_name: None,
        }]);
        let contacts = MemoryContactStore::with_contacts(vec![ContactRecord {
            id: 1,
            name: "Ada".into(),
            ..ContactRecord::default()
        }]);

        let reader = SourceReader::new(&messages, &call_logs, &contacts);
        let captured = reader.capture();

        assert!(captured.messages.is_none());
        assert_eq!(captured.call_logs.as_ref().unwrap().len(), 1);
        assert_eq!(captured.contacts.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_old_call_logs_fall_outside_history() {
        let call_logs = MemoryCallLogStore::with_entries(vec![CallLogEntry {
            id: 1,
            number: "555".into(),
            date: 1000, // far before the trailing-year horizon
            ..CallLogEntry::default()
        }]);
        let messages = MemoryMessageStore::new();
        let contacts = MemoryContactStore::new();

        let reader = SourceReader::new(&messages, &call_logs, &contacts);
        assert!(reader.read_call_logs().unwrap().is_empty());
    }

    #[test]
    fn test_empty_contacts_dropped_at_capture() {
        let contacts = MemoryContactStore::with_contacts(vec![
            ContactRecord {
                id: 1,
                name: "  ".into(),
                ..ContactRecord::default()
            },
            ContactRecord {
                id: 2,
                name: "Ada".into(),
                ..ContactRecord::default()
            },
        ]);
        let messages = MemoryMessageStore::new();
        let call_logs = MemoryCallLogStore::new();

        let reader = SourceReader::new(&messages, &call_logs, &contacts);
        let captured = reader.read_contacts().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].name, "Ada");
    }

    #[test]
    fn test_satellites_read_per_contact() {
        let contacts = MemoryContactStore::with_contacts(vec![ContactRecord {
            id: 3,
            name: "Ada".into(),
            phones: vec!["5551234567".into()],
            emails: Some(vec!["ada@example.com".into()]),
            note: Some("met at work".into()),
            ..ContactRecord::default()
        }]);
        let messages = MemoryMessageStore::new();
        let call_logs = MemoryCallLogStore::new();

        let reader = SourceReader::new(&messages, &call_logs, &contacts);
        let captured = reader.read_contacts().unwrap();
        assert_eq!(captured[0].phones, vec!["5551234567".to_string()]);
        assert_eq!(captured[0].note.as_deref(), Some("met at work"));
        assert!(captured[0].groups.is_none());
    }

    #[test]
    fn test_captured_records_is_empty() {
        let captured = CapturedRecords::default();
        assert!(captured.is_empty());

        let with_empty_lists = CapturedRecords {
            messages: Some(Vec::new()),
            ..CapturedRecords::default()
        };
        assert!(with_empty_lists.is_empty());

        let with_records = CapturedRecords {
            messages: Some(vec![Message::default()]),
            ..CapturedRecords::default()
        };
        assert!(!with_records.is_empty());
    }
}
