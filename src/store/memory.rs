//! In-memory store implementations
//!
//! Back the store traits with plain vectors and expose the failure modes
//! the engines must tolerate: denied reads (missing permission), failing
//! inserts for chosen records, and insert counting for gate assertions.
//! Used throughout the test suite; also a convenient seed for embedders'
//! own tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::error::{VaultError, VaultResult};
use crate::models::{
    CallLogEntry, ContactAddress, ContactEvent, ContactRecord, ContactRelationship, Message,
    SocialProfile,
};
use crate::phone;

use super::{CallLogStore, ContactStore, ContactStub, InsertedMessage, MessageStore, TimeWindow};

#[derive(Default)]
struct MessageState {
    messages: Vec<Message>,
    next_id: i64,
    next_thread: i64,
}

/// In-memory message store
#[derive(Default)]
pub struct MemoryMessageStore {
    state: Mutex<MessageState>,
    read_denied: bool,
    failing_ids: HashSet<i64>,
    insert_attempts: AtomicUsize,
}

impl MemoryMessageStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing messages
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let next_id = messages.iter().map(|m| m.id).max().unwrap_or(0) + 1;
        let next_thread = messages.iter().map(|m| m.thread_id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(MessageState {
                messages,
                next_id,
                next_thread,
            }),
            ..Self::default()
        }
    }

    /// Simulate missing read permission
    pub fn deny_reads(mut self) -> Self {
        self.read_denied = true;
        self
    }

    /// Make inserts fail for messages whose incoming id is in `ids`
    pub fn failing_inserts(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.failing_ids = ids.into_iter().collect();
        self
    }

    /// Messages currently held by the store
    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    /// Number of insert calls attempted, successful or not
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    /// Distinct thread ids present in the store
    pub fn thread_ids(&self) -> HashSet<i64> {
        self.state
            .lock()
            .unwrap()
            .messages
            .iter()
            .map(|m| m.thread_id)
            .collect()
    }
}

impl MessageStore for MemoryMessageStore {
    fn query_messages(&self) -> VaultResult<Vec<Message>> {
        if self.read_denied {
            return Err(VaultError::permission_denied("messages"));
        }
        Ok(self.messages())
    }

    fn insert_message(
        &self,
        message: &Message,
        thread_id: Option<i64>,
    ) -> VaultResult<InsertedMessage> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(&message.id) {
            return Err(VaultError::Store(format!(
                "simulated insert failure for message {}",
                message.id
            )));
        }

        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(1);
        state.next_thread = state.next_thread.max(1);

        let assigned = InsertedMessage {
            id: state.next_id,
            thread_id: thread_id.unwrap_or(state.next_thread),
        };
        state.next_id += 1;
        if thread_id.is_none() {
            state.next_thread += 1;
        }

        let mut stored = message.clone();
        stored.id = assigned.id;
        stored.thread_id = assigned.thread_id;
        state.messages.push(stored);

        Ok(assigned)
    }
}

#[derive(Default)]
struct CallLogState {
    entries: Vec<CallLogEntry>,
    next_id: i64,
}

/// In-memory call-log store
#[derive(Default)]
pub struct MemoryCallLogStore {
    state: Mutex<CallLogState>,
    read_denied: bool,
    failing_ids: HashSet<i64>,
    insert_attempts: AtomicUsize,
}

impl MemoryCallLogStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing entries
    pub fn with_entries(entries: Vec<CallLogEntry>) -> Self {
        let next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(CallLogState { entries, next_id }),
            ..Self::default()
        }
    }

    /// Simulate missing read permission
    pub fn deny_reads(mut self) -> Self {
        self.read_denied = true;
        self
    }

    /// Make inserts fail for entries whose incoming id is in `ids`
    pub fn failing_inserts(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.failing_ids = ids.into_iter().collect();
        self
    }

    /// Entries currently held by the store
    pub fn entries(&self) -> Vec<CallLogEntry> {
        self.state.lock().unwrap().entries.clone()
    }

    /// Number of insert calls attempted, successful or not
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }
}

impl CallLogStore for MemoryCallLogStore {
    fn query_call_logs(&self, window: Option<&TimeWindow>) -> VaultResult<Vec<CallLogEntry>> {
        if self.read_denied {
            return Err(VaultError::permission_denied("call logs"));
        }
        let entries = self.entries();
        Ok(match window {
            Some(window) => entries
                .into_iter()
                .filter(|e| window.contains(e.date))
                .collect(),
            None => entries,
        })
    }

    fn insert_call_log(&self, entry: &CallLogEntry) -> VaultResult<i64> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(&entry.id) {
            return Err(VaultError::Store(format!(
                "simulated insert failure for call log {}",
                entry.id
            )));
        }

        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(1);
        let id = state.next_id;
        state.next_id += 1;

        let mut stored = entry.clone();
        stored.id = id;
        state.entries.push(stored);

        Ok(id)
    }
}

#[derive(Default)]
struct ContactState {
    contacts: Vec<ContactRecord>,
    next_id: i64,
}

/// In-memory contact store
#[derive(Default)]
pub struct MemoryContactStore {
    state: Mutex<ContactState>,
    read_denied: bool,
    failing_ids: HashSet<i64>,
    insert_attempts: AtomicUsize,
}

impl MemoryContactStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with existing contacts
    pub fn with_contacts(contacts: Vec<ContactRecord>) -> Self {
        let next_id = contacts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Self {
            state: Mutex::new(ContactState { contacts, next_id }),
            ..Self::default()
        }
    }

    /// Simulate missing read permission
    pub fn deny_reads(mut self) -> Self {
        self.read_denied = true;
        self
    }

    /// Make inserts fail for contacts whose incoming id is in `ids`
    pub fn failing_inserts(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.failing_ids = ids.into_iter().collect();
        self
    }

    /// Contacts currently held by the store
    pub fn contacts(&self) -> Vec<ContactRecord> {
        self.state.lock().unwrap().contacts.clone()
    }

    /// Number of insert calls attempted, successful or not
    pub fn insert_attempts(&self) -> usize {
        self.insert_attempts.load(Ordering::SeqCst)
    }

    fn with_contact<T>(&self, contact_id: i64, f: impl FnOnce(&ContactRecord) -> T) -> VaultResult<T> {
        if self.read_denied {
            return Err(VaultError::permission_denied("contacts"));
        }
        let state = self.state.lock().unwrap();
        state
            .contacts
            .iter()
            .find(|c| c.id == contact_id)
            .map(f)
            .ok_or_else(|| VaultError::Store(format!("no contact with id {}", contact_id)))
    }
}

impl ContactStore for MemoryContactStore {
    fn roster(&self) -> VaultResult<Vec<ContactStub>> {
        if self.read_denied {
            return Err(VaultError::permission_denied("contacts"));
        }
        Ok(self
            .contacts()
            .iter()
            .map(|c| ContactStub {
                id: c.id,
                name: c.name.clone(),
            })
            .collect())
    }

    fn phones_of(&self, contact_id: i64) -> VaultResult<Vec<String>> {
        self.with_contact(contact_id, |c| c.phones.clone())
    }

    fn emails_of(&self, contact_id: i64) -> VaultResult<Vec<String>> {
        self.with_contact(contact_id, |c| c.emails.clone().unwrap_or_default())
    }

    fn addresses_of(&self, contact_id: i64) -> VaultResult<Vec<ContactAddress>> {
        self.with_contact(contact_id, |c| c.addresses.clone().unwrap_or_default())
    }

    fn note_of(&self, contact_id: i64) -> VaultResult<Option<String>> {
        self.with_contact(contact_id, |c| c.note.clone())
    }

    fn groups_of(&self, contact_id: i64) -> VaultResult<Vec<String>> {
        self.with_contact(contact_id, |c| c.groups.clone().unwrap_or_default())
    }

    fn websites_of(&self, contact_id: i64) -> VaultResult<Vec<String>> {
        self.with_contact(contact_id, |c| c.websites.clone().unwrap_or_default())
    }

    fn events_of(&self, contact_id: i64) -> VaultResult<Vec<ContactEvent>> {
        self.with_contact(contact_id, |c| c.events.clone().unwrap_or_default())
    }

    fn relationships_of(&self, contact_id: i64) -> VaultResult<Vec<ContactRelationship>> {
        self.with_contact(contact_id, |c| c.relationships.clone().unwrap_or_default())
    }

    fn social_profiles_of(&self, contact_id: i64) -> VaultResult<Vec<SocialProfile>> {
        self.with_contact(contact_id, |c| c.social_profiles.clone().unwrap_or_default())
    }

    fn insert_contact(&self, contact: &ContactRecord) -> VaultResult<i64> {
        self.insert_attempts.fetch_add(1, Ordering::SeqCst);
        if self.failing_ids.contains(&contact.id) {
            return Err(VaultError::Store(format!(
                "simulated insert failure for contact {}",
                contact.id
            )));
        }

        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(1);
        let id = state.next_id;
        state.next_id += 1;

        let mut stored = contact.clone();
        stored.id = id;
        state.contacts.push(stored);

        Ok(id)
    }

    fn display_name_for(&self, number: &str) -> VaultResult<Option<String>> {
        let probe = phone::normalize(number);
        if probe.is_empty() {
            return Ok(None);
        }
        Ok(self.contacts().iter().find_map(|contact| {
            let known = contact
                .phones
                .iter()
                .any(|candidate| phone::normalize(candidate) == probe);
            (known && !contact.name.trim().is_empty()).then(|| contact.name.clone())
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_insert_assigns_ids_and_threads() {
        let store = MemoryMessageStore::new();
        let message = Message {
            address: "555".into(),
            ..Message::default()
        };

        let first = store.insert_message(&message, None).unwrap();
        let second = store.insert_message(&message, Some(first.thread_id)).unwrap();
        let third = store.insert_message(&message, None).unwrap();

        assert_eq!(first.thread_id, second.thread_id);
        assert_ne!(first.thread_id, third.thread_id);
        assert_ne!(first.id, second.id);
        assert_eq!(store.messages().len(), 3);
    }

    #[test]
    fn test_denied_reads() {
        let store = MemoryMessageStore::new().deny_reads();
        assert!(store.query_messages().unwrap_err().is_permission_denied());
    }

    #[test]
    fn test_failing_inserts_counted_as_attempts() {
        let store = MemoryCallLogStore::new().failing_inserts([7]);
        let entry = CallLogEntry {
            id: 7,
            number: "555".into(),
            ..CallLogEntry::default()
        };
        assert!(store.insert_call_log(&entry).is_err());
        assert_eq!(store.insert_attempts(), 1);
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_call_log_window_filter() {
        let store = MemoryCallLogStore::with_entries(vec![
            CallLogEntry {
                id: 1,
                date: 100,
                ..CallLogEntry::default()
            },
            CallLogEntry {
                id: 2,
                date: 900,
                ..CallLogEntry::default()
            },
        ]);

        let window = TimeWindow { start: 0, end: 500 };
        let hits = store.query_call_logs(Some(&window)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_display_name_lookup_normalizes() {
        let store = MemoryContactStore::with_contacts(vec![ContactRecord {
            id: 1,
            name: "Ada".into(),
            phones: vec!["+1 (555) 123-4567".into()],
            ..ContactRecord::default()
        }]);

        assert_eq!(
            store.display_name_for("+15551234567").unwrap().as_deref(),
            Some("Ada")
        );
        assert_eq!(store.display_name_for("999").unwrap(), None);
    }
}
