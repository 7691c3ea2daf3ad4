//! JSON-file-backed store implementations
//!
//! Back the store traits with per-category JSON collection files under the
//! configured store directory (`messages.json`, `call_logs.json`,
//! `contacts.json`). This is the backing the CLI runs against and the
//! reference implementation of the trait contracts; a device integration
//! replaces these with live stores without touching the engines.
//!
//! Every mutation rewrites the collection atomically through
//! [`file_io::write_json_atomic`], so an interrupted write leaves the
//! previous collection intact.

use std::path::{Path, PathBuf};

use crate::error::{VaultError, VaultResult};
use crate::models::{
    CallLogEntry, ContactAddress, ContactEvent, ContactRecord, ContactRelationship, Message,
    SocialProfile,
};
use crate::phone;

use super::file_io;
use super::{CallLogStore, ContactStore, ContactStub, InsertedMessage, MessageStore, TimeWindow};

/// File name of the message collection
pub const MESSAGES_FILE: &str = "messages.json";
/// File name of the call-log collection
pub const CALL_LOGS_FILE: &str = "call_logs.json";
/// File name of the contact collection
pub const CONTACTS_FILE: &str = "contacts.json";

/// Message store backed by a JSON collection file
pub struct LocalMessageStore {
    path: PathBuf,
}

impl LocalMessageStore {
    /// Create a store over `<dir>/messages.json`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(MESSAGES_FILE),
        }
    }

    fn load(&self) -> VaultResult<Vec<Message>> {
        file_io::read_json(&self.path)
    }
}

impl MessageStore for LocalMessageStore {
    fn query_messages(&self) -> VaultResult<Vec<Message>> {
        self.load()
    }

    fn insert_message(
        &self,
        message: &Message,
        thread_id: Option<i64>,
    ) -> VaultResult<InsertedMessage> {
        let mut messages = self.load()?;

        let assigned = InsertedMessage {
            id: messages.iter().map(|m| m.id).max().unwrap_or(0) + 1,
            thread_id: thread_id.unwrap_or_else(|| {
                messages.iter().map(|m| m.thread_id).max().unwrap_or(0) + 1
            }),
        };

        let mut stored = message.clone();
        stored.id = assigned.id;
        stored.thread_id = assigned.thread_id;
        messages.push(stored);

        file_io::write_json_atomic(&self.path, &messages)?;
        Ok(assigned)
    }
}

/// Call-log store backed by a JSON collection file
pub struct LocalCallLogStore {
    path: PathBuf,
}

impl LocalCallLogStore {
    /// Create a store over `<dir>/call_logs.json`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(CALL_LOGS_FILE),
        }
    }

    fn load(&self) -> VaultResult<Vec<CallLogEntry>> {
        file_io::read_json(&self.path)
    }
}

impl CallLogStore for LocalCallLogStore {
    fn query_call_logs(&self, window: Option<&TimeWindow>) -> VaultResult<Vec<CallLogEntry>> {
        let entries = self.load()?;
        Ok(match window {
            Some(window) => entries
                .into_iter()
                .filter(|e| window.contains(e.date))
                .collect(),
            None => entries,
        })
    }

    fn insert_call_log(&self, entry: &CallLogEntry) -> VaultResult<i64> {
        let mut entries = self.load()?;

        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        let mut stored = entry.clone();
        stored.id = id;
        entries.push(stored);

        file_io::write_json_atomic(&self.path, &entries)?;
        Ok(id)
    }
}

/// Contact store backed by a JSON collection file
pub struct LocalContactStore {
    path: PathBuf,
}

impl LocalContactStore {
    /// Create a store over `<dir>/contacts.json`
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(CONTACTS_FILE),
        }
    }

    fn load(&self) -> VaultResult<Vec<ContactRecord>> {
        file_io::read_json(&self.path)
    }

    fn with_contact<T>(&self, contact_id: i64, f: impl FnOnce(&ContactRecord) -> T) -> VaultResult<T> {
        self.load()?
            .iter()
            .find(|c| c.id == contact_id)
            .map(f)
            .ok_or_else(|| VaultError::Store(format!("no contact with id {}", contact_id)))
    }
}

impl ContactStore for LocalContactStore {
    fn roster(&self) -> VaultResult<Vec<ContactStub>> {
        Ok(self
            .load()?
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
        let mut contacts = self.load()?;

        let id = contacts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        let mut stored = contact.clone();
        stored.id = id;
        contacts.push(stored);

        // One atomic file swap carries the whole contact: base record,
        // name, and numbers land together or not at all.
        file_io::write_json_atomic(&self.path, &contacts)?;
        Ok(id)
    }

    fn display_name_for(&self, number: &str) -> VaultResult<Option<String>> {
        let probe = phone::normalize(number);
        if probe.is_empty() {
            return Ok(None);
        }
        Ok(self.load()?.iter().find_map(|contact| {
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
    use tempfile::TempDir;

    #[test]
    fn test_message_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalMessageStore::new(temp_dir.path());

        assert!(store.query_messages().unwrap().is_empty());

        let message = Message {
            address: "555".into(),
            body: Some("hi".into()),
            ..Message::default()
        };
        let first = store.insert_message(&message, None).unwrap();
        let second = store.insert_message(&message, Some(first.thread_id)).unwrap();

        let stored = store.query_messages().unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].thread_id, stored[1].thread_id);
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_thread_allocation_advances() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalMessageStore::new(temp_dir.path());

        let message = Message::default();
        let first = store.insert_message(&message, None).unwrap();
        let second = store.insert_message(&message, None).unwrap();
        assert_ne!(first.thread_id, second.thread_id);
    }

    #[test]
    fn test_call_log_store_persists() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalCallLogStore::new(temp_dir.path());

        let entry = CallLogEntry {
            number: "5551234567".into(),
            date: 100,
            duration: 30,
            ..CallLogEntry::default()
        };
        store.insert_call_log(&entry).unwrap();

        let reopened = LocalCallLogStore::new(temp_dir.path());
        assert_eq!(reopened.query_call_logs(None).unwrap().len(), 1);
    }

    #[test]
    fn test_contact_satellites_and_lookup() {
        let temp_dir = TempDir::new().unwrap();
        let store = LocalContactStore::new(temp_dir.path());

        let id = store
            .insert_contact(&ContactRecord {
                name: "Ada".into(),
                phones: vec!["+1 (555) 123-4567".into()],
                note: Some("note".into()),
                ..ContactRecord::default()
            })
            .unwrap();

        assert_eq!(store.phones_of(id).unwrap().len(), 1);
        assert_eq!(store.note_of(id).unwrap().as_deref(), Some("note"));
        assert!(store.emails_of(id).unwrap().is_empty());
        assert_eq!(
            store.display_name_for("15551234567").unwrap().as_deref(),
            None,
            "lookup is exact on the normalized form; variants are the caller's job"
        );
        assert_eq!(
            store.display_name_for("+15551234567").unwrap().as_deref(),
            Some("Ada")
        );
    }
}
