//! Record store interfaces
//!
//! The pipeline never talks to a device database directly; it goes through
//! the traits defined here. A platform integration supplies live-backed
//! implementations, [`local`] supplies the JSON-file stores the CLI runs
//! against, and [`memory`] supplies fault-injectable stores for tests.
//!
//! Write access to the message store is gated by an OS-level exclusive
//! role (only one application may write messages at a time). The engines
//! only ever *check* that role through [`WriteRoleOracle`]; acquiring it is
//! an OS workflow that belongs to the caller.

pub mod file_io;
pub mod local;
pub mod memory;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::VaultResult;
use crate::models::{
    CallLogEntry, ContactAddress, ContactEvent, ContactRecord, ContactRelationship, Message,
    SocialProfile,
};

pub use local::{LocalCallLogStore, LocalContactStore, LocalMessageStore};
pub use memory::{MemoryCallLogStore, MemoryContactStore, MemoryMessageStore};

/// An inclusive epoch-millisecond time range used to bound call-log queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Window start, inclusive
    pub start: i64,
    /// Window end, inclusive
    pub end: i64,
}

impl TimeWindow {
    /// Whether an epoch-millisecond timestamp falls inside this window
    pub fn contains(&self, timestamp: i64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

/// Identifiers assigned by the message store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedMessage {
    /// Store-assigned row identifier
    pub id: i64,
    /// Conversation thread the store filed the message under
    pub thread_id: i64,
}

/// The device message store
pub trait MessageStore {
    /// Read all messages (id, address, body, date, type, read, status,
    /// thread projection)
    fn query_messages(&self) -> VaultResult<Vec<Message>>;

    /// Insert one message.
    ///
    /// With `thread_id: None` the store files the message under a
    /// conversation of its choosing and reports the assigned thread;
    /// passing `Some` pins the message to an existing conversation.
    fn insert_message(&self, message: &Message, thread_id: Option<i64>)
        -> VaultResult<InsertedMessage>;
}

/// The device call-log store
pub trait CallLogStore {
    /// Read call log entries, optionally restricted to a time window
    fn query_call_logs(&self, window: Option<&TimeWindow>) -> VaultResult<Vec<CallLogEntry>>;

    /// Insert one call log entry, returning the store-assigned id
    fn insert_call_log(&self, entry: &CallLogEntry) -> VaultResult<i64>;
}

/// A row of the contact roster, before satellite attributes are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactStub {
    /// Store-assigned contact identifier
    pub id: i64,
    /// Display name, possibly blank
    pub name: String,
}

/// The device contact store/directory.
///
/// Reads follow the store's native shape: one roster query plus one
/// follow-up query per contact per satellite attribute. Inserts are atomic
/// per contact: base record, name, and phone numbers land together or not
/// at all.
pub trait ContactStore {
    /// Read the contact roster
    fn roster(&self) -> VaultResult<Vec<ContactStub>>;

    /// Phone numbers of one contact
    fn phones_of(&self, contact_id: i64) -> VaultResult<Vec<String>>;

    /// Email addresses of one contact
    fn emails_of(&self, contact_id: i64) -> VaultResult<Vec<String>>;

    /// Postal addresses of one contact
    fn addresses_of(&self, contact_id: i64) -> VaultResult<Vec<ContactAddress>>;

    /// Free-text note of one contact
    fn note_of(&self, contact_id: i64) -> VaultResult<Option<String>>;

    /// Group memberships of one contact
    fn groups_of(&self, contact_id: i64) -> VaultResult<Vec<String>>;

    /// Website URLs of one contact
    fn websites_of(&self, contact_id: i64) -> VaultResult<Vec<String>>;

    /// Events of one contact
    fn events_of(&self, contact_id: i64) -> VaultResult<Vec<ContactEvent>>;

    /// Relationships of one contact
    fn relationships_of(&self, contact_id: i64) -> VaultResult<Vec<ContactRelationship>>;

    /// Social profiles of one contact
    fn social_profiles_of(&self, contact_id: i64) -> VaultResult<Vec<SocialProfile>>;

    /// Atomically insert one contact, returning the store-assigned id
    fn insert_contact(&self, contact: &ContactRecord) -> VaultResult<i64>;

    /// Reverse lookup: display name for an exact number, if the directory
    /// knows it
    fn display_name_for(&self, number: &str) -> VaultResult<Option<String>>;
}

/// Capability that answers whether this process currently holds the
/// exclusive write role over the message store
pub trait WriteRoleOracle: Send + Sync {
    /// True if message-store writes are currently permitted
    fn holds_write_role(&self) -> bool;
}

/// An oracle with a fixed answer, for callers that resolve the role once
/// up front (the CLI) and for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedWriteRole(pub bool);

impl WriteRoleOracle for FixedWriteRole {
    fn holds_write_role(&self) -> bool {
        self.0
    }
}

/// An oracle the caller can flip while an engine holds a reference to it,
/// for integrations where the role is granted or revoked out of band
#[derive(Debug, Clone, Default)]
pub struct SharedWriteRole {
    granted: Arc<AtomicBool>,
}

impl SharedWriteRole {
    /// Create an oracle with an initial answer
    pub fn new(granted: bool) -> Self {
        Self {
            granted: Arc::new(AtomicBool::new(granted)),
        }
    }

    /// Update the answer
    pub fn set(&self, granted: bool) {
        self.granted.store(granted, Ordering::SeqCst);
    }
}

impl WriteRoleOracle for SharedWriteRole {
    fn holds_write_role(&self) -> bool {
        self.granted.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_window_contains() {
        let window = TimeWindow { start: 10, end: 20 };
        assert!(window.contains(10));
        assert!(window.contains(20));
        assert!(!window.contains(9));
        assert!(!window.contains(21));
    }

    #[test]
    fn test_fixed_write_role() {
        assert!(FixedWriteRole(true).holds_write_role());
        assert!(!FixedWriteRole(false).holds_write_role());
    }

    #[test]
    fn test_shared_write_role_can_flip() {
        let oracle = SharedWriteRole::new(false);
        assert!(!oracle.holds_write_role());
        oracle.set(true);
        assert!(oracle.holds_write_role());
    }
}
