//! Core data models for msgvault
//!
//! This module contains the record types carried by a snapshot: messages,
//! call log entries, contacts, and the snapshot container itself. All types
//! serialize with the short wire field names of the snapshot format and
//! accept their long-form aliases on decode.

pub mod call_log;
pub mod contact;
pub mod message;
pub mod snapshot;

pub use call_log::{CallLogEntry, CallType};
pub use contact::{ContactAddress, ContactEvent, ContactRecord, ContactRelationship, SocialProfile};
pub use message::{Message, MessageKind};
pub use snapshot::{Snapshot, FORMAT_VERSION};
