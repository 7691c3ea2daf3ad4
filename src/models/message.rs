//! Text message model
//!
//! Represents a single text message as read from (or written back to) the
//! device message store.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction/type of a message, mirroring the message store's numeric codes
///
/// Codes the store may report that fall outside the known set are preserved
/// verbatim through `Other`, so a snapshot round-trip never loses them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum MessageKind {
    /// Received message
    Inbox,
    /// Sent message
    Sent,
    /// Unsent draft
    Draft,
    /// Waiting in the outbox
    Outbox,
    /// Send attempt failed
    Failed,
    /// Queued for sending
    Queued,
    /// Unrecognized store code, kept as-is
    Other(i32),
}

impl MessageKind {
    /// The store's numeric code for this kind
    pub fn code(&self) -> i32 {
        match self {
            Self::Inbox => 1,
            Self::Sent => 2,
            Self::Draft => 3,
            Self::Outbox => 4,
            Self::Failed => 5,
            Self::Queued => 6,
            Self::Other(code) => *code,
        }
    }
}

impl From<i32> for MessageKind {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::Inbox,
            2 => Self::Sent,
            3 => Self::Draft,
            4 => Self::Outbox,
            5 => Self::Failed,
            6 => Self::Queued,
            other => Self::Other(other),
        }
    }
}

impl From<MessageKind> for i32 {
    fn from(kind: MessageKind) -> Self {
        kind.code()
    }
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::Other(0)
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inbox => write!(f, "inbox"),
            Self::Sent => write!(f, "sent"),
            Self::Draft => write!(f, "draft"),
            Self::Outbox => write!(f, "outbox"),
            Self::Failed => write!(f, "failed"),
            Self::Queued => write!(f, "queued"),
            Self::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// A single text message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Message {
    /// Store-assigned row identifier, 0 for a record not yet inserted
    #[serde(default)]
    pub id: i64,

    /// Sender/recipient address. May be blank in raw store data; blank
    /// addresses are replaced with an `unknown_<id>` placeholder before
    /// serialization.
    #[serde(rename = "addr", alias = "address", default)]
    pub address: String,

    /// Message body, absent for some store rows
    #[serde(default)]
    pub body: Option<String>,

    /// Epoch-millisecond timestamp
    #[serde(default)]
    pub date: i64,

    /// Direction/type of the message
    #[serde(rename = "type", default)]
    pub kind: MessageKind,

    /// Read flag as stored (0 unread, 1 read)
    #[serde(rename = "read", alias = "read_state", default)]
    pub read_state: i32,

    /// Delivery status code as stored
    #[serde(rename = "status", alias = "message_status", default)]
    pub status: i32,

    /// Store-specific conversation grouping key. Not portable across
    /// stores; restore obtains a fresh one from the target store.
    #[serde(rename = "thread_id", default)]
    pub thread_id: i64,
}

impl Message {
    /// True if the address carries no usable content
    pub fn has_blank_address(&self) -> bool {
        self.address.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_codes_round_trip() {
        for code in 0..8 {
            let kind = MessageKind::from(code);
            assert_eq!(kind.code(), code);
        }
    }

    #[test]
    fn test_kind_known_codes() {
        assert_eq!(MessageKind::from(1), MessageKind::Inbox);
        assert_eq!(MessageKind::from(2), MessageKind::Sent);
        assert_eq!(MessageKind::from(6), MessageKind::Queued);
        assert_eq!(MessageKind::from(42), MessageKind::Other(42));
    }

    #[test]
    fn test_wire_field_names() {
        let message = Message {
            id: 7,
            address: "+15551234567".into(),
            body: Some("hi".into()),
            date: 1_700_000_000_000,
            kind: MessageKind::Inbox,
            read_state: 1,
            status: 0,
            thread_id: 3,
        };

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["addr"], "+15551234567");
        assert_eq!(json["type"], 1);
        assert_eq!(json["read"], 1);
        assert_eq!(json["thread_id"], 3);
    }

    #[test]
    fn test_decode_accepts_long_aliases_and_defaults() {
        let message: Message =
            serde_json::from_str(r#"{"id": 2, "address": "555", "read_state": 1}"#).unwrap();
        assert_eq!(message.address, "555");
        assert_eq!(message.read_state, 1);
        assert_eq!(message.date, 0);
        assert_eq!(message.kind, MessageKind::Other(0));
        assert_eq!(message.body, None);
    }

    #[test]
    fn test_blank_address() {
        let message = Message {
            address: "  ".into(),
            ..Message::default()
        };
        assert!(message.has_blank_address());
    }
}
