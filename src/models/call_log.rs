//! Call history model
//!
//! Represents a single call log entry with the store's numeric call-type
//! codes preserved through an enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of a call, mirroring the call-log store's numeric codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum CallType {
    /// Incoming call that was not answered
    MissedIncoming,
    /// Outgoing call
    Outgoing,
    /// Incoming call that was answered
    AnsweredIncoming,
    /// Call that went to voicemail
    Voicemail,
    /// Call rejected by the user
    Rejected,
    /// Call blocked automatically
    Blocked,
    /// Unrecognized store code, kept as-is
    Other(i32),
}

impl CallType {
    /// The store's numeric code for this call type
    pub fn code(&self) -> i32 {
        match self {
            Self::MissedIncoming => 1,
            Self::Outgoing => 2,
            Self::AnsweredIncoming => 3,
            Self::Voicemail => 4,
            Self::Rejected => 5,
            Self::Blocked => 6,
            Self::Other(code) => *code,
        }
    }
}

impl From<i32> for CallType {
    fn from(code: i32) -> Self {
        match code {
            1 => Self::MissedIncoming,
            2 => Self::Outgoing,
            3 => Self::AnsweredIncoming,
            4 => Self::Voicemail,
            5 => Self::Rejected,
            6 => Self::Blocked,
            other => Self::Other(other),
        }
    }
}

impl From<CallType> for i32 {
    fn from(call_type: CallType) -> Self {
        call_type.code()
    }
}

impl Default for CallType {
    fn default() -> Self {
        Self::Other(0)
    }
}

impl fmt::Display for CallType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissedIncoming => write!(f, "missed"),
            Self::Outgoing => write!(f, "outgoing"),
            Self::AnsweredIncoming => write!(f, "incoming"),
            Self::Voicemail => write!(f, "voicemail"),
            Self::Rejected => write!(f, "rejected"),
            Self::Blocked => write!(f, "blocked"),
            Self::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// A single call log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CallLogEntry {
    /// Store-assigned row identifier, 0 for a record not yet inserted
    #[serde(default)]
    pub id: i64,

    /// Remote phone number. May be blank in raw store data; blank numbers
    /// are replaced with an `unknown_<id>` placeholder before serialization.
    #[serde(rename = "num", alias = "number", default)]
    pub number: String,

    /// Type of the call
    #[serde(rename = "type", default)]
    pub kind: CallType,

    /// Epoch-millisecond timestamp of the call
    #[serde(default)]
    pub date: i64,

    /// Call duration in seconds
    #[serde(rename = "dur", alias = "duration", default)]
    pub duration: i64,

    /// Display name cached by the store at capture time, if the number
    /// resolved to a contact back then
    #[serde(rename = "name", alias = "contact", default)]
    pub cached_name: Option<String>,
}

impl CallLogEntry {
    /// True if the number carries no usable content
    pub fn has_blank_number(&self) -> bool {
        self.number.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_type_codes_round_trip() {
        for code in 0..8 {
            assert_eq!(CallType::from(code).code(), code);
        }
    }

    #[test]
    fn test_wire_field_names() {
        let entry = CallLogEntry {
            id: 1,
            number: "5551234567".into(),
            kind: CallType::Outgoing,
            date: 1_700_000_000_000,
            duration: 95,
            cached_name: Some("Dana".into()),
        };

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["num"], "5551234567");
        assert_eq!(json["type"], 2);
        assert_eq!(json["dur"], 95);
        assert_eq!(json["name"], "Dana");
    }

    #[test]
    fn test_decode_accepts_long_aliases_and_defaults() {
        let entry: CallLogEntry =
            serde_json::from_str(r#"{"number": "555", "duration": 3, "contact": "Kim"}"#).unwrap();
        assert_eq!(entry.number, "555");
        assert_eq!(entry.duration, 3);
        assert_eq!(entry.cached_name.as_deref(), Some("Kim"));
        assert_eq!(entry.id, 0);
        assert_eq!(entry.kind, CallType::Other(0));
    }
}
