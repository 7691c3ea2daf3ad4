//! Contact model
//!
//! Represents a contact with its satellite attributes (phones, emails,
//! postal addresses, note, groups, websites, events, relationships, social
//! profiles). Satellite collections are optional: `None` means the
//! attribute was absent, which is distinct from an empty list and survives
//! serialization round-trips.

use serde::{Deserialize, Serialize};

/// A typed postal address attached to a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactAddress {
    /// Address type label (home, work, ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Formatted address text
    #[serde(default)]
    pub value: String,
}

/// A dated event attached to a contact (birthday, anniversary, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEvent {
    /// Event type label
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Event date as stored (free-form string)
    #[serde(default)]
    pub date: String,
}

/// A named relationship attached to a contact (spouse, child, ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRelationship {
    /// Relationship type label
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Name of the related person
    #[serde(default)]
    pub name: String,
}

/// A social media profile attached to a contact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfile {
    /// Network/service label
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Handle or profile link
    #[serde(default)]
    pub value: String,
}

/// A contact and its satellite attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContactRecord {
    /// Store-assigned identifier, 0 for a record not yet inserted
    #[serde(default)]
    pub id: i64,

    /// Display name, possibly blank
    #[serde(default)]
    pub name: String,

    /// Phone numbers in store order
    #[serde(rename = "phones", alias = "phone_numbers", default)]
    pub phones: Vec<String>,

    /// Email addresses
    #[serde(default)]
    pub emails: Option<Vec<String>>,

    /// Postal addresses
    #[serde(default)]
    pub addresses: Option<Vec<ContactAddress>>,

    /// Free-text note
    #[serde(default)]
    pub note: Option<String>,

    /// Group memberships by group name
    #[serde(default)]
    pub groups: Option<Vec<String>>,

    /// Website URLs
    #[serde(default)]
    pub websites: Option<Vec<String>>,

    /// Events (birthday, anniversary, ...)
    #[serde(default)]
    pub events: Option<Vec<ContactEvent>>,

    /// Relationships (spouse, child, ...)
    #[serde(default)]
    pub relationships: Option<Vec<ContactRelationship>>,

    /// Social media profiles
    #[serde(rename = "social_profiles", default)]
    pub social_profiles: Option<Vec<SocialProfile>>,
}

impl ContactRecord {
    /// Whether this contact carries any identifying data.
    ///
    /// A contact with a blank name, no phone numbers, and no emails is not
    /// worth keeping in a snapshot and is dropped at capture time.
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty()
            || !self.phones.is_empty()
            || self.emails.as_ref().is_some_and(|emails| !emails.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_identity() {
        let empty = ContactRecord::default();
        assert!(!empty.has_identity());

        let named = ContactRecord {
            name: "Ada".into(),
            ..ContactRecord::default()
        };
        assert!(named.has_identity());

        let phone_only = ContactRecord {
            phones: vec!["5551234567".into()],
            ..ContactRecord::default()
        };
        assert!(phone_only.has_identity());

        let email_only = ContactRecord {
            emails: Some(vec!["ada@example.com".into()]),
            ..ContactRecord::default()
        };
        assert!(email_only.has_identity());

        let empty_email_list = ContactRecord {
            emails: Some(Vec::new()),
            ..ContactRecord::default()
        };
        assert!(!empty_email_list.has_identity());
    }

    #[test]
    fn test_satellite_wire_names() {
        let contact = ContactRecord {
            id: 4,
            name: "Ada".into(),
            phones: vec!["5551234567".into()],
            addresses: Some(vec![ContactAddress {
                kind: "home".into(),
                value: "1 Main St".into(),
            }]),
            events: Some(vec![ContactEvent {
                kind: "birthday".into(),
                date: "1990-01-02".into(),
            }]),
            social_profiles: Some(vec![SocialProfile {
                kind: "Fediverse".into(),
                value: "@ada@example.com".into(),
            }]),
            ..ContactRecord::default()
        };

        let json = serde_json::to_value(&contact).unwrap();
        assert_eq!(json["phones"][0], "5551234567");
        assert_eq!(json["addresses"][0]["type"], "home");
        assert_eq!(json["events"][0]["date"], "1990-01-02");
        assert_eq!(json["social_profiles"][0]["value"], "@ada@example.com");
        // Absent satellites serialize as null, not as empty lists.
        assert!(json["emails"].is_null());
        assert!(json["groups"].is_null());
    }

    #[test]
    fn test_decode_defaults() {
        let contact: ContactRecord = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(contact.name, "Ada");
        assert!(contact.phones.is_empty());
        assert!(contact.emails.is_none());
        assert!(contact.note.is_none());
    }
}
