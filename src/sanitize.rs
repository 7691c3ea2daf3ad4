//! Record sanitization
//!
//! Raw store data is messy: blank addresses, control characters embedded in
//! free-text fields, numbers in arbitrary formats. These passes bring
//! records into the shape the snapshot schema promises, without ever
//! dropping a record. All passes are pure and idempotent.

use crate::models::{CallLogEntry, ContactRecord, Message};
use crate::phone;

/// Prefix of the placeholder synthesized for records with a blank
/// address/number. The suffix is the record's store id, keeping the
/// placeholder unique per record so grouping never folds unrelated
/// no-address records into one "unknown" bucket.
pub const UNKNOWN_PREFIX: &str = "unknown_";

/// Whether an address/number is a synthesized placeholder
pub fn is_placeholder(value: &str) -> bool {
    value.starts_with(UNKNOWN_PREFIX)
}

/// Replace blank message addresses with `unknown_<id>` placeholders.
///
/// Only the address is touched; id, body, date, kind, and flags pass
/// through unchanged.
pub fn sanitize_messages(messages: Vec<Message>) -> Vec<Message> {
    messages
        .into_iter()
        .map(|mut message| {
            if message.has_blank_address() {
                message.address = format!("{}{}", UNKNOWN_PREFIX, message.id);
            }
            message
        })
        .collect()
}

/// Replace blank call numbers with `unknown_<id>` placeholders and
/// normalize every real number.
///
/// Placeholders are skipped by the normalizer, which would otherwise strip
/// them down to their digit suffix on a second pass.
pub fn sanitize_call_logs(call_logs: Vec<CallLogEntry>) -> Vec<CallLogEntry> {
    call_logs
        .into_iter()
        .map(|mut entry| {
            if entry.has_blank_number() {
                entry.number = format!("{}{}", UNKNOWN_PREFIX, entry.id);
            } else if !is_placeholder(&entry.number) {
                entry.number = phone::normalize(&entry.number);
            }
            entry
        })
        .collect()
}

/// Strip control characters from every free-text field of every contact.
///
/// Store data has been observed to carry control characters that corrupt
/// the serialized snapshot or its re-import.
pub fn sanitize_contacts(contacts: Vec<ContactRecord>) -> Vec<ContactRecord> {
    contacts
        .into_iter()
        .map(|mut contact| {
            contact.name = strip_unprintable(&contact.name);
            for number in &mut contact.phones {
                *number = strip_unprintable(number);
            }
            if let Some(emails) = &mut contact.emails {
                for email in emails.iter_mut() {
                    *email = strip_unprintable(email);
                }
            }
            if let Some(addresses) = &mut contact.addresses {
                for address in addresses.iter_mut() {
                    address.kind = strip_unprintable(&address.kind);
                    address.value = strip_unprintable(&address.value);
                }
            }
            contact.note = contact.note.take().map(|note| strip_unprintable(&note));
            if let Some(groups) = &mut contact.groups {
                for group in groups.iter_mut() {
                    *group = strip_unprintable(group);
                }
            }
            if let Some(websites) = &mut contact.websites {
                for website in websites.iter_mut() {
                    *website = strip_unprintable(website);
                }
            }
            if let Some(events) = &mut contact.events {
                for event in events.iter_mut() {
                    event.kind = strip_unprintable(&event.kind);
                    event.date = strip_unprintable(&event.date);
                }
            }
            if let Some(relationships) = &mut contact.relationships {
                for relationship in relationships.iter_mut() {
                    relationship.kind = strip_unprintable(&relationship.kind);
                    relationship.name = strip_unprintable(&relationship.name);
                }
            }
            if let Some(profiles) = &mut contact.social_profiles {
                for profile in profiles.iter_mut() {
                    profile.kind = strip_unprintable(&profile.kind);
                    profile.value = strip_unprintable(&profile.value);
                }
            }
            contact
        })
        .collect()
}

/// Remove control characters, keeping all printable text intact
fn strip_unprintable(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}
