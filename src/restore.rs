//! Restore engine
//!
//! Replays a snapshot back into the device stores. The operation moves
//! through a fixed sequence of phases:
//!
//! ```text
//! Idle → Preparing → (write-role gate) → RestoringMessages
//!      → RestoringCallLogs → RestoringContacts → Completed | Failed
//! ```
//!
//! Only two conditions fail the whole operation: an unparseable snapshot,
//! and a snapshot that carries messages while the process does not hold
//! the exclusive message-store write role. Every other failure (a record
//! the store refuses, a contact whose atomic write errors) is logged,
//! absorbed, and reflected only in the final counts. A restore that
//! recovers 90% of the data reports success with count-qualified wording,
//! not failure.
//!
//! There is deliberately no cancellation: a restore runs to completion or
//! failure. The loops are per-record, so threading a token through them
//! later would not change the public contract.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::codec;
use crate::config::PacingSettings;
use crate::models::{CallLogEntry, ContactRecord, Message};
use crate::phone;
use crate::sanitize::{self, is_placeholder};
use crate::store::{CallLogStore, ContactStore, MessageStore, WriteRoleOracle};

/// Receives fine-grained progress from the engines.
///
/// Called from the engine's (background) execution context and observed
/// wherever the caller likes; implementations must be cheap and must never
/// block, since the restore loop fires them inline and does not wait for
/// acknowledgment.
pub trait ProgressReporter: Send + Sync {
    /// Report progress: phase label, percent within the phase (0..=100),
    /// human-readable detail
    fn update(&self, phase: &str, percent: u8, detail: &str);
}

/// A reporter that discards all updates
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn update(&self, _phase: &str, _percent: u8, _detail: &str) {}
}

/// Phases of a restore run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    /// Nothing running
    Idle,
    /// Reading and parsing the snapshot
    Preparing,
    /// Writing messages back
    RestoringMessages,
    /// Writing call logs back
    RestoringCallLogs,
    /// Writing contacts back
    RestoringContacts,
    /// Terminal: at least one record restored
    Completed,
    /// Terminal: parse failure, gate rejection, or nothing restored
    Failed,
}

impl RestorePhase {
    /// Short label used in progress updates
    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "prepare",
            Self::RestoringMessages => "messages",
            Self::RestoringCallLogs => "call-logs",
            Self::RestoringContacts => "contacts",
            Self::Completed => "done",
            Self::Failed => "failed",
        }
    }
}

/// Pacing of restore writes; see [`PacingSettings`]
#[derive(Debug, Clone)]
pub struct Pacing {
    /// Pause after every this many record writes
    pub records_per_pause: usize,
    /// Pause inserted per record batch
    pub record_pause: Duration,
    /// Pause inserted after each completed group
    pub group_pause: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Pacing::from(&PacingSettings::default())
    }
}

impl Pacing {
    /// No pauses at all (tests)
    pub fn none() -> Self {
        Self {
            records_per_pause: 10,
            record_pause: Duration::ZERO,
            group_pause: Duration::ZERO,
        }
    }
}

impl From<&PacingSettings> for Pacing {
    fn from(settings: &PacingSettings) -> Self {
        Self {
            records_per_pause: settings.records_per_pause.max(1),
            record_pause: Duration::from_millis(settings.record_pause_ms),
            group_pause: Duration::from_millis(settings.group_pause_ms),
        }
    }
}

/// Result of a restore operation
#[derive(Debug, Clone)]
pub struct RestoreResult {
    /// True if at least one record was restored across all categories
    pub success: bool,
    /// Human-readable summary with per-category counts, or the failure
    /// reason
    pub message: String,
    /// Messages restored
    pub restored_messages: usize,
    /// Call log entries restored
    pub restored_call_logs: usize,
    /// Contacts restored
    pub restored_contacts: usize,
}

impl RestoreResult {
    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            restored_messages: 0,
            restored_call_logs: 0,
            restored_contacts: 0,
        }
    }
}

/// Replays snapshots into a set of stores
pub struct RestoreEngine<'a> {
    messages: &'a dyn MessageStore,
    call_logs: &'a dyn CallLogStore,
    contacts: &'a dyn ContactStore,
    write_role: &'a dyn WriteRoleOracle,
    pacing: Pacing,
}

impl<'a> RestoreEngine<'a> {
    /// Create a restore engine with default pacing
    pub fn new(
        messages: &'a dyn MessageStore,
        call_logs: &'a dyn CallLogStore,
        contacts: &'a dyn ContactStore,
        write_role: &'a dyn WriteRoleOracle,
    ) -> Self {
        Self {
            messages,
            call_logs,
            contacts,
            write_role,
            pacing: Pacing::default(),
        }
    }

    /// Override the write pacing
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Restore the snapshot at `snapshot_path`, reporting progress along
    /// the way. Never panics and never errors: the outcome, good or bad,
    /// is the returned [`RestoreResult`].
    pub fn restore(&self, snapshot_path: &Path, progress: &dyn ProgressReporter) -> RestoreResult {
        tracing::info!("restoring from {}", snapshot_path.display());
        progress.update(RestorePhase::Preparing.label(), 0, "reading snapshot");

        let bytes = match fs::read(snapshot_path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!("cannot read snapshot file: {}", err);
                return RestoreResult::failed(format!("cannot read snapshot file: {}", err));
            }
        };

        let snapshot = match codec::decode(&bytes) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::error!("cannot parse snapshot file: {}", err);
                return RestoreResult::failed(format!("cannot parse snapshot file: {}", err));
            }
        };
        progress.update(
            RestorePhase::Preparing.label(),
            100,
            &format!(
                "snapshot parsed: {} messages, {} call logs, {} contacts",
                snapshot.message_count(),
                snapshot.call_log_count(),
                snapshot.contact_count()
            ),
        );

        // Hard precondition, checked before any store is touched: writing
        // messages requires the exclusive message-handler role. Acquiring
        // it is an OS workflow that belongs to the caller, so this is not
        // retried here. An absent message category skips the gate along
        // with the phase; an empty one enters the phase but writes nothing
        // and needs no role.
        let has_messages = snapshot.messages.as_ref().is_some_and(|m| !m.is_empty());
        if has_messages && !self.write_role.holds_write_role() {
            let err = crate::error::VaultError::WriteRoleRequired;
            tracing::warn!("restore rejected: {}", err);
            return RestoreResult::failed(err.to_string());
        }

        let restored_messages = match &snapshot.messages {
            Some(messages) => self.restore_messages(messages, progress),
            None => {
                tracing::info!("snapshot has no message category, skipping");
                0
            }
        };

        let restored_call_logs = match &snapshot.call_logs {
            Some(entries) => self.restore_call_logs(entries, progress),
            None => {
                tracing::info!("snapshot has no call-log category, skipping");
                0
            }
        };

        let restored_contacts = match &snapshot.contacts {
            Some(contacts) => self.restore_contacts(contacts, progress),
            None => {
                tracing::info!("snapshot has no contact category, skipping");
                0
            }
        };

        let success = restored_messages + restored_call_logs + restored_contacts > 0;
        let message = if success {
            format!(
                "Restored {} messages, {} call log entries, and {} contacts",
                restored_messages, restored_call_logs, restored_contacts
            )
        } else {
            "No records could be restored".to_string()
        };

        let terminal = if success {
            RestorePhase::Completed
        } else {
            RestorePhase::Failed
        };
        progress.update(terminal.label(), 100, &message);
        tracing::info!("restore finished: {}", message);

        RestoreResult {
            success,
            message,
            restored_messages,
            restored_call_logs,
            restored_contacts,
        }
    }

    /// Restore messages grouped by conversation.
    ///
    /// The first message of each group is inserted without a thread id and
    /// adopts the one the store assigns; the rest of the group reuses it,
    /// so every message from one sender lands in a single conversation
    /// regardless of the thread ids the source device used.
    fn restore_messages(&self, messages: &[Message], progress: &dyn ProgressReporter) -> usize {
        let total = messages.len();
        progress.update(
            RestorePhase::RestoringMessages.label(),
            0,
            &format!("restoring {} messages", total),
        );
        if total == 0 {
            return 0;
        }

        let groups = group_messages(prepare_messages(messages.to_vec()));
        tracing::info!(
            "restoring {} messages across {} conversations",
            total,
            groups.len()
        );

        let step = progress_step(total, 20);
        let mut processed = 0usize;
        let mut restored = 0usize;

        for (address, group) in groups {
            let mut thread_id: Option<i64> = None;
            for message in &group {
                match self.messages.insert_message(message, thread_id) {
                    Ok(inserted) => {
                        restored += 1;
                        thread_id = Some(inserted.thread_id);
                    }
                    Err(err) => {
                        tracing::error!(
                            "failed to restore message to {}: {}",
                            message.address,
                            err
                        );
                    }
                }

                processed += 1;
                if processed % step == 0 || processed == total {
                    progress.update(
                        RestorePhase::RestoringMessages.label(),
                        percent(processed, total),
                        &format!("restored {}/{} messages", processed, total),
                    );
                }
                self.pause_between_records(processed);
            }

            progress.update(
                RestorePhase::RestoringMessages.label(),
                percent(processed, total),
                &format!("conversation with {} done", address),
            );
            self.pause_between_groups();
        }

        tracing::info!("message restore complete: {}/{}", restored, total);
        restored
    }

    /// Restore call logs, enriching entries that lack a cached contact
    /// name via reverse lookup. Enrichment is best effort; a miss costs
    /// nothing.
    fn restore_call_logs(
        &self,
        entries: &[CallLogEntry],
        progress: &dyn ProgressReporter,
    ) -> usize {
        let total = entries.len();
        progress.update(
            RestorePhase::RestoringCallLogs.label(),
            0,
            &format!("restoring {} call log entries", total),
        );
        if total == 0 {
            return 0;
        }

        let groups = group_call_logs(sanitize::sanitize_call_logs(entries.to_vec()));
        tracing::info!(
            "restoring {} call log entries across {} numbers",
            total,
            groups.len()
        );

        let step = progress_step(total, 20);
        let mut processed = 0usize;
        let mut restored = 0usize;

        for (_, group) in groups {
            for mut entry in group {
                if entry.cached_name.is_none() && !is_placeholder(&entry.number) {
                    entry.cached_name = self.contact_name_for(&entry.number);
                }

                match self.call_logs.insert_call_log(&entry) {
                    Ok(_) => restored += 1,
                    Err(err) => {
                        tracing::error!(
                            "failed to restore call log for {}: {}",
                            entry.number,
                            err
                        );
                    }
                }

                processed += 1;
                if processed % step == 0 || processed == total {
                    progress.update(
                        RestorePhase::RestoringCallLogs.label(),
                        percent(processed, total),
                        &format!("restored {}/{} call log entries", processed, total),
                    );
                }
                self.pause_between_records(processed);
            }
            self.pause_between_groups();
        }

        tracing::info!("call-log restore complete: {}/{}", restored, total);
        restored
    }

    /// Restore contacts one atomic insert at a time. A failed contact is
    /// skipped, never fatal to the batch.
    fn restore_contacts(
        &self,
        contacts: &[ContactRecord],
        progress: &dyn ProgressReporter,
    ) -> usize {
        let total = contacts.len();
        progress.update(
            RestorePhase::RestoringContacts.label(),
            0,
            &format!("restoring {} contacts", total),
        );
        if total == 0 {
            return 0;
        }

        let sanitized = sanitize::sanitize_contacts(contacts.to_vec());
        let step = progress_step(total, 10);
        let mut restored = 0usize;

        for (index, contact) in sanitized.iter().enumerate() {
            match self.contacts.insert_contact(contact) {
                Ok(_) => restored += 1,
                Err(err) => {
                    tracing::error!("failed to restore contact {}: {}", contact.name, err);
                }
            }

            let done = index + 1;
            if done % step == 0 || done == total {
                progress.update(
                    RestorePhase::RestoringContacts.label(),
                    percent(done, total),
                    &format!("restored {}/{} contacts", done, total),
                );
            }
        }

        tracing::info!("contact restore complete: {}/{}", restored, total);
        restored
    }

    /// Resolve a number to a display name, trying the exact normalized
    /// form first and then its de-prefixed variants
    fn contact_name_for(&self, number: &str) -> Option<String> {
        if let Ok(Some(name)) = self.contacts.display_name_for(number) {
            return Some(name);
        }
        for variant in phone::variants(number) {
            if let Ok(Some(name)) = self.contacts.display_name_for(&variant) {
                tracing::debug!("matched contact for {} via variant {}", number, variant);
                return Some(name);
            }
        }
        None
    }

    fn pause_between_records(&self, processed: usize) {
        if !self.pacing.record_pause.is_zero() && processed % self.pacing.records_per_pause == 0 {
            std::thread::sleep(self.pacing.record_pause);
        }
    }

    fn pause_between_groups(&self) {
        if !self.pacing.group_pause.is_zero() {
            std::thread::sleep(self.pacing.group_pause);
        }
    }
}

/// Sanitize and canonicalize message addresses for grouping. Addresses
/// that normalize to nothing (letters only, say) fall back to the
/// placeholder so the non-empty invariant holds.
fn prepare_messages(messages: Vec<Message>) -> Vec<Message> {
    sanitize::sanitize_messages(messages)
        .into_iter()
        .map(|mut message| {
            if !is_placeholder(&message.address) {
                let normalized = phone::normalize(&message.address);
                message.address = if normalized.is_empty() {
                    format!("{}{}", sanitize::UNKNOWN_PREFIX, message.id)
                } else {
                    normalized
                };
            }
            message
        })
        .collect()
}

/// Group messages into conversations, first-seen order, oldest first
/// within each group.
///
/// A message joins an existing group when [`phone::matches`] accepts the
/// group key, which unifies renderings of one number that differ only in
/// prefix convention. Placeholder addresses group by exact string: their
/// digit tails are record ids, not phone numbers.
fn group_messages(messages: Vec<Message>) -> Vec<(String, Vec<Message>)> {
    let mut groups: Vec<(String, Vec<Message>)> = Vec::new();

    for message in messages {
        let slot = groups.iter_mut().find(|(key, _)| {
            if is_placeholder(key) || is_placeholder(&message.address) {
                *key == message.address
            } else {
                phone::matches(key, &message.address)
            }
        });
        match slot {
            Some((_, members)) => members.push(message),
            None => groups.push((message.address.clone(), vec![message])),
        }
    }

    for (_, members) in &mut groups {
        members.sort_by_key(|m| m.date);
    }

    groups
}

/// Group call logs by sanitized number, first-seen order. Purely an
/// insert-locality batching; call logs carry no thread semantics.
fn group_call_logs(entries: Vec<CallLogEntry>) -> Vec<(String, Vec<CallLogEntry>)> {
    let mut groups: Vec<(String, Vec<CallLogEntry>)> = Vec::new();

    for entry in entries {
        match groups.iter_mut().find(|(key, _)| *key == entry.number) {
            Some((_, members)) => members.push(entry),
            None => groups.push((entry.number.clone(), vec![entry])),
        }
    }

    groups
}

/// Step between progress updates: roughly `target` updates across the run
/// regardless of record count, every record for small runs
fn progress_step(total: usize, target: usize) -> usize {
    if total > 100 {
        (total / target).max(1)
    } else {
        1
    }
}

fn percent(processed: usize, total: usize) -> u8 {
    if total == 0 {
        100
    } else {
        ((processed * 100) / total) as u8
    }
}
