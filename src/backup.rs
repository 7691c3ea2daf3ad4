//! Backup engine
//!
//! Orchestrates the backup direction of the pipeline: read the stores,
//! sanitize, wrap in a snapshot, encode, and write a deterministically
//! named file into the backup directory. The whole operation is reported
//! through a [`BackupResult`]; nothing errors across this boundary.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::codec;
use crate::config::{Settings, VaultPaths};
use crate::error::VaultResult;
use crate::models::Snapshot;
use crate::sanitize;
use crate::source::{CapturedRecords, SourceReader};
use crate::store::{CallLogStore, ContactStore, MessageStore};

/// Result of a backup operation
#[derive(Debug, Clone)]
pub struct BackupResult {
    /// When the backup ran
    pub timestamp: DateTime<Utc>,
    /// Messages written into the snapshot
    pub message_count: usize,
    /// Call log entries written into the snapshot
    pub call_log_count: usize,
    /// Contacts written into the snapshot
    pub contact_count: usize,
    /// Path of the snapshot file, `None` on failure
    pub file_path: Option<PathBuf>,
    /// Failure description, `None` on success
    pub error_message: Option<String>,
}

impl BackupResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            message_count: 0,
            call_log_count: 0,
            contact_count: 0,
            file_path: None,
            error_message: Some(message.into()),
        }
    }

    /// Whether the backup produced a snapshot file
    pub fn is_success(&self) -> bool {
        self.file_path.is_some() && self.error_message.is_none()
    }

    /// Human-readable one-line summary
    pub fn summary(&self) -> String {
        match (&self.file_path, &self.error_message) {
            (Some(path), None) => format!(
                "Backed up {} messages, {} call log entries, and {} contacts to {}",
                self.message_count,
                self.call_log_count,
                self.contact_count,
                path.display()
            ),
            (_, Some(error)) => format!("Backup failed: {}", error),
            (None, None) => "Backup produced no file".to_string(),
        }
    }
}

/// Runs backups against a set of stores
pub struct BackupEngine<'a> {
    messages: &'a dyn MessageStore,
    call_logs: &'a dyn CallLogStore,
    contacts: &'a dyn ContactStore,
    paths: &'a VaultPaths,
    settings: &'a Settings,
}

impl<'a> BackupEngine<'a> {
    /// Create a backup engine
    pub fn new(
        messages: &'a dyn MessageStore,
        call_logs: &'a dyn CallLogStore,
        contacts: &'a dyn ContactStore,
        paths: &'a VaultPaths,
        settings: &'a Settings,
    ) -> Self {
        Self {
            messages,
            call_logs,
            contacts,
            paths,
            settings,
        }
    }

    /// Run a full backup.
    ///
    /// Each category is captured independently; the backup aborts only when
    /// every category is either unreadable or empty. The written file is
    /// verified to be larger than an empty snapshot before success is
    /// reported, and deleted otherwise: a silently empty snapshot is worse
    /// than a visible failure.
    pub fn backup(&self) -> BackupResult {
        tracing::info!("starting backup");

        let reader = SourceReader::new(self.messages, self.call_logs, self.contacts)
            .with_call_log_windowing(
                self.settings.call_log_windows,
                self.settings.call_log_history_days,
            );
        let captured = reader.capture();

        if captured.is_empty() {
            tracing::warn!("backup aborted: no category produced any record");
            return BackupResult::failure("no records available to back up");
        }

        match self.write_snapshot(captured) {
            Ok(result) => {
                tracing::info!("backup complete: {}", result.summary());
                result
            }
            Err(err) => {
                tracing::error!("backup failed: {}", err);
                BackupResult::failure(err.to_string())
            }
        }
    }

    fn write_snapshot(&self, captured: CapturedRecords) -> VaultResult<BackupResult> {
        let now = Utc::now();

        let snapshot = Snapshot {
            messages: captured.messages.map(sanitize::sanitize_messages),
            call_logs: captured.call_logs.map(sanitize::sanitize_call_logs),
            contacts: captured.contacts.map(sanitize::sanitize_contacts),
            timestamp: now.timestamp_millis(),
            device_info: self.device_info(),
            format_version: crate::models::FORMAT_VERSION,
        };

        let bytes = codec::encode(&snapshot)?;

        fs::create_dir_all(self.paths.backup_dir())?;
        let file_path = self.paths.backup_dir().join(snapshot_file_name(
            &self.settings.device_label,
            now,
        ));
        fs::write(&file_path, &bytes)?;

        // A file no larger than an empty snapshot means serialization
        // dropped every record; keep the failure visible.
        let empty_floor = codec::encode(&Snapshot::empty(
            snapshot.timestamp,
            snapshot.device_info.as_str(),
        ))?
        .len() as u64;
        let written = fs::metadata(&file_path)?.len();
        if written <= empty_floor {
            tracing::error!(
                "snapshot file is {} bytes, no larger than an empty snapshot; deleting",
                written
            );
            let _ = fs::remove_file(&file_path);
            return Ok(BackupResult::failure("snapshot file failed size verification"));
        }

        Ok(BackupResult {
            timestamp: now,
            message_count: snapshot.message_count(),
            call_log_count: snapshot.call_log_count(),
            contact_count: snapshot.contact_count(),
            file_path: Some(file_path),
            error_message: None,
        })
    }

    fn device_info(&self) -> String {
        format!(
            "{} {} msgvault/{}",
            self.settings.device_label,
            std::env::consts::OS,
            env!("CARGO_PKG_VERSION")
        )
    }
}

/// Snapshot file name: `msgvault_<device-label>_<yyyy-MM-dd_HH-mm>.json`
pub fn snapshot_file_name(device_label: &str, timestamp: DateTime<Utc>) -> String {
    let device = device_label.replace(' ', "_");
    format!("msgvault_{}_{}.json", device, timestamp.format("%Y-%m-%d_%H-%M"))
}
