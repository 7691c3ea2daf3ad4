//! User settings for msgvault
//!
//! Covers the handful of knobs the pipeline exposes: the device label used
//! in snapshot file names, call-log query windowing, and the pacing of
//! restore writes.

use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};
use crate::source::{DEFAULT_CALL_LOG_HISTORY_DAYS, DEFAULT_CALL_LOG_WINDOWS};
use crate::store::file_io;

use super::paths::VaultPaths;

/// Pacing of restore writes.
///
/// Store write paths tolerate bursts poorly; a short pause every few
/// records and after each conversation keeps the restore from saturating
/// them. Set the pauses to zero to disable (tests do).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingSettings {
    /// Pause after every this many record writes
    #[serde(default = "default_records_per_pause")]
    pub records_per_pause: usize,

    /// Per-record-batch pause in milliseconds
    #[serde(default = "default_record_pause_ms")]
    pub record_pause_ms: u64,

    /// Pause after each completed group in milliseconds
    #[serde(default = "default_group_pause_ms")]
    pub group_pause_ms: u64,
}

impl Default for PacingSettings {
    fn default() -> Self {
        Self {
            records_per_pause: default_records_per_pause(),
            record_pause_ms: default_record_pause_ms(),
            group_pause_ms: default_group_pause_ms(),
        }
    }
}

/// User settings for msgvault
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Device label stamped into snapshot file names and device_info
    #[serde(default = "default_device_label")]
    pub device_label: String,

    /// Number of time windows a call-log read is partitioned into
    #[serde(default = "default_call_log_windows")]
    pub call_log_windows: u32,

    /// How many days of call history a backup captures
    #[serde(default = "default_call_log_history_days")]
    pub call_log_history_days: u32,

    /// Restore write pacing
    #[serde(default)]
    pub pacing: PacingSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_device_label() -> String {
    "device".to_string()
}

fn default_call_log_windows() -> u32 {
    DEFAULT_CALL_LOG_WINDOWS
}

fn default_call_log_history_days() -> u32 {
    DEFAULT_CALL_LOG_HISTORY_DAYS
}

fn default_records_per_pause() -> usize {
    10
}

fn default_record_pause_ms() -> u64 {
    50
}

fn default_group_pause_ms() -> u64 {
    100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            device_label: default_device_label(),
            call_log_windows: default_call_log_windows(),
            call_log_history_days: default_call_log_history_days(),
            pacing: PacingSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, creating the file with defaults if absent
    pub fn load_or_create(paths: &VaultPaths) -> VaultResult<Self> {
        let settings_file = paths.settings_file();

        if settings_file.exists() {
            let settings: Settings = file_io::read_json(&settings_file)
                .map_err(|e| VaultError::Config(format!("Failed to load settings: {}", e)))?;
            Ok(settings)
        } else {
            let settings = Settings::default();
            settings.save(paths)?;
            Ok(settings)
        }
    }

    /// Persist settings to disk
    pub fn save(&self, paths: &VaultPaths) -> VaultResult<()> {
        paths.ensure_directories()?;
        file_io::write_json_atomic(paths.settings_file(), self)
            .map_err(|e| VaultError::Config(format!("Failed to save settings: {}", e)))
    }
}
