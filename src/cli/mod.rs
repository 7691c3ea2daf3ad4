//! CLI commands
//!
//! The thin collaborator layer over the engines: all policy lives in the
//! library, this module only parses arguments, wires up the local stores,
//! and prints results.

use std::path::PathBuf;

use clap::Subcommand;

use crate::backup::BackupEngine;
use crate::catalog::{SnapshotCatalog, SnapshotFile};
use crate::config::{Settings, VaultPaths};
use crate::error::{VaultError, VaultResult};
use crate::restore::{Pacing, ProgressReporter, RestoreEngine};
use crate::store::{FixedWriteRole, LocalCallLogStore, LocalContactStore, LocalMessageStore};

/// msgvault subcommands
#[derive(Subcommand)]
pub enum Commands {
    /// Back up the local stores into a new snapshot
    Backup,

    /// List all snapshots in the backup directory
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show information about a specific snapshot
    Info {
        /// Snapshot file name or path (use 'latest' for most recent)
        snapshot: String,
    },

    /// Check whether a file is a readable snapshot
    Validate {
        /// Snapshot file name or path
        snapshot: String,
    },

    /// Restore a snapshot into the local stores
    Restore {
        /// Snapshot file name or path (use 'latest' for most recent)
        snapshot: String,

        /// Assert that this process holds the message-store write role.
        /// Restoring a snapshot that contains messages is refused without
        /// it.
        #[arg(long)]
        message_role: bool,
    },
}

/// Progress reporter that prints one line per update
struct ConsoleProgress;

impl ProgressReporter for ConsoleProgress {
    fn update(&self, phase: &str, percent: u8, detail: &str) {
        println!("  [{}] {:>3}% {}", phase, percent, detail);
    }
}

/// Handle a parsed command
pub fn handle_command(paths: &VaultPaths, settings: &Settings, cmd: Commands) -> VaultResult<()> {
    let store_dir = paths.store_dir();
    let messages = LocalMessageStore::new(&store_dir);
    let call_logs = LocalCallLogStore::new(&store_dir);
    let contacts = LocalContactStore::new(&store_dir);
    let catalog = SnapshotCatalog::new(paths);

    match cmd {
        Commands::Backup => {
            println!("Creating snapshot...");
            let engine = BackupEngine::new(&messages, &call_logs, &contacts, paths, settings);
            let result = engine.backup();
            println!("{}", result.summary());
            if !result.is_success() {
                return Err(VaultError::Store(
                    result.error_message.unwrap_or_else(|| "backup failed".into()),
                ));
            }
        }

        Commands::List { verbose } => {
            let snapshots = catalog.list_snapshots()?;

            if snapshots.is_empty() {
                println!("No snapshots found.");
                println!("Create one with: msgvault backup");
                return Ok(());
            }

            println!("Available Snapshots");
            println!("===================");
            println!();

            for (i, snapshot) in snapshots.iter().enumerate() {
                if verbose {
                    println!(
                        "{}. {}\n   Captured: {}\n   Device: {}\n   Size: {}\n   Messages: {}, call logs: {}\n",
                        i + 1,
                        snapshot.file_name,
                        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        snapshot.device_label,
                        format_size(snapshot.file_size),
                        snapshot.sms_count,
                        snapshot.call_log_count,
                    );
                } else {
                    println!(
                        "  {}. {} ({} messages, {} call logs, {})",
                        i + 1,
                        snapshot.file_name,
                        snapshot.sms_count,
                        snapshot.call_log_count,
                        format_size(snapshot.file_size),
                    );
                }
            }

            println!();
            println!("Total: {} snapshot(s)", snapshots.len());
        }

        Commands::Info { snapshot } => {
            let entry = resolve_snapshot(&catalog, &snapshot)?;

            println!("Snapshot Details");
            println!("================");
            println!("File: {}", entry.path.display());
            println!("Size: {}", format_size(entry.file_size));
            println!(
                "Captured: {}",
                entry.created_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            println!("Device: {}", entry.device_label);
            println!();
            println!("Contents:");
            println!("  Messages:  {}", entry.sms_count);
            println!("  Call logs: {}", entry.call_log_count);
        }

        Commands::Validate { snapshot } => {
            let path = PathBuf::from(&snapshot);
            let path = if path.exists() {
                path
            } else {
                paths.backup_dir().join(&snapshot)
            };

            if catalog.validate(&path) {
                println!("Valid snapshot: {}", path.display());
            } else {
                println!("Not a readable snapshot: {}", path.display());
                return Err(VaultError::Parse(format!(
                    "{} is not a readable snapshot",
                    path.display()
                )));
            }
        }

        Commands::Restore {
            snapshot,
            message_role,
        } => {
            let entry = resolve_snapshot(&catalog, &snapshot)?;

            println!("Restoring from {}", entry.file_name);
            println!(
                "Captured {} with {} messages and {} call logs",
                entry.created_at.format("%Y-%m-%d %H:%M"),
                entry.sms_count,
                entry.call_log_count,
            );
            println!();

            let role = FixedWriteRole(message_role);
            let engine = RestoreEngine::new(&messages, &call_logs, &contacts, &role)
                .with_pacing(Pacing::from(&settings.pacing));
            let result = engine.restore(&entry.path, &ConsoleProgress);

            println!();
            println!("{}", result.message);
            if !result.success {
                if entry.sms_count > 0 && !message_role {
                    println!("Hint: re-run with --message-role once this process may write messages.");
                }
                return Err(VaultError::Store(result.message));
            }
        }
    }

    Ok(())
}

/// Resolve a snapshot identifier ('latest', a path, or a file name in the
/// backup directory) to a catalog entry
fn resolve_snapshot(catalog: &SnapshotCatalog, snapshot: &str) -> VaultResult<SnapshotFile> {
    if snapshot.eq_ignore_ascii_case("latest") {
        return catalog
            .latest()?
            .ok_or_else(|| VaultError::snapshot_not_found("latest"));
    }

    let path = PathBuf::from(snapshot);
    if path.exists() {
        return SnapshotCatalog::with_dir(path.parent().unwrap_or(&path).to_path_buf())
            .find(
                path.file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_default()
                    .as_str(),
            )?
            .ok_or_else(|| VaultError::snapshot_not_found(snapshot));
    }

    if let Some(entry) = catalog.find(snapshot)? {
        return Ok(entry);
    }

    let with_ext = format!("{}.json", snapshot);
    if let Some(entry) = catalog.find(&with_ext)? {
        return Ok(entry);
    }

    Err(VaultError::snapshot_not_found(snapshot))
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
