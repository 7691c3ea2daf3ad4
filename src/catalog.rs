//! Snapshot catalog
//!
//! Enumerates, validates, and indexes the snapshot files in the backup
//! directory. Every candidate is validated by a full decode; files that
//! fail to decode are silently excluded, since they may be partial or
//! corrupt leftovers of an interrupted backup rather than user errors
//! worth reporting.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::codec;
use crate::config::VaultPaths;
use crate::error::{VaultError, VaultResult};

/// A validated snapshot file and the facts worth showing before a restore
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    /// Full path of the file
    pub path: PathBuf,
    /// File name
    pub file_name: String,
    /// File size in bytes
    pub file_size: u64,
    /// Capture time recorded inside the snapshot
    pub created_at: DateTime<Utc>,
    /// Device string recorded inside the snapshot
    pub device_label: String,
    /// Message count, peeked from the snapshot during cataloging
    pub sms_count: usize,
    /// Call-log count, peeked from the snapshot during cataloging
    pub call_log_count: usize,
}

/// Catalog over the snapshot files in one directory
pub struct SnapshotCatalog {
    backup_dir: PathBuf,
}

impl SnapshotCatalog {
    /// Create a catalog over the configured backup directory
    pub fn new(paths: &VaultPaths) -> Self {
        Self {
            backup_dir: paths.backup_dir(),
        }
    }

    /// Create a catalog over an explicit directory
    pub fn with_dir(backup_dir: PathBuf) -> Self {
        Self { backup_dir }
    }

    /// List all valid snapshots, newest first
    pub fn list_snapshots(&self) -> VaultResult<Vec<SnapshotFile>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut snapshots = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| VaultError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| VaultError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                match self.read_entry(&path) {
                    Some(snapshot) => snapshots.push(snapshot),
                    None => {
                        tracing::debug!("excluding undecodable file {}", path.display());
                    }
                }
            }
        }

        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(snapshots)
    }

    /// Whether the file at `path` decodes as a snapshot. Pure check, no
    /// side effects.
    pub fn validate(&self, path: &Path) -> bool {
        fs::read(path)
            .ok()
            .map_or(false, |bytes| codec::decode(&bytes).is_ok())
    }

    /// Look up a catalog entry by file name
    pub fn find(&self, file_name: &str) -> VaultResult<Option<SnapshotFile>> {
        let path = self.backup_dir.join(file_name);
        if path.exists() {
            Ok(self.read_entry(&path))
        } else {
            Ok(None)
        }
    }

    /// The most recent snapshot, if any
    pub fn latest(&self) -> VaultResult<Option<SnapshotFile>> {
        Ok(self.list_snapshots()?.into_iter().next())
    }

    /// Build a catalog entry by decoding the file; `None` if it does not
    /// decode as a snapshot
    fn read_entry(&self, path: &Path) -> Option<SnapshotFile> {
        let bytes = fs::read(path).ok()?;
        let snapshot = codec::decode(&bytes).ok()?;
        let metadata = fs::metadata(path).ok()?;

        // The capture timestamp inside the snapshot outlives file copies
        // and downloads; mtime does not.
        let created_at = DateTime::from_timestamp_millis(snapshot.timestamp)
            .unwrap_or_else(|| DateTime::<Utc>::MIN_UTC);

        Some(SnapshotFile {
            path: path.to_path_buf(),
            file_name: path.file_name()?.to_string_lossy().to_string(),
            file_size: metadata.len(),
            created_at,
            device_label: snapshot.device_info.clone(),
            sms_count: snapshot.message_count(),
            call_log_count: snapshot.call_log_count(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Snapshot};
    use tempfile::TempDir;

    fn write_snapshot(dir: &Path, name: &str, snapshot: &Snapshot) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, codec::encode(snapshot).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_list_sorts_newest_first_and_peeks_counts() {
        let temp_dir = TempDir::new().unwrap();

        let mut older = Snapshot::empty(1_000, "dev");
        older.messages = Some(vec![Message::default(), Message::default()]);
        write_snapshot(temp_dir.path(), "older.json", &older);

        let newer = Snapshot::empty(2_000, "dev");
        write_snapshot(temp_dir.path(), "newer.json", &newer);

        let catalog = SnapshotCatalog::with_dir(temp_dir.path().to_path_buf());
        let snapshots = catalog.list_snapshots().unwrap();

        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0].file_name, "newer.json");
        assert_eq!(snapshots[1].sms_count, 2);
        assert_eq!(snapshots[0].sms_count, 0);
    }

    #[test]
    fn test_empty_and_missing_lists_both_catalog_as_zero() {
        let temp_dir = TempDir::new().unwrap();

        let mut empty_list = Snapshot::empty(2_000, "dev");
        empty_list.messages = Some(Vec::new());
        write_snapshot(temp_dir.path(), "empty.json", &empty_list);

        let missing_list = Snapshot::empty(1_000, "dev");
        write_snapshot(temp_dir.path(), "missing.json", &missing_list);

        let catalog = SnapshotCatalog::with_dir(temp_dir.path().to_path_buf());
        let snapshots = catalog.list_snapshots().unwrap();
        assert!(snapshots.iter().all(|s| s.sms_count == 0));
    }

    #[test]
    fn test_corrupt_files_silently_excluded() {
        let temp_dir = TempDir::new().unwrap();

        write_snapshot(temp_dir.path(), "good.json", &Snapshot::empty(1, "dev"));
        fs::write(temp_dir.path().join("truncated.json"), "{\"messages\": [").unwrap();
        fs::write(temp_dir.path().join("junk.json"), "not json").unwrap();
        fs::write(temp_dir.path().join("ignored.txt"), "not a snapshot").unwrap();

        let catalog = SnapshotCatalog::with_dir(temp_dir.path().to_path_buf());
        let snapshots = catalog.list_snapshots().unwrap();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].file_name, "good.json");
    }

    #[test]
    fn test_validate() {
        let temp_dir = TempDir::new().unwrap();
        let good = write_snapshot(temp_dir.path(), "good.json", &Snapshot::empty(1, "dev"));
        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "nope").unwrap();

        let catalog = SnapshotCatalog::with_dir(temp_dir.path().to_path_buf());
        assert!(catalog.validate(&good));
        assert!(!catalog.validate(&bad));
        assert!(!catalog.validate(&temp_dir.path().join("absent.json")));
    }

    #[test]
    fn test_find_and_latest() {
        let temp_dir = TempDir::new().unwrap();
        write_snapshot(temp_dir.path(), "a.json", &Snapshot::empty(1_000, "dev"));
        write_snapshot(temp_dir.path(), "b.json", &Snapshot::empty(9_000, "dev"));

        let catalog = SnapshotCatalog::with_dir(temp_dir.path().to_path_buf());
        assert_eq!(catalog.find("a.json").unwrap().unwrap().file_name, "a.json");
        assert!(catalog.find("zzz.json").unwrap().is_none());
        assert_eq!(catalog.latest().unwrap().unwrap().file_name, "b.json");
    }

    #[test]
    fn test_missing_directory_lists_empty() {
        let catalog = SnapshotCatalog::with_dir(PathBuf::from("/nonexistent/msgvault-test"));
        assert!(catalog.list_snapshots().unwrap().is_empty());
    }
}
