//! Path management for msgvault
//!
//! Provides platform-appropriate path resolution for configuration, the
//! local record stores, and the snapshot directory.
//!
//! ## Path Resolution Order
//!
//! 1. `MSGVAULT_DATA_DIR` environment variable (if set)
//! 2. The platform config directory via `directories`
//!    (Linux: `~/.config/msgvault`, macOS: `~/Library/Application
//!    Support/msgvault`, Windows: `%APPDATA%\msgvault`)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{VaultError, VaultResult};

/// Manages all paths used by msgvault
#[derive(Debug, Clone)]
pub struct VaultPaths {
    /// Base directory for all msgvault data
    base_dir: PathBuf,
}

impl VaultPaths {
    /// Create a new VaultPaths instance.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and the
    /// environment override is unset.
    pub fn new() -> VaultResult<Self> {
        let base_dir = if let Ok(custom) = std::env::var("MSGVAULT_DATA_DIR") {
            PathBuf::from(custom)
        } else {
            ProjectDirs::from("", "", "msgvault")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .ok_or_else(|| {
                    VaultError::Config("Could not determine a home directory".into())
                })?
        };

        Ok(Self { base_dir })
    }

    /// Create VaultPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the snapshot directory (base/backups/)
    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    /// Get the local record store directory (base/store/)
    pub fn store_dir(&self) -> PathBuf {
        self.base_dir.join("store")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Ensure all required directories exist
    pub fn ensure_directories(&self) -> VaultResult<()> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| VaultError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir())
            .map_err(|e| VaultError::Io(format!("Failed to create backup directory: {}", e)))?;

        std::fs::create_dir_all(self.store_dir())
            .map_err(|e| VaultError::Io(format!("Failed to create store directory: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
        assert_eq!(paths.store_dir(), temp_dir.path().join("store"));
        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = VaultPaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.backup_dir().exists());
        assert!(paths.store_dir().exists());
    }
}
