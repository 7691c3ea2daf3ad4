//! Custom error types for msgvault
//!
//! This module defines the error hierarchy for the pipeline using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for msgvault operations
#[derive(Error, Debug)]
pub enum VaultError {
    /// Read or write access to a record category is not authorized.
    ///
    /// Non-fatal during backup: the category is simply not captured.
    #[error("Permission denied for {category}")]
    PermissionDenied {
        /// The record category that could not be accessed
        category: &'static str,
    },

    /// The process does not hold the exclusive write role over the message
    /// store. Fatal to a restore that carries messages, but recoverable:
    /// the caller acquires the role and invokes restore again.
    #[error("Restoring messages requires the exclusive message-store write role")]
    WriteRoleRequired,

    /// A snapshot file could not be parsed; the file is unusable.
    #[error("Parse error: {0}")]
    Parse(String),

    /// File system errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Record store read/write errors
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },
}

impl VaultError {
    /// Create a "permission denied" error for a record category
    pub fn permission_denied(category: &'static str) -> Self {
        Self::PermissionDenied { category }
    }

    /// Create a "not found" error for snapshot files
    pub fn snapshot_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Snapshot",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a permission error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Check if this is a parse error
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for VaultError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for msgvault operations
pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VaultError::Parse("unexpected end of input".into());
        assert_eq!(err.to_string(), "Parse error: unexpected end of input");
    }

    #[test]
    fn test_permission_denied() {
        let err = VaultError::permission_denied("messages");
        assert_eq!(err.to_string(), "Permission denied for messages");
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_snapshot_not_found() {
        let err = VaultError::snapshot_not_found("latest");
        assert_eq!(err.to_string(), "Snapshot not found: latest");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let vault_err: VaultError = io_err.into();
        assert!(matches!(vault_err, VaultError::Io(_)));
    }
}
