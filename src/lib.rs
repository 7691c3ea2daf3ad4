//! msgvault - portable backup and restore for personal communication records
//!
//! This library captures three categories of records (text messages, call
//! history, and contacts) from a device's stores into a single versioned
//! snapshot file, and replays snapshots back into the stores with
//! best-effort, per-record fault tolerance.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (messages, call logs, contacts, snapshot)
//! - `phone`: Phone number normalization and fuzzy matching
//! - `sanitize`: Record sanitization passes
//! - `codec`: Snapshot serialization
//! - `store`: Record store traits and the local/in-memory implementations
//! - `source`: Reading records out of the stores
//! - `backup`: The backup engine
//! - `catalog`: Snapshot file cataloging
//! - `restore`: The restore engine and progress reporting
//! - `cli`: Command-line interface
//!
//! # Example
//!
//! ```rust,ignore
//! use msgvault::backup::BackupEngine;
//! use msgvault::config::{paths::VaultPaths, settings::Settings};
//!
//! let paths = VaultPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! ```
//!
//! Backup and restore are synchronous, strictly sequential operations;
//! run them off the interaction thread. Concurrent backup and restore are
//! not supported; callers must serialize them.

pub mod backup;
pub mod catalog;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod models;
pub mod phone;
pub mod restore;
pub mod sanitize;
pub mod source;
pub mod store;

pub use error::{VaultError, VaultResult};
