//! Configuration and path management for msgvault

pub mod paths;
pub mod settings;

pub use paths::VaultPaths;
pub use settings::{PacingSettings, Settings};
