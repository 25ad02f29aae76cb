//! Global configuration types for passvault.
//!
//! `PassvaultConfig` represents the `config.toml` in the data directory that
//! locates the database and key file and sets generation defaults.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::password::DEFAULT_PASSWORD_LENGTH;

/// Top-level configuration.
///
/// Loaded from `~/.passvault/config.toml`. All fields have sensible defaults.
/// Relative paths are resolved against the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassvaultConfig {
    /// SQLite database holding the credentials table.
    #[serde(default = "default_database_file")]
    pub database_file: PathBuf,

    /// File holding the raw symmetric key.
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,

    /// Password length used by `generate` when `--length` is omitted.
    #[serde(default = "default_length")]
    pub default_length: usize,

    /// Seconds a writer waits on a locked database before failing.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_database_file() -> PathBuf {
    PathBuf::from("passvault.db")
}

fn default_key_file() -> PathBuf {
    PathBuf::from("passvault.key")
}

fn default_length() -> usize {
    DEFAULT_PASSWORD_LENGTH
}

fn default_busy_timeout_secs() -> u64 {
    5
}

impl Default for PassvaultConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            key_file: default_key_file(),
            default_length: default_length(),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}
