//! Application state wiring the credential store together.
//!
//! AppState resolves the data directory and config once, then pins the
//! generic `CredentialService` to the SQLite repository and AES-256-GCM cipher.

use std::path::PathBuf;
use std::time::Duration;

use passvault_infra::config::resolve_path;
use passvault_infra::crypto::key_file::KeyFile;
use passvault_infra::store::{SqliteCredentialService, open_store};
use passvault_types::config::PassvaultConfig;

/// Paths derived from the data directory and config.toml.
#[derive(Debug, Clone)]
pub struct Layout {
    pub data_dir: PathBuf,
    pub database_file: PathBuf,
    pub key_file: KeyFile,
    pub busy_timeout: Duration,
}

impl Layout {
    pub fn new(data_dir: PathBuf, config: &PassvaultConfig) -> Self {
        Self {
            database_file: resolve_path(&data_dir, &config.database_file),
            key_file: KeyFile::new(resolve_path(&data_dir, &config.key_file)),
            busy_timeout: Duration::from_secs(config.busy_timeout_secs),
            data_dir,
        }
    }
}

/// Shared state for every command that touches stored credentials.
pub struct AppState {
    pub credentials: SqliteCredentialService,
    pub layout: Layout,
}

impl AppState {
    /// Load the key, open the database and make sure the schema exists.
    pub async fn init(layout: Layout) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&layout.data_dir).await?;

        let credentials =
            open_store(&layout.database_file, &layout.key_file, layout.busy_timeout).await?;

        Ok(Self {
            credentials,
            layout,
        })
    }
}
