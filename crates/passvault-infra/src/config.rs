//! Configuration loading and data-directory layout.
//!
//! Reads `config.toml` from the data directory (`~/.passvault/` in production)
//! and deserializes it into [`PassvaultConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use passvault_types::config::PassvaultConfig;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "PASSVAULT_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `PASSVAULT_DATA_DIR` environment variable
/// 2. `~/.passvault`
/// 3. `.passvault` in the current directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".passvault");
    }

    PathBuf::from(".passvault")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// A missing file yields [`PassvaultConfig::default()`]. An unreadable or
/// unparsable file logs a warning and also yields the default.
pub async fn load_config(data_dir: &Path) -> PassvaultConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return PassvaultConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return PassvaultConfig::default();
        }
    };

    match toml::from_str::<PassvaultConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            PassvaultConfig::default()
        }
    }
}

/// Resolve a configured path against the data directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_path(data_dir: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        data_dir.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config, PassvaultConfig::default());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
database_file = "vault.db"
default_length = 24
busy_timeout_secs = 10
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.database_file, PathBuf::from("vault.db"));
        assert_eq!(config.key_file, PathBuf::from("passvault.key"));
        assert_eq!(config.default_length, 24);
        assert_eq!(config.busy_timeout_secs, 10);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config, PassvaultConfig::default());
    }

    #[test]
    fn resolve_path_relative_joins_data_dir() {
        let data_dir = PathBuf::from("/home/user/.passvault");
        assert_eq!(
            resolve_path(&data_dir, Path::new("passvault.db")),
            PathBuf::from("/home/user/.passvault/passvault.db")
        );
    }

    #[test]
    fn resolve_path_absolute_is_unchanged() {
        let data_dir = PathBuf::from("/home/user/.passvault");
        assert_eq!(
            resolve_path(&data_dir, Path::new("/srv/keys/k.key")),
            PathBuf::from("/srv/keys/k.key")
        );
    }

    #[test]
    fn resolve_data_dir_from_env() {
        // SAFETY: This test is the only one touching PASSVAULT_DATA_DIR and restores it immediately.
        unsafe {
            std::env::set_var(DATA_DIR_ENV, "/tmp/test-passvault");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-passvault"));
        unsafe {
            std::env::remove_var(DATA_DIR_ENV);
        }
    }
}
