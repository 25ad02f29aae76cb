//! Opening a ready-to-use credential store on disk.
//!
//! Ties the key file, the AES-256-GCM cipher and the SQLite repository into a
//! single [`SqliteCredentialService`], with the schema guaranteed to exist.

use std::path::{Path, PathBuf};
use std::time::Duration;

use passvault_core::service::credential::CredentialService;
use passvault_types::error::CredentialError;
use thiserror::Error;

use crate::crypto::key_file::KeyFile;
use crate::crypto::vault::{VaultCrypto, VaultError};
use crate::sqlite::credential::SqliteCredentialRepository;
use crate::sqlite::pool::DatabasePool;

/// The concrete credential service used by the binary.
pub type SqliteCredentialService = CredentialService<SqliteCredentialRepository, VaultCrypto>;

/// Errors raised while opening the store. Nothing here carries key bytes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Key(#[from] VaultError),

    #[error("failed to open database {path}: {source}")]
    Database {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Schema(#[from] CredentialError),
}

/// Load (or create) the key, open the database and ensure the schema.
pub async fn open_store(
    database_file: &Path,
    key_file: &KeyFile,
    busy_timeout: Duration,
) -> Result<SqliteCredentialService, StoreError> {
    let cipher = VaultCrypto::from_key_file(key_file)?;

    let pool = DatabasePool::open(database_file, busy_timeout)
        .await
        .map_err(|source| StoreError::Database {
            path: database_file.to_path_buf(),
            source,
        })?;

    let service = CredentialService::new(SqliteCredentialRepository::new(pool), cipher);
    service.ensure_schema().await?;

    tracing::debug!(
        database = %database_file.display(),
        key_file = %key_file.path().display(),
        "credential store ready"
    );
    Ok(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_types::credential::CredentialKey;
    use passvault_types::secret::{DecryptFailure, UNREADABLE_SENTINEL};
    use tempfile::TempDir;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn db(&self) -> PathBuf {
            self.dir.path().join("passvault.db")
        }

        fn key_file(&self, name: &str) -> KeyFile {
            KeyFile::new(self.dir.path().join(name))
        }

        async fn open(&self) -> SqliteCredentialService {
            open_store(&self.db(), &self.key_file("passvault.key"), Duration::from_secs(5))
                .await
                .unwrap()
        }

        async fn open_with_key(&self, name: &str) -> SqliteCredentialService {
            open_store(&self.db(), &self.key_file(name), Duration::from_secs(5))
                .await
                .unwrap()
        }
    }

    fn key(username: &str, service: &str) -> CredentialKey {
        CredentialKey::new(username, service).unwrap()
    }

    #[tokio::test]
    async fn test_open_creates_key_and_database() {
        let fx = Fixture::new();
        let store = fx.open().await;

        assert!(fx.db().exists());
        assert!(fx.key_file("passvault.key").exists());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_and_find_across_lookups() {
        let fx = Fixture::new();
        let store = fx.open().await;

        store.upsert(&key("ivan", "gmail"), "pass1").await.unwrap();
        store.upsert(&key("ivan", "yahoo"), "pass2").await.unwrap();
        store.upsert(&key("olga", "gmail"), "pass3").await.unwrap();

        let found = store.get(&key("ivan", "gmail")).await.unwrap().unwrap();
        assert_eq!(found.expose(), "pass1");

        let by_user = store.find_by_username("ivan").await.unwrap();
        let services: Vec<(&str, Option<&str>)> = by_user
            .iter()
            .map(|s| (s.service.as_str(), s.secret.plaintext()))
            .collect();
        assert_eq!(services, vec![("gmail", Some("pass1")), ("yahoo", Some("pass2"))]);

        let by_service = store.find_by_service("gmail").await.unwrap();
        let users: Vec<&str> = by_service.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(users, vec!["ivan", "olga"]);
    }

    #[tokio::test]
    async fn test_data_survives_reopen() {
        let fx = Fixture::new();
        {
            let store = fx.open().await;
            store.upsert(&key("ivan", "gmail"), "persisted").await.unwrap();
        }

        let store = fx.open().await;
        let found = store.get(&key("ivan", "gmail")).await.unwrap().unwrap();
        assert_eq!(found.expose(), "persisted");
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_row_per_pair() {
        let fx = Fixture::new();
        let store = fx.open().await;

        store.upsert(&key("ivan", "gmail"), "old").await.unwrap();
        store.upsert(&key("ivan", "gmail"), "new").await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.get(&key("ivan", "gmail")).await.unwrap().unwrap();
        assert_eq!(found.expose(), "new");
    }

    #[tokio::test]
    async fn test_row_under_foreign_key_is_isolated_in_scans() {
        let fx = Fixture::new();

        let foreign = fx.open_with_key("other.key").await;
        foreign.upsert(&key("ivan", "aol"), "foreign").await.unwrap();
        drop(foreign);

        let store = fx.open().await;
        store.upsert(&key("ivan", "gmail"), "mine").await.unwrap();

        let rows = store.find_by_username("ivan").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].service, "aol");
        assert!(!rows[0].secret.is_readable());
        assert_eq!(rows[0].secret.expose_or_sentinel(), UNREADABLE_SENTINEL);
        assert_eq!(rows[1].secret.plaintext(), Some("mine"));

        let all = store.list_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.iter().filter(|r| r.secret.is_readable()).count(), 1);
    }

    #[tokio::test]
    async fn test_service_scan_isolates_row_under_foreign_key() {
        let fx = Fixture::new();

        let foreign = fx.open_with_key("other.key").await;
        foreign.upsert(&key("bob", "gmail"), "foreign").await.unwrap();
        drop(foreign);

        let store = fx.open().await;
        store.upsert(&key("zed", "gmail"), "z").await.unwrap();
        store.upsert(&key("amy", "gmail"), "").await.unwrap();

        let rows = store.find_by_service("gmail").await.unwrap();
        let summary: Vec<(&str, bool, Option<&str>)> = rows
            .iter()
            .map(|r| (r.username.as_str(), r.secret.is_readable(), r.secret.plaintext()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("amy", true, Some("")),
                ("bob", false, None),
                ("zed", true, Some("z")),
            ]
        );
        assert_eq!(rows[1].secret.expose_or_sentinel(), UNREADABLE_SENTINEL);
    }

    #[tokio::test]
    async fn test_point_lookup_distinguishes_missing_from_corrupt() {
        let fx = Fixture::new();

        let foreign = fx.open_with_key("other.key").await;
        foreign.upsert(&key("ivan", "aol"), "foreign").await.unwrap();
        drop(foreign);

        let store = fx.open().await;
        assert!(store.get(&key("ivan", "nowhere")).await.unwrap().is_none());

        let err = store.get(&key("ivan", "aol")).await.unwrap_err();
        assert!(matches!(
            err,
            CredentialError::Decryption(DecryptFailure::KeyMismatch)
        ));
    }

    #[tokio::test]
    async fn test_corrupt_key_file_fails_to_open() {
        let fx = Fixture::new();
        std::fs::write(fx.dir.path().join("passvault.key"), b"short").unwrap();

        let result = open_store(
            &fx.db(),
            &fx.key_file("passvault.key"),
            Duration::from_secs(5),
        )
        .await;
        assert!(matches!(result, Err(StoreError::Key(_))));
    }

    #[tokio::test]
    async fn test_concurrent_writers_on_same_pair() {
        let fx = Fixture::new();
        let store = std::sync::Arc::new(fx.open().await);

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .upsert(&key("ivan", "gmail"), &format!("pw-{i}"))
                        .await
                        .unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.count().await.unwrap(), 1);
        let found = store.get(&key("ivan", "gmail")).await.unwrap().unwrap();
        assert!(found.expose().starts_with("pw-"));
    }
}
