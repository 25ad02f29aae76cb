//! SQLite credential repository implementation.
//!
//! Implements `CredentialRepository` from `passvault-core` using sqlx with split
//! read/write pools. Secrets arrive here already encrypted; this repository
//! stores and returns ciphertext text and never logs it.

use chrono::{DateTime, Utc};
use passvault_core::repository::credential::CredentialRepository;
use passvault_types::credential::{CredentialKey, StoredCredential};
use passvault_types::error::RepositoryError;
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::pool::DatabasePool;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS credentials (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    username         TEXT NOT NULL,
    service          TEXT NOT NULL,
    encrypted_secret TEXT NOT NULL,
    created_at       TEXT NOT NULL,
    UNIQUE(username, service)
)";

const CREATE_SERVICE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_credentials_service ON credentials(service, username)";

const SELECT_COLUMNS: &str = "SELECT id, username, service, encrypted_secret, created_at FROM credentials";

/// SQLite-backed implementation of `CredentialRepository`.
///
/// The UNIQUE(username, service) constraint is what makes `upsert` atomic:
/// conflict resolution happens inside the single INSERT statement.
pub struct SqliteCredentialRepository {
    pool: DatabasePool,
}

impl SqliteCredentialRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

/// Classify sqlx errors into the repository taxonomy.
fn map_err(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
            RepositoryError::Connection
        }
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(db.message().to_string())
        }
        other => RepositoryError::Query(other.to_string()),
    }
}

fn row_to_credential(row: &SqliteRow) -> Result<StoredCredential, RepositoryError> {
    let created_at: String = row.try_get("created_at").map_err(map_err)?;

    Ok(StoredCredential {
        id: row.try_get("id").map_err(map_err)?,
        username: row.try_get("username").map_err(map_err)?,
        service: row.try_get("service").map_err(map_err)?,
        encrypted_secret: row.try_get("encrypted_secret").map_err(map_err)?,
        created_at: parse_datetime(&created_at)?,
    })
}

fn rows_to_credentials(rows: &[SqliteRow]) -> Result<Vec<StoredCredential>, RepositoryError> {
    rows.iter().map(row_to_credential).collect()
}

impl CredentialRepository for SqliteCredentialRepository {
    async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool.writer)
            .await
            .map_err(map_err)?;
        sqlx::query(CREATE_SERVICE_INDEX)
            .execute(&self.pool.writer)
            .await
            .map_err(map_err)?;

        tracing::debug!("credentials schema ready");
        Ok(())
    }

    async fn upsert(&self, key: &CredentialKey, encrypted_secret: &str) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());

        sqlx::query(
            "INSERT INTO credentials (username, service, encrypted_secret, created_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(username, service) DO UPDATE SET
                 encrypted_secret = excluded.encrypted_secret,
                 created_at = excluded.created_at",
        )
        .bind(key.username())
        .bind(key.service())
        .bind(encrypted_secret)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(map_err)?;

        Ok(())
    }

    async fn get(&self, key: &CredentialKey) -> Result<Option<StoredCredential>, RepositoryError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE username = ? AND service = ?"))
            .bind(key.username())
            .bind(key.service())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(map_err)?;

        row.as_ref().map(row_to_credential).transpose()
    }

    async fn list_by_username(&self, username: &str) -> Result<Vec<StoredCredential>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE username = ? ORDER BY service ASC"))
            .bind(username)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_err)?;

        rows_to_credentials(&rows)
    }

    async fn list_by_service(&self, service: &str) -> Result<Vec<StoredCredential>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} WHERE service = ? ORDER BY username ASC"))
            .bind(service)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_err)?;

        rows_to_credentials(&rows)
    }

    async fn list_all(&self) -> Result<Vec<StoredCredential>, RepositoryError> {
        let rows = sqlx::query(&format!("{SELECT_COLUMNS} ORDER BY username ASC, service ASC"))
            .fetch_all(&self.pool.reader)
            .await
            .map_err(map_err)?;

        rows_to_credentials(&rows)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM credentials")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(map_err)?;

        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn test_repo() -> SqliteCredentialRepository {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        std::mem::forget(dir);
        let pool = DatabasePool::open(&db_path, Duration::from_secs(5)).await.unwrap();
        let repo = SqliteCredentialRepository::new(pool);
        repo.ensure_schema().await.unwrap();
        repo
    }

    fn key(username: &str, service: &str) -> CredentialKey {
        CredentialKey::new(username, service).unwrap()
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let repo = test_repo().await;
        repo.ensure_schema().await.unwrap();
        repo.ensure_schema().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type='table' AND name = 'credentials'",
        )
        .fetch_all(&repo.pool.reader)
        .await
        .unwrap();
        assert_eq!(tables.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_and_get() {
        let repo = test_repo().await;
        repo.upsert(&key("ivan", "gmail"), "cipher-1").await.unwrap();

        let row = repo.get(&key("ivan", "gmail")).await.unwrap().unwrap();
        assert_eq!(row.username, "ivan");
        assert_eq!(row.service, "gmail");
        assert_eq!(row.encrypted_secret, "cipher-1");

        assert!(repo.get(&key("ivan", "yahoo")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_updates_in_place() {
        let repo = test_repo().await;
        repo.upsert(&key("ivan", "gmail"), "cipher-1").await.unwrap();
        let first = repo.get(&key("ivan", "gmail")).await.unwrap().unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        repo.upsert(&key("ivan", "gmail"), "cipher-2").await.unwrap();
        let second = repo.get(&key("ivan", "gmail")).await.unwrap().unwrap();

        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(second.id, first.id, "upsert must keep the surrogate id");
        assert_eq!(second.encrypted_secret, "cipher-2");
        assert!(second.created_at > first.created_at, "upsert must refresh the timestamp");
    }

    #[tokio::test]
    async fn test_list_by_username_ordered_by_service() {
        let repo = test_repo().await;
        for service in ["yahoo", "gmail", "mail.ru"] {
            repo.upsert(&key("ivan", service), "c").await.unwrap();
        }
        repo.upsert(&key("olga", "aol"), "c").await.unwrap();

        let rows = repo.list_by_username("ivan").await.unwrap();
        let services: Vec<&str> = rows.iter().map(|r| r.service.as_str()).collect();
        assert_eq!(services, vec!["gmail", "mail.ru", "yahoo"]);
    }

    #[tokio::test]
    async fn test_list_by_service_ordered_by_username() {
        let repo = test_repo().await;
        for username in ["zoe", "anna", "mike"] {
            repo.upsert(&key(username, "gmail"), "c").await.unwrap();
        }
        repo.upsert(&key("bob", "yahoo"), "c").await.unwrap();

        let rows = repo.list_by_service("gmail").await.unwrap();
        let users: Vec<&str> = rows.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(users, vec!["anna", "mike", "zoe"]);
    }

    #[tokio::test]
    async fn test_list_all_ordered_by_username_then_service() {
        let repo = test_repo().await;
        repo.upsert(&key("bob", "gmail"), "c").await.unwrap();
        repo.upsert(&key("alice", "yahoo"), "c").await.unwrap();
        repo.upsert(&key("alice", "gmail"), "c").await.unwrap();

        let rows = repo.list_all().await.unwrap();
        let pairs: Vec<(&str, &str)> = rows
            .iter()
            .map(|r| (r.username.as_str(), r.service.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("alice", "gmail"), ("alice", "yahoo"), ("bob", "gmail")]
        );
    }

    #[tokio::test]
    async fn test_username_and_service_are_case_sensitive() {
        let repo = test_repo().await;
        repo.upsert(&key("Ivan", "gmail"), "upper").await.unwrap();
        repo.upsert(&key("ivan", "gmail"), "lower").await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_queries_before_schema_fail_with_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(&dir.path().join("empty.db"), Duration::from_secs(5))
            .await
            .unwrap();
        let repo = SqliteCredentialRepository::new(pool);

        let err = repo.list_all().await.unwrap_err();
        assert!(matches!(err, RepositoryError::Query(_)));
    }
}
