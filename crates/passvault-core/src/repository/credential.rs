//! Credential repository trait definition.

use passvault_types::credential::{CredentialKey, StoredCredential};
use passvault_types::error::RepositoryError;

/// Repository trait for encrypted credential persistence.
///
/// Implementations store ciphertext only; encryption and decryption happen
/// in `CredentialService`. Every method is a single statement against the
/// backing store, with no state kept between calls.
///
/// Implementations live in passvault-infra (e.g., SqliteCredentialRepository).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait CredentialRepository: Send + Sync {
    /// Create the credentials table and its indexes if they are missing.
    fn ensure_schema(&self) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Insert the row for `key`, or replace its ciphertext and refresh its
    /// timestamp if it already exists. Must be one atomic statement.
    fn upsert(
        &self,
        key: &CredentialKey,
        encrypted_secret: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Fetch the unique row for `key`.
    fn get(
        &self,
        key: &CredentialKey,
    ) -> impl std::future::Future<Output = Result<Option<StoredCredential>, RepositoryError>> + Send;

    /// All rows for `username`, ordered by service ascending.
    fn list_by_username(
        &self,
        username: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StoredCredential>, RepositoryError>> + Send;

    /// All rows for `service`, ordered by username ascending.
    fn list_by_service(
        &self,
        service: &str,
    ) -> impl std::future::Future<Output = Result<Vec<StoredCredential>, RepositoryError>> + Send;

    /// Every row, ordered by (username, service) ascending.
    fn list_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<StoredCredential>, RepositoryError>> + Send;

    /// Number of stored rows.
    fn count(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
