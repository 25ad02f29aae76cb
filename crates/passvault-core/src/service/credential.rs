//! Credential storage service.
//!
//! CredentialService is the storage engine: it encrypts plaintexts through a
//! [`SecretCipher`], persists ciphertext through a [`CredentialRepository`]
//! with upsert semantics, and decrypts on the way back out.
//!
//! Point lookups propagate decryption failures to the caller. Scans isolate
//! them per row: an undecryptable row is returned as
//! `RevealedSecret::Unreadable` and the scan carries on.

use passvault_types::credential::{
    CredentialKey, CredentialRecord, ServiceSecret, StoredCredential, UserSecret, validate_part,
};
use passvault_types::error::CredentialError;
use passvault_types::secret::{Redacted, RevealedSecret};

use crate::repository::credential::CredentialRepository;
use crate::service::cipher::SecretCipher;

/// Service wrapping a credential repository with encryption at rest.
///
/// Generic over the repository and cipher traits -- passvault-core never
/// depends on passvault-infra.
pub struct CredentialService<R: CredentialRepository, C: SecretCipher> {
    repo: R,
    cipher: C,
}

impl<R: CredentialRepository, C: SecretCipher> CredentialService<R, C> {
    pub fn new(repo: R, cipher: C) -> Self {
        Self { repo, cipher }
    }

    /// Idempotently create the backing table.
    pub async fn ensure_schema(&self) -> Result<(), CredentialError> {
        self.repo.ensure_schema().await?;
        Ok(())
    }

    /// Encrypt `plaintext` and store it under `key`, replacing any previous
    /// secret for the same pair.
    ///
    /// The key was validated at construction, so nothing malformed reaches
    /// the repository. An empty plaintext is allowed.
    pub async fn upsert(&self, key: &CredentialKey, plaintext: &str) -> Result<(), CredentialError> {
        let encrypted = self
            .cipher
            .encrypt(plaintext)
            .map_err(CredentialError::Encryption)?;

        self.repo.upsert(key, &encrypted).await?;

        tracing::info!(
            username = %key.username(),
            service = %key.service(),
            "credential stored"
        );
        Ok(())
    }

    /// Look up and decrypt the secret for `key`.
    ///
    /// Returns `Ok(None)` when no row exists. A row that exists but cannot be
    /// decrypted is an error, never `None`.
    pub async fn get(&self, key: &CredentialKey) -> Result<Option<Redacted>, CredentialError> {
        let Some(stored) = self.repo.get(key).await? else {
            tracing::debug!(username = %key.username(), service = %key.service(), "credential not found");
            return Ok(None);
        };

        let plaintext = self
            .cipher
            .decrypt(&stored.encrypted_secret)
            .map_err(|failure| {
                tracing::warn!(
                    id = stored.id,
                    username = %stored.username,
                    service = %stored.service,
                    %failure,
                    "stored credential could not be decrypted"
                );
                CredentialError::Decryption(failure)
            })?;

        Ok(Some(Redacted::new(plaintext)))
    }

    /// Every service stored for `username`, ordered by service.
    pub async fn find_by_username(&self, username: &str) -> Result<Vec<ServiceSecret>, CredentialError> {
        validate_part("username", username)?;
        let rows = self.repo.list_by_username(username).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let secret = self.reveal(&row);
                ServiceSecret {
                    service: row.service,
                    secret,
                }
            })
            .collect())
    }

    /// Every username stored for `service`, ordered by username.
    pub async fn find_by_service(&self, service: &str) -> Result<Vec<UserSecret>, CredentialError> {
        validate_part("service", service)?;
        let rows = self.repo.list_by_service(service).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let secret = self.reveal(&row);
                UserSecret {
                    username: row.username,
                    secret,
                }
            })
            .collect())
    }

    /// Every stored credential, ordered by (username, service).
    pub async fn list_all(&self) -> Result<Vec<CredentialRecord>, CredentialError> {
        let rows = self.repo.list_all().await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let secret = self.reveal(&row);
                CredentialRecord {
                    username: row.username,
                    service: row.service,
                    secret,
                    created_at: row.created_at,
                }
            })
            .collect())
    }

    /// Number of stored credentials.
    pub async fn count(&self) -> Result<u64, CredentialError> {
        Ok(self.repo.count().await?)
    }

    /// Decrypt one scanned row without failing the scan.
    fn reveal(&self, row: &StoredCredential) -> RevealedSecret {
        let revealed = RevealedSecret::from(
            self.cipher
                .decrypt(&row.encrypted_secret)
                .map(Redacted::new),
        );
        if let RevealedSecret::Unreadable(failure) = &revealed {
            tracing::warn!(
                id = row.id,
                username = %row.username,
                service = %row.service,
                %failure,
                "skipping undecryptable credential in scan"
            );
        }
        revealed
    }
}
