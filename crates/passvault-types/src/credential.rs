use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CredentialError;
use crate::secret::RevealedSecret;

use std::fmt;

/// Longest accepted username or service name, in characters.
pub const MAX_KEY_PART_LEN: usize = 100;

/// The (username, service) pair that uniquely identifies a credential row.
///
/// Only constructible through [`CredentialKey::new`], so every key that
/// reaches the storage layer has already been validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CredentialKey {
    username: String,
    service: String,
}

impl CredentialKey {
    /// Validate and build a composite key.
    ///
    /// Rejects empty or whitespace-only parts and parts longer than
    /// [`MAX_KEY_PART_LEN`] characters. Values are stored exactly as given.
    pub fn new(
        username: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self, CredentialError> {
        let username = username.into();
        let service = service.into();
        validate_part("username", &username)?;
        validate_part("service", &service)?;
        Ok(Self { username, service })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.username, self.service)
    }
}

/// Check a single key part (also used for the one-sided scans).
pub fn validate_part(field: &str, value: &str) -> Result<(), CredentialError> {
    if value.trim().is_empty() {
        return Err(CredentialError::Validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > MAX_KEY_PART_LEN {
        return Err(CredentialError::Validation(format!(
            "{field} must be at most {MAX_KEY_PART_LEN} characters"
        )));
    }
    Ok(())
}

/// A credential row as persisted: the secret is still ciphertext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredential {
    /// Surrogate id assigned by the store; survives upserts.
    pub id: i64,
    pub username: String,
    pub service: String,
    /// Base64 text of `nonce || ciphertext`, opaque to callers.
    pub encrypted_secret: String,
    /// Time of the last insert or update.
    pub created_at: DateTime<Utc>,
}

/// One entry of a scan by username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceSecret {
    pub service: String,
    pub secret: RevealedSecret,
}

/// One entry of a scan by service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSecret {
    pub username: String,
    pub secret: RevealedSecret,
}

/// One entry of the full enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CredentialRecord {
    pub username: String,
    pub service: String,
    pub secret: RevealedSecret,
    pub created_at: DateTime<Utc>,
}
