use thiserror::Error;

use crate::secret::DecryptFailure;

/// Errors from repository operations (used by trait definitions in passvault-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the credential service.
///
/// IMPORTANT: no variant ever carries plaintext, ciphertext or key material.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("invalid credential key: {0}")]
    Validation(String),

    #[error("encryption error: {0}")]
    Encryption(String),

    #[error("decryption error: {0}")]
    Decryption(DecryptFailure),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Errors related to password generation settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("password length must be between 1 and {max}, got {got}")]
    InvalidLength { got: usize, max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_storage_error_wraps_repository_error() {
        let err: CredentialError = RepositoryError::Connection.into();
        assert_eq!(err.to_string(), "storage error: database connection error");
    }

    #[test]
    fn test_decryption_error_names_cause() {
        let err = CredentialError::Decryption(DecryptFailure::KeyMismatch);
        assert!(err.to_string().contains("key mismatch"));
    }

    #[test]
    fn test_policy_error_display() {
        let err = PolicyError::InvalidLength { got: 0, max: 1024 };
        assert_eq!(err.to_string(), "password length must be between 1 and 1024, got 0");
    }
}
