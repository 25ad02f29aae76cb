//! AES-256-GCM vault encryption for secrets at rest.
//!
//! VaultCrypto provides symmetric encryption using AES-256-GCM with random nonces.
//! The key comes from either:
//! - A raw 32-byte key
//! - The key file (auto-generated on first use, see [`KeyFile`])
//!
//! Encrypted format: `nonce (12 bytes) || ciphertext`, stored in the database
//! as standard base64 text.
//!
//! SECURITY: Error types never contain plaintext or key material.

use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use passvault_core::service::cipher::SecretCipher;
use passvault_types::secret::DecryptFailure;
use secrecy::ExposeSecret;
use thiserror::Error;

use super::key_file::{KEY_LEN, KeyError, KeyFile};

/// Nonce size for AES-256-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// Errors from vault encryption operations.
///
/// IMPORTANT: These errors never include plaintext, key material, or ciphertext
/// in their Display/Debug output to prevent accidental logging of secrets.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("encryption failed")]
    EncryptionFailed,

    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid ciphertext: too short")]
    CiphertextTooShort,

    #[error("invalid ciphertext encoding")]
    InvalidEncoding,

    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,

    #[error(transparent)]
    Key(#[from] KeyError),
}

impl From<&VaultError> for DecryptFailure {
    fn from(err: &VaultError) -> Self {
        match err {
            VaultError::CiphertextTooShort | VaultError::InvalidEncoding => DecryptFailure::Malformed,
            VaultError::InvalidUtf8 => DecryptFailure::Encoding,
            _ => DecryptFailure::KeyMismatch,
        }
    }
}

/// AES-256-GCM encryption for vault secrets at rest.
///
/// Each encryption call generates a random 12-byte nonce, prepended to the ciphertext.
/// This means encrypting the same plaintext twice produces different output.
pub struct VaultCrypto {
    cipher: Aes256Gcm,
}

impl VaultCrypto {
    /// Create a new VaultCrypto from a raw 32-byte key.
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(key.into()),
        }
    }

    /// Load or auto-generate the key from the key file.
    ///
    /// The key is read once here and held by the cipher for the lifetime of
    /// the process.
    pub fn from_key_file(key_file: &KeyFile) -> Result<Self, VaultError> {
        let key = key_file.get_key()?;
        Ok(Self::new(key.expose_secret()))
    }

    /// Encrypt plaintext using AES-256-GCM with a random nonce.
    ///
    /// Returns `nonce (12 bytes) || ciphertext`.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext)
            .map_err(|_| VaultError::EncryptionFailed)?;

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypt data produced by `encrypt()`.
    ///
    /// Expects `nonce (12 bytes) || ciphertext` format.
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>, VaultError> {
        if data.len() < NONCE_SIZE {
            return Err(VaultError::CiphertextTooShort);
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_SIZE);
        let nonce = Nonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(nonce, ciphertext)
            .map_err(|_| VaultError::DecryptionFailed)
    }

    /// Encrypt a string into base64 text suitable for a TEXT column.
    pub fn encrypt_text(&self, plaintext: &str) -> Result<String, VaultError> {
        let sealed = self.encrypt(plaintext.as_bytes())?;
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt base64 text produced by `encrypt_text()`.
    pub fn decrypt_text(&self, encoded: &str) -> Result<String, VaultError> {
        let sealed = STANDARD
            .decode(encoded)
            .map_err(|_| VaultError::InvalidEncoding)?;
        let plaintext = self.decrypt(&sealed)?;
        String::from_utf8(plaintext).map_err(|_| VaultError::InvalidUtf8)
    }
}

impl SecretCipher for VaultCrypto {
    fn encrypt(&self, plaintext: &str) -> Result<String, String> {
        self.encrypt_text(plaintext).map_err(|e| e.to_string())
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptFailure> {
        self.decrypt_text(ciphertext)
            .map_err(|e| DecryptFailure::from(&e))
    }
}
