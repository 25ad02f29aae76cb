//! SecretCipher trait for encrypting secrets at rest.
//!
//! Defined in passvault-core so the credential service can encrypt without
//! coupling to a specific algorithm or key source. The AES-256-GCM adapter
//! (`VaultCrypto`) lives in passvault-infra.

use passvault_types::secret::DecryptFailure;

/// Abstraction over text-in, text-out symmetric encryption.
///
/// `encrypt` must be non-deterministic: two calls with the same plaintext
/// return different ciphertexts. Error values never contain plaintext or
/// key material.
pub trait SecretCipher: Send + Sync {
    /// Encrypt `plaintext` into an opaque, text-safe ciphertext.
    fn encrypt(&self, plaintext: &str) -> Result<String, String>;

    /// Reverse `encrypt`, reporting why a ciphertext is unreadable.
    fn decrypt(&self, ciphertext: &str) -> Result<String, DecryptFailure>;
}
