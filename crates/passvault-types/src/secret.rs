use serde::{Deserialize, Serialize};

use std::fmt;

/// Placeholder rendered in reports for a row whose secret could not be decrypted.
pub const UNREADABLE_SENTINEL: &str = "[decryption failed]";

/// A wrapper that redacts secret values in Debug and Display output.
///
/// Use this to wrap any `String` that holds a plaintext password.
/// The actual value is accessible via `.expose()`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Show masked representation: last 4 chars visible.
    ///
    /// Counts characters, not bytes, so multi-byte plaintexts never split a
    /// code point.
    pub fn masked(&self) -> String {
        let len = self.0.chars().count();
        if len <= 4 {
            "****".to_string()
        } else {
            let tail: String = self.0.chars().skip(len - 4).collect();
            format!("****{tail}")
        }
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted(\"***\")")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

/// Why a stored ciphertext could not be turned back into a plaintext.
///
/// Carries no ciphertext or key material, so it is safe to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecryptFailure {
    /// Authentication tag did not verify: wrong key or tampered bytes.
    KeyMismatch,
    /// Stored text is not valid base64 or is shorter than a nonce.
    Malformed,
    /// Decrypted bytes are not valid UTF-8.
    Encoding,
}

impl fmt::Display for DecryptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecryptFailure::KeyMismatch => write!(f, "key mismatch or corrupted ciphertext"),
            DecryptFailure::Malformed => write!(f, "malformed ciphertext"),
            DecryptFailure::Encoding => write!(f, "plaintext is not valid UTF-8"),
        }
    }
}

/// Outcome of decrypting a single row during a scan.
///
/// Scans never drop rows: a row that fails to decrypt is kept as
/// `Unreadable` and the rendering layer decides how to show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum RevealedSecret {
    Plain(Redacted),
    Unreadable(DecryptFailure),
}

impl RevealedSecret {
    pub fn is_readable(&self) -> bool {
        matches!(self, RevealedSecret::Plain(_))
    }

    /// The plaintext, or `None` for an unreadable row.
    pub fn plaintext(&self) -> Option<&str> {
        match self {
            RevealedSecret::Plain(value) => Some(value.expose()),
            RevealedSecret::Unreadable(_) => None,
        }
    }

    /// The plaintext, or the fixed sentinel for an unreadable row.
    pub fn expose_or_sentinel(&self) -> &str {
        self.plaintext().unwrap_or(UNREADABLE_SENTINEL)
    }
}

impl From<Result<Redacted, DecryptFailure>> for RevealedSecret {
    fn from(result: Result<Redacted, DecryptFailure>) -> Self {
        match result {
            Ok(value) => RevealedSecret::Plain(value),
            Err(failure) => RevealedSecret::Unreadable(failure),
        }
    }
}
