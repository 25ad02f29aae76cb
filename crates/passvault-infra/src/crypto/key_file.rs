//! Key manager: the single symmetric key, persisted as raw bytes in a file.
//!
//! The first call to [`KeyFile::get_key`] on a path with no file generates 32
//! random bytes and writes them; every later call reads the same bytes back.
//!
//! Creation is race-free across processes: the new key is written to a
//! temp file in the target directory and linked into place with no-clobber
//! semantics. A process that loses the race discards its key and loads the
//! winner's, so concurrent first use can never leave two keys in play.
//!
//! SECURITY: Error types never contain key material.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use aes_gcm::aead::OsRng;
use aes_gcm::aead::rand_core::RngCore;
use secrecy::{ExposeSecret, SecretBox};
use secrecy::zeroize::Zeroizing;
use thiserror::Error;

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Raw key bytes, zeroized on drop and redacted in Debug output.
pub type KeyMaterial = SecretBox<[u8; KEY_LEN]>;

/// Errors from reading or creating the key file.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("key file I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("key file {path} holds {got} bytes, expected {KEY_LEN}")]
    InvalidLength { path: PathBuf, got: usize },
}

/// Handle to the on-disk key file at a fixed path.
#[derive(Debug, Clone)]
pub struct KeyFile {
    path: PathBuf,
}

impl KeyFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Return the key, creating the file on first use.
    pub fn get_key(&self) -> Result<KeyMaterial, KeyError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => self.parse(Zeroizing::new(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => self.create(),
            Err(err) => Err(self.io_error(err)),
        }
    }

    /// Read an existing key file without ever creating one.
    pub fn load(&self) -> Result<KeyMaterial, KeyError> {
        let bytes = std::fs::read(&self.path).map_err(|e| self.io_error(e))?;
        self.parse(Zeroizing::new(bytes))
    }

    fn parse(&self, bytes: Zeroizing<Vec<u8>>) -> Result<KeyMaterial, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength {
                path: self.path.clone(),
                got: bytes.len(),
            });
        }
        tracing::debug!(path = %self.path.display(), "loaded encryption key");
        Ok(SecretBox::init_with_mut(|key: &mut [u8; KEY_LEN]| {
            key.copy_from_slice(&bytes)
        }))
    }

    fn create(&self) -> Result<KeyMaterial, KeyError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let key: KeyMaterial =
            SecretBox::init_with_mut(|key: &mut [u8; KEY_LEN]| OsRng.fill_bytes(key));

        // NamedTempFile is created with 0600 permissions on Unix.
        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(key.expose_secret())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.io_error(e))?;

        match tmp.persist_noclobber(&self.path) {
            Ok(_) => {
                tracing::info!(path = %self.path.display(), "generated new encryption key");
                Ok(key)
            }
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                tracing::info!(
                    path = %self.path.display(),
                    "key file appeared concurrently, loading it instead"
                );
                self.load()
            }
            Err(err) => Err(self.io_error(err.error)),
        }
    }

    fn io_error(&self, source: io::Error) -> KeyError {
        KeyError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
