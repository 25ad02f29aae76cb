//! Cryptographic operations for passvault.
//!
//! - `key_file`: the single symmetric key, created on first use
//! - `vault`: AES-256-GCM encryption for secrets at rest

pub mod key_file;
pub mod vault;
