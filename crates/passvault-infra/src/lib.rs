//! Infrastructure layer for passvault.
//!
//! Contains implementations of the traits defined in `passvault-core`:
//! the key file, AES-256-GCM encryption, SQLite storage and configuration
//! loading.

pub mod config;
pub mod crypto;
pub mod sqlite;
pub mod store;
