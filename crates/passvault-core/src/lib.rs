//! Credential service logic and repository trait definitions for passvault.
//!
//! This crate defines the "ports" (repository and cipher traits) that the
//! infrastructure layer implements. It depends only on `passvault-types` --
//! never on `passvault-infra` or any database/IO crate.

pub mod repository;
pub mod service;
