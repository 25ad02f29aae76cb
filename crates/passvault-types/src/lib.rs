//! Shared domain types for passvault.
//!
//! This crate contains the domain types used across the workspace: the
//! composite credential key, stored and revealed credential rows, the typed
//! command union, password policy, configuration and error types.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror.

pub mod command;
pub mod config;
pub mod credential;
pub mod error;
pub mod password;
pub mod secret;
