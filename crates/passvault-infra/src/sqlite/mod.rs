//! SQLite storage layer.
//!
//! The credential repository backed by SQLite with WAL mode and split
//! read/write connection pools.

pub mod credential;
pub mod pool;
