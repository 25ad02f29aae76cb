//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, encryption and business rules.
//! They depend on traits (ports) -- never on concrete infrastructure
//! implementations.

pub mod cipher;
pub mod credential;
pub mod password;
