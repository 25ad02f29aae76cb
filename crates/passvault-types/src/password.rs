//! Password generation settings.

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Length used when none is given on the command line or in config.toml.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

/// Upper bound on generated password length.
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Which character classes a generated password draws from.
///
/// Lowercase ASCII letters are always included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub length: usize,
    pub uppercase: bool,
    pub digits: bool,
    pub special: bool,
}

impl PasswordPolicy {
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.length == 0 || self.length > MAX_PASSWORD_LENGTH {
            return Err(PolicyError::InvalidLength {
                got: self.length,
                max: MAX_PASSWORD_LENGTH,
            });
        }
        Ok(())
    }

    /// True when no class besides lowercase letters was selected.
    pub fn only_lowercase(&self) -> bool {
        !(self.uppercase || self.digits || self.special)
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            length: DEFAULT_PASSWORD_LENGTH,
            uppercase: true,
            digits: true,
            special: true,
        }
    }
}
