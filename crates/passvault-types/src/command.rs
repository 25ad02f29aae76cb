//! The typed command union built once at the CLI boundary.
//!
//! Argument parsing produces a [`Command`]; dispatch matches on it
//! exhaustively, so nothing downstream inspects loosely-typed arguments.

use crate::credential::CredentialKey;
use crate::password::PasswordPolicy;
use crate::secret::Redacted;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Generate a password, optionally storing it under `save`.
    Generate {
        policy: PasswordPolicy,
        save: Option<CredentialKey>,
    },
    /// Store a password; prompt for it when `password` is `None`.
    Save {
        key: CredentialKey,
        password: Option<Redacted>,
    },
    FindByUsername {
        username: String,
    },
    FindByService {
        service: String,
    },
    FindByBoth {
        key: CredentialKey,
    },
    ShowAll,
}

impl Command {
    /// Whether the command needs the credential store at all.
    pub fn needs_store(&self) -> bool {
        !matches!(self, Command::Generate { save: None, .. })
    }
}
