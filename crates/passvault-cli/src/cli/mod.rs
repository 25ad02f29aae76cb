//! CLI command definitions for the `passvault` binary.
//!
//! Uses clap derive macros for argument parsing. Parsed arguments are turned
//! into a typed [`Command`] exactly once, in [`Commands::into_command`].

pub mod credential;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use passvault_types::command::Command;
use passvault_types::credential::{CredentialKey, validate_part};
use passvault_types::error::CredentialError;
use passvault_types::password::PasswordPolicy;
use passvault_types::secret::Redacted;

/// Generate, store and look up passwords encrypted at rest.
#[derive(Parser)]
#[command(name = "passvault", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only log errors. Command results are still printed.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a random password, optionally storing it.
    #[command(alias = "gen")]
    Generate {
        /// Password length (defaults to `default_length` from config.toml).
        #[arg(short, long)]
        length: Option<usize>,

        /// Include ASCII punctuation.
        #[arg(short, long)]
        special: bool,

        /// Include digits.
        #[arg(short, long)]
        digits: bool,

        /// Include uppercase letters.
        #[arg(short, long)]
        uppercase: bool,

        /// Store the generated password under this username (requires --service).
        #[arg(long, requires = "service")]
        username: Option<String>,

        /// Store the generated password under this service (requires --username).
        #[arg(long, requires = "username")]
        service: Option<String>,
    },

    /// Store a password for a username and service, replacing any previous one.
    Save {
        /// Account username.
        username: String,

        /// Service the account belongs to.
        service: String,

        /// Password to store (omit for a hidden prompt).
        #[arg(long, env = "PASSVAULT_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Look up stored passwords by username, service, or both.
    Find {
        /// Username to look up.
        #[arg(long, required_unless_present = "service")]
        username: Option<String>,

        /// Service to look up.
        #[arg(long)]
        service: Option<String>,
    },

    /// Show every stored credential.
    #[command(name = "show-all", alias = "ls")]
    ShowAll {
        /// Mask passwords instead of printing them in full.
        #[arg(long)]
        mask: bool,
    },

    /// Show where the key and database live and how many credentials exist.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Tracing filter chosen by `-v` and `--quiet`. `-v` wins over `--quiet`.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 if self.quiet => "error",
            0 => "warn",
            1 => "info,passvault=debug",
            _ => "trace",
        }
    }
}

impl Commands {
    /// Build the typed command for everything that reaches the credential
    /// store or the generator.
    ///
    /// Returns `Ok(None)` for `status` and `completions`, which are handled
    /// directly by the binary. Username and service values are validated
    /// here, before any key file or database is touched.
    pub fn into_command(self, default_length: usize) -> Result<Option<Command>, CredentialError> {
        let command = match self {
            Commands::Generate {
                length,
                special,
                digits,
                uppercase,
                username,
                service,
            } => {
                let policy = PasswordPolicy {
                    length: length.unwrap_or(default_length),
                    uppercase,
                    digits,
                    special,
                };
                let save = match (username, service) {
                    (Some(username), Some(service)) => Some(CredentialKey::new(username, service)?),
                    _ => None,
                };
                Command::Generate { policy, save }
            }

            Commands::Save {
                username,
                service,
                password,
            } => Command::Save {
                key: CredentialKey::new(username, service)?,
                password: password.map(Redacted::new),
            },

            Commands::Find { username, service } => match (username, service) {
                (Some(username), Some(service)) => Command::FindByBoth {
                    key: CredentialKey::new(username, service)?,
                },
                (Some(username), None) => {
                    validate_part("username", &username)?;
                    Command::FindByUsername { username }
                }
                (None, Some(service)) => {
                    validate_part("service", &service)?;
                    Command::FindByService { service }
                }
                (None, None) => {
                    return Err(CredentialError::Validation(
                        "find needs --username, --service, or both".to_string(),
                    ));
                }
            },

            Commands::ShowAll { .. } => Command::ShowAll,

            Commands::Status | Commands::Completions { .. } => return Ok(None),
        };

        Ok(Some(command))
    }
}
