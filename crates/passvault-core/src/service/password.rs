//! Random password generation.
//!
//! Characters are drawn independently and uniformly from the alphabet the
//! policy selects, using the thread-local CSPRNG.

use passvault_types::error::PolicyError;
use passvault_types::password::PasswordPolicy;
use rand::Rng;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Build the alphabet for a policy. Lowercase letters are always present.
pub fn alphabet(policy: &PasswordPolicy) -> Vec<char> {
    let mut chars: Vec<char> = LOWERCASE.chars().collect();
    if policy.uppercase {
        chars.extend(UPPERCASE.chars());
    }
    if policy.digits {
        chars.extend(DIGITS.chars());
    }
    if policy.special {
        chars.extend(PUNCTUATION.chars());
    }
    chars
}

/// Generate a password according to `policy`.
pub fn generate_password(policy: &PasswordPolicy) -> Result<String, PolicyError> {
    policy.validate()?;

    let chars = alphabet(policy);
    let mut rng = rand::rng();
    let password: String = (0..policy.length)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect();

    tracing::debug!(
        length = policy.length,
        alphabet_size = chars.len(),
        "generated password"
    );
    Ok(password)
}
