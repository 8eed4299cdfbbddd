//! Credential helpers over `secrecy`.
//!
//! API keys are held as [`SecretString`] from the moment they are read out
//! of the environment and only leave it through `expose_secret()`, at the
//! point where a request header is built.

pub use secrecy::{ExposeSecret, SecretString};

const REDACTED: &str = "***";

/// Values this short are masked entirely; longer ones keep a 4-char tail.
const MIN_LEN_FOR_TAIL: usize = 8;

/// Wrap a raw environment value. Surrounding whitespace is trimmed; an
/// empty result yields `None` so blank variables count as missing.
pub fn from_env_value(raw: impl AsRef<str>) -> Option<SecretString> {
    let trimmed = raw.as_ref().trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(SecretString::from(trimmed))
    }
}

/// Operator-facing hint: `***` plus the last four characters.
pub fn masked(secret: &SecretString) -> String {
    let value = secret.expose_secret();
    let count = value.chars().count();
    if count <= MIN_LEN_FOR_TAIL {
        return REDACTED.to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{REDACTED}{tail}")
}
