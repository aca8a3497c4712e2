//! Environment variable secret provider.
//!
//! Read-only: credentials are set via shell config or the process manager,
//! never written back. Blank values count as missing.

use secrecy::SecretString;

/// Environment variable holding the generative API key.
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

/// Environment variable secret provider.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    /// Look up `key` as an environment variable.
    pub fn get(&self, key: &str) -> Option<SecretString> {
        match std::env::var(key) {
            Ok(val) => non_blank(val),
            Err(std::env::VarError::NotPresent) => None,
            // Present but not valid Unicode -- a key must be a valid string
            Err(std::env::VarError::NotUnicode(_)) => None,
        }
    }

    /// The generative API key, if configured.
    pub fn gemini_api_key(&self) -> Option<SecretString> {
        let key = self.get(GEMINI_API_KEY);
        if key.is_none() {
            tracing::debug!("{GEMINI_API_KEY} not set, generation and ranking disabled");
        }
        key
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn non_blank(value: String) -> Option<SecretString> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(SecretString::from(trimmed.to_string()))
    }
}
