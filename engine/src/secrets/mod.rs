//! API key handling
//!
//! The completion service key is read from the process environment, after an
//! optional `.env` file in the working directory has been merged in. It is
//! carried as a [`SecretString`] and scrubbed from any text headed for logs.

pub mod string;

pub use string::SecretString;

use regex::Regex;
use std::sync::OnceLock;

/// Regex patterns for detecting API keys in free text.
static SECRET_PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();

/// Patterns match:
/// - Groq API keys: gsk_[a-zA-Z0-9]{20,}
/// - OpenAI-style keys: sk-[a-zA-Z0-9-_]{20,}
/// - Bearer tokens: Bearer\s+[^\s]{20,}
fn get_secret_patterns() -> &'static Vec<Regex> {
    SECRET_PATTERNS.get_or_init(|| {
        vec![
            Regex::new(r"gsk_[a-zA-Z0-9]{20,}").expect("Invalid Groq pattern"),
            Regex::new(r"sk-[a-zA-Z0-9\-_]{20,}").expect("Invalid OpenAI pattern"),
            Regex::new(r"Bearer\s+[^\s]{20,}").expect("Invalid Bearer pattern"),
        ]
    })
}

/// Merge a `.env` file from the working directory into the environment.
///
/// Variables already set in the environment win. A missing file is not an
/// error.
pub fn load_dotenv() {
    match dotenv::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }
}

/// Read the API key from the named environment variable.
///
/// A missing key is not fatal: requests are still sent and the completion
/// service answers with an authentication error, which reaches the caller as
/// an error response.
pub fn load_api_key(var: &str) -> SecretString {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => SecretString::new(value),
        _ => {
            tracing::warn!(
                "{} is not set; completion requests will be rejected upstream",
                var
            );
            SecretString::default()
        }
    }
}

/// Replace anything that looks like an API key with `[REDACTED]`.
pub fn scrub(text: &str) -> String {
    let mut result = text.to_string();

    for pattern in get_secret_patterns() {
        result = pattern.replace_all(&result, "[REDACTED]").to_string();
    }

    result
}
