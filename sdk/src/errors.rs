//! Error types and handling
//!
//! This module provides the error types used throughout the relay.
//! All errors implement the `RelayErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Hints never include API keys, file paths or raw upstream bodies, so they
//! are safe to hand back to HTTP callers.

use thiserror::Error;

/// Trait for relay error extensions
pub trait RelayErrorExt {
    /// Returns a user-friendly hint for the error
    ///
    /// The hint is safe to display to end users.
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    ///
    /// Recoverable errors can be retried. Non-recoverable errors need the
    /// operator to fix configuration or storage first.
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// # Error Categories
///
/// - **Configuration**: Invalid or missing configuration
/// - **Database**: SQLite operation failures
/// - **LLM Provider**: Malformed or unusable completion responses
/// - **Network**: The completion service could not be reached
/// - **Invalid argument**: Caller passed a value outside the contract
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RelayErrorExt};
///
/// let error = EngineError::Network("connection refused".to_string());
/// println!("Hint: {}", error.user_hint());
/// assert!(error.is_recoverable());
///
/// let fatal = EngineError::Config("unknown persona 'pirate'".to_string());
/// assert!(!fatal.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // LLM provider errors
    #[error("LLM provider error: {0}")]
    LLMProvider(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Argument errors
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::Database(_) => "Conversation storage is unavailable. Try again later",
            Self::LLMProvider(_) => "The completion service returned an unusable response",
            Self::Network(_) => "Could not reach the completion service. Check your network",
            Self::InvalidArgument(_) => "The request contained an invalid value",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        match self {
            // Non-recoverable errors
            Self::Config(_) | Self::Io(_) => false,

            // All other errors are potentially recoverable
            _ => true,
        }
    }
}
