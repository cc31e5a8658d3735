//! Completion client abstraction
//!
//! The relay talks to one remote chat-completion service per request. The
//! [`CompletionClient`] trait is the seam between the request handler and the
//! HTTP client, so tests can swap in a scripted client.
//!
//! A non-success status is not an error at this layer. It comes back as
//! [`Completion::Rejected`] carrying the raw body, and the handler turns it
//! into an error response for the caller. [`LLMError`] is reserved for
//! failures where no usable answer exists at all (unreachable service,
//! malformed success body).

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod openai;

pub use openai::OpenAICompatClient;

/// Result type for completion operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Errors that can occur while obtaining a completion
#[derive(Debug, thiserror::Error)]
pub enum LLMError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<LLMError> for EngineError {
    fn from(e: LLMError) -> Self {
        match e {
            LLMError::NetworkError(msg) => EngineError::Network(msg),
            LLMError::ParseError(msg) => EngineError::LLMProvider(msg),
        }
    }
}

/// Message in the outbound request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Role of the message sender
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Persona guidance
    System,

    /// Flattened transcript
    User,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
        }
    }
}

/// Outcome of a completion call that reached the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// First choice's content, trimmed
    Reply(String),

    /// Non-success status; `body` is the raw response text
    Rejected { status: u16, body: String },
}

impl Completion {
    /// Returns true for a non-success outcome
    pub fn is_rejected(&self) -> bool {
        matches!(self, Completion::Rejected { .. })
    }
}

/// Client for a remote chat-completion endpoint
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Returns the name of the client (e.g., "openai-compatible")
    fn name(&self) -> &str;

    /// Send the system instruction and transcript to the given model
    ///
    /// # Returns
    /// * `Ok(Completion::Reply)` - the trimmed reply text
    /// * `Ok(Completion::Rejected)` - the service answered with a non-success status
    /// * `Err(LLMError)` - the service could not be reached or its answer was unusable
    async fn complete(
        &self,
        system_instruction: &str,
        prompt_text: &str,
        model: &str,
    ) -> Result<Completion>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, MessageRole::User);
        assert_eq!(user_msg.content, "Hello");

        let system_msg = Message::system("You are a helpful assistant");
        assert_eq!(system_msg.role, MessageRole::System);
    }

    #[test]
    fn test_message_serialization() {
        let json = serde_json::to_value(Message::system("x")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "x"}));
    }

    #[test]
    fn test_role_display() {
        assert_eq!(MessageRole::System.to_string(), "system");
        assert_eq!(MessageRole::User.to_string(), "user");
    }

    #[test]
    fn test_error_conversion() {
        let err: EngineError = LLMError::NetworkError("refused".into()).into();
        assert!(matches!(err, EngineError::Network(_)));

        let err: EngineError = LLMError::ParseError("no choices".into()).into();
        assert!(matches!(err, EngineError::LLMProvider(_)));
    }

    #[test]
    fn test_completion_is_rejected() {
        assert!(!Completion::Reply("hi".into()).is_rejected());
        assert!(Completion::Rejected {
            status: 401,
            body: "nope".into()
        }
        .is_rejected());
    }
}
