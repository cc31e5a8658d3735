//! Chat request/response types

use serde::{Deserialize, Serialize};

/// Body of an inbound chat request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    /// Opaque user identifier used to key the history window
    pub user: String,

    /// The user's new message
    pub message: String,
}

impl ChatRequest {
    /// Create a new ChatRequest
    pub fn new(user: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            message: message.into(),
        }
    }
}

/// Outcome of a chat request as seen by the caller.
///
/// Serialized without a tag, so the wire form is either
/// `{"response": "..."}` or `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ChatResponse {
    /// The model replied and the exchange was persisted
    Reply { response: String },

    /// The completion service rejected the request; carries its raw body
    Error { error: String },
}

impl ChatResponse {
    /// Create a reply response
    pub fn reply(response: impl Into<String>) -> Self {
        Self::Reply {
            response: response.into(),
        }
    }

    /// Create an error response
    pub fn error(error: impl Into<String>) -> Self {
        Self::Error {
            error: error.into(),
        }
    }

    /// Returns true if this response carries an upstream error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The reply text, if any
    pub fn reply_text(&self) -> Option<&str> {
        match self {
            Self::Reply { response } => Some(response),
            Self::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_request_from_json() {
        let req: ChatRequest =
            serde_json::from_value(json!({"user": "robert", "message": "Tell me a joke"}))
                .unwrap();
        assert_eq!(req, ChatRequest::new("robert", "Tell me a joke"));
    }

    #[test]
    fn test_chat_request_missing_field() {
        let result = serde_json::from_value::<ChatRequest>(json!({"user": "robert"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_reply_wire_format() {
        let value = serde_json::to_value(ChatResponse::reply("Why did...")).unwrap();
        assert_eq!(value, json!({"response": "Why did..."}));
    }

    #[test]
    fn test_error_wire_format() {
        let value = serde_json::to_value(ChatResponse::error("{\"error\":\"bad key\"}")).unwrap();
        assert_eq!(value, json!({"error": "{\"error\":\"bad key\"}"}));
    }

    #[test]
    fn test_response_accessors() {
        let reply = ChatResponse::reply("hello");
        assert!(!reply.is_error());
        assert_eq!(reply.reply_text(), Some("hello"));

        let error = ChatResponse::error("nope");
        assert!(error.is_error());
        assert_eq!(error.reply_text(), None);
    }

    #[test]
    fn test_response_deserializes_either_shape() {
        let reply: ChatResponse = serde_json::from_value(json!({"response": "hi"})).unwrap();
        assert_eq!(reply, ChatResponse::reply("hi"));

        let error: ChatResponse = serde_json::from_value(json!({"error": "boom"})).unwrap();
        assert_eq!(error, ChatResponse::error("boom"));
    }
}
