//! OpenAI-compatible completion client
//!
//! Speaks the `/chat/completions` dialect shared by Groq, OpenAI and most
//! hosted inference APIs. One blocking call per request: no retry, no
//! streaming, no client-side timeout.

use super::{Completion, CompletionClient, LLMError, Message, Result};
use crate::secrets::{self, SecretString};
use async_trait::async_trait;
use serde_json::json;

pub struct OpenAICompatClient {
    base_url: String,
    api_key: SecretString,
    client: reqwest::Client,
}

impl OpenAICompatClient {
    /// Create a client for `base_url` (e.g. "https://api.groq.com/openai/v1")
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Full URL of the completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Pull `choices[0].message.content` out of a success body
fn extract_reply(data: &serde_json::Value) -> Result<String> {
    let choice = data
        .get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| LLMError::ParseError("No choices in response".to_string()))?;

    let message = choice
        .get("message")
        .ok_or_else(|| LLMError::ParseError("No message in choice".to_string()))?;

    message
        .get("content")
        .and_then(|c| c.as_str())
        .map(|c| c.trim().to_string())
        .ok_or_else(|| LLMError::ParseError("Empty content".to_string()))
}

#[async_trait]
impl CompletionClient for OpenAICompatClient {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    async fn complete(
        &self,
        system_instruction: &str,
        prompt_text: &str,
        model: &str,
    ) -> Result<Completion> {
        let messages = [Message::system(system_instruction), Message::user(prompt_text)];

        let payload = json!({
            "model": model,
            "messages": messages,
        });

        tracing::debug!(model, endpoint = %self.endpoint(), "Sending completion request");

        let response = self
            .client
            .post(self.endpoint())
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.unsecure()),
            )
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(secrets::scrub(&e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                status = status.as_u16(),
                "Completion service rejected request: {}",
                secrets::scrub(&body)
            );
            return Ok(Completion::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        extract_reply(&data).map(Completion::Reply)
    }
}
