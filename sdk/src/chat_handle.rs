//! Chat handle
//!
//! The HTTP surface never sees the store or the completion client. It holds a
//! `ChatHandle`, which the engine backs with its request handler.

use crate::errors::EngineError;
use crate::types::{ChatRequest, ChatResponse};
use async_trait::async_trait;
use std::sync::Arc;

/// Handle for chat operations
#[derive(Clone)]
pub struct ChatHandle {
    inner: Arc<dyn ChatHandleImpl>,
}

impl ChatHandle {
    /// Create a new ChatHandle with the given implementation
    pub fn new(inner: Arc<dyn ChatHandleImpl>) -> Self {
        Self { inner }
    }

    /// Run one request cycle for the given user and message
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, EngineError> {
        self.inner.chat(request).await
    }

    /// Name of the persona answering requests
    pub fn persona(&self) -> String {
        self.inner.persona()
    }
}

/// Trait for chat handle implementation (to be implemented by engine)
#[async_trait]
pub trait ChatHandleImpl: Send + Sync {
    /// Handle a chat request.
    ///
    /// Upstream rejections come back as `Ok(ChatResponse::Error { .. })`.
    /// `Err` is reserved for faults the caller cannot recover from, such as
    /// storage failures.
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, EngineError>;

    /// Name of the active persona
    fn persona(&self) -> String;
}
