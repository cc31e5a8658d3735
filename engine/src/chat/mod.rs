//! Request handler
//!
//! One linear sequence per incoming chat request:
//!
//! 1. Fetch the user's recent history window from the store
//! 2. Build the prompt for the active persona
//! 3. Call the completion client
//! 4. On rejection: return `{error: body}` and write nothing
//! 5. Otherwise append the exchange, then return `{response: reply}`
//!
//! Persistence happens before the reply is returned. If the append fails the
//! caller gets a storage error even though the completion succeeded, and the
//! reply is lost. That window is logged, not papered over.

use async_trait::async_trait;
use sdk::errors::EngineError;
use sdk::{ChatHandleImpl, ChatRequest, ChatResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::llm::{Completion, CompletionClient};
use crate::memory::{Exchange, InteractionStore, DEFAULT_HISTORY_LIMIT};
use crate::persona::Persona;
use crate::prompt;

/// Request handler wired to one store, one client and one persona
pub struct ChatService {
    /// Conversation memory, shared across all users
    store: Arc<dyn InteractionStore>,

    /// Remote completion client
    client: Arc<dyn CompletionClient>,

    /// System instruction and model for every request
    persona: Persona,

    /// Number of past exchanges replayed into each prompt
    history_limit: u32,
}

impl ChatService {
    /// Create a new chat service with the default history window
    pub fn new(
        store: Arc<dyn InteractionStore>,
        client: Arc<dyn CompletionClient>,
        persona: Persona,
    ) -> Self {
        Self {
            store,
            client,
            persona,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override the history window size
    pub fn with_history_limit(mut self, history_limit: u32) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Active persona
    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    /// Run one request cycle
    pub async fn handle(&self, request: &ChatRequest) -> Result<ChatResponse, EngineError> {
        let start = Instant::now();

        let history = self.store.recent(&request.user, self.history_limit).await?;
        debug!(
            user = %request.user,
            history = history.len(),
            "Loaded conversation history"
        );

        let prompt = prompt::build(&self.persona.system_instruction, &history, &request.message);

        let completion = self
            .client
            .complete(
                &prompt.system_instruction,
                &prompt.transcript,
                &self.persona.model,
            )
            .await?;

        let reply = match completion {
            Completion::Reply(reply) => reply,
            Completion::Rejected { status, body } => {
                warn!(
                    user = %request.user,
                    status,
                    "Completion rejected; nothing persisted"
                );
                return Ok(ChatResponse::error(body));
            }
        };

        if let Err(e) = self
            .store
            .append(&request.user, &request.message, &reply)
            .await
        {
            error!(
                user = %request.user,
                "Completion succeeded but the exchange could not be persisted: {}",
                e
            );
            return Err(e);
        }

        info!(
            user = %request.user,
            persona = %self.persona.name,
            duration_ms = start.elapsed().as_millis() as u64,
            "Chat request completed"
        );

        Ok(ChatResponse::reply(reply))
    }

    /// Read a user's recent window without running a request
    pub async fn history(&self, user: &str, limit: u32) -> Result<Vec<Exchange>, EngineError> {
        self.store.recent(user, limit).await
    }
}

#[async_trait]
impl ChatHandleImpl for ChatService {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, EngineError> {
        self.handle(&request).await
    }

    fn persona(&self) -> String {
        self.persona.name.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LLMError, Result as LLMResult};
    use crate::memory::InMemoryInteractionStore;
    use std::sync::Mutex;

    /// Client that records its inputs and answers with a fixed outcome
    struct ScriptedClient {
        outcome: Mutex<Option<LLMResult<Completion>>>,
        seen: Mutex<Vec<(String, String, String)>>,
    }

    impl ScriptedClient {
        fn new(outcome: LLMResult<Completion>) -> Arc<Self> {
            Arc::new(Self {
                outcome: Mutex::new(Some(outcome)),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn seen(&self) -> Vec<(String, String, String)> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            system_instruction: &str,
            prompt_text: &str,
            model: &str,
        ) -> LLMResult<Completion> {
            self.seen.lock().unwrap().push((
                system_instruction.to_string(),
                prompt_text.to_string(),
                model.to_string(),
            ));
            self.outcome
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Err(LLMError::NetworkError("script exhausted".into())))
        }
    }

    /// Store whose appends always fail
    struct ReadOnlyStore;

    #[async_trait]
    impl InteractionStore for ReadOnlyStore {
        async fn initialize(&self) -> Result<(), EngineError> {
            Ok(())
        }

        async fn append(&self, _: &str, _: &str, _: &str) -> Result<(), EngineError> {
            Err(EngineError::Database("disk full".into()))
        }

        async fn recent(&self, _: &str, _: u32) -> Result<Vec<Exchange>, EngineError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_joke_scenario() {
        let store = Arc::new(InMemoryInteractionStore::new());
        let client = ScriptedClient::new(Ok(Completion::Reply("Why did...".into())));
        let service = ChatService::new(store.clone(), client.clone(), Persona::naija());

        let response = service
            .handle(&ChatRequest::new("robert", "Tell me a joke"))
            .await
            .unwrap();

        assert_eq!(response, ChatResponse::reply("Why did..."));
        assert_eq!(
            client.seen(),
            vec![(
                Persona::naija().system_instruction,
                "User: Tell me a joke\nBot:".to_string(),
                Persona::naija().model,
            )]
        );
        assert_eq!(
            store.recent("robert", 5).await.unwrap(),
            vec![Exchange::new("Tell me a joke", "Why did...")]
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_history_feeds_prompt() {
        let store = Arc::new(InMemoryInteractionStore::new());
        store.append("u1", "hi", "hello").await.unwrap();
        let client = ScriptedClient::new(Ok(Completion::Reply("see ya".into())));
        let service = ChatService::new(store.clone(), client.clone(), Persona::assistant());

        service
            .handle(&ChatRequest::new("u1", "bye"))
            .await
            .unwrap();

        assert_eq!(client.seen()[0].1, "User: hi\nBot: hello\nUser: bye\nBot:");
    }

    #[tokio::test]
    async fn test_history_window_respects_limit() {
        let store = Arc::new(InMemoryInteractionStore::new());
        for i in 1..=4 {
            store
                .append("u1", &format!("m{}", i), &format!("r{}", i))
                .await
                .unwrap();
        }
        let client = ScriptedClient::new(Ok(Completion::Reply("ok".into())));
        let service = ChatService::new(store.clone(), client.clone(), Persona::assistant())
            .with_history_limit(2);

        service.handle(&ChatRequest::new("u1", "m5")).await.unwrap();

        assert_eq!(
            client.seen()[0].1,
            "User: m3\nBot: r3\nUser: m4\nBot: r4\nUser: m5\nBot:"
        );
    }

    #[tokio::test]
    async fn test_rejection_passes_body_and_writes_nothing() {
        let store = Arc::new(InMemoryInteractionStore::new());
        store.append("u1", "hi", "hello").await.unwrap();
        let before = store.records().unwrap();

        let body = r#"{"error":{"message":"Invalid API Key"}}"#;
        let client = ScriptedClient::new(Ok(Completion::Rejected {
            status: 401,
            body: body.to_string(),
        }));
        let service = ChatService::new(store.clone(), client, Persona::naija());

        let response = service
            .handle(&ChatRequest::new("u1", "again"))
            .await
            .unwrap();

        assert_eq!(response, ChatResponse::error(body));
        assert_eq!(store.records().unwrap(), before);
    }

    #[tokio::test]
    async fn test_transport_failure_propagates_without_write() {
        let store = Arc::new(InMemoryInteractionStore::new());
        let client = ScriptedClient::new(Err(LLMError::NetworkError("refused".into())));
        let service = ChatService::new(store.clone(), client, Persona::naija());

        let result = service.handle(&ChatRequest::new("u1", "hello")).await;

        assert!(matches!(result, Err(EngineError::Network(_))));
        assert!(store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_storage_failure_after_completion_is_fatal() {
        let client = ScriptedClient::new(Ok(Completion::Reply("lost reply".into())));
        let service = ChatService::new(Arc::new(ReadOnlyStore), client, Persona::naija());

        let result = service.handle(&ChatRequest::new("u1", "hello")).await;

        assert!(matches!(result, Err(EngineError::Database(_))));
    }

    #[tokio::test]
    async fn test_handle_impl_reports_persona() {
        let client = ScriptedClient::new(Ok(Completion::Reply("x".into())));
        let service = ChatService::new(
            Arc::new(InMemoryInteractionStore::new()),
            client,
            Persona::assistant(),
        );

        assert_eq!(ChatHandleImpl::persona(&service), "assistant");
    }
}
