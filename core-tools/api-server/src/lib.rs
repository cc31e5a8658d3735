//! API Server
//!
//! HTTP surface of the relay. It owns routing, CORS and JSON validation and
//! hands every chat request to the engine through a [`ChatHandle`].
//!
//! # Endpoints
//!
//! - POST /chat - Run one request cycle
//! - GET /api/status - Get server status
//!
//! # Status codes
//!
//! An upstream rejection is still a 200: the body is `{"error": "<raw
//! upstream body>"}`. Callers tell success from failure by the field name.
//! Faults inside the relay (storage, unreachable upstream) are a 500 with a
//! generic hint. Malformed JSON is rejected by the extractor before the
//! handler runs.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use sdk::{ChatHandle, ChatRequest, EngineError, RelayErrorExt};
use serde_json::json;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// API server state shared across handlers
#[derive(Clone)]
struct ServerState {
    chat: ChatHandle,
}

/// Build the router for the given chat handle
pub fn router(chat: ChatHandle) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/chat", post(chat_handler))
        .route("/api/status", get(status_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(ServerState { chat })
}

/// Running API server
pub struct APIServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl APIServer {
    /// Bind `addr` and start serving in the background
    ///
    /// Port 0 picks a free port; [`APIServer::addr`] reports the one bound.
    pub async fn start(chat: ChatHandle, addr: SocketAddr) -> Result<Self, EngineError> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| EngineError::Network(format!("Failed to bind to {}: {}", addr, e)))?;

        let addr = listener
            .local_addr()
            .map_err(|e| EngineError::Network(format!("Failed to get local address: {}", e)))?;

        let app = router(chat);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            tracing::info!("API server listening on http://{}", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_rx.await.ok();
                    tracing::info!("API server shutting down gracefully");
                })
                .await
                .unwrap_or_else(|e| {
                    tracing::error!("API server error: {}", e);
                });
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    /// Address the server is bound to
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn stop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            shutdown_tx.send(()).ok();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!("API server task failed: {}", e);
            }
            tracing::info!("API server stopped");
        }
    }
}

/// Chat endpoint
async fn chat_handler(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match state.chat.chat(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            tracing::error!("Chat request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": e.user_hint()})),
            )
                .into_response()
        }
    }
}

/// Server status endpoint
async fn status_handler(State(state): State<ServerState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "persona": state.chat.persona(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use sdk::{ChatHandleImpl, ChatResponse};
    use std::sync::Arc;
    use tower::ServiceExt;

    /// Echoes the message back, rejects "reject", fails on "fail"
    struct EchoChat;

    #[async_trait]
    impl ChatHandleImpl for EchoChat {
        async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, EngineError> {
            match request.message.as_str() {
                "reject" => Ok(ChatResponse::error("{\"error\":\"Invalid API Key\"}")),
                "fail" => Err(EngineError::Database("disk full at /var/db".into())),
                other => Ok(ChatResponse::reply(format!("{} says {}", request.user, other))),
            }
        }

        fn persona(&self) -> String {
            "echo".to_string()
        }
    }

    fn app() -> Router {
        router(ChatHandle::new(Arc::new(EchoChat)))
    }

    fn chat_request(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/chat")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_reply() {
        let response = app()
            .oneshot(chat_request(r#"{"user":"robert","message":"hi"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"response": "robert says hi"}));
    }

    #[tokio::test]
    async fn test_upstream_rejection_is_200_with_error_body() {
        let response = app()
            .oneshot(chat_request(r#"{"user":"robert","message":"reject"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"error": "{\"error\":\"Invalid API Key\"}"})
        );
    }

    #[tokio::test]
    async fn test_internal_failure_is_500_with_hint() {
        let response = app()
            .oneshot(chat_request(r#"{"user":"robert","message":"fail"}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        let error = body["error"].as_str().unwrap();
        assert!(!error.contains("/var/db"));
    }

    #[tokio::test]
    async fn test_missing_field_rejected() {
        let response = app()
            .oneshot(chat_request(r#"{"user":"robert"}"#))
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_cors_preflight_allows_any_origin() {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/chat")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_status_reports_persona() {
        let request = Request::builder()
            .uri("/api/status")
            .body(Body::empty())
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["persona"], "echo");
    }

    #[tokio::test]
    async fn test_server_start_and_stop() {
        let mut server = APIServer::start(
            ChatHandle::new(Arc::new(EchoChat)),
            "127.0.0.1:0".parse().unwrap(),
        )
        .await
        .unwrap();
        assert_ne!(server.addr().port(), 0);

        let body: serde_json::Value = reqwest::Client::new()
            .post(format!("http://{}/chat", server.addr()))
            .json(&json!({"user": "ada", "message": "ping"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({"response": "ada says ping"}));

        server.stop().await;
    }
}
