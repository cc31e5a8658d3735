//! Chat Relay SDK
//!
//! Shared types used by the engine and the HTTP surface: the chat wire
//! format, the engine error type, and the handle through which the HTTP
//! server reaches the request handler.

/// Chat handle seam between the HTTP surface and the engine
pub mod chat_handle;

/// Error types and handling
pub mod errors;

/// Chat request/response wire types
pub mod types;

// Re-export commonly used types
pub use chat_handle::{ChatHandle, ChatHandleImpl};
pub use errors::{EngineError, RelayErrorExt};
pub use types::{ChatRequest, ChatResponse};
