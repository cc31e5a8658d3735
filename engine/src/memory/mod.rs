//! Conversation memory
//!
//! An append-only log of (user, message, response) records. The request
//! handler reads a user's most recent window to build prompt context and
//! appends one record per successful exchange.
//!
//! Two stores implement [`InteractionStore`]:
//! - [`crate::db::SqliteInteractionStore`], the durable store used by the binary
//! - [`InMemoryInteractionStore`], a process-local substitute for tests

use async_trait::async_trait;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};

pub mod in_memory;

pub use in_memory::InMemoryInteractionStore;

/// Number of past exchanges replayed into a prompt when nothing else is configured
pub const DEFAULT_HISTORY_LIMIT: u32 = 5;

/// One stored exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InteractionRecord {
    /// Store-assigned, strictly increasing with insertion order
    pub id: i64,
    pub user: String,
    pub message: String,
    pub response: String,
}

/// A (message, response) pair as replayed into a prompt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Exchange {
    pub message: String,
    pub response: String,
}

impl Exchange {
    /// Create a new exchange
    pub fn new(message: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            response: response.into(),
        }
    }
}

impl From<InteractionRecord> for Exchange {
    fn from(record: InteractionRecord) -> Self {
        Self {
            message: record.message,
            response: record.response,
        }
    }
}

impl<M: Into<String>, R: Into<String>> From<(M, R)> for Exchange {
    fn from((message, response): (M, R)) -> Self {
        Self::new(message, response)
    }
}

/// Storage contract for conversation memory.
///
/// Records are never updated or removed. `recent` returns the `limit`
/// highest-id records of one user, oldest first.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Ensure the backing structure exists. Safe to call repeatedly.
    async fn initialize(&self) -> Result<(), EngineError>;

    /// Append one exchange with the next sequential id.
    ///
    /// Empty strings are stored as given. The write is all-or-nothing.
    async fn append(&self, user: &str, message: &str, response: &str)
        -> Result<(), EngineError>;

    /// Up to `limit` most recent exchanges of `user`, oldest first.
    ///
    /// `limit` must be positive.
    async fn recent(&self, user: &str, limit: u32) -> Result<Vec<Exchange>, EngineError>;
}

/// Reject a zero window size
pub(crate) fn check_limit(limit: u32) -> Result<(), EngineError> {
    if limit == 0 {
        return Err(EngineError::InvalidArgument(
            "history limit must be a positive integer".to_string(),
        ));
    }
    Ok(())
}
