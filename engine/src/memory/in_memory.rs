//! Process-local interaction store
//!
//! Same ordering and windowing semantics as the SQLite store, without
//! durability. Used by tests and by anyone embedding the handler without a
//! database.

use super::{check_limit, Exchange, InteractionRecord, InteractionStore};
use async_trait::async_trait;
use sdk::errors::EngineError;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Log {
    next_id: i64,
    records: Vec<InteractionRecord>,
}

/// In-memory store backed by a mutex-guarded vector
#[derive(Default)]
pub struct InMemoryInteractionStore {
    log: Mutex<Log>,
}

impl InMemoryInteractionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every record, in insertion order
    pub fn records(&self) -> Result<Vec<InteractionRecord>, EngineError> {
        Ok(self.lock()?.records.clone())
    }

    /// Number of records across all users
    pub fn len(&self) -> Result<usize, EngineError> {
        Ok(self.lock()?.records.len())
    }

    /// Returns true when nothing has been appended
    pub fn is_empty(&self) -> Result<bool, EngineError> {
        Ok(self.len()? == 0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Log>, EngineError> {
        self.log
            .lock()
            .map_err(|_| EngineError::Database("interaction log lock poisoned".to_string()))
    }
}

#[async_trait]
impl InteractionStore for InMemoryInteractionStore {
    async fn initialize(&self) -> Result<(), EngineError> {
        self.lock().map(|_| ())
    }

    async fn append(
        &self,
        user: &str,
        message: &str,
        response: &str,
    ) -> Result<(), EngineError> {
        let mut log = self.lock()?;
        log.next_id += 1;
        let id = log.next_id;
        log.records.push(InteractionRecord {
            id,
            user: user.to_string(),
            message: message.to_string(),
            response: response.to_string(),
        });
        Ok(())
    }

    async fn recent(&self, user: &str, limit: u32) -> Result<Vec<Exchange>, EngineError> {
        check_limit(limit)?;
        let log = self.lock()?;

        // Newest first, bounded, then replayed oldest first
        let mut window: Vec<Exchange> = log
            .records
            .iter()
            .rev()
            .filter(|r| r.user == user)
            .take(limit as usize)
            .cloned()
            .map(Exchange::from)
            .collect();
        window.reverse();

        Ok(window)
    }
}
