//! SQLite interaction store
//!
//! Durable implementation of [`InteractionStore`] over the `memory` table.
//! All queries are parameterized.

use crate::memory::{check_limit, Exchange, InteractionStore};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sdk::errors::EngineError;
use sqlx::{Row, SqlitePool};

/// Interaction store backed by a shared sqlx pool
#[derive(Clone)]
pub struct SqliteInteractionStore {
    pool: SqlitePool,
}

impl SqliteInteractionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn insert(&self, user: &str, message: &str, response: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO memory (user, message, response) VALUES (?, ?, ?)")
            .bind(user)
            .bind(message)
            .bind(response)
            .execute(&self.pool)
            .await
            .context("Failed to save interaction")?;

        Ok(result.last_insert_rowid())
    }

    async fn select_recent(&self, user: &str, limit: u32) -> Result<Vec<Exchange>> {
        let rows = sqlx::query(
            r#"
            SELECT message, response
            FROM memory
            WHERE user = ?
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(user)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch past interactions")?;

        // Rows arrive newest first; the window is replayed oldest first
        let mut exchanges: Vec<Exchange> = rows
            .into_iter()
            .map(|row| Exchange {
                message: row.get("message"),
                response: row.get("response"),
            })
            .collect();
        exchanges.reverse();

        Ok(exchanges)
    }
}

fn storage_error(e: anyhow::Error) -> EngineError {
    EngineError::Database(format!("{:#}", e))
}

#[async_trait]
impl InteractionStore for SqliteInteractionStore {
    async fn initialize(&self) -> Result<(), EngineError> {
        super::apply_schema(&self.pool).await.map_err(storage_error)
    }

    async fn append(
        &self,
        user: &str,
        message: &str,
        response: &str,
    ) -> Result<(), EngineError> {
        let id = self
            .insert(user, message, response)
            .await
            .map_err(storage_error)?;
        tracing::debug!(user, id, "Saved interaction");
        Ok(())
    }

    async fn recent(&self, user: &str, limit: u32) -> Result<Vec<Exchange>, EngineError> {
        check_limit(limit)?;
        self.select_recent(user, limit)
            .await
            .map_err(storage_error)
    }
}
