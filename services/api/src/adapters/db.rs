//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `RecordStore` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flash_core::domain::{Flashcard, Summary};
use flash_core::ports::{PortError, PortResult, RecordStore};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `RecordStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Waits for checked-out connections to return, then closes the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    text: String,
    created_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> Summary {
        Summary {
            id: self.id,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct FlashcardRecord {
    id: Uuid,
    summary: String,
    created_at: DateTime<Utc>,
}
impl FlashcardRecord {
    fn to_domain(self) -> Flashcard {
        Flashcard {
            id: self.id,
            summary: self.summary,
            created_at: self.created_at,
        }
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for DbAdapter {
    async fn create_summary(&self, text: &str) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(
            "INSERT INTO summaries (text) VALUES ($1) RETURNING id, text, created_at",
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_summaries(&self) -> PortResult<Vec<Summary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(
            "SELECT id, text, created_at FROM summaries ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let summaries = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(summaries)
    }

    async fn create_flashcard(&self, summary: &str) -> PortResult<Flashcard> {
        let record = sqlx::query_as::<_, FlashcardRecord>(
            "INSERT INTO flashcards (summary) VALUES ($1) RETURNING id, summary, created_at",
        )
        .bind(summary)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_flashcards(&self) -> PortResult<Vec<Flashcard>> {
        let records = sqlx::query_as::<_, FlashcardRecord>(
            "SELECT id, summary, created_at FROM flashcards ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let flashcards = records.into_iter().map(|r| r.to_domain()).collect();
        Ok(flashcards)
    }

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM flashcards WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Flashcard {} not found", id)));
        }
        Ok(())
    }
}
