//! crates/flash_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture: the server
//! backs `RecordStore` with Postgres, the client backs it with HTTP calls to
//! the server, and tests back it with `memory::InMemoryStore`.

use crate::domain::{Flashcard, Summary};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Whether repeating the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PortError::Timeout(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage of summaries and flashcards.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // --- Summaries ---
    async fn create_summary(&self, text: &str) -> PortResult<Summary>;

    async fn list_summaries(&self) -> PortResult<Vec<Summary>>;

    // --- Flashcards ---
    async fn create_flashcard(&self, summary: &str) -> PortResult<Flashcard>;

    async fn list_flashcards(&self) -> PortResult<Vec<Flashcard>>;

    /// Removes a flashcard. Returns `PortError::NotFound` if no flashcard has `id`.
    async fn delete_flashcard(&self, id: Uuid) -> PortResult<()>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Sends a prompt to a generative-text model and returns its free-form reply.
    async fn generate_text(&self, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Places `text` on the system clipboard.
    async fn write_text(&self, text: &str) -> PortResult<()>;
}
