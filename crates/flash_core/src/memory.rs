//! crates/flash_core/src/memory.rs
//!
//! A process-local `RecordStore`. Records keep insertion order and vanish when
//! the process exits.

use crate::domain::{Flashcard, Summary};
use crate::ports::{PortError, PortResult, RecordStore};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStore {
    summaries: RwLock<Vec<Summary>>,
    flashcards: RwLock<Vec<Flashcard>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> PortError {
    PortError::Unexpected("in-memory store lock poisoned".to_string())
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create_summary(&self, text: &str) -> PortResult<Summary> {
        let summary = Summary {
            id: Uuid::new_v4(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.summaries
            .write()
            .map_err(poisoned)?
            .push(summary.clone());
        Ok(summary)
    }

    async fn list_summaries(&self) -> PortResult<Vec<Summary>> {
        Ok(self.summaries.read().map_err(poisoned)?.clone())
    }

    async fn create_flashcard(&self, summary: &str) -> PortResult<Flashcard> {
        let card = Flashcard {
            id: Uuid::new_v4(),
            summary: summary.to_string(),
            created_at: Utc::now(),
        };
        self.flashcards.write().map_err(poisoned)?.push(card.clone());
        Ok(card)
    }

    async fn list_flashcards(&self) -> PortResult<Vec<Flashcard>> {
        Ok(self.flashcards.read().map_err(poisoned)?.clone())
    }

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<()> {
        let mut cards = self.flashcards.write().map_err(poisoned)?;
        let position = cards
            .iter()
            .position(|card| card.id == id)
            .ok_or_else(|| PortError::NotFound(format!("Flashcard {} not found", id)))?;
        cards.remove(position);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn summaries_are_listed_in_insertion_order() {
        let store = InMemoryStore::new();
        let first = store.create_summary("first").await.unwrap();
        let second = store.create_summary("second").await.unwrap();
        assert_ne!(first.id, second.id);

        let listed = store.list_summaries().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn deleting_a_flashcard_leaves_the_others() {
        let store = InMemoryStore::new();
        let keep = store.create_flashcard("keep").await.unwrap();
        let drop = store.create_flashcard("drop").await.unwrap();

        store.delete_flashcard(drop.id).await.unwrap();
        assert_eq!(store.list_flashcards().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn deleting_an_unknown_flashcard_is_not_found() {
        let store = InMemoryStore::new();
        let card = store.create_flashcard("once").await.unwrap();
        store.delete_flashcard(card.id).await.unwrap();

        let err = store.delete_flashcard(card.id).await.unwrap_err();
        assert!(matches!(err, PortError::NotFound(_)));
    }

    #[tokio::test]
    async fn flashcards_are_independent_of_summaries() {
        let store = InMemoryStore::new();
        let summary = store.create_summary("Q? A").await.unwrap();
        let card = store.create_flashcard(&summary.text).await.unwrap();
        assert_eq!(card.summary, summary.text);
        assert_eq!(store.list_summaries().await.unwrap().len(), 1);
    }
}
