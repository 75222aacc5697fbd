//! crates/flash_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The full generated text returned for one submission.
///
/// `text` never changes once the store has accepted the record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A user-curated note. `summary` is a copy of the text it was promoted from,
/// not a reference to the originating `Summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

/// A question/answer pair split out of generated text. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QAPair {
    pub question: String,
    pub answer: String,
}

impl QAPair {
    /// The pair as a single line of text, used for copying and promotion.
    pub fn to_text(&self) -> String {
        if self.answer.is_empty() {
            self.question.clone()
        } else {
            format!("{} {}", self.question, self.answer)
        }
    }
}
