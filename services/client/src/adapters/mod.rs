//! services/client/src/adapters/mod.rs
//!
//! Concrete implementations of the `flash_core` ports for the command-line client.

pub mod clipboard;
pub mod gemini;
pub mod http_store;
pub mod openai;

pub use clipboard::CommandClipboard;
pub use gemini::GeminiAdapter;
pub use http_store::HttpRecordStore;
pub use openai::OpenAiTextAdapter;

use async_trait::async_trait;
use flash_core::ports::{PortError, PortResult, TextGenerationService};

/// Stands in for a generator that could not be configured, so commands that
/// never generate text still run.
#[derive(Debug, Clone)]
pub struct MissingGenerator {
    reason: String,
}

impl MissingGenerator {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextGenerationService for MissingGenerator {
    async fn generate_text(&self, _prompt: &str) -> PortResult<String> {
        Err(PortError::Unexpected(self.reason.clone()))
    }
}
