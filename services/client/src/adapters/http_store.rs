//! services/client/src/adapters/http_store.rs
//!
//! Implements the `RecordStore` port by calling the REST server.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use flash_core::domain::{Flashcard, Summary};
use flash_core::ports::{PortError, PortResult, RecordStore};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct HttpRecordStore {
    http: Client,
    base_url: String,
}

impl HttpRecordStore {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

//=========================================================================================
// Wire Records
//=========================================================================================

#[derive(Serialize)]
struct NewSummary<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct NewFlashcard<'a> {
    summary: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
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

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
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

#[derive(Deserialize)]
struct ErrorRecord {
    message: String,
}

//=========================================================================================
// Error Mapping
//=========================================================================================

fn transport(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Timeout(e.to_string())
    } else {
        PortError::Unexpected(e.to_string())
    }
}

/// Passes 2xx responses through and turns the rest into a `PortError`
/// carrying the server's message.
async fn check(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorRecord>()
        .await
        .map(|body| body.message)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Unknown error").to_string());

    Err(match status {
        StatusCode::NOT_FOUND => PortError::NotFound(message),
        StatusCode::BAD_REQUEST => PortError::InvalidInput(message),
        _ => PortError::Unexpected(format!("HTTP {}: {}", status.as_u16(), message)),
    })
}

//=========================================================================================
// `RecordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn create_summary(&self, text: &str) -> PortResult<Summary> {
        let response = self
            .http
            .post(self.url("/summaries"))
            .json(&NewSummary { text })
            .send()
            .await
            .map_err(transport)?;
        let record: SummaryRecord = check(response).await?.json().await.map_err(transport)?;
        Ok(record.to_domain())
    }

    async fn list_summaries(&self) -> PortResult<Vec<Summary>> {
        let response = self
            .http
            .get(self.url("/summaries"))
            .send()
            .await
            .map_err(transport)?;
        let records: Vec<SummaryRecord> =
            check(response).await?.json().await.map_err(transport)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_flashcard(&self, summary: &str) -> PortResult<Flashcard> {
        let response = self
            .http
            .post(self.url("/flashcards"))
            .json(&NewFlashcard { summary })
            .send()
            .await
            .map_err(transport)?;
        let record: FlashcardRecord = check(response).await?.json().await.map_err(transport)?;
        Ok(record.to_domain())
    }

    async fn list_flashcards(&self) -> PortResult<Vec<Flashcard>> {
        let response = self
            .http
            .get(self.url("/flashcards"))
            .send()
            .await
            .map_err(transport)?;
        let records: Vec<FlashcardRecord> =
            check(response).await?.json().await.map_err(transport)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_flashcard(&self, id: Uuid) -> PortResult<()> {
        let response = self
            .http
            .delete(self.url(&format!("/flashcards/{}", id)))
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;
        Ok(())
    }
}
