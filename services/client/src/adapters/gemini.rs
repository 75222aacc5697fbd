//! services/client/src/adapters/gemini.rs
//!
//! This module contains the adapter for Google's Gemini `generateContent` API.
//! It implements the `TextGenerationService` port from the `core` crate.

use async_trait::async_trait;
use flash_core::ports::{PortError, PortResult, TextGenerationService};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` against Gemini.
#[derive(Clone)]
pub struct GeminiAdapter {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiAdapter {
    /// Creates a new `GeminiAdapter`. `base_url` is the API root without a version.
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

//=========================================================================================
// Wire Types
//=========================================================================================

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pulls `candidates[0].content.parts[0].text` out of a response body.
fn extract_text(response: GenerateContentResponse) -> PortResult<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| PortError::Unexpected("Invalid response.".to_string()))
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for GeminiAdapter {
    async fn generate_text(&self, prompt: &str) -> PortResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PortError::Timeout(e.to_string())
                } else {
                    PortError::Unexpected(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PortError::Unexpected(format!(
                "Failed to fetch summary (HTTP {})",
                status.as_u16()
            )));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        let text = extract_text(body)?;
        info!(model = %self.model, chars = text.len(), "generated study text");
        Ok(text)
    }
}
