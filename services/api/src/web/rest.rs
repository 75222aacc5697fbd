//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::{ErrorBody, HttpError};
use crate::web::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use flash_core::domain::{Flashcard, Summary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        health_handler,
        create_summary_handler,
        list_summaries_handler,
        create_flashcard_handler,
        list_flashcards_handler,
        delete_flashcard_handler,
    ),
    components(
        schemas(
            CreateSummaryRequest,
            CreateFlashcardRequest,
            SummaryResponse,
            FlashcardResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Flashcards API", description = "Generated study summaries and flashcards.")
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// The OpenAPI document as pretty-printed JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        ApiDoc::openapi().to_pretty_json()
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct CreateSummaryRequest {
    pub text: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateFlashcardRequest {
    pub summary: String,
}

/// A stored summary as it appears on the wire.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl From<Summary> for SummaryResponse {
    fn from(summary: Summary) -> Self {
        Self {
            id: summary.id,
            text: summary.text,
            created_at: summary.created_at,
        }
    }
}

/// A stored flashcard as it appears on the wire.
#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardResponse {
    pub id: Uuid,
    pub summary: String,
    pub created_at: DateTime<Utc>,
}

impl From<Flashcard> for FlashcardResponse {
    fn from(card: Flashcard) -> Self {
        Self {
            id: card.id,
            summary: card.summary,
            created_at: card.created_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "The server is up"))
)]
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Store the generated text of one submission.
#[utoipa::path(
    post,
    path = "/summaries",
    request_body = CreateSummaryRequest,
    responses(
        (status = 201, description = "Summary stored", body = SummaryResponse),
        (status = 500, description = "Malformed body or store failure", body = ErrorBody)
    )
)]
pub async fn create_summary_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateSummaryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(request) = payload.map_err(|e| HttpError::internal(e, "Error saving summary"))?;

    let summary = app_state
        .store
        .create_summary(&request.text)
        .await
        .map_err(|e| HttpError::from_port(e, "Error saving summary"))?;

    info!(summary_id = %summary.id, "summary created");
    Ok((StatusCode::CREATED, Json(SummaryResponse::from(summary))))
}

/// List every stored summary.
#[utoipa::path(
    get,
    path = "/summaries",
    responses(
        (status = 200, description = "All summaries", body = [SummaryResponse]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_summaries_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<SummaryResponse>>, HttpError> {
    let summaries = app_state
        .store
        .list_summaries()
        .await
        .map_err(|e| HttpError::from_port(e, "Error fetching summaries"))?;

    Ok(Json(summaries.into_iter().map(SummaryResponse::from).collect()))
}

/// Store a flashcard holding a copy of some summary text.
#[utoipa::path(
    post,
    path = "/flashcards",
    request_body = CreateFlashcardRequest,
    responses(
        (status = 201, description = "Flashcard stored", body = FlashcardResponse),
        (status = 500, description = "Malformed body or store failure", body = ErrorBody)
    )
)]
pub async fn create_flashcard_handler(
    State(app_state): State<Arc<AppState>>,
    payload: Result<Json<CreateFlashcardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(request) = payload.map_err(|e| HttpError::internal(e, "Error saving flashcard"))?;

    let card = app_state
        .store
        .create_flashcard(&request.summary)
        .await
        .map_err(|e| HttpError::from_port(e, "Error saving flashcard"))?;

    info!(flashcard_id = %card.id, "flashcard created");
    Ok((StatusCode::CREATED, Json(FlashcardResponse::from(card))))
}

/// List every stored flashcard.
#[utoipa::path(
    get,
    path = "/flashcards",
    responses(
        (status = 200, description = "All flashcards", body = [FlashcardResponse]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_flashcards_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<Vec<FlashcardResponse>>, HttpError> {
    let cards = app_state
        .store
        .list_flashcards()
        .await
        .map_err(|e| HttpError::from_port(e, "Error fetching flashcards"))?;

    Ok(Json(cards.into_iter().map(FlashcardResponse::from).collect()))
}

/// Delete one flashcard.
#[utoipa::path(
    delete,
    path = "/flashcards/{id}",
    params(
        ("id" = Uuid, Path, description = "The flashcard to delete.")
    ),
    responses(
        (status = 204, description = "Flashcard deleted"),
        (status = 404, description = "No flashcard has this id", body = ErrorBody),
        (status = 500, description = "Malformed id or store failure", body = ErrorBody)
    )
)]
pub async fn delete_flashcard_handler(
    State(app_state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, HttpError> {
    let Path(id) = id.map_err(|e| HttpError::internal(e, "Error deleting flashcard"))?;

    app_state
        .store
        .delete_flashcard(id)
        .await
        .map_err(|e| HttpError::from_port(e, "Error deleting flashcard"))?;

    info!(flashcard_id = %id, "flashcard deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn document_covers_every_route_with_camel_case_schemas() {
        let doc: Value = serde_json::from_str(&ApiDoc::to_json().unwrap()).unwrap();

        for (path, method) in [
            ("/health", "get"),
            ("/summaries", "post"),
            ("/summaries", "get"),
            ("/flashcards", "post"),
            ("/flashcards", "get"),
            ("/flashcards/{id}", "delete"),
        ] {
            assert!(doc["paths"][path][method].is_object(), "{} {}", method, path);
        }
        let card = &doc["components"]["schemas"]["FlashcardResponse"]["properties"];
        assert!(card["createdAt"].is_object());
        assert!(card["created_at"].is_null());
    }
}
