//! services/api/src/error.rs
//!
//! Defines the error types for the API service: `ApiError` for startup and
//! shutdown, `HttpError` for failures a handler turns into a response.

use crate::config::ConfigError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flash_core::ports::PortError;
use serde::Serialize;
use utoipa::ToSchema;

/// Errors that stop the server from starting or from shutting down cleanly.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Connecting to Postgres or running migrations failed.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Binding the listener or serving connections failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The JSON body sent with every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub message: String,
}

/// An error a handler returns. Only the generic message reaches the client;
/// the cause is logged.
#[derive(Debug)]
pub enum HttpError {
    NotFound(&'static str),
    Internal {
        message: &'static str,
        cause: String,
    },
}

impl HttpError {
    /// A 500 carrying the generic `message`; `cause` is only logged.
    pub fn internal(cause: impl std::fmt::Display, message: &'static str) -> Self {
        HttpError::Internal {
            message,
            cause: cause.to_string(),
        }
    }

    /// Maps a port failure: a missing record is a 404, anything else a 500.
    pub fn from_port(err: PortError, message: &'static str) -> Self {
        match err {
            PortError::NotFound(_) => HttpError::NotFound("Flashcard not found"),
            other => HttpError::internal(other, message),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            HttpError::Internal { message, cause } => {
                tracing::error!(%cause, "{}", message);
                (StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        };

        (
            status,
            Json(ErrorBody {
                message: message.to_string(),
            }),
        )
            .into_response()
    }
}
