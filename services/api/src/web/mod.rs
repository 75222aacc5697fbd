//! services/api/src/web/mod.rs
//!
//! Assembles the HTTP surface: routes, CORS, request logging and Swagger UI.

pub mod middleware;
pub mod rest;
pub mod state;

pub use middleware::log_requests;
pub use rest::{
    create_flashcard_handler, create_summary_handler, delete_flashcard_handler, health_handler,
    list_flashcards_handler, list_summaries_handler, ApiDoc,
};
pub use state::AppState;

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the complete application router over `app_state`.
pub fn router(app_state: Arc<AppState>) -> Router {
    // Any origin may call the API; there are no credentials to protect.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/summaries",
            post(create_summary_handler).get(list_summaries_handler),
        )
        .route(
            "/flashcards",
            post(create_flashcard_handler).get(list_flashcards_handler),
        )
        .route("/flashcards/{id}", delete(delete_flashcard_handler))
        .layer(axum_middleware::from_fn(log_requests))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

/// Serves `app` until `shutdown` is cancelled, then lets in-flight requests finish.
pub async fn serve(
    listener: TcpListener,
    app: Router,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
}
