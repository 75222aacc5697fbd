//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::{Config, StoreBackend},
    error::ApiError,
    web::{self, state::AppState},
};
use flash_core::{memory::InMemoryStore, ports::RecordStore};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Open the Store & Run Migrations ---
    let (store, db_adapter): (Arc<dyn RecordStore>, Option<Arc<DbAdapter>>) = match &config.store {
        StoreBackend::Postgres {
            url,
            max_connections,
        } => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let store: Arc<dyn RecordStore> = db_adapter.clone();
            (store, Some(db_adapter))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory store; records are lost on exit.");
            let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
            (store, None)
        }
    };

    // --- 3. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(store));
    let app = web::router(app_state);

    // --- 4. Start the Server ---
    let shutdown = CancellationToken::new();
    tokio::spawn(cancel_on_signal(shutdown.clone()));

    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    web::serve(listener, app, shutdown).await?;

    // --- 5. Release the Store ---
    if let Some(db_adapter) = db_adapter {
        info!("Closing database pool...");
        db_adapter.close().await;
    }
    info!("Server stopped.");

    Ok(())
}

/// Cancels `shutdown` on Ctrl-C, or on SIGTERM where the platform has it.
async fn cancel_on_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received, draining in-flight requests...");
    shutdown.cancel();
}
