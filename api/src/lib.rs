//! Agrisight API Server
//!
//! This crate provides the HTTP server for the Agrisight agricultural IoT
//! platform. It handles telemetry ingestion, alert evaluation, read-only
//! queries, and retention sweeping.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - A fire-and-forget ingestion endpoint that validates synchronously and
//!   persists/evaluates on a detached task
//! - Read endpoints for latest telemetry, history, alerts, and hub status
//! - Registration endpoints for hubs and sensor nodes
//! - A periodic retention sweeper pruning aged alerts and telemetry
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
mod routes;
mod state;
mod sweeper;

pub use config::Config;
pub use state::AppState;
pub use sweeper::{spawn_retention_sweeper, sweep_once, SweepOutcome};

use anyhow::Result;
use axum::Router;
use shared::alerts::AlertThresholds;
use shared::storage::{InMemoryRecordStore, JsonFileStore, RecordStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the Agrisight API server.
///
/// This function initializes the server with configuration from environment
/// variables and starts listening for incoming connections. It handles
/// graceful shutdown on SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Agrisight API server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration
/// programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The retention configuration is invalid
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr();

    let retention = config.retention();
    retention
        .validate()
        .map_err(|message| anyhow::anyhow!("Invalid retention configuration: {message}"))?;

    let store: Arc<dyn RecordStore> = match &config.data_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Using file-backed record store");
            Arc::new(JsonFileStore::new(path))
        }
        None => {
            tracing::warn!("AGRISIGHT_DATA_PATH not set, data will not survive a restart");
            Arc::new(InMemoryRecordStore::new())
        }
    };

    let state = AppState::new(store, AlertThresholds::default(), retention);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Agrisight API server starting"
    );

    let sweeper = spawn_retention_sweeper(state.clone(), config.sweep_interval);

    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a
/// full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::ingest_routes(state.clone()))
        .merge(routes::telemetry_routes(state.clone()))
        .merge(routes::alerts_routes(state.clone()))
        .merge(routes::hubs_routes(state.clone()))
        .merge(routes::sensors_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
