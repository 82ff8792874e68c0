//! API route definitions.
//!
//! This module organizes all HTTP routes for the Agrisight API server, plus
//! the response envelope shared across them.

mod alerts;
mod health;
mod hubs;
mod ingest;
mod sensors;
mod telemetry;

pub use alerts::alerts_routes;
pub use health::health_routes;
pub use hubs::hubs_routes;
pub use ingest::ingest_routes;
pub use sensors::sensors_routes;
pub use telemetry::telemetry_routes;

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::storage::StoreError;

/// Outcome discriminator carried by every API response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    /// The request was processed.
    Success,
    /// The request failed.
    Error,
    /// The request was a no-op (e.g. an already-registered device).
    Warning,
}

/// Minimal response body: an outcome plus a human-readable message.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// Human-readable description.
    pub message: String,
}

impl ApiMessage {
    /// Builds a success message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Success,
            message: message.into(),
        }
    }

    /// Builds an error message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Error,
            message: message.into(),
        }
    }

    /// Builds a warning message.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: ApiStatus::Warning,
            message: message.into(),
        }
    }
}

/// Maps a store failure on a synchronous path to a service error response.
pub(crate) fn store_error_response(err: &StoreError) -> (StatusCode, Json<ApiMessage>) {
    tracing::error!(error = %err, "Record store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiMessage::error("Storage operation failed")),
    )
}
