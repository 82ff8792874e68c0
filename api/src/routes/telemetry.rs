//! Telemetry read endpoints.
//!
//! Latest-sample and history projections over the record store.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::query::{self, DEFAULT_QUERY_LIMIT};

use crate::routes::{store_error_response, ApiMessage, ApiStatus};
use crate::state::AppState;

/// Query parameters for the latest-telemetry endpoint.
#[derive(Debug, Deserialize)]
pub struct LatestParams {
    /// Restrict to one hub; absent means "any hub".
    pub hub_id: Option<String>,
}

/// Query parameters for the telemetry-history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    /// The hub whose history to return.
    pub hub_id: String,
    /// Maximum number of records to return.
    pub limit: Option<usize>,
}

/// Response for the latest-telemetry endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct LatestResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// The most recent telemetry record.
    pub item: Value,
}

/// Response for the telemetry-history endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// The records in this page, newest first.
    pub items: Vec<Value>,
    /// Total records matching before the limit was applied.
    pub total_count: usize,
    /// Number of records returned in this response.
    pub returned_count: usize,
}

/// Creates the telemetry read routes.
pub fn telemetry_routes(state: AppState) -> Router {
    Router::new()
        .route("/telemetry/latest", get(latest_telemetry))
        .route("/telemetry/history", get(telemetry_history))
        .with_state(state)
}

/// Handler for GET /telemetry/latest.
///
/// No telemetry yet is a not-found condition, not a service error.
async fn latest_telemetry(
    State(state): State<AppState>,
    Query(params): Query<LatestParams>,
) -> Result<Json<LatestResponse>, (StatusCode, Json<ApiMessage>)> {
    match query::latest_telemetry(state.store(), params.hub_id.as_deref()) {
        Ok(Some(item)) => Ok(Json(LatestResponse {
            status: ApiStatus::Success,
            item,
        })),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(ApiMessage::error("No telemetry recorded yet")),
        )),
        Err(err) => Err(store_error_response(&err)),
    }
}

/// Handler for GET /telemetry/history.
async fn telemetry_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<HistoryResponse>, (StatusCode, Json<ApiMessage>)> {
    let limit = params.limit.unwrap_or(DEFAULT_QUERY_LIMIT);

    let page = query::telemetry_history(state.store(), &params.hub_id, limit)
        .map_err(|err| store_error_response(&err))?;

    Ok(Json(HistoryResponse {
        status: ApiStatus::Success,
        returned_count: page.items.len(),
        items: page.items,
        total_count: page.total_count,
    }))
}
