//! Alert read endpoint.
//!
//! Filterable, sorted, limited projection over the alerts collection.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::models::AlertLevel;
use shared::query::{self, DEFAULT_QUERY_LIMIT};

use crate::routes::{store_error_response, ApiMessage, ApiStatus};
use crate::state::AppState;

/// Query parameters for the alerts endpoint.
#[derive(Debug, Deserialize)]
pub struct AlertParams {
    /// Restrict to one hub.
    pub hub_id: Option<String>,
    /// Restrict to one severity level (info, warning, critical).
    pub level: Option<String>,
    /// Maximum number of alerts to return.
    pub limit: Option<usize>,
}

/// Response for the alerts endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct AlertsResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// The alerts in this page, newest first.
    pub items: Vec<Value>,
    /// Total alerts matching before the limit was applied.
    pub total_count: usize,
    /// Number of alerts returned in this response.
    pub returned_count: usize,
}

/// Creates the alert read routes.
pub fn alerts_routes(state: AppState) -> Router {
    Router::new()
        .route("/alerts", get(recent_alerts))
        .with_state(state)
}

/// Handler for GET /alerts.
async fn recent_alerts(
    State(state): State<AppState>,
    Query(params): Query<AlertParams>,
) -> Result<Json<AlertsResponse>, (StatusCode, Json<ApiMessage>)> {
    let level = params
        .level
        .as_deref()
        .map(str::parse::<AlertLevel>)
        .transpose()
        .map_err(|err| (StatusCode::BAD_REQUEST, Json(ApiMessage::error(err.to_string()))))?;

    let limit = params.limit.unwrap_or(DEFAULT_QUERY_LIMIT);

    let page = query::recent_alerts(state.store(), params.hub_id.as_deref(), level, limit)
        .map_err(|err| store_error_response(&err))?;

    Ok(Json(AlertsResponse {
        status: ApiStatus::Success,
        returned_count: page.items.len(),
        items: page.items,
        total_count: page.total_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::json;
    use shared::storage::collections;
    use tower::ServiceExt;

    fn create_test_router_with_state() -> (Router, AppState) {
        let state = AppState::with_in_memory_store();
        let router = alerts_routes(state.clone());
        (router, state)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn seed_alert(state: &AppState, hub_id: &str, level: &str, created_at: &str) {
        state
            .store()
            .add(
                collections::ALERTS,
                json!({
                    "hub_id": hub_id,
                    "node_id": "soil-1",
                    "level": level,
                    "message": "test alert",
                    "created_at": created_at,
                }),
            )
            .unwrap();
    }

    #[tokio::test]
    async fn test_alerts_empty_store_is_success() {
        let (app, _state) = create_test_router_with_state();

        let (status, body) = get_json(app, "/alerts").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["total_count"], 0);
    }

    #[tokio::test]
    async fn test_alerts_filtered_by_hub_and_level() {
        let (app, state) = create_test_router_with_state();
        seed_alert(&state, "hub-1", "critical", "2026-06-01T10:00:00Z");
        seed_alert(&state, "hub-1", "info", "2026-06-01T11:00:00Z");
        seed_alert(&state, "hub-2", "critical", "2026-06-01T12:00:00Z");

        let (status, body) = get_json(app, "/alerts?hub_id=hub-1&level=critical").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 1);
        assert_eq!(body["items"][0]["hub_id"], "hub-1");
        assert_eq!(body["items"][0]["level"], "critical");
    }

    #[tokio::test]
    async fn test_alerts_sorted_newest_first_and_limited() {
        let (app, state) = create_test_router_with_state();
        for hour in 10..=14 {
            seed_alert(&state, "hub-1", "info", &format!("2026-06-01T{hour}:00:00Z"));
        }

        let (status, body) = get_json(app, "/alerts?limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_count"], 5);
        assert_eq!(body["returned_count"], 2);
        assert_eq!(body["items"][0]["created_at"], "2026-06-01T14:00:00Z");
    }

    #[tokio::test]
    async fn test_alerts_invalid_level_is_rejected() {
        let (app, _state) = create_test_router_with_state();

        let (status, body) = get_json(app, "/alerts?level=severe").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }
}
