//! Hub registration and status endpoints.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use shared::models::{HubRecord, Location};
use shared::query::{self, HubStatusView};
use shared::storage::{collections, Filter};

use crate::routes::{store_error_response, ApiMessage, ApiStatus};
use crate::state::AppState;

/// Request body for hub registration.
#[derive(Debug, Deserialize)]
pub struct HubRegistration {
    /// Unique hub identifier.
    pub hub_id: String,
    /// Email address of the owning user.
    pub user_email: String,
    /// Identifier of the field the hub serves.
    pub field_id: String,
    /// Display name.
    pub name: String,
    /// Installed location (optional).
    #[serde(default)]
    pub location: Option<Location>,
    /// Free-form description (optional).
    #[serde(default)]
    pub description: Option<String>,
}

/// Response for hub registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct HubRegistrationResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// Human-readable description.
    pub message: String,
    /// The registered hub's identifier.
    pub hub_id: String,
}

/// Response for the hub status endpoint.
#[derive(Debug, Serialize)]
pub struct HubStatusResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// One composite view per hub.
    pub hubs: Vec<HubStatusView>,
}

/// Query parameters for the hub status endpoint.
#[derive(Debug, Deserialize)]
pub struct HubStatusParams {
    /// Restrict to one hub.
    pub hub_id: Option<String>,
}

/// Creates the hub routes.
pub fn hubs_routes(state: AppState) -> Router {
    Router::new()
        .route("/hubs", post(register_hub))
        .route("/hubs/status", get(hub_status))
        .with_state(state)
}

/// Handler for POST /hubs.
///
/// Idempotent on `hub_id`: re-registering an existing hub is a warning, not
/// an error.
async fn register_hub(
    State(state): State<AppState>,
    Json(registration): Json<HubRegistration>,
) -> Result<(StatusCode, Json<HubRegistrationResponse>), (StatusCode, Json<ApiMessage>)> {
    let mut hub = HubRecord::new(
        registration.hub_id,
        registration.user_email,
        registration.field_id,
        registration.name,
    );
    if let Some(location) = registration.location {
        hub = hub.with_location(location);
    }
    if let Some(description) = registration.description {
        hub = hub.with_description(description);
    }

    hub.validate_record()
        .map_err(|err| (StatusCode::BAD_REQUEST, Json(ApiMessage::error(err.to_string()))))?;

    let filter = Filter::new().with_field("hub_id", hub.hub_id.clone());
    let existing = state
        .store()
        .get(collections::HUBS, Some(&filter))
        .map_err(|err| store_error_response(&err))?;

    if !existing.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(HubRegistrationResponse {
                status: ApiStatus::Warning,
                message: format!("Hub '{}' is already registered", hub.hub_id),
                hub_id: hub.hub_id,
            }),
        ));
    }

    let value = serde_json::to_value(&hub)
        .map_err(|err| store_error_response(&shared::storage::StoreError::from(err)))?;
    state
        .store()
        .add(collections::HUBS, value)
        .map_err(|err| store_error_response(&err))?;

    tracing::info!(hub_id = %hub.hub_id, field_id = %hub.field_id, "Hub registered");

    Ok((
        StatusCode::CREATED,
        Json(HubRegistrationResponse {
            status: ApiStatus::Success,
            message: "Hub registered".to_string(),
            hub_id: hub.hub_id,
        }),
    ))
}

/// Handler for GET /hubs/status.
async fn hub_status(
    State(state): State<AppState>,
    Query(params): Query<HubStatusParams>,
) -> Result<Json<HubStatusResponse>, (StatusCode, Json<ApiMessage>)> {
    let hubs = query::hub_status(state.store(), params.hub_id.as_deref())
        .map_err(|err| store_error_response(&err))?;

    Ok(Json(HubStatusResponse {
        status: ApiStatus::Success,
        hubs,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    fn create_test_router_with_state() -> (Router, AppState) {
        let state = AppState::with_in_memory_store();
        let router = hubs_routes(state.clone());
        (router, state)
    }

    async fn post_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
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

    fn registration() -> serde_json::Value {
        json!({
            "hub_id": "hub-1",
            "user_email": "farmer@example.com",
            "field_id": "field-9",
            "name": "North field gateway"
        })
    }

    #[tokio::test]
    async fn test_register_hub_created() {
        let (app, state) = create_test_router_with_state();

        let (status, body) = post_json(app, "/hubs", registration()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["hub_id"], "hub-1");

        let hubs = state.store().get(collections::HUBS, None).unwrap();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0]["status"], "active");
        assert!(hubs[0]["registered_at"].is_string());
    }

    #[tokio::test]
    async fn test_register_hub_duplicate_is_warning() {
        let (app, state) = create_test_router_with_state();

        let (status, _) = post_json(app.clone(), "/hubs", registration()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(app, "/hubs", registration()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "warning");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains("already registered"));

        // No second record
        assert_eq!(state.store().get(collections::HUBS, None).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_hub_invalid_email_rejected() {
        let (app, _state) = create_test_router_with_state();

        let mut body = registration();
        body["user_email"] = json!("not-an-email");
        let (status, response) = post_json(app, "/hubs", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], "error");
    }

    #[tokio::test]
    async fn test_hub_status_composite_view() {
        let (app, state) = create_test_router_with_state();

        let (status, _) = post_json(app.clone(), "/hubs", registration()).await;
        assert_eq!(status, StatusCode::CREATED);

        state
            .store()
            .add(
                collections::SENSORS,
                json!({"node_id": "soil-1", "hub_id": "hub-1"}),
            )
            .unwrap();
        state
            .store()
            .add(
                collections::TELEMETRY,
                json!({"hub_id": "hub-1", "timestamp": "2026-06-01T12:00:00Z"}),
            )
            .unwrap();

        let (status, body) = get_json(app, "/hubs/status?hub_id=hub-1").await;

        assert_eq!(status, StatusCode::OK);
        let hubs = body["hubs"].as_array().unwrap();
        assert_eq!(hubs.len(), 1);
        assert_eq!(hubs[0]["hub"]["hub_id"], "hub-1");
        assert_eq!(hubs[0]["sensors"].as_array().unwrap().len(), 1);
        assert_eq!(
            hubs[0]["latest_telemetry"]["timestamp"],
            "2026-06-01T12:00:00Z"
        );
        assert!(hubs[0]["last_data_time"].is_string());
    }

    #[tokio::test]
    async fn test_hub_status_empty_is_success() {
        let (app, _state) = create_test_router_with_state();

        let (status, body) = get_json(app, "/hubs/status").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["hubs"].as_array().unwrap().is_empty());
    }
}
