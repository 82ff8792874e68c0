//! Sensor-node registration endpoint.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use shared::models::{SensorKind, SensorRecord};
use shared::storage::{collections, Filter};

use crate::routes::{store_error_response, ApiMessage, ApiStatus};
use crate::state::AppState;

/// Request body for sensor-node registration.
#[derive(Debug, Deserialize)]
pub struct SensorRegistration {
    /// Unique node identifier.
    pub node_id: String,
    /// Identifier of the hub the node reports through.
    pub hub_id: String,
    /// Display name.
    pub name: String,
    /// Whether the node is a soil or atmospheric sensor.
    pub kind: SensorKind,
    /// Free-form description (optional).
    #[serde(default)]
    pub description: Option<String>,
}

/// Response for sensor-node registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct SensorRegistrationResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// Human-readable description.
    pub message: String,
    /// The registered node's identifier.
    pub node_id: String,
}

/// Creates the sensor routes.
pub fn sensors_routes(state: AppState) -> Router {
    Router::new()
        .route("/sensors", post(register_sensor))
        .with_state(state)
}

/// Handler for POST /sensors.
///
/// Idempotent on `node_id`: re-registering an existing node is a warning,
/// not an error.
async fn register_sensor(
    State(state): State<AppState>,
    Json(registration): Json<SensorRegistration>,
) -> Result<(StatusCode, Json<SensorRegistrationResponse>), (StatusCode, Json<ApiMessage>)> {
    let mut sensor = SensorRecord::new(
        registration.node_id,
        registration.hub_id,
        registration.name,
        registration.kind,
    );
    if let Some(description) = registration.description {
        sensor = sensor.with_description(description);
    }

    sensor
        .validate_record()
        .map_err(|err| (StatusCode::BAD_REQUEST, Json(ApiMessage::error(err.to_string()))))?;

    let filter = Filter::new().with_field("node_id", sensor.node_id.clone());
    let existing = state
        .store()
        .get(collections::SENSORS, Some(&filter))
        .map_err(|err| store_error_response(&err))?;

    if !existing.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(SensorRegistrationResponse {
                status: ApiStatus::Warning,
                message: format!("Sensor '{}' is already registered", sensor.node_id),
                node_id: sensor.node_id,
            }),
        ));
    }

    let value = serde_json::to_value(&sensor)
        .map_err(|err| store_error_response(&shared::storage::StoreError::from(err)))?;
    state
        .store()
        .add(collections::SENSORS, value)
        .map_err(|err| store_error_response(&err))?;

    tracing::info!(node_id = %sensor.node_id, hub_id = %sensor.hub_id, "Sensor registered");

    Ok((
        StatusCode::CREATED,
        Json(SensorRegistrationResponse {
            status: ApiStatus::Success,
            message: "Sensor registered".to_string(),
            node_id: sensor.node_id,
        }),
    ))
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
        let router = sensors_routes(state.clone());
        (router, state)
    }

    async fn post_json(
        app: Router,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/sensors")
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

    fn registration() -> serde_json::Value {
        json!({
            "node_id": "soil-1",
            "hub_id": "hub-1",
            "name": "Row 3 probe",
            "kind": "soil"
        })
    }

    #[tokio::test]
    async fn test_register_sensor_created() {
        let (app, state) = create_test_router_with_state();

        let (status, body) = post_json(app, registration()).await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["node_id"], "soil-1");

        let sensors = state.store().get(collections::SENSORS, None).unwrap();
        assert_eq!(sensors.len(), 1);
        assert_eq!(sensors[0]["kind"], "soil");
    }

    #[tokio::test]
    async fn test_register_sensor_duplicate_is_warning() {
        let (app, state) = create_test_router_with_state();

        let (status, _) = post_json(app.clone(), registration()).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = post_json(app, registration()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "warning");

        assert_eq!(
            state.store().get(collections::SENSORS, None).unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_register_sensor_unknown_kind_rejected() {
        let (app, _state) = create_test_router_with_state();

        let mut body = registration();
        body["kind"] = json!("thermal");
        let (status, _) = post_json(app, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_sensor_empty_node_id_rejected() {
        let (app, _state) = create_test_router_with_state();

        let mut body = registration();
        body["node_id"] = json!("");
        let (status, response) = post_json(app, body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["status"], "error");
    }
}
