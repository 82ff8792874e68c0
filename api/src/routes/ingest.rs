//! Telemetry ingestion endpoint.
//!
//! Validates incoming telemetry synchronously, then acknowledges the caller
//! before storage and alert evaluation run on a detached task. The detached
//! phase never reports back: its failures are logged only, keeping ingestion
//! latency independent of store latency.

use axum::{
    extract::rejection::JsonRejection, extract::State, http::StatusCode, routing::post, Json,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared::alerts::{evaluate, AlertThresholds};
use shared::models::{parse_timestamp, Location, TelemetryData, TelemetryRecord};
use shared::storage::{collections, Filter, RecordStore};

use crate::routes::{ApiMessage, ApiStatus};
use crate::state::AppState;

/// Request body for telemetry ingestion.
///
/// The timestamp arrives as a string so any ISO-8601 offset can be accepted
/// and normalized to UTC before storage.
#[derive(Debug, Deserialize)]
pub struct TelemetryPayload {
    /// Identifier of the reporting hub.
    pub hub_id: String,

    /// Capture time as an ISO-8601 string.
    pub timestamp: String,

    /// Hub location at capture time (optional).
    #[serde(default)]
    pub location: Option<Location>,

    /// The batch of sensor readings.
    pub data: TelemetryData,
}

impl TelemetryPayload {
    /// Validates the payload and normalizes it into a telemetry record.
    fn into_record(self) -> Result<TelemetryRecord, String> {
        let timestamp = parse_timestamp(&self.timestamp).map_err(|err| err.to_string())?;

        let mut record = TelemetryRecord::new(self.hub_id, timestamp, self.data);
        if let Some(location) = self.location {
            record = record.with_location(location);
        }
        record.validate_record().map_err(|err| err.to_string())?;
        Ok(record)
    }
}

/// Response for accepted telemetry.
#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    /// Outcome of the request.
    pub status: ApiStatus,
    /// Human-readable description.
    pub message: String,
    /// Identifier of the hub the telemetry came from.
    pub hub_id: String,
    /// When the API accepted the payload, in UTC.
    pub received_at: DateTime<Utc>,
}

/// Creates the telemetry ingestion routes.
pub fn ingest_routes(state: AppState) -> Router {
    Router::new()
        .route("/ingest", post(ingest_telemetry))
        .with_state(state)
}

/// Handler for telemetry ingestion.
///
/// Returns 202 Accepted once validation passes; storage and alert evaluation
/// continue on a detached task after the response is sent.
async fn ingest_telemetry(
    State(state): State<AppState>,
    payload: Result<Json<TelemetryPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<IngestResponse>), (StatusCode, Json<ApiMessage>)> {
    let Json(payload) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiMessage::error(rejection.body_text())),
        )
    })?;

    let record = payload.into_record().map_err(|message| {
        tracing::debug!(error = %message, "Rejected telemetry payload");
        (StatusCode::BAD_REQUEST, Json(ApiMessage::error(message)))
    })?;

    let hub_id = record.hub_id.clone();
    let received_at = Utc::now();

    // Fire and forget: the caller is acknowledged before the write happens,
    // so store latency never shows up in ingestion latency
    let store = state.store_handle();
    let thresholds = state.thresholds_handle();
    tokio::task::spawn_blocking(move || {
        process_telemetry(store.as_ref(), thresholds.as_ref(), &record);
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            status: ApiStatus::Success,
            message: "Telemetry accepted for processing".to_string(),
            hub_id,
            received_at,
        }),
    ))
}

/// Detached processing: persist the record, evaluate alerts, persist those,
/// and touch the owning hub's `last_seen`.
///
/// The response has already been sent, so every failure here is logged and
/// swallowed.
fn process_telemetry(store: &dyn RecordStore, thresholds: &AlertThresholds, record: &TelemetryRecord) {
    let value = match serde_json::to_value(record) {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(hub_id = %record.hub_id, error = %err, "Failed to serialize telemetry");
            return;
        }
    };

    if let Err(err) = store.add(collections::TELEMETRY, value) {
        tracing::error!(hub_id = %record.hub_id, error = %err, "Failed to persist telemetry");
        return;
    }

    let alerts = evaluate(record, thresholds, Utc::now());
    let triggered = alerts.len();
    for alert in alerts {
        match serde_json::to_value(&alert) {
            Ok(value) => {
                if let Err(err) = store.add(collections::ALERTS, value) {
                    tracing::error!(hub_id = %record.hub_id, error = %err, "Failed to persist alert");
                }
            }
            Err(err) => {
                tracing::error!(hub_id = %record.hub_id, error = %err, "Failed to serialize alert");
            }
        }
    }
    if triggered > 0 {
        tracing::info!(hub_id = %record.hub_id, alerts = triggered, "Telemetry triggered alerts");
    }

    touch_hub_last_seen(store, record);
}

/// Stamps the owning hub's `last_seen` with the telemetry timestamp.
fn touch_hub_last_seen(store: &dyn RecordStore, record: &TelemetryRecord) {
    let filter = Filter::new().with_field("hub_id", record.hub_id.clone());
    let mut patch = Map::new();
    patch.insert(
        "last_seen".to_string(),
        Value::String(record.timestamp.to_rfc3339()),
    );

    match store.update(collections::HUBS, &filter, &patch) {
        Ok(0) => {
            tracing::debug!(hub_id = %record.hub_id, "Telemetry from unregistered hub");
        }
        Ok(_) => {}
        Err(err) => {
            tracing::error!(hub_id = %record.hub_id, error = %err, "Failed to update hub last_seen");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use shared::storage::{InMemoryRecordStore, StoreError};
    use std::sync::Arc;
    use std::time::{Duration, Instant};
    use tower::ServiceExt;

    fn create_test_router_with_state() -> (Router, AppState) {
        let state = AppState::with_in_memory_store();
        let router = ingest_routes(state.clone());
        (router, state)
    }

    fn valid_payload() -> serde_json::Value {
        json!({
            "hub_id": "hub-1",
            "timestamp": "2026-06-01T12:00:00Z",
            "data": {
                "soil_nodes": [
                    {"node_id": "soil-1", "sensors": {"soil_moisture": 45.0, "soil_temperature": 18.0}}
                ],
                "atmospheric": {
                    "node_id": "atm-1",
                    "sensors": {
                        "air_temperature": 20.0,
                        "air_humidity": 50.0,
                        "rain_intensity": 0.0,
                        "wind_speed": 5.0,
                        "light_intensity": 10000.0,
                        "barometric_pressure": 1010.0
                    }
                }
            }
        })
    }

    async fn post_ingest(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ingest")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_string(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    async fn wait_for_telemetry(state: &AppState, expected: usize) {
        for _ in 0..100 {
            let count = state
                .store()
                .get(collections::TELEMETRY, None)
                .unwrap()
                .len();
            if count >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Telemetry was not processed in time");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ingest_accepted() {
        let (app, state) = create_test_router_with_state();

        let (status, body) = post_ingest(app, valid_payload()).await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["status"], "success");
        assert_eq!(body["hub_id"], "hub-1");
        assert!(body["received_at"].is_string());

        wait_for_telemetry(&state, 1).await;
        let records = state.store().get(collections::TELEMETRY, None).unwrap();
        assert_eq!(records[0]["hub_id"], "hub-1");
        // Normalized to UTC on store
        assert_eq!(records[0]["timestamp"], "2026-06-01T12:00:00Z");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ingest_normalizes_offset_timestamps() {
        let (app, state) = create_test_router_with_state();

        let mut payload = valid_payload();
        payload["timestamp"] = json!("2026-06-01T15:00:00+03:00");
        let (status, _) = post_ingest(app, payload).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        wait_for_telemetry(&state, 1).await;
        let records = state.store().get(collections::TELEMETRY, None).unwrap();
        assert_eq!(records[0]["timestamp"], "2026-06-01T12:00:00Z");
    }

    #[tokio::test]
    async fn test_ingest_rejects_bad_timestamp() {
        let (app, _state) = create_test_router_with_state();

        let mut payload = valid_payload();
        payload["timestamp"] = json!("next tuesday");
        let (status, body) = post_ingest(app, payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_ingest_rejects_out_of_range_moisture() {
        let (app, state) = create_test_router_with_state();

        let mut payload = valid_payload();
        payload["data"]["soil_nodes"][0]["sensors"]["soil_moisture"] = json!(120.0);
        let (status, body) = post_ingest(app, payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        // Rejection happens before any persistence
        assert!(state
            .store()
            .get(collections::TELEMETRY, None)
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_ingest_rejects_missing_atmospheric_node() {
        let (app, _state) = create_test_router_with_state();

        let mut payload = valid_payload();
        payload["data"].as_object_mut().unwrap().remove("atmospheric");
        let (status, body) = post_ingest(app, payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn test_ingest_rejects_negative_wind() {
        let (app, _state) = create_test_router_with_state();

        let mut payload = valid_payload();
        payload["data"]["atmospheric"]["sensors"]["wind_speed"] = json!(-1.0);
        let (status, _) = post_ingest(app, payload).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ingest_stores_alerts_for_dry_soil() {
        let (app, state) = create_test_router_with_state();

        let mut payload = valid_payload();
        payload["data"]["soil_nodes"][0]["sensors"]["soil_moisture"] = json!(15.0);
        let (status, _) = post_ingest(app, payload).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        wait_for_telemetry(&state, 1).await;
        for _ in 0..100 {
            if !state.store().get(collections::ALERTS, None).unwrap().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let alerts = state.store().get(collections::ALERTS, None).unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["level"], "critical");
        assert_eq!(alerts[0]["node_id"], "soil-1");
    }

    /// Store wrapper that stalls every write, standing in for slow disk I/O.
    struct SlowStore {
        inner: InMemoryRecordStore,
        delay: Duration,
    }

    impl RecordStore for SlowStore {
        fn add(&self, collection: &str, record: serde_json::Value) -> Result<serde_json::Value, StoreError> {
            std::thread::sleep(self.delay);
            self.inner.add(collection, record)
        }

        fn get(
            &self,
            collection: &str,
            filter: Option<&Filter>,
        ) -> Result<Vec<serde_json::Value>, StoreError> {
            self.inner.get(collection, filter)
        }

        fn update(
            &self,
            collection: &str,
            filter: &Filter,
            patch: &Map<String, serde_json::Value>,
        ) -> Result<usize, StoreError> {
            self.inner.update(collection, filter, patch)
        }

        fn delete(
            &self,
            collection: &str,
            filter: Option<&Filter>,
        ) -> Result<usize, StoreError> {
            self.inner.delete(collection, filter)
        }

        fn overwrite(
            &self,
            collection: &str,
            records: Vec<serde_json::Value>,
        ) -> Result<(), StoreError> {
            self.inner.overwrite(collection, records)
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_acceptance_latency_independent_of_store_latency() {
        let slow_store = Arc::new(SlowStore {
            inner: InMemoryRecordStore::new(),
            delay: Duration::from_millis(500),
        });
        let state = AppState::new(
            slow_store,
            shared::alerts::AlertThresholds::default(),
            shared::config::RetentionConfig::default(),
        );
        let app = ingest_routes(state.clone());

        let started = Instant::now();
        let (status, _) = post_ingest(app, valid_payload()).await;
        let elapsed = started.elapsed();

        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(
            elapsed < Duration::from_millis(400),
            "acceptance took {elapsed:?}, should not wait for the store"
        );

        // The write still lands once the slow store catches up
        wait_for_telemetry(&state, 1).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_ingest_touches_hub_last_seen() {
        let (app, state) = create_test_router_with_state();

        state
            .store()
            .add(
                collections::HUBS,
                json!({"hub_id": "hub-1", "name": "North field", "last_seen": null}),
            )
            .unwrap();

        let (status, _) = post_ingest(app, valid_payload()).await;
        assert_eq!(status, StatusCode::ACCEPTED);

        wait_for_telemetry(&state, 1).await;
        for _ in 0..100 {
            let hubs = state.store().get(collections::HUBS, None).unwrap();
            if hubs[0]["last_seen"].is_string() {
                assert_eq!(hubs[0]["last_seen"], "2026-06-01T12:00:00+00:00");
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Hub last_seen was not updated");
    }
}
