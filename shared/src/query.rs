//! Read-only projections over the record store.
//!
//! Sorting and limiting happen here, in the service layer; the store only
//! filters by field equality. None of these functions mutate state, and "no
//! data yet" is an empty/absent result, never an error.

use crate::models::AlertLevel;
use crate::storage::{collections, Filter, RecordStore, StoreError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Default number of records returned by history and alert queries.
pub const DEFAULT_QUERY_LIMIT: usize = 50;

/// One page of records plus the total match count before limiting.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// The records in this page, newest first.
    pub items: Vec<Value>,
    /// Total records matching the query before the limit was applied.
    pub total_count: usize,
}

/// Composite per-hub view: the hub, its sensors, and its most recent sample.
#[derive(Debug, Clone, Serialize)]
pub struct HubStatusView {
    /// The hub record.
    pub hub: Value,
    /// Sensor nodes registered to the hub.
    pub sensors: Vec<Value>,
    /// The hub's most recent telemetry record, if any.
    pub latest_telemetry: Option<Value>,
    /// Timestamp of the most recent telemetry, if any.
    pub last_data_time: Option<DateTime<Utc>>,
}

/// Reads an RFC 3339 instant out of a stored record's field.
///
/// Returns `None` when the field is missing or unparseable; callers decide
/// whether that means "sort last" (queries) or "keep" (retention).
#[must_use]
pub fn record_instant(record: &Value, field: &str) -> Option<DateTime<Utc>> {
    record
        .get(field)?
        .as_str()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Sorts records newest first by the given timestamp field; records without
/// a parseable timestamp order last.
fn sort_newest_first(records: &mut [Value], field: &str) {
    records.sort_by(|a, b| record_instant(b, field).cmp(&record_instant(a, field)));
}

fn hub_scope(hub_id: Option<&str>) -> Filter {
    match hub_id {
        Some(hub_id) => Filter::new().with_field("hub_id", hub_id),
        None => Filter::new(),
    }
}

/// Returns the most recent telemetry record, optionally scoped to one hub.
///
/// # Errors
///
/// Returns an error if the store read fails.
pub fn latest_telemetry(
    store: &dyn RecordStore,
    hub_id: Option<&str>,
) -> Result<Option<Value>, StoreError> {
    let filter = hub_scope(hub_id);
    let mut records = store.get(collections::TELEMETRY, Some(&filter))?;
    sort_newest_first(&mut records, "timestamp");
    Ok(records.into_iter().next())
}

/// Returns one hub's telemetry history, newest first, limited.
///
/// # Errors
///
/// Returns an error if the store read fails.
pub fn telemetry_history(
    store: &dyn RecordStore,
    hub_id: &str,
    limit: usize,
) -> Result<Page, StoreError> {
    let filter = Filter::new().with_field("hub_id", hub_id);
    let mut records = store.get(collections::TELEMETRY, Some(&filter))?;
    sort_newest_first(&mut records, "timestamp");

    let total_count = records.len();
    records.truncate(limit);
    Ok(Page {
        items: records,
        total_count,
    })
}

/// Returns alerts filtered by hub and level, newest first, limited.
///
/// # Errors
///
/// Returns an error if the store read fails.
pub fn recent_alerts(
    store: &dyn RecordStore,
    hub_id: Option<&str>,
    level: Option<AlertLevel>,
    limit: usize,
) -> Result<Page, StoreError> {
    let mut filter = hub_scope(hub_id);
    if let Some(level) = level {
        filter = filter.with_field("level", level.to_string());
    }

    let mut records = store.get(collections::ALERTS, Some(&filter))?;
    sort_newest_first(&mut records, "created_at");

    let total_count = records.len();
    records.truncate(limit);
    Ok(Page {
        items: records,
        total_count,
    })
}

/// Returns the composite status view for each hub (optionally just one):
/// the hub record joined with its sensors and most recent telemetry.
///
/// # Errors
///
/// Returns an error if any store read fails.
pub fn hub_status(
    store: &dyn RecordStore,
    hub_id: Option<&str>,
) -> Result<Vec<HubStatusView>, StoreError> {
    let hubs = store.get(collections::HUBS, Some(&hub_scope(hub_id)))?;

    let mut views = Vec::with_capacity(hubs.len());
    for hub in hubs {
        let id = hub
            .get("hub_id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let sensor_filter = Filter::new().with_field("hub_id", id.clone());
        let sensors = store.get(collections::SENSORS, Some(&sensor_filter))?;
        let latest_telemetry = latest_telemetry(store, Some(&id))?;
        let last_data_time = latest_telemetry
            .as_ref()
            .and_then(|record| record_instant(record, "timestamp"));

        views.push(HubStatusView {
            hub,
            sensors,
            latest_telemetry,
            last_data_time,
        });
    }
    Ok(views)
}
