//! The record store trait and its supporting types.
//!
//! A record store is a durable mapping from a collection name to an ordered
//! sequence of JSON records. Records are opaque to the store; schema is
//! enforced at the API boundary, not here. All mutation of a deployment's
//! dataset passes through one store instance, whose implementations serialize
//! every operation.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

/// Names of the collections owned by the core.
pub mod collections {
    /// Telemetry batches, appended by the ingestion pipeline.
    pub const TELEMETRY: &str = "telemetry";
    /// Alerts, appended after evaluation.
    pub const ALERTS: &str = "alerts";
    /// Registered hubs.
    pub const HUBS: &str = "iot_hubs";
    /// Registered sensor nodes.
    pub const SENSORS: &str = "sensors";
}

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to acquire a lock on the store.
    #[error("Failed to acquire lock on record store")]
    Lock,

    /// An underlying I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A conjunction of exact-match field equalities.
///
/// An empty filter matches every record.
///
/// # Example
///
/// ```
/// use shared::storage::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new()
///     .with_field("hub_id", "hub-1")
///     .with_field("level", "critical");
///
/// assert!(filter.matches(&json!({"hub_id": "hub-1", "level": "critical", "message": "x"})));
/// assert!(!filter.matches(&json!({"hub_id": "hub-1", "level": "info"})));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    /// Creates a new empty filter (matches every record).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an exact-match condition on a top-level field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Returns true when the filter has no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true when every condition matches the record exactly.
    #[must_use]
    pub fn matches(&self, record: &Value) -> bool {
        self.fields
            .iter()
            .all(|(key, expected)| record.get(key) == Some(expected))
    }
}

/// Trait for record store implementations.
///
/// Implementations must be thread-safe (`Send + Sync`) and must serialize all
/// operations: a read always observes the latest committed write, and two
/// writers never interleave partial writes. Append order follows lock
/// acquisition, not logical time; readers sort by the record's own timestamp
/// fields.
pub trait RecordStore: Send + Sync {
    /// Appends a record to a collection, assigning `id` and `created_at`
    /// when absent, and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the dataset fails.
    fn add(&self, collection: &str, record: Value) -> Result<Value, StoreError>;

    /// Returns the records matching the filter, or the whole collection when
    /// no filter is given. An unknown collection yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the dataset fails.
    fn get(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<Value>, StoreError>;

    /// Merges the patch into every matching record, stamping `updated_at`,
    /// and returns the match count. Persists only when at least one record
    /// matched; zero matches is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the dataset fails.
    fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Map<String, Value>,
    ) -> Result<usize, StoreError>;

    /// Deletes matching records and returns the count. A missing filter
    /// clears the whole collection. Persists only when something was deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the dataset fails.
    fn delete(&self, collection: &str, filter: Option<&Filter>) -> Result<usize, StoreError>;

    /// Replaces a collection wholesale. Used by the retention sweeper to
    /// commit pruned sets atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if persisting the dataset fails.
    fn overwrite(&self, collection: &str, records: Vec<Value>) -> Result<(), StoreError>;
}

/// The in-memory shape of a deployment's dataset: collection name to records.
pub(crate) type Dataset = HashMap<String, Vec<Value>>;

/// Assigns `id` and `created_at` to a new record when absent.
pub(crate) fn stamp_new_record(record: &mut Value) {
    if let Value::Object(fields) = record {
        fields
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        fields
            .entry("created_at")
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    }
}

/// Merges the patch into every matching record, stamping `updated_at`.
/// Returns the match count.
pub(crate) fn apply_update(
    records: &mut [Value],
    filter: &Filter,
    patch: &Map<String, Value>,
) -> usize {
    let mut count = 0;
    for record in records.iter_mut() {
        if !filter.matches(record) {
            continue;
        }
        if let Value::Object(fields) = record {
            for (key, value) in patch {
                fields.insert(key.clone(), value.clone());
            }
            fields.insert(
                "updated_at".to_string(),
                Value::String(Utc::now().to_rfc3339()),
            );
            count += 1;
        }
    }
    count
}

/// Removes matching records in place. Returns the removed count.
pub(crate) fn apply_delete(records: &mut Vec<Value>, filter: Option<&Filter>) -> usize {
    match filter {
        None => {
            let removed = records.len();
            records.clear();
            removed
        }
        Some(filter) => {
            let before = records.len();
            records.retain(|record| !filter.matches(record));
            before - records.len()
        }
    }
}
