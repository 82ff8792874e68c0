//! In-memory record store implementation.
//!
//! Stores the dataset in a `HashMap` behind a `RwLock`. Suitable for
//! development and tests; data is not persisted across restarts.

use super::record_store::{
    apply_delete, apply_update, stamp_new_record, Dataset, Filter, RecordStore, StoreError,
};
use serde_json::{Map, Value};
use std::sync::{Arc, RwLock};

/// In-memory record store.
///
/// # Example
///
/// ```
/// use shared::storage::{Filter, InMemoryRecordStore, RecordStore};
/// use serde_json::json;
///
/// let store = InMemoryRecordStore::new();
/// let stored = store.add("telemetry", json!({"hub_id": "hub-1"})).unwrap();
///
/// let filter = Filter::new().with_field("id", stored["id"].clone());
/// let found = store.get("telemetry", Some(&filter)).unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    data: Arc<RwLock<Dataset>>,
}

impl InMemoryRecordStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store wrapped in an `Arc`.
    #[must_use]
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl RecordStore for InMemoryRecordStore {
    fn add(&self, collection: &str, record: Value) -> Result<Value, StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Lock)?;
        let mut record = record;
        stamp_new_record(&mut record);
        data.entry(collection.to_string())
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    fn get(&self, collection: &str, filter: Option<&Filter>) -> Result<Vec<Value>, StoreError> {
        let data = self.data.read().map_err(|_| StoreError::Lock)?;
        let records = match data.get(collection) {
            Some(records) => match filter {
                Some(filter) => records
                    .iter()
                    .filter(|record| filter.matches(record))
                    .cloned()
                    .collect(),
                None => records.clone(),
            },
            None => Vec::new(),
        };
        Ok(records)
    }

    fn update(
        &self,
        collection: &str,
        filter: &Filter,
        patch: &Map<String, Value>,
    ) -> Result<usize, StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Lock)?;
        let count = match data.get_mut(collection) {
            Some(records) => apply_update(records, filter, patch),
            None => 0,
        };
        Ok(count)
    }

    fn delete(&self, collection: &str, filter: Option<&Filter>) -> Result<usize, StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Lock)?;
        let count = match data.get_mut(collection) {
            Some(records) => apply_delete(records, filter),
            None => 0,
        };
        Ok(count)
    }

    fn overwrite(&self, collection: &str, records: Vec<Value>) -> Result<(), StoreError> {
        let mut data = self.data.write().map_err(|_| StoreError::Lock)?;
        data.insert(collection.to_string(), records);
        Ok(())
    }
}
