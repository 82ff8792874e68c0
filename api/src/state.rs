//! Application state module.
//!
//! Defines the shared application state that is passed to route handlers.
//! The record store is injected here; nothing in the API reaches for a
//! global.

use shared::alerts::AlertThresholds;
use shared::config::RetentionConfig;
use shared::storage::{InMemoryRecordStore, RecordStore};
use std::sync::Arc;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The record store backing every collection.
    store: Arc<dyn RecordStore>,
    /// Threshold rules used by alert evaluation.
    thresholds: Arc<AlertThresholds>,
    /// Retention windows used by the sweeper.
    retention: RetentionConfig,
}

impl AppState {
    /// Creates a new application state with the given store and policies.
    pub fn new(
        store: Arc<dyn RecordStore>,
        thresholds: AlertThresholds,
        retention: RetentionConfig,
    ) -> Self {
        Self {
            store,
            thresholds: Arc::new(thresholds),
            retention,
        }
    }

    /// Creates a new application state with an in-memory store and default
    /// policies.
    ///
    /// This is useful for development and testing.
    #[must_use]
    pub fn with_in_memory_store() -> Self {
        Self::new(
            Arc::new(InMemoryRecordStore::new()),
            AlertThresholds::default(),
            RetentionConfig::default(),
        )
    }

    /// Returns a reference to the record store.
    #[must_use]
    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Returns an owned handle to the record store, for detached tasks.
    #[must_use]
    pub fn store_handle(&self) -> Arc<dyn RecordStore> {
        Arc::clone(&self.store)
    }

    /// Returns a reference to the alert thresholds.
    #[must_use]
    pub fn thresholds(&self) -> &AlertThresholds {
        self.thresholds.as_ref()
    }

    /// Returns an owned handle to the alert thresholds, for detached tasks.
    #[must_use]
    pub fn thresholds_handle(&self) -> Arc<AlertThresholds> {
        Arc::clone(&self.thresholds)
    }

    /// Returns the retention configuration.
    #[must_use]
    pub fn retention(&self) -> &RetentionConfig {
        &self.retention
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_in_memory_store()
    }
}
