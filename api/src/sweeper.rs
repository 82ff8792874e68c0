//! Retention sweeper background task.
//!
//! Periodically prunes alerts and telemetry older than their retention
//! windows. The per-sweep logic lives in [`sweep_once`] so it can be tested
//! without the timer loop; the loop itself is spawned at server startup and
//! aborted at shutdown. Sweep failures are logged and the next scheduled run
//! retries.

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::config::RetentionConfig;
use shared::query::record_instant;
use shared::storage::{collections, RecordStore, StoreError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::state::AppState;

/// Counts of records removed by one sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Alerts pruned by `created_at` age.
    pub alerts_pruned: usize,
    /// Telemetry pruned by `timestamp` age.
    pub telemetry_pruned: usize,
}

/// Runs one retention sweep against the store at the given instant.
///
/// Records whose timestamp field is missing or unparseable are kept
/// (fail-open); the collection is rewritten only when something was actually
/// pruned.
///
/// # Errors
///
/// Returns an error if a store read or rewrite fails.
pub fn sweep_once(
    store: &dyn RecordStore,
    retention: &RetentionConfig,
    now: DateTime<Utc>,
) -> Result<SweepOutcome, StoreError> {
    let alerts_pruned = prune_collection(
        store,
        collections::ALERTS,
        "created_at",
        retention.alerts.cutoff(now),
    )?;
    let telemetry_pruned = prune_collection(
        store,
        collections::TELEMETRY,
        "timestamp",
        retention.telemetry.cutoff(now),
    )?;

    Ok(SweepOutcome {
        alerts_pruned,
        telemetry_pruned,
    })
}

/// Prunes one collection by its timestamp field. Returns the pruned count.
fn prune_collection(
    store: &dyn RecordStore,
    collection: &str,
    field: &str,
    cutoff: DateTime<Utc>,
) -> Result<usize, StoreError> {
    let records = store.get(collection, None)?;
    let original = records.len();

    let retained: Vec<Value> = records
        .into_iter()
        .filter(|record| match record_instant(record, field) {
            Some(instant) => instant >= cutoff,
            // Fail open: never destroy a record we cannot date
            None => true,
        })
        .collect();

    let pruned = original - retained.len();
    if pruned > 0 {
        store.overwrite(collection, retained)?;
    }
    Ok(pruned)
}

/// Spawns the periodic sweeper. The returned handle is aborted at shutdown.
pub fn spawn_retention_sweeper(state: AppState, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // The first tick fires immediately, giving one sweep at startup
            ticker.tick().await;

            let store = state.store_handle();
            let retention = state.retention().clone();
            let result =
                tokio::task::spawn_blocking(move || sweep_once(store.as_ref(), &retention, Utc::now()))
                    .await;

            match result {
                Ok(Ok(outcome)) => {
                    tracing::info!(
                        alerts_pruned = outcome.alerts_pruned,
                        telemetry_pruned = outcome.telemetry_pruned,
                        "Retention sweep complete"
                    );
                }
                Ok(Err(err)) => {
                    tracing::error!(error = %err, "Retention sweep failed");
                }
                Err(err) => {
                    tracing::error!(error = %err, "Retention sweep task panicked");
                }
            }
        }
    })
}
