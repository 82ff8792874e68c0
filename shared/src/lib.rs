//! Agrisight Shared Library
//!
//! This crate contains the data models, record store, alert evaluation, and
//! read-only query logic used across the Agrisight agricultural IoT platform.
//!
//! # Modules
//!
//! - [`models`] - Data models for telemetry, alerts, hubs, and sensor nodes
//! - [`storage`] - The record store trait and its backends
//! - [`alerts`] - Threshold rules and the pure alert evaluator
//! - [`config`] - Retention configuration
//! - [`query`] - Read-only projections over the record store
//!
//! # Example
//!
//! ```
//! use shared::models::{AtmosphericReading, AtmosphericSensors, TelemetryData, TelemetryRecord};
//! use chrono::Utc;
//!
//! let data = TelemetryData {
//!     soil_nodes: Vec::new(),
//!     atmospheric: AtmosphericReading {
//!         node_id: "atm-1".to_string(),
//!         sensors: AtmosphericSensors {
//!             air_temperature: 21.5,
//!             air_humidity: 55.0,
//!             rain_intensity: 0.0,
//!             wind_speed: 3.2,
//!             light_intensity: 18_000.0,
//!             barometric_pressure: 1013.0,
//!         },
//!     },
//! };
//!
//! let record = TelemetryRecord::new("hub-1", Utc::now(), data);
//! assert!(record.validate_record().is_ok());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod alerts;
pub mod config;
pub mod models;
pub mod query;
pub mod storage;

/// Re-export common dependencies for convenience.
pub use chrono;
pub use serde;
pub use serde_json;
pub use validator;
