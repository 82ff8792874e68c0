//! Data models for the Agrisight platform.
//!
//! This module contains the core data structures for telemetry batches,
//! derived alerts, and registered hubs and sensor nodes.

pub mod alert;
pub mod hub;
pub mod telemetry;

pub use alert::{AlertLevel, AlertRecord, ParseAlertLevelError};
pub use hub::{
    DeviceStatus, HubRecord, HubValidationError, SensorKind, SensorRecord, SensorValidationError,
};
pub use telemetry::{
    parse_timestamp, AtmosphericReading, AtmosphericSensors, Location, SoilNodeReading,
    SoilSensors, TelemetryData, TelemetryRecord, TelemetryValidationError,
};
