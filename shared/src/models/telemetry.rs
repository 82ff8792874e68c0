//! Telemetry data model.
//!
//! Defines the `TelemetryRecord` structure: one timestamped batch of sensor
//! readings from a hub, holding zero or more soil nodes and exactly one
//! atmospheric node.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Geographic coordinates of a hub or reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Sensor values reported by a single soil node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SoilSensors {
    /// Volumetric soil moisture in percent.
    #[validate(range(min = 0.0, max = 100.0, message = "Soil moisture must be between 0 and 100"))]
    pub soil_moisture: f64,

    /// Soil temperature in degrees Celsius.
    pub soil_temperature: f64,
}

/// One soil node's contribution to a telemetry batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SoilNodeReading {
    /// Identifier of the reporting soil node.
    #[validate(length(min = 1, message = "Node id cannot be empty"))]
    pub node_id: String,

    /// The node's sensor values.
    #[validate(nested)]
    pub sensors: SoilSensors,
}

/// Sensor values reported by the atmospheric node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct AtmosphericSensors {
    /// Air temperature in degrees Celsius.
    pub air_temperature: f64,

    /// Relative air humidity in percent.
    #[validate(range(min = 0.0, max = 100.0, message = "Air humidity must be between 0 and 100"))]
    pub air_humidity: f64,

    /// Rainfall intensity in mm/h.
    #[validate(range(min = 0.0, message = "Rain intensity cannot be negative"))]
    pub rain_intensity: f64,

    /// Wind speed in m/s.
    #[validate(range(min = 0.0, message = "Wind speed cannot be negative"))]
    pub wind_speed: f64,

    /// Ambient light intensity in lux.
    #[validate(range(min = 0.0, message = "Light intensity cannot be negative"))]
    pub light_intensity: f64,

    /// Barometric pressure in hPa.
    #[validate(range(min = 0.0, message = "Barometric pressure cannot be negative"))]
    pub barometric_pressure: f64,
}

/// The atmospheric node's contribution to a telemetry batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AtmosphericReading {
    /// Identifier of the reporting atmospheric node.
    #[validate(length(min = 1, message = "Node id cannot be empty"))]
    pub node_id: String,

    /// The node's sensor values.
    #[validate(nested)]
    pub sensors: AtmosphericSensors,
}

/// The readings carried by one telemetry batch.
///
/// Invariant: exactly one atmospheric node, zero or more soil nodes. The type
/// enforces the atmospheric node's presence; a payload without it does not
/// deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TelemetryData {
    /// Readings from the hub's soil nodes, in reporting order.
    #[serde(default)]
    #[validate(nested)]
    pub soil_nodes: Vec<SoilNodeReading>,

    /// The single atmospheric reading.
    #[validate(nested)]
    pub atmospheric: AtmosphericReading,
}

/// One timestamped batch of sensor readings from a hub.
///
/// Immutable once written: created by the ingestion pipeline on accept, never
/// mutated, deleted only by the retention sweeper.
///
/// # Example
///
/// ```
/// use shared::models::{
///     AtmosphericReading, AtmosphericSensors, TelemetryData, TelemetryRecord,
/// };
/// use chrono::Utc;
///
/// let data = TelemetryData {
///     soil_nodes: Vec::new(),
///     atmospheric: AtmosphericReading {
///         node_id: "atm-1".to_string(),
///         sensors: AtmosphericSensors {
///             air_temperature: 18.0,
///             air_humidity: 60.0,
///             rain_intensity: 0.0,
///             wind_speed: 4.0,
///             light_intensity: 12_000.0,
///             barometric_pressure: 1008.5,
///         },
///     },
/// };
///
/// let record = TelemetryRecord::new("hub-7", Utc::now(), data);
/// assert!(record.validate_record().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TelemetryRecord {
    /// Identifier of the hub that reported the batch.
    #[validate(length(min = 1, message = "Hub id cannot be empty"))]
    pub hub_id: String,

    /// When the hub captured the readings, normalized to UTC.
    pub timestamp: DateTime<Utc>,

    /// Where the hub was located at capture time, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// The batch of sensor readings.
    #[validate(nested)]
    pub data: TelemetryData,
}

/// Errors that can occur while validating a telemetry record or payload.
#[derive(Debug, Error)]
pub enum TelemetryValidationError {
    /// The hub id is empty.
    #[error("Hub id cannot be empty")]
    EmptyHubId,

    /// The timestamp could not be parsed as ISO-8601.
    #[error("Invalid timestamp '{0}': expected an ISO-8601 date-time")]
    InvalidTimestamp(String),

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl TelemetryRecord {
    /// Creates a new telemetry record.
    #[must_use]
    pub fn new(hub_id: impl Into<String>, timestamp: DateTime<Utc>, data: TelemetryData) -> Self {
        Self {
            hub_id: hub_id.into(),
            timestamp,
            location: None,
            data,
        }
    }

    /// Sets the hub's reported location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Validates the record.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The hub id or any node id is empty
    /// - Soil moisture or air humidity lies outside [0, 100]
    /// - Rain, wind, light, or pressure is negative
    pub fn validate_record(&self) -> Result<(), TelemetryValidationError> {
        if self.hub_id.is_empty() {
            return Err(TelemetryValidationError::EmptyHubId);
        }
        self.validate()?;
        Ok(())
    }
}

/// Parses a caller-supplied ISO-8601 timestamp, normalizing to UTC.
///
/// Accepts a trailing `Z`, any numeric offset, and bare timestamps without an
/// offset (assumed UTC).
///
/// # Errors
///
/// Returns [`TelemetryValidationError::InvalidTimestamp`] when the string is
/// not a parseable ISO-8601 date-time.
///
/// # Example
///
/// ```
/// use shared::models::parse_timestamp;
///
/// let utc = parse_timestamp("2026-06-01T12:00:00Z").unwrap();
/// let offset = parse_timestamp("2026-06-01T15:00:00+03:00").unwrap();
/// assert_eq!(utc, offset);
/// ```
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TelemetryValidationError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| TelemetryValidationError::InvalidTimestamp(raw.to_string()))
}
