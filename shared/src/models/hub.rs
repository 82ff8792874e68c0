//! Hub and sensor-node registration models.
//!
//! Hubs are physical gateways aggregating sensor nodes for a field; sensor
//! records describe the individual nodes reporting through a hub. Relations
//! are by string id, resolved via lookup.

use crate::models::telemetry::Location;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

/// Operational status of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    /// Reporting normally.
    Active,
    /// Registered but not reporting.
    Inactive,
    /// Taken offline intentionally.
    Maintenance,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Maintenance => write!(f, "maintenance"),
        }
    }
}

/// The kind of sensor node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    /// In-ground node reporting soil moisture and temperature.
    Soil,
    /// Above-ground node reporting weather conditions.
    Atmospheric,
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Soil => write!(f, "soil"),
            Self::Atmospheric => write!(f, "atmospheric"),
        }
    }
}

/// A registered field hub.
///
/// Created on registration; `status` and `last_seen` may be updated later.
/// Never auto-deleted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct HubRecord {
    /// Unique hub identifier.
    #[validate(length(min = 1, message = "Hub id cannot be empty"))]
    pub hub_id: String,

    /// Email address of the owning user.
    #[validate(email(message = "Owner email is not a valid address"))]
    pub user_email: String,

    /// Identifier of the field the hub serves.
    #[validate(length(min = 1, message = "Field id cannot be empty"))]
    pub field_id: String,

    /// Display name.
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,

    /// Installed location, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,

    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Operational status.
    #[serde(default)]
    pub status: DeviceStatus,

    /// When the hub was registered, in UTC.
    pub registered_at: DateTime<Utc>,

    /// Timestamp of the hub's most recent telemetry, if any.
    pub last_seen: Option<DateTime<Utc>>,
}

/// Errors that can occur during hub validation.
#[derive(Debug, Error)]
pub enum HubValidationError {
    /// The hub id is empty.
    #[error("Hub id cannot be empty")]
    EmptyHubId,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl HubRecord {
    /// Creates a new hub record registered now, with default status.
    #[must_use]
    pub fn new(
        hub_id: impl Into<String>,
        user_email: impl Into<String>,
        field_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            hub_id: hub_id.into(),
            user_email: user_email.into(),
            field_id: field_id.into(),
            name: name.into(),
            location: None,
            description: None,
            status: DeviceStatus::default(),
            registered_at: Utc::now(),
            last_seen: None,
        }
    }

    /// Sets the installed location.
    #[must_use]
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the hub id, field id, or name is empty, or the
    /// owner email is malformed.
    pub fn validate_record(&self) -> Result<(), HubValidationError> {
        if self.hub_id.is_empty() {
            return Err(HubValidationError::EmptyHubId);
        }
        self.validate()?;
        Ok(())
    }
}

/// A registered sensor node, associated with a hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct SensorRecord {
    /// Unique node identifier.
    #[validate(length(min = 1, message = "Node id cannot be empty"))]
    pub node_id: String,

    /// Identifier of the hub the node reports through.
    #[validate(length(min = 1, message = "Hub id cannot be empty"))]
    pub hub_id: String,

    /// Display name.
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,

    /// Whether the node is a soil or atmospheric sensor.
    pub kind: SensorKind,

    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Operational status.
    #[serde(default)]
    pub status: DeviceStatus,

    /// When the node was registered, in UTC.
    pub registered_at: DateTime<Utc>,
}

/// Errors that can occur during sensor validation.
#[derive(Debug, Error)]
pub enum SensorValidationError {
    /// The node id is empty.
    #[error("Node id cannot be empty")]
    EmptyNodeId,

    /// Validation failed with details.
    #[error("Validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),
}

impl SensorRecord {
    /// Creates a new sensor record registered now, with default status.
    #[must_use]
    pub fn new(
        node_id: impl Into<String>,
        hub_id: impl Into<String>,
        name: impl Into<String>,
        kind: SensorKind,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            hub_id: hub_id.into(),
            name: name.into(),
            kind,
            description: None,
            status: DeviceStatus::default(),
            registered_at: Utc::now(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Validates the record.
    ///
    /// # Errors
    ///
    /// Returns an error if the node id, hub id, or name is empty.
    pub fn validate_record(&self) -> Result<(), SensorValidationError> {
        if self.node_id.is_empty() {
            return Err(SensorValidationError::EmptyNodeId);
        }
        self.validate()?;
        Ok(())
    }
}
