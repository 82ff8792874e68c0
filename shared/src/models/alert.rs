//! Alert data model.
//!
//! Defines the `AlertRecord` produced by threshold evaluation of telemetry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Alert severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Advisory conditions worth surfacing.
    Info,
    /// Conditions that need attention soon.
    Warning,
    /// Conditions that need immediate action.
    Critical,
}

impl std::fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Error returned when parsing an unknown alert level string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown alert level '{0}': expected info, warning, or critical")]
pub struct ParseAlertLevelError(pub String);

impl FromStr for AlertLevel {
    type Err = ParseAlertLevelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            _ => Err(ParseAlertLevelError(raw.to_string())),
        }
    }
}

/// A derived notification produced by evaluating telemetry against threshold
/// rules.
///
/// Immutable once written: created by the alert evaluator, deleted only by the
/// retention sweeper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    /// Identifier of the hub whose telemetry triggered the alert.
    pub hub_id: String,

    /// Identifier of the originating node; `None` implies hub-wide.
    pub node_id: Option<String>,

    /// Human-readable description of the condition.
    pub message: String,

    /// Severity of the alert.
    pub level: AlertLevel,

    /// When the alert was evaluated, in UTC.
    pub created_at: DateTime<Utc>,
}

impl AlertRecord {
    /// Creates a new hub-wide alert.
    #[must_use]
    pub fn new(
        hub_id: impl Into<String>,
        level: AlertLevel,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            hub_id: hub_id.into(),
            node_id: None,
            message: message.into(),
            level,
            created_at,
        }
    }

    /// Attributes the alert to a specific node.
    #[must_use]
    pub fn with_node_id(mut self, node_id: impl Into<String>) -> Self {
        self.node_id = Some(node_id.into());
        self
    }
}
