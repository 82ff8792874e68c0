//! Retention configuration for data expiration policies.
//!
//! Defines how long alerts and telemetry are kept before the sweeper prunes
//! them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// The prunable record types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// Derived alert records.
    Alerts,
    /// Telemetry batches.
    Telemetry,
}

/// Retention policy for a specific data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// The data type this policy applies to.
    pub data_type: DataType,
    /// Time-to-live in days.
    pub ttl_days: u32,
}

impl RetentionPolicy {
    /// Creates a new retention policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::{DataType, RetentionPolicy};
    ///
    /// let policy = RetentionPolicy::new(DataType::Alerts, 30);
    /// assert_eq!(policy.ttl_days, 30);
    /// ```
    #[must_use]
    pub fn new(data_type: DataType, ttl_days: u32) -> Self {
        Self {
            data_type,
            ttl_days,
        }
    }

    /// Returns the TTL as a `std::time::Duration`.
    #[must_use]
    pub fn as_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(u64::from(self.ttl_days) * 24 * 60 * 60)
    }

    /// Returns the oldest timestamp still retained when evaluated at `now`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use shared::config::{DataType, RetentionPolicy};
    ///
    /// let policy = RetentionPolicy::new(DataType::Telemetry, 90);
    /// let now = Utc::now();
    /// assert_eq!(policy.cutoff(now), now - Duration::days(90));
    /// ```
    #[must_use]
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.ttl_days))
    }

    /// Validates the retention policy.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - TTL is zero
    /// - TTL exceeds maximum allowed (3650 days / 10 years)
    pub fn validate(&self) -> Result<(), String> {
        if self.ttl_days == 0 {
            return Err("TTL must be greater than zero".to_string());
        }
        if self.ttl_days > 3650 {
            return Err("TTL cannot exceed 3650 days (10 years)".to_string());
        }
        Ok(())
    }
}

/// Complete retention configuration for both prunable data types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionConfig {
    /// Retention policy for alerts.
    pub alerts: RetentionPolicy,
    /// Retention policy for telemetry.
    pub telemetry: RetentionPolicy,
}

impl RetentionConfig {
    /// Creates a new retention configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use shared::config::RetentionConfig;
    ///
    /// let config = RetentionConfig::new(30, 90);
    /// assert_eq!(config.alerts.ttl_days, 30);
    /// assert_eq!(config.telemetry.ttl_days, 90);
    /// ```
    #[must_use]
    pub fn new(alerts_ttl_days: u32, telemetry_ttl_days: u32) -> Self {
        Self {
            alerts: RetentionPolicy::new(DataType::Alerts, alerts_ttl_days),
            telemetry: RetentionPolicy::new(DataType::Telemetry, telemetry_ttl_days),
        }
    }

    /// Validates all retention policies.
    ///
    /// # Errors
    ///
    /// Returns an error if any policy is invalid.
    pub fn validate(&self) -> Result<(), String> {
        self.alerts.validate()?;
        self.telemetry.validate()?;
        Ok(())
    }

    /// Gets the retention policy for a specific data type.
    #[must_use]
    pub fn get_policy(&self, data_type: DataType) -> &RetentionPolicy {
        match data_type {
            DataType::Alerts => &self.alerts,
            DataType::Telemetry => &self.telemetry,
        }
    }
}

impl Default for RetentionConfig {
    /// Returns default retention configuration:
    /// - Alerts: 30 days
    /// - Telemetry: 90 days
    fn default() -> Self {
        Self::new(30, 90)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retention_policy_new() {
        let policy = RetentionPolicy::new(DataType::Alerts, 30);
        assert_eq!(policy.data_type, DataType::Alerts);
        assert_eq!(policy.ttl_days, 30);
    }

    #[test]
    fn test_retention_policy_as_duration() {
        let policy = RetentionPolicy::new(DataType::Alerts, 30);
        assert_eq!(policy.as_duration().as_secs(), 30 * 24 * 60 * 60);
    }

    #[test]
    fn test_retention_policy_cutoff() {
        let policy = RetentionPolicy::new(DataType::Telemetry, 90);
        let now = Utc::now();
        assert_eq!(policy.cutoff(now), now - Duration::days(90));
    }

    #[test]
    fn test_retention_policy_validate_zero_ttl() {
        let policy = RetentionPolicy::new(DataType::Alerts, 0);
        let result = policy.validate();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "TTL must be greater than zero");
    }

    #[test]
    fn test_retention_policy_validate_exceeds_max() {
        let policy = RetentionPolicy::new(DataType::Alerts, 3651);
        let result = policy.validate();
        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), "TTL cannot exceed 3650 days (10 years)");
    }

    #[test]
    fn test_retention_config_default() {
        let config = RetentionConfig::default();
        assert_eq!(config.alerts.ttl_days, 30);
        assert_eq!(config.telemetry.ttl_days, 90);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retention_config_validate_invalid_member() {
        let config = RetentionConfig::new(0, 90);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retention_config_get_policy() {
        let config = RetentionConfig::default();
        assert_eq!(config.get_policy(DataType::Alerts).ttl_days, 30);
        assert_eq!(config.get_policy(DataType::Telemetry).ttl_days, 90);
    }

    #[test]
    fn test_retention_config_serialization() {
        let config = RetentionConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: RetentionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_data_type_serialization() {
        assert_eq!(
            serde_json::to_string(&DataType::Telemetry).unwrap(),
            "\"telemetry\""
        );
        let data_type: DataType = serde_json::from_str("\"alerts\"").unwrap();
        assert_eq!(data_type, DataType::Alerts);
    }
}
