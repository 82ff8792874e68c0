//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible
//! defaults.

use anyhow::Result;
use shared::config::RetentionConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `AGRISIGHT_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `AGRISIGHT_PORT`: The port to listen on (default: 8080)
/// - `AGRISIGHT_DATA_PATH`: Path of the JSON dataset file; unset means an
///   in-memory store (data is lost on restart)
/// - `AGRISIGHT_ALERT_RETENTION_DAYS`: Alert retention window (default: 30)
/// - `AGRISIGHT_TELEMETRY_RETENTION_DAYS`: Telemetry retention window
///   (default: 90)
/// - `AGRISIGHT_SWEEP_INTERVAL_SECS`: Seconds between retention sweeps
///   (default: 86400, once per day)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The port to listen on.
    pub port: u16,
    /// Path of the dataset file; `None` selects the in-memory store.
    pub data_path: Option<PathBuf>,
    /// Alert retention window in days.
    pub alert_retention_days: u32,
    /// Telemetry retention window in days.
    pub telemetry_retention_days: u32,
    /// Interval between retention sweeps.
    pub sweep_interval: Duration,
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("AGRISIGHT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = std::env::var("AGRISIGHT_PORT")
            .ok()
            .map(|p| p.parse::<u16>())
            .transpose()?
            .unwrap_or(8080);

        let data_path = std::env::var("AGRISIGHT_DATA_PATH").ok().map(PathBuf::from);

        let alert_retention_days = std::env::var("AGRISIGHT_ALERT_RETENTION_DAYS")
            .ok()
            .map(|d| d.parse::<u32>())
            .transpose()?
            .unwrap_or(30);

        let telemetry_retention_days = std::env::var("AGRISIGHT_TELEMETRY_RETENTION_DAYS")
            .ok()
            .map(|d| d.parse::<u32>())
            .transpose()?
            .unwrap_or(90);

        let sweep_interval_secs = std::env::var("AGRISIGHT_SWEEP_INTERVAL_SECS")
            .ok()
            .map(|s| s.parse::<u64>())
            .transpose()?
            .unwrap_or(86_400);

        Ok(Self {
            host,
            port,
            data_path,
            alert_retention_days,
            telemetry_retention_days,
            sweep_interval: Duration::from_secs(sweep_interval_secs),
        })
    }

    /// Returns the socket address for binding.
    ///
    /// # Panics
    ///
    /// Panics if the host and port combination cannot be parsed as a valid
    /// socket address.
    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port)
            .parse()
            .expect("Invalid socket address from config")
    }

    /// Returns the retention configuration derived from the window settings.
    #[must_use]
    pub fn retention(&self) -> RetentionConfig {
        RetentionConfig::new(self.alert_retention_days, self.telemetry_retention_days)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_path: None,
            alert_retention_days: 30,
            telemetry_retention_days: 90,
            sweep_interval: Duration::from_secs(86_400),
        }
    }
}
