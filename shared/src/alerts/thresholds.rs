//! Alert threshold configuration.
//!
//! The defaults carry the platform's standard agronomic limits; constructing
//! a custom value leaves room for per-crop tuning without touching the
//! evaluator.

use serde::{Deserialize, Serialize};

/// Threshold values driving alert evaluation.
///
/// Soil moisture and air humidity are percentages; temperatures are °C, wind
/// is m/s, rain is mm/h.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertThresholds {
    /// Below this moisture, irrigation is urgent (critical).
    pub soil_moisture_critical: f64,
    /// Below this moisture, irrigation should be planned (warning).
    pub soil_moisture_warning: f64,
    /// Above this moisture, waterlogging is likely (info).
    pub soil_moisture_saturation: f64,

    /// Above this soil temperature, roots are at risk (critical).
    pub soil_temperature_critical_high: f64,
    /// Above this soil temperature, plants suffer heat stress (warning).
    pub soil_temperature_warning_high: f64,
    /// Below this soil temperature, the ground is freezing (critical).
    pub soil_temperature_critical_low: f64,
    /// Below this soil temperature, frost is near (warning).
    pub soil_temperature_warning_low: f64,

    /// Above this wind speed, conditions are storm-force (critical).
    pub wind_speed_critical: f64,
    /// Above this wind speed, winds are strong (warning).
    pub wind_speed_warning: f64,

    /// Above this rain intensity, flooding is likely (critical).
    pub rain_intensity_critical: f64,
    /// Above this rain intensity, rainfall is heavy (info).
    pub rain_intensity_heavy: f64,

    /// Above this air temperature, heat is extreme (critical).
    pub air_temperature_critical_high: f64,
    /// Below this air temperature, freezing conditions (critical).
    pub air_temperature_critical_low: f64,

    /// Above this humidity, the air is near saturation (info).
    pub air_humidity_saturation: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            soil_moisture_critical: 20.0,
            soil_moisture_warning: 30.0,
            soil_moisture_saturation: 90.0,
            soil_temperature_critical_high: 50.0,
            soil_temperature_warning_high: 40.0,
            soil_temperature_critical_low: 0.0,
            soil_temperature_warning_low: 5.0,
            wind_speed_critical: 25.0,
            wind_speed_warning: 15.0,
            rain_intensity_critical: 50.0,
            rain_intensity_heavy: 10.0,
            air_temperature_critical_high: 45.0,
            air_temperature_critical_low: 0.0,
            air_humidity_saturation: 95.0,
        }
    }
}

impl AlertThresholds {
    /// Validates internal ordering of the ladders.
    ///
    /// # Errors
    ///
    /// Returns an error if a critical band does not sit beyond its warning
    /// band.
    pub fn validate(&self) -> Result<(), String> {
        if self.soil_moisture_critical >= self.soil_moisture_warning {
            return Err("Soil moisture critical threshold must be below warning".to_string());
        }
        if self.soil_temperature_warning_high >= self.soil_temperature_critical_high {
            return Err("Soil temperature warning threshold must be below critical".to_string());
        }
        if self.soil_temperature_critical_low >= self.soil_temperature_warning_low {
            return Err("Soil freeze threshold must be below frost threshold".to_string());
        }
        if self.wind_speed_warning >= self.wind_speed_critical {
            return Err("Wind warning threshold must be below critical".to_string());
        }
        if self.rain_intensity_heavy >= self.rain_intensity_critical {
            return Err("Heavy rain threshold must be below critical".to_string());
        }
        Ok(())
    }
}
