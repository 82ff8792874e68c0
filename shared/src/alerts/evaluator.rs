//! The alert evaluator.
//!
//! A pure function from one telemetry batch to zero or more alerts. Sensor
//! values are judged independently (a node can trip both a moisture and a
//! temperature alert), but within one value's threshold ladder only the
//! first matching band fires, checked highest severity first.

use crate::alerts::thresholds::AlertThresholds;
use crate::models::{AlertLevel, AlertRecord, AtmosphericReading, SoilNodeReading, TelemetryRecord};
use chrono::{DateTime, Utc};

/// Evaluates one telemetry batch against the thresholds.
///
/// No side effects; deterministic given the record, thresholds, and `now`
/// (which becomes `created_at` on every produced alert).
#[must_use]
pub fn evaluate(
    telemetry: &TelemetryRecord,
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
) -> Vec<AlertRecord> {
    let mut alerts = Vec::new();

    for node in &telemetry.data.soil_nodes {
        evaluate_soil_node(&telemetry.hub_id, node, thresholds, now, &mut alerts);
    }
    evaluate_atmosphere(
        &telemetry.hub_id,
        &telemetry.data.atmospheric,
        thresholds,
        now,
        &mut alerts,
    );

    alerts
}

fn evaluate_soil_node(
    hub_id: &str,
    node: &SoilNodeReading,
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
    alerts: &mut Vec<AlertRecord>,
) {
    let moisture = node.sensors.soil_moisture;
    if moisture < thresholds.soil_moisture_critical {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Soil moisture critically low ({moisture:.1}%): urgent irrigation needed"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    } else if moisture < thresholds.soil_moisture_warning {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Warning,
                format!("Soil moisture low ({moisture:.1}%): plan irrigation soon"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    } else if moisture > thresholds.soil_moisture_saturation {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Info,
                format!("Soil moisture very high ({moisture:.1}%): waterlogging risk"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    }

    let temperature = node.sensors.soil_temperature;
    if temperature > thresholds.soil_temperature_critical_high {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Soil temperature extreme ({temperature:.1}°C): root damage risk"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    } else if temperature > thresholds.soil_temperature_warning_high {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Warning,
                format!("Soil temperature high ({temperature:.1}°C): heat stress"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    } else if temperature < thresholds.soil_temperature_critical_low {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Soil temperature below freezing ({temperature:.1}°C): freeze risk"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    } else if temperature < thresholds.soil_temperature_warning_low {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Warning,
                format!("Soil temperature near freezing ({temperature:.1}°C): frost risk"),
                now,
            )
            .with_node_id(&node.node_id),
        );
    }
}

fn evaluate_atmosphere(
    hub_id: &str,
    reading: &AtmosphericReading,
    thresholds: &AlertThresholds,
    now: DateTime<Utc>,
    alerts: &mut Vec<AlertRecord>,
) {
    let sensors = &reading.sensors;

    let wind = sensors.wind_speed;
    if wind > thresholds.wind_speed_critical {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Storm-force wind ({wind:.1} m/s): secure equipment and covers"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    } else if wind > thresholds.wind_speed_warning {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Warning,
                format!("Strong wind ({wind:.1} m/s): spraying not advised"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    }

    let rain = sensors.rain_intensity;
    if rain > thresholds.rain_intensity_critical {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Torrential rain ({rain:.1} mm/h): flooding risk"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    } else if rain > thresholds.rain_intensity_heavy {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Info,
                format!("Heavy rain ({rain:.1} mm/h)"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    }

    let air_temperature = sensors.air_temperature;
    if air_temperature > thresholds.air_temperature_critical_high {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Extreme heat ({air_temperature:.1}°C)"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    } else if air_temperature < thresholds.air_temperature_critical_low {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Critical,
                format!("Freezing conditions ({air_temperature:.1}°C)"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    }

    let humidity = sensors.air_humidity;
    if humidity > thresholds.air_humidity_saturation {
        alerts.push(
            AlertRecord::new(
                hub_id,
                AlertLevel::Info,
                format!("Air humidity near saturation ({humidity:.1}%): disease pressure risk"),
                now,
            )
            .with_node_id(&reading.node_id),
        );
    }
}
