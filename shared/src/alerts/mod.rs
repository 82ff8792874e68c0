//! Alert evaluation.
//!
//! Threshold rules and the pure evaluator mapping one telemetry batch to
//! zero or more alerts.

pub mod evaluator;
pub mod thresholds;

pub use evaluator::evaluate;
pub use thresholds::AlertThresholds;
