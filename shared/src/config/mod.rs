//! Configuration types shared across the platform.

pub mod retention;

pub use retention::{DataType, RetentionConfig, RetentionPolicy};
