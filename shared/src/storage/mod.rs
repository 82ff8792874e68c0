//! Record store traits and implementations.
//!
//! This module provides the abstraction for storing and filtering the
//! platform's record collections. The `RecordStore` trait defines the
//! interface; `InMemoryRecordStore` backs development and tests, and
//! `JsonFileStore` provides durable single-file persistence.

pub mod json_file;
pub mod memory;
pub mod record_store;

pub use json_file::JsonFileStore;
pub use memory::InMemoryRecordStore;
pub use record_store::{collections, Filter, RecordStore, StoreError};
