//! Connector Integration Test Suite
//!
//! Exercises the public operations end to end against the in-memory
//! backend: routing into collections, the document layout left in the
//! store, the readiness gate and error reporting.
//!
//! ## Running Tests
//!
//! ```bash
//! # Run all connector tests
//! cargo test --test connector
//!
//! # Run routing tests only, with logs
//! RUST_LOG=debug cargo test --test connector routing::
//! ```

use std::sync::Arc;

use deepstream_storage_mongodb::prelude::*;
use deepstream_storage_mongodb::{MemoryCollection, MemoryDatabase};

pub mod concurrency;
pub mod readiness;
pub mod stored_layout;

// =============================================================================
// SHARED TEST UTILITIES
// =============================================================================

/// Connection string for the memory backend; selects database `deepstream`
pub const CONNECTION_STRING: &str = "memory://127.0.0.1/deepstream";

/// Route tracing output through the test harness. Honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config routing on `/` with the default collection name
pub fn test_config() -> ConnectorConfig {
    ConnectorConfig::new(CONNECTION_STRING).split_char('/')
}

/// Create a ready connector plus a driver handle for inspecting the store
pub async fn create_connector() -> (Connector, MemoryDriver) {
    create_connector_with(test_config()).await
}

/// Like [`create_connector`] with a custom config
pub async fn create_connector_with(config: ConnectorConfig) -> (Connector, MemoryDriver) {
    init_tracing();
    let driver = MemoryDriver::new();
    let connector = Connector::open(config, driver.clone())
        .await
        .expect("Failed to open connector");
    (connector, driver)
}

/// The `deepstream` database behind a connector
pub fn database(driver: &MemoryDriver) -> Arc<MemoryDatabase> {
    driver
        .database("deepstream")
        .expect("database not created")
}

/// A collection in the `deepstream` database
pub fn collection(driver: &MemoryDriver, name: &str) -> Arc<MemoryCollection> {
    database(driver)
        .get_collection(name)
        .unwrap_or_else(|| panic!("collection {} not created", name))
}

/// Let background index requests run
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}
