//! Convenient imports for hosts.
//!
//! ```ignore
//! use deepstream_storage_mongodb::prelude::*;
//!
//! let connector = Connector::open(ConnectorConfig::new(url), MemoryDriver::new()).await?;
//! connector.set("key", 1, &json!({"a": 1})).await?;
//! ```

// Main entry point
pub use crate::connector::{Connector, ConnectorBuilder};
pub use crate::plugin::StoragePlugin;

// Error handling
pub use crate::{Error, Result};

// Configuration and results
pub use crate::types::{ConnectorConfig, Versioned};

// Backends
pub use crate::types::{Driver, MemoryDriver};
#[cfg(feature = "mongodb")]
pub use crate::types::MongoDriver;

// Re-export serde_json for convenience
pub use serde_json::json;
