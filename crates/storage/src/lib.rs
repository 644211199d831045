//! Storage layer for the routed document connector
//!
//! This crate implements the seam to the document database:
//! - [`Driver`], [`Database`], [`Collection`]: what the connector needs from
//!   a database client
//! - [`CollectionCache`]: one handle per collection name, indexed on first use
//! - [`MemoryDriver`]: in-process backend for tests and development
//! - `MongoDriver`: MongoDB backend (feature `mongodb`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use cache::CollectionCache;
pub use memory::{MemoryCollection, MemoryDatabase, MemoryDriver};

#[cfg(feature = "mongodb")]
pub use mongo::MongoDriver;

use async_trait::async_trait;
use dsm_core::Result;
use dsm_wire::{StoredDocument, ROUTING_FIELD};
use std::sync::Arc;

/// Equality match on a single document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFilter<'a> {
    /// Field to match
    pub field: &'a str,
    /// Required string value
    pub value: &'a str,
}

impl<'a> KeyFilter<'a> {
    /// Match documents whose routing field equals `document_id`.
    pub fn routing(document_id: &'a str) -> Self {
        Self {
            field: ROUTING_FIELD,
            value: document_id,
        }
    }

    /// Check a document against the filter.
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        matches!(doc.get(self.field), Some(serde_json::Value::String(s)) if s == self.value)
    }
}

/// Opens connections to a document database.
#[async_trait]
pub trait Driver: Send + Sync {
    /// Human-readable backend name, e.g. `"MongoDB"`
    fn backend_name(&self) -> &'static str;

    /// Connect and select a database.
    ///
    /// `database` is `None` when the connection string should decide.
    async fn connect(
        &self,
        connection_string: &str,
        database: Option<&str>,
    ) -> Result<Arc<dyn Database>>;
}

/// A connected database.
pub trait Database: Send + Sync {
    /// Name of the selected database
    fn name(&self) -> &str;

    /// Get a handle to a collection. Does not contact the server.
    fn collection(&self, name: &str) -> Arc<dyn Collection>;
}

/// A named partition of documents.
#[async_trait]
pub trait Collection: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Find the first document matching the filter
    async fn find_one(&self, filter: &KeyFilter<'_>) -> Result<Option<StoredDocument>>;

    /// Replace the first matching document in full.
    ///
    /// With `upsert`, inserts `document` when nothing matches.
    async fn replace_one(
        &self,
        filter: &KeyFilter<'_>,
        document: StoredDocument,
        upsert: bool,
    ) -> Result<()>;

    /// Delete the first matching document. Returns whether one was removed.
    async fn delete_one(&self, filter: &KeyFilter<'_>) -> Result<bool>;

    /// Build an ascending index over `field`
    async fn create_index(&self, field: &str) -> Result<()>;
}
