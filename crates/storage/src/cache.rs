//! Collection handle cache
//!
//! One handle per collection name, created on first use and kept for the
//! lifetime of the cache. No eviction: the number of collections follows
//! the application's key prefixes, not request volume.
//!
//! # Design
//!
//! - DashMap: sharded, lock-free reads on the hit path
//! - Population runs under the shard's entry lock, so concurrent misses
//!   for one name produce exactly one handle and one index request
//! - The routing-field index is requested on a runtime task; the handle is
//!   returned without waiting for it
//! - The index is not unique. On a network store, concurrent upserts of a
//!   key that does not exist yet can each insert a document; callers
//!   serialize writes to one key

use crate::{Collection, Database};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use dsm_wire::ROUTING_FIELD;
use std::sync::Arc;
use tracing::{debug, warn};

/// Cache of collection handles keyed by name.
pub struct CollectionCache {
    database: Arc<dyn Database>,
    collections: DashMap<String, Arc<dyn Collection>>,
}

impl CollectionCache {
    /// Create an empty cache over a connected database.
    pub fn new(database: Arc<dyn Database>) -> Self {
        Self {
            database,
            collections: DashMap::new(),
        }
    }

    /// The database handles come from
    pub fn database(&self) -> &Arc<dyn Database> {
        &self.database
    }

    /// Get the handle for `name`, opening and indexing it on first use.
    pub fn get(&self, name: &str) -> Arc<dyn Collection> {
        if let Some(collection) = self.collections.get(name) {
            return Arc::clone(collection.value());
        }

        match self.collections.entry(name.to_string()) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                debug!(collection = name, "opening collection");
                let collection = self.database.collection(name);
                entry.insert(Arc::clone(&collection));
                request_index(Arc::clone(&collection));
                collection
            }
        }
    }

    /// Check if a handle for `name` is cached
    pub fn contains(&self, name: &str) -> bool {
        self.collections.contains_key(name)
    }

    /// Number of cached handles
    pub fn len(&self) -> usize {
        self.collections.len()
    }

    /// Check if no handle is cached
    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// Build the routing-field index in the background.
///
/// Lookups stay correct without the index, so failures are only logged.
fn request_index(collection: Arc<dyn Collection>) {
    let handle = match tokio::runtime::Handle::try_current() {
        Ok(handle) => handle,
        Err(_) => {
            warn!(
                collection = collection.name(),
                "no async runtime, skipping index on {}", ROUTING_FIELD
            );
            return;
        }
    };

    handle.spawn(async move {
        match collection.create_index(ROUTING_FIELD).await {
            Ok(()) => debug!(collection = collection.name(), "index on {} ready", ROUTING_FIELD),
            Err(e) => warn!(
                collection = collection.name(),
                error = %e,
                "failed to build index on {}", ROUTING_FIELD
            ),
        }
    });
}
