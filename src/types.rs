//! Public types re-exported from the internal crates.

// Configuration and routing
pub use dsm_core::{ConnectorConfig, KeyRouter, Route, DEFAULT_COLLECTION};

// Document codec
pub use dsm_wire::{
    decode_document, encode_document, StoredDocument, Versioned, LIST_FIELD, NOT_FOUND_VERSION,
    ROUTING_FIELD, VERSION_FIELD,
};

// Storage seam and backends
pub use dsm_storage::{
    Collection, CollectionCache, Database, Driver, KeyFilter, MemoryCollection, MemoryDatabase,
    MemoryDriver,
};

#[cfg(feature = "mongodb")]
pub use dsm_storage::MongoDriver;
