//! # deepstream-storage-mongodb
//!
//! Versioned key-value storage over a document database.
//!
//! Keys are routed into collections: with `splitChar = '/'`, the record
//! `user/i4vcg5j1-16n1qrnziuog` is stored in the `user` collection under the
//! id `i4vcg5j1-16n1qrnziuog`, and keys without the separator go to the
//! default collection. Smaller collections keep lookups fast, and each one
//! is indexed on the id field the first time it is used.
//!
//! ## Quick Start
//!
//! ```ignore
//! use deepstream_storage_mongodb::prelude::*;
//!
//! let connector = Connector::builder()
//!     .connection_string("mongodb://127.0.0.1/deepstream")
//!     .split_char('/')
//!     .open()
//!     .await?;
//!
//! connector.set("user/i4vcg5j1", 10, &json!({"firstname": "Wolfram"})).await?;
//!
//! let versioned = connector.get("user/i4vcg5j1").await?;
//! assert_eq!(versioned.version, 10);
//!
//! connector.delete("user/i4vcg5j1").await?;
//! assert!(!connector.get("user/i4vcg5j1").await?.is_found());
//! ```
//!
//! ## Layers
//!
//! - [`KeyRouter`] - key to collection and document id
//! - [`CollectionCache`] - one indexed handle per collection
//! - [`encode_document`] / [`decode_document`] - logical value to stored document
//! - [`Connector`] - the public operations, behind a readiness gate
//!
//! ## Backends
//!
//! - [`MemoryDriver`] - in-process, for tests and development
//! - `MongoDriver` - MongoDB, with the `mongodb` feature

#![warn(missing_docs)]

mod connector;
mod plugin;
mod types;

pub mod prelude;

// Re-export main entry points
pub use connector::{Connector, ConnectorBuilder, NAME, VERSION};
pub use dsm_core::{Error, Result};
pub use plugin::StoragePlugin;

// Re-export types
pub use types::*;
