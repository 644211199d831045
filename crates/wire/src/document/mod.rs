//! Stored document layout
//!
//! A stored document is a JSON object. Besides the caller's fields it
//! carries the reserved fields below. A caller field with a reserved name
//! is shadowed by the reserved use: `ds_key` and `ds_version` are
//! overwritten on encode, and an object whose only field is an array under
//! `ds_list` decodes as that bare array.

mod decode;
mod encode;
mod versioned;

pub use decode::{decode_document, DecodeError};
pub use encode::{encode_document, EncodeError};
pub use versioned::{Versioned, NOT_FOUND_VERSION};

/// A document as held by the backing store.
pub type StoredDocument = serde_json::Map<String, serde_json::Value>;

/// Field echoing the document id, used for lookups and indexed
pub const ROUTING_FIELD: &str = "ds_key";

/// Field holding the caller-supplied version
pub const VERSION_FIELD: &str = "ds_version";

/// Field wrapping a bare array value
pub const LIST_FIELD: &str = "ds_list";

/// The store's own primary key field
pub const ID_FIELD: &str = "_id";

/// Field names never returned to callers
pub const RESERVED_FIELDS: [&str; 4] = [ID_FIELD, ROUTING_FIELD, VERSION_FIELD, LIST_FIELD];
