//! Document encoding for the storage connector
//!
//! Document stores keep keyed JSON objects. Logical values are arbitrary
//! JSON objects or bare arrays tagged with a caller version, so this crate
//! maps between the two using reserved fields:
//!
//! - `ds_key`: the document id, used for lookups
//! - `ds_version`: the caller-supplied version
//! - `ds_list`: holds a bare array value
//!
//! ## Encoding Rules
//!
//! | Logical value | Stored document |
//! |---------------|-----------------|
//! | `{...}` | `{..., "ds_key": id, "ds_version": n}` |
//! | `[...]` | `{"ds_list": [...], "ds_key": id, "ds_version": n}` |
//! | scalar | rejected |
//!
//! ## Examples
//!
//! ```
//! use dsm_wire::{decode_document, encode_document};
//! use serde_json::json;
//!
//! let doc = encode_document(&json!([1, 2, 3]), "abc", 4).unwrap();
//! assert_eq!(doc["ds_list"], json!([1, 2, 3]));
//!
//! let versioned = decode_document(Some(doc)).unwrap();
//! assert_eq!(versioned.version, 4);
//! assert_eq!(versioned.value, Some(json!([1, 2, 3])));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;

pub use document::{
    decode_document, encode_document, DecodeError, EncodeError, StoredDocument, Versioned,
    ID_FIELD, LIST_FIELD, NOT_FOUND_VERSION, RESERVED_FIELDS, ROUTING_FIELD, VERSION_FIELD,
};
