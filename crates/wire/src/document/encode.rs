//! Logical value to stored document

use super::{StoredDocument, ID_FIELD, LIST_FIELD, ROUTING_FIELD, VERSION_FIELD};
use serde_json::Value;
use thiserror::Error;

/// Encode error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Scalars cannot be stored as keyed documents
    #[error("cannot store a {0} as a document, expected an object or an array")]
    UnsupportedValue(&'static str),

    /// Negative versions are reserved
    #[error("version {0} is reserved")]
    ReservedVersion(i64),
}

impl From<EncodeError> for dsm_core::Error {
    fn from(e: EncodeError) -> Self {
        dsm_core::Error::InvalidValue(e.to_string())
    }
}

/// Encode a logical value into the document stored under `document_id`.
///
/// The caller's value is cloned, never modified. Arrays are wrapped under
/// `ds_list`; a caller-supplied `_id` is dropped since the store owns it.
pub fn encode_document(
    value: &Value,
    document_id: &str,
    version: i64,
) -> Result<StoredDocument, EncodeError> {
    if version < 0 {
        return Err(EncodeError::ReservedVersion(version));
    }

    let mut doc = match value {
        Value::Object(map) => {
            let mut doc = map.clone();
            doc.remove(ID_FIELD);
            doc
        }
        Value::Array(_) => {
            let mut doc = StoredDocument::new();
            doc.insert(LIST_FIELD.to_string(), value.clone());
            doc
        }
        other => return Err(EncodeError::UnsupportedValue(type_name(other))),
    };

    doc.insert(ROUTING_FIELD.to_string(), Value::String(document_id.to_string()));
    doc.insert(VERSION_FIELD.to_string(), Value::from(version));
    Ok(doc)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
