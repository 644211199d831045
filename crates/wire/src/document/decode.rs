//! Stored document to logical value

use super::versioned::Versioned;
use super::{StoredDocument, ID_FIELD, LIST_FIELD, ROUTING_FIELD, VERSION_FIELD};
use serde_json::Value;
use thiserror::Error;

/// Decode error types
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// Document has no version field
    #[error("document has no ds_version field")]
    MissingVersion,

    /// Version field is not an integer
    #[error("invalid ds_version value: {0}")]
    InvalidVersion(String),
}

impl From<DecodeError> for dsm_core::Error {
    fn from(e: DecodeError) -> Self {
        dsm_core::Error::Serialization(e.to_string())
    }
}

/// Decode a looked-up document.
///
/// `None` (no document) yields [`Versioned::not_found`]. Otherwise the
/// store's `_id` and the routing and version fields are stripped, and a
/// document whose only remaining field is `ds_list` holding an array is
/// unwrapped to that array.
pub fn decode_document(doc: Option<StoredDocument>) -> Result<Versioned, DecodeError> {
    let Some(mut doc) = doc else {
        return Ok(Versioned::not_found());
    };

    let version = match doc.remove(VERSION_FIELD) {
        Some(v) => decode_version(&v)?,
        None => return Err(DecodeError::MissingVersion),
    };

    doc.remove(ID_FIELD);
    doc.remove(ROUTING_FIELD);

    let is_wrapped_list = doc.len() == 1 && matches!(doc.get(LIST_FIELD), Some(Value::Array(_)));
    let value = if is_wrapped_list {
        doc.remove(LIST_FIELD).unwrap_or(Value::Null)
    } else {
        Value::Object(doc)
    };

    Ok(Versioned::new(version, value))
}

fn decode_version(raw: &Value) -> Result<i64, DecodeError> {
    if let Some(v) = raw.as_i64() {
        return Ok(v);
    }
    // Some drivers hand integral numbers back as doubles
    match raw.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 => {
            Ok(f as i64)
        }
        _ => Err(DecodeError::InvalidVersion(raw.to_string())),
    }
}
