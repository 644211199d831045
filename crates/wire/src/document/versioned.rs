//! Versioned read results

use serde_json::Value;

/// Version reported for keys that hold no document.
///
/// Reserved: callers can never write it.
pub const NOT_FOUND_VERSION: i64 = -1;

/// A logical value together with its caller-supplied version.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned {
    /// Version, or [`NOT_FOUND_VERSION`] when nothing is stored
    pub version: i64,
    /// The value, `None` when nothing is stored
    pub value: Option<Value>,
}

impl Versioned {
    /// A found value.
    pub fn new(version: i64, value: Value) -> Self {
        Self {
            version,
            value: Some(value),
        }
    }

    /// The not-found sentinel: `(-1, None)`.
    pub fn not_found() -> Self {
        Self {
            version: NOT_FOUND_VERSION,
            value: None,
        }
    }

    /// Check if a document was found.
    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }

    /// Split into `(version, value)`.
    pub fn into_parts(self) -> (i64, Option<Value>) {
        (self.version, self.value)
    }
}
