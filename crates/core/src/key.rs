//! Key routing.
//!
//! A key is split at the *first* occurrence of the separator: the part
//! before it names the collection, everything after it (further separators
//! included) is the document id.
//!
//! | Key | Route |
//! |-----|-------|
//! | `user/a` | `("user", "a")` |
//! | `bla` | `(default, "bla")` |
//! | `a/b/c` | `("a", "b/c")` |
//! | `/a/b/c` | invalid |
//!
//! Multi-segment keys are accepted, not rejected.

use crate::error::{Error, Result};
use std::fmt;

/// Where a key lives: a collection and a document id inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Route<'a> {
    /// Collection name
    pub collection: &'a str,
    /// Document id within the collection
    pub document_id: &'a str,
}

impl fmt::Display for Route<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.collection, self.document_id)
    }
}

/// Splits keys into routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRouter {
    separator: Option<char>,
    default_collection: String,
}

impl KeyRouter {
    /// Create a router. A `None` separator disables routing.
    pub fn new(separator: Option<char>, default_collection: impl Into<String>) -> Self {
        Self {
            separator,
            default_collection: default_collection.into(),
        }
    }

    /// The configured separator, if routing is enabled.
    pub fn separator(&self) -> Option<char> {
        self.separator
    }

    /// The collection for keys without a separator.
    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// Route a key.
    ///
    /// Fails with [`Error::InvalidKey`] for the empty key and for keys that
    /// start with the separator, since both would need an empty name.
    pub fn route<'a>(&'a self, key: &'a str) -> Result<Route<'a>> {
        if key.is_empty() {
            return Err(Error::InvalidKey(key.to_string()));
        }

        let index = self.separator.and_then(|sep| key.find(sep).map(|i| (i, sep)));

        match index {
            None => Ok(Route {
                collection: &self.default_collection,
                document_id: key,
            }),
            Some((0, _)) => Err(Error::InvalidKey(key.to_string())),
            Some((i, sep)) => Ok(Route {
                collection: &key[..i],
                document_id: &key[i + sep.len_utf8()..],
            }),
        }
    }
}
