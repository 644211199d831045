//! Error types for the storage connector.
//!
//! Every failure of a connector operation is reported through [`Error`].
//! A missing document is *not* an error: reads report it with the
//! not-found sentinel instead.

use thiserror::Error;

/// All connector errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Missing or malformed configuration. Fatal, raised at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The key cannot be routed to a collection
    #[error("Invalid key {0}")]
    InvalidKey(String),

    /// The value cannot be stored as a document
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// The backing store reported a failure
    #[error("backend error: {0}")]
    Backend(String),

    /// The connection to the backing store could not be established
    #[error("not ready: {0}")]
    NotReady(String),

    /// A stored document could not be decoded
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for connector operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a backend error from anything displayable.
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Error::Backend(err.to_string())
    }

    /// Check if this is an invalid-key error.
    pub fn is_invalid_key(&self) -> bool {
        matches!(self, Error::InvalidKey(_))
    }

    /// Check if the backing store reported this error.
    pub fn is_backend(&self) -> bool {
        matches!(self, Error::Backend(_))
    }

    /// Check if this error is a fatal configuration problem.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }

    /// Check if this error may succeed on retry.
    ///
    /// Only backend failures qualify. The connector itself never retries;
    /// the decision belongs to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Backend(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Configuration(e.to_string())
    }
}
