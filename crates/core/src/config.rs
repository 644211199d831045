//! Connector configuration.
//!
//! Options use the same names hosts already write in their plugin
//! configuration (`connectionString`, `defaultCollection`, `splitChar`,
//! `db`), so a config section can be deserialized directly:
//!
//! ```
//! use dsm_core::ConnectorConfig;
//!
//! let config = ConnectorConfig::from_toml_str(r#"
//!     connectionString = "mongodb://127.0.0.1"
//!     db = "deepstream"
//!     splitChar = "/"
//! "#).unwrap();
//!
//! assert_eq!(config.split_char, Some('/'));
//! assert_eq!(config.default_collection, "deepstream_docs");
//! ```

use crate::error::{Error, Result};
use crate::key::KeyRouter;
use serde::{Deserialize, Deserializer, Serialize};

/// Collection used for keys that carry no collection prefix.
pub const DEFAULT_COLLECTION: &str = "deepstream_docs";

/// Options recognized by the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectorConfig {
    /// Backing-store connection URL. Required.
    #[serde(default)]
    pub connection_string: Option<String>,

    /// Database to select after connecting, for drivers that need one.
    #[serde(default, rename = "db", alias = "database")]
    pub database: Option<String>,

    /// Collection for keys without a separator
    #[serde(default = "default_collection")]
    pub default_collection: String,

    /// Separator between collection name and document id.
    ///
    /// `None` disables routing: every key lands in the default collection.
    #[serde(default, deserialize_with = "deserialize_split_char")]
    pub split_char: Option<char>,
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

/// Accepts a one-character string; an empty string means "unset".
fn deserialize_split_char<'de, D>(deserializer: D) -> std::result::Result<Option<char>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("") => Ok(None),
        Some(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Some(c)),
                _ => Err(serde::de::Error::custom(format!(
                    "splitChar must be a single character, got {:?}",
                    s
                ))),
            }
        }
    }
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            connection_string: None,
            database: None,
            default_collection: default_collection(),
            split_char: None,
        }
    }
}

impl ConnectorConfig {
    /// Create a config for the given connection string with default options.
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: Some(connection_string.into()),
            ..Self::default()
        }
    }

    /// Parse and validate a TOML config section.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: ConnectorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON config object.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let config: ConnectorConfig =
            serde_json::from_value(value).map_err(|e| Error::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Select the database to use after connecting.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the collection for keys without a separator.
    pub fn default_collection(mut self, name: impl Into<String>) -> Self {
        self.default_collection = name.into();
        self
    }

    /// Enable routing on the given separator.
    pub fn split_char(mut self, separator: char) -> Self {
        self.split_char = Some(separator);
        self
    }

    /// Disable routing.
    pub fn no_split_char(mut self) -> Self {
        self.split_char = None;
        self
    }

    /// The connection string, or a configuration error if it is missing.
    pub fn require_connection_string(&self) -> Result<&str> {
        match self.connection_string.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(Error::Configuration(
                "Missing setting 'connectionString'".to_string(),
            )),
        }
    }

    /// Check the config for fatal problems.
    pub fn validate(&self) -> Result<()> {
        self.require_connection_string()?;

        if self.default_collection.is_empty() {
            return Err(Error::Configuration(
                "Setting 'defaultCollection' must not be empty".to_string(),
            ));
        }

        if let Some(sep) = self.split_char {
            if self.default_collection.starts_with(sep) {
                return Err(Error::Configuration(format!(
                    "Setting 'defaultCollection' must not start with splitChar {:?}",
                    sep
                )));
            }
        }

        Ok(())
    }

    /// The database a connection will select: the `db` setting, else the
    /// path segment of the connection string.
    pub fn database_name(&self) -> Option<String> {
        self.database
            .clone()
            .or_else(|| self.connection_string.as_deref().and_then(database_from_url))
    }

    /// Build the key router described by this config.
    pub fn router(&self) -> KeyRouter {
        KeyRouter::new(self.split_char, self.default_collection.clone())
    }
}

/// Database path segment of a `scheme://host/db?options` URL
pub fn database_from_url(url: &str) -> Option<String> {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let (_, path) = rest.split_once('/')?;
    let name = path.split('?').next().unwrap_or_default();
    (!name.is_empty()).then(|| name.to_string())
}
