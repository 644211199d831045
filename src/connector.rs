//! The storage connector.
//!
//! [`Connector`] is the entry point for hosts: it validates the
//! configuration, connects through a [`Driver`], and exposes the versioned
//! `get`/`set`/`delete` operations.
//!
//! Every operation routes its key, fetches the collection handle from the
//! cache and translates the value with the document codec before talking to
//! the database.

use dsm_core::{ConnectorConfig, Error, KeyRouter, Result, Route};
use dsm_storage::{Collection, CollectionCache, Driver, KeyFilter};
use dsm_wire::{decode_document, encode_document, Versioned};
use futures::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// Crate name reported to hosts
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Crate version reported to hosts
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A versioned key-value store over a document database.
///
/// Construction validates the configuration and, inside a tokio runtime,
/// starts connecting in the background. Outside a runtime the connection
/// is established by [`when_ready`](Self::when_ready) or by the first
/// operation. Operations issued while it is in flight wait for it. If it
/// fails, every operation fails with [`Error::NotReady`].
///
/// # Example
///
/// ```ignore
/// use deepstream_storage_mongodb::prelude::*;
///
/// let config = ConnectorConfig::new("mongodb://127.0.0.1/deepstream").split_char('/');
/// let connector = Connector::open(config, MongoDriver::new()).await?;
///
/// connector.set("user/i4vcg5j1", 1, &json!({"name": "Alice"})).await?;
/// let versioned = connector.get("user/i4vcg5j1").await?;
/// connector.delete("user/i4vcg5j1").await?;
/// ```
pub struct Connector {
    config: ConnectorConfig,
    router: KeyRouter,
    gate: Arc<ReadinessGate>,
}

/// Connects at most once and keeps the outcome.
struct ReadinessGate {
    driver: Arc<dyn Driver>,
    connection_string: String,
    database: Option<String>,
    state: OnceCell<std::result::Result<CollectionCache, Error>>,
}

impl ReadinessGate {
    /// Wait for the connection, starting it if nothing has yet.
    async fn collections(&self) -> Result<&CollectionCache> {
        let state = self.state.get_or_init(|| self.connect()).await;
        match state {
            Ok(cache) => Ok(cache),
            Err(e) => Err(Error::NotReady(e.to_string())),
        }
    }

    async fn connect(&self) -> std::result::Result<CollectionCache, Error> {
        let backend = self.driver.backend_name();

        match self
            .driver
            .connect(&self.connection_string, self.database.as_deref())
            .await
        {
            Ok(database) => {
                info!(backend, database = database.name(), "storage connector ready");
                Ok(CollectionCache::new(database))
            }
            Err(e) => {
                warn!(backend, error = %e, "storage connector failed to connect");
                Err(e)
            }
        }
    }
}

/// Start connecting on the current runtime, if there is one.
fn start_connecting(gate: &Arc<ReadinessGate>) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let gate = Arc::clone(gate);
            handle.spawn(async move {
                // Failures are logged by the gate and reported to every caller.
                let _ = gate.collections().await;
            });
        }
        Err(_) => debug!("no async runtime, connecting on first use"),
    }
}

impl Connector {
    /// Validate the configuration and create a connector.
    ///
    /// Fails with [`Error::Configuration`] when `connectionString` is missing.
    pub fn new(config: ConnectorConfig, driver: impl Driver + 'static) -> Result<Self> {
        Self::with_driver(config, Arc::new(driver))
    }

    /// Like [`new`](Self::new), for an already shared driver.
    pub fn with_driver(config: ConnectorConfig, driver: Arc<dyn Driver>) -> Result<Self> {
        if let Err(e) = config.validate() {
            warn!(error = %e, "rejecting connector configuration");
            return Err(e);
        }

        let router = config.router();
        debug!(
            split_char = ?router.separator(),
            default_collection = router.default_collection(),
            "connector configured"
        );

        let gate = Arc::new(ReadinessGate {
            driver,
            connection_string: config.require_connection_string()?.to_string(),
            database: config.database.clone(),
            state: OnceCell::new(),
        });
        start_connecting(&gate);

        Ok(Self {
            config,
            router,
            gate,
        })
    }

    /// Create a connector and wait until it is ready.
    pub async fn open(config: ConnectorConfig, driver: impl Driver + 'static) -> Result<Self> {
        let connector = Self::new(config, driver)?;
        connector.when_ready().await?;
        Ok(connector)
    }

    /// Create a builder for connector configuration.
    pub fn builder() -> ConnectorBuilder {
        ConnectorBuilder::new()
    }

    /// The validated configuration
    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Crate name
    pub fn name(&self) -> &'static str {
        NAME
    }

    /// Crate version
    pub fn version(&self) -> &'static str {
        VERSION
    }

    /// Human-readable description naming the backend and database.
    pub fn description(&self) -> String {
        let database = match self.gate.state.get() {
            Some(Ok(cache)) => cache.database().name().to_string(),
            _ => self
                .config
                .database_name()
                .unwrap_or_else(|| "<unset>".to_string()),
        };
        format!(
            "{} Storage {} using db {}",
            self.gate.driver.backend_name(),
            VERSION,
            database
        )
    }

    /// Check if the connection is established, without waiting.
    pub fn is_ready(&self) -> bool {
        matches!(self.gate.state.get(), Some(Ok(_)))
    }

    /// Wait until the connection is established.
    ///
    /// Starts connecting if nothing has yet. Safe to call repeatedly and
    /// concurrently; the connection is attempted once.
    pub async fn when_ready(&self) -> Result<()> {
        self.gate.collections().await.map(|_| ())
    }

    /// Show where a key is stored without touching the database.
    pub fn route<'a>(&'a self, key: &'a str) -> Result<Route<'a>> {
        self.router.route(key)
    }

    /// Write a value, replacing whatever the key held.
    ///
    /// Objects and arrays are accepted; `version` must not be negative.
    #[instrument(level = "debug", skip(self, value))]
    pub async fn set(&self, key: &str, version: i64, value: &Value) -> Result<()> {
        let route = self.router.route(key)?;
        let document = encode_document(value, route.document_id, version)?;
        let collection = self.collection(route.collection).await?;

        collection
            .replace_one(&KeyFilter::routing(route.document_id), document, true)
            .await
            .map_err(|e| report("set", key, e))
    }

    /// Read a value and its version.
    ///
    /// A missing key is not an error: it yields [`Versioned::not_found`].
    #[instrument(level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Result<Versioned> {
        let route = self.router.route(key)?;
        let collection = self.collection(route.collection).await?;

        let found = collection
            .find_one(&KeyFilter::routing(route.document_id))
            .await
            .map_err(|e| report("get", key, e))?;

        let versioned = decode_document(found)?;
        debug!(found = versioned.is_found(), version = versioned.version, "read");
        Ok(versioned)
    }

    /// Delete a key. Deleting a missing key is not an error.
    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let route = self.router.route(key)?;
        self.delete_routed(key, route).await
    }

    /// Delete several keys concurrently.
    ///
    /// All keys are routed first: one invalid key fails the call before any
    /// document is touched. Every delete runs to completion even when a
    /// sibling fails; the first backend failure is reported.
    #[instrument(level = "debug", skip(self, keys), fields(count = keys.len()))]
    pub async fn delete_bulk<S: AsRef<str>>(&self, keys: &[S]) -> Result<()> {
        let routes = keys
            .iter()
            .map(|key| {
                let key = key.as_ref();
                self.router.route(key).map(|route| (key, route))
            })
            .collect::<Result<Vec<_>>>()?;

        join_all(
            routes
                .into_iter()
                .map(|(key, route)| self.delete_routed(key, route)),
        )
        .await
        .into_iter()
        .collect()
    }

    async fn delete_routed(&self, key: &str, route: Route<'_>) -> Result<()> {
        let collection = self.collection(route.collection).await?;
        let removed = collection
            .delete_one(&KeyFilter::routing(route.document_id))
            .await
            .map_err(|e| report("delete", key, e))?;
        debug!(key, removed, "deleted");
        Ok(())
    }

    /// Wait for readiness, then get a collection handle.
    async fn collection(&self, name: &str) -> Result<Arc<dyn Collection>> {
        Ok(self.gate.collections().await?.get(name))
    }
}

/// Log a backend failure and hand it back unchanged.
fn report(op: &'static str, key: &str, e: Error) -> Error {
    warn!(op, key, error = %e, "storage operation failed");
    e
}

/// Builder for connector configuration.
///
/// # Example
///
/// ```ignore
/// let connector = Connector::builder()
///     .connection_string("mongodb://127.0.0.1")
///     .database("deepstream")
///     .split_char('/')
///     .driver(MemoryDriver::new())
///     .open()
///     .await?;
/// ```
pub struct ConnectorBuilder {
    config: ConnectorConfig,
    driver: Option<Arc<dyn Driver>>,
}

impl ConnectorBuilder {
    /// Create a builder with default options and no connection string.
    pub fn new() -> Self {
        Self {
            config: ConnectorConfig::default(),
            driver: None,
        }
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: ConnectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the backing-store connection URL.
    pub fn connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.config.connection_string = Some(connection_string.into());
        self
    }

    /// Select the database to use after connecting.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.config = self.config.database(database);
        self
    }

    /// Set the collection for keys without a separator.
    pub fn default_collection(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.default_collection(name);
        self
    }

    /// Route keys into collections on `separator`.
    pub fn split_char(mut self, separator: char) -> Self {
        self.config = self.config.split_char(separator);
        self
    }

    /// Use the given driver.
    pub fn driver(mut self, driver: impl Driver + 'static) -> Self {
        self.driver = Some(Arc::new(driver));
        self
    }

    /// Validate and create the connector.
    ///
    /// Without an explicit driver, the MongoDB driver is used when the
    /// `mongodb` feature is enabled.
    pub fn build(self) -> Result<Connector> {
        let driver = match self.driver {
            Some(driver) => driver,
            None => default_driver()?,
        };
        Connector::with_driver(self.config, driver)
    }

    /// Create the connector and wait until it is ready.
    pub async fn open(self) -> Result<Connector> {
        let connector = self.build()?;
        connector.when_ready().await?;
        Ok(connector)
    }
}

impl Default for ConnectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "mongodb")]
fn default_driver() -> Result<Arc<dyn Driver>> {
    Ok(Arc::new(dsm_storage::MongoDriver::new()))
}

#[cfg(not(feature = "mongodb"))]
fn default_driver() -> Result<Arc<dyn Driver>> {
    Err(Error::Configuration(
        "no driver given and the `mongodb` feature is disabled".to_string(),
    ))
}
