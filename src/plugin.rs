//! Host-facing storage plugin contract.
//!
//! Hosts that manage several storage backends hold them as
//! `Arc<dyn StoragePlugin>`. [`Connector`] implements the trait by
//! delegating to its inherent methods.

use crate::connector::Connector;
use async_trait::async_trait;
use dsm_core::Result;
use dsm_wire::Versioned;
use serde_json::Value;

/// A versioned key-value storage backend.
#[async_trait]
pub trait StoragePlugin: Send + Sync {
    /// Plugin name
    fn name(&self) -> &'static str;

    /// Plugin version
    fn version(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> String;

    /// Check readiness without waiting
    fn is_ready(&self) -> bool;

    /// Wait until the backend can serve operations
    async fn when_ready(&self) -> Result<()>;

    /// Write `value` at `version`, replacing the previous value
    async fn set(&self, key: &str, version: i64, value: &Value) -> Result<()>;

    /// Read a value; missing keys yield the not-found sentinel
    async fn get(&self, key: &str) -> Result<Versioned>;

    /// Delete a key; missing keys are not an error
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete several keys
    async fn delete_bulk(&self, keys: &[String]) -> Result<()>;
}

#[async_trait]
impl StoragePlugin for Connector {
    fn name(&self) -> &'static str {
        Connector::name(self)
    }

    fn version(&self) -> &'static str {
        Connector::version(self)
    }

    fn description(&self) -> String {
        Connector::description(self)
    }

    fn is_ready(&self) -> bool {
        Connector::is_ready(self)
    }

    async fn when_ready(&self) -> Result<()> {
        Connector::when_ready(self).await
    }

    async fn set(&self, key: &str, version: i64, value: &Value) -> Result<()> {
        Connector::set(self, key, version, value).await
    }

    async fn get(&self, key: &str) -> Result<Versioned> {
        Connector::get(self, key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        Connector::delete(self, key).await
    }

    async fn delete_bulk(&self, keys: &[String]) -> Result<()> {
        Connector::delete_bulk(self, keys).await
    }
}
