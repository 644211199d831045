//! MongoDB backend built on the official driver
//!
//! Documents cross the seam as JSON objects; they are converted to BSON with
//! `bson::to_document` on the way in and back through relaxed extended JSON
//! on the way out, so `_id` arrives as `{"$oid": ...}` and is stripped by
//! the decoder like any other internal field.

use crate::{Collection, Database, Driver, KeyFilter};
use async_trait::async_trait;
use dsm_core::{Error, Result};
use dsm_wire::StoredDocument;
use mongodb::bson::{self, doc, Bson, Document};
use mongodb::options::ReplaceOptions;
use mongodb::{Client, IndexModel};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Driver for MongoDB connection strings (`mongodb://` and `mongodb+srv://`).
#[derive(Debug, Clone, Copy, Default)]
pub struct MongoDriver;

impl MongoDriver {
    /// Create the driver.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Driver for MongoDriver {
    fn backend_name(&self) -> &'static str {
        "MongoDB"
    }

    async fn connect(
        &self,
        connection_string: &str,
        database: Option<&str>,
    ) -> Result<Arc<dyn Database>> {
        let client = Client::with_uri_str(connection_string)
            .await
            .map_err(Error::backend)?;

        let db = match database {
            Some(name) => client.database(name),
            None => client.default_database().ok_or_else(|| {
                Error::Configuration(
                    "no database in 'connectionString' and no 'db' setting".to_string(),
                )
            })?,
        };

        // The driver connects lazily; ping so readiness means reachable.
        db.run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(Error::backend)?;

        info!(database = db.name(), "connected to MongoDB");
        Ok(Arc::new(MongoDatabase { db }))
    }
}

struct MongoDatabase {
    db: mongodb::Database,
}

impl Database for MongoDatabase {
    fn name(&self) -> &str {
        self.db.name()
    }

    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        Arc::new(MongoCollection {
            inner: self.db.collection::<Document>(name),
        })
    }
}

struct MongoCollection {
    inner: mongodb::Collection<Document>,
}

fn to_query(filter: &KeyFilter<'_>) -> Document {
    let mut query = Document::new();
    query.insert(filter.field, filter.value);
    query
}

fn to_stored(document: Document) -> Result<StoredDocument> {
    match Bson::Document(document).into_relaxed_extjson() {
        Value::Object(map) => Ok(map),
        other => Err(Error::Serialization(format!(
            "expected a document, got {}",
            other
        ))),
    }
}

#[async_trait]
impl Collection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find_one(&self, filter: &KeyFilter<'_>) -> Result<Option<StoredDocument>> {
        let found = self
            .inner
            .find_one(to_query(filter), None)
            .await
            .map_err(Error::backend)?;
        found.map(to_stored).transpose()
    }

    async fn replace_one(
        &self,
        filter: &KeyFilter<'_>,
        document: StoredDocument,
        upsert: bool,
    ) -> Result<()> {
        let replacement =
            bson::to_document(&document).map_err(|e| Error::Serialization(e.to_string()))?;
        let options = ReplaceOptions::builder().upsert(upsert).build();
        self.inner
            .replace_one(to_query(filter), replacement, options)
            .await
            .map_err(Error::backend)?;
        Ok(())
    }

    async fn delete_one(&self, filter: &KeyFilter<'_>) -> Result<bool> {
        let result = self
            .inner
            .delete_one(to_query(filter), None)
            .await
            .map_err(Error::backend)?;
        Ok(result.deleted_count > 0)
    }

    async fn create_index(&self, field: &str) -> Result<()> {
        let mut keys = Document::new();
        keys.insert(field, 1);
        let model = IndexModel::builder().keys(keys).build();
        self.inner
            .create_index(model, None)
            .await
            .map_err(Error::backend)?;
        Ok(())
    }
}
