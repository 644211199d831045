//! In-memory document backend for testing and development
//!
//! Behaves like a document database for the operations the connector
//! uses: full-document upserts, single-field equality lookups, deletes and
//! index bookkeeping. Lookups scan the collection; indexes are recorded
//! but not used, the same result a database returns without one.
//!
//! Failures can be injected to exercise error paths:
//! - [`MemoryDriver::set_offline`]: connects and operations fail
//! - [`MemoryDriver::set_fail_indexes`]: index builds fail
//! - [`MemoryDriver::gated`]: connects wait for [`MemoryDriver::open_gate`]

use crate::{Collection, Database, Driver, KeyFilter};
use async_trait::async_trait;
use dashmap::DashMap;
use dsm_core::config::database_from_url;
use dsm_core::{Error, Result};
use dsm_wire::{StoredDocument, ID_FIELD};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Database name used when neither the caller nor the URL names one
const DEFAULT_DATABASE: &str = "test";

/// Permits released by one `open_gate` call
const GATE_PERMITS: usize = 1 << 20;

#[derive(Debug, Default)]
struct Faults {
    offline: AtomicBool,
    fail_indexes: AtomicBool,
}

impl Faults {
    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::Acquire) {
            Err(Error::Backend("memory backend is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

/// Driver for the in-memory backend.
///
/// Clones share the same databases, so a test can keep one clone for
/// inspection while the connector owns another.
#[derive(Clone)]
pub struct MemoryDriver {
    databases: Arc<DashMap<String, Arc<MemoryDatabase>>>,
    faults: Arc<Faults>,
    gate: Option<Arc<Semaphore>>,
    connects: Arc<AtomicUsize>,
}

impl MemoryDriver {
    /// Create a driver whose connects succeed immediately.
    pub fn new() -> Self {
        Self {
            databases: Arc::new(DashMap::new()),
            faults: Arc::new(Faults::default()),
            gate: None,
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Create a driver whose connects wait until [`open_gate`](Self::open_gate).
    pub fn gated() -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new()
        }
    }

    /// Let waiting and future connects through.
    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(GATE_PERMITS);
        }
    }

    /// Make connects and all operations fail with a backend error.
    pub fn set_offline(&self, offline: bool) {
        self.faults.offline.store(offline, Ordering::Release);
    }

    /// Make index builds fail.
    pub fn set_fail_indexes(&self, fail: bool) {
        self.faults.fail_indexes.store(fail, Ordering::Release);
    }

    /// Number of connect attempts so far
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::Acquire)
    }

    /// Get a database by name, if a connect created it.
    pub fn database(&self, name: &str) -> Option<Arc<MemoryDatabase>> {
        self.databases.get(name).map(|db| Arc::clone(db.value()))
    }
}

impl Default for MemoryDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    fn backend_name(&self) -> &'static str {
        "Memory"
    }

    async fn connect(
        &self,
        connection_string: &str,
        database: Option<&str>,
    ) -> Result<Arc<dyn Database>> {
        self.connects.fetch_add(1, Ordering::AcqRel);

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| Error::Backend(e.to_string()))?
                .forget();
        }

        self.faults.check_online()?;

        let name = database
            .map(str::to_string)
            .or_else(|| database_from_url(connection_string))
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let db = self
            .databases
            .entry(name.clone())
            .or_insert_with(|| Arc::new(MemoryDatabase::new(name, Arc::clone(&self.faults))))
            .clone();

        Ok(db as Arc<dyn Database>)
    }
}

/// In-memory database.
pub struct MemoryDatabase {
    name: String,
    collections: DashMap<String, Arc<MemoryCollection>>,
    faults: Arc<Faults>,
    opens: AtomicUsize,
}

impl MemoryDatabase {
    fn new(name: String, faults: Arc<Faults>) -> Self {
        Self {
            name,
            collections: DashMap::new(),
            faults,
            opens: AtomicUsize::new(0),
        }
    }

    /// Number of [`Database::collection`] calls so far
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::Acquire)
    }

    /// Names of all collections handed out, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Get a collection for inspection without counting it as an open.
    pub fn get_collection(&self, name: &str) -> Option<Arc<MemoryCollection>> {
        self.collections.get(name).map(|c| Arc::clone(c.value()))
    }
}

impl Database for MemoryDatabase {
    fn name(&self) -> &str {
        &self.name
    }

    fn collection(&self, name: &str) -> Arc<dyn Collection> {
        self.opens.fetch_add(1, Ordering::AcqRel);
        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| {
                Arc::new(MemoryCollection::new(name.to_string(), Arc::clone(&self.faults)))
            })
            .clone();
        collection as Arc<dyn Collection>
    }
}

/// In-memory collection.
pub struct MemoryCollection {
    name: String,
    /// Documents by internal id, in insertion order
    documents: RwLock<BTreeMap<u64, StoredDocument>>,
    indexes: RwLock<BTreeSet<String>>,
    index_requests: AtomicUsize,
    next_id: AtomicU64,
    faults: Arc<Faults>,
}

impl MemoryCollection {
    fn new(name: String, faults: Arc<Faults>) -> Self {
        Self {
            name,
            documents: RwLock::new(BTreeMap::new()),
            indexes: RwLock::new(BTreeSet::new()),
            index_requests: AtomicUsize::new(0),
            next_id: AtomicU64::new(1),
            faults,
        }
    }

    /// Snapshot of the stored documents, `_id` included
    pub fn documents(&self) -> Vec<StoredDocument> {
        self.documents.read().values().cloned().collect()
    }

    /// Number of stored documents
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Check if the collection holds no documents
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Fields with a successfully built index
    pub fn indexes(&self) -> Vec<String> {
        self.indexes.read().iter().cloned().collect()
    }

    /// Number of index builds requested, failed ones included
    pub fn index_request_count(&self) -> usize {
        self.index_requests.load(Ordering::Acquire)
    }

    fn find_id(&self, documents: &BTreeMap<u64, StoredDocument>, filter: &KeyFilter<'_>) -> Option<u64> {
        documents
            .iter()
            .find(|(_, doc)| filter.matches(doc))
            .map(|(id, _)| *id)
    }
}

#[async_trait]
impl Collection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find_one(&self, filter: &KeyFilter<'_>) -> Result<Option<StoredDocument>> {
        self.faults.check_online()?;
        let documents = self.documents.read();
        Ok(documents.values().find(|doc| filter.matches(doc)).cloned())
    }

    async fn replace_one(
        &self,
        filter: &KeyFilter<'_>,
        mut document: StoredDocument,
        upsert: bool,
    ) -> Result<()> {
        self.faults.check_online()?;
        let mut documents = self.documents.write();

        let id = match self.find_id(&documents, filter) {
            Some(id) => id,
            None if upsert => self.next_id.fetch_add(1, Ordering::AcqRel),
            None => return Ok(()),
        };

        document.insert(ID_FIELD.to_string(), Value::from(id));
        documents.insert(id, document);
        Ok(())
    }

    async fn delete_one(&self, filter: &KeyFilter<'_>) -> Result<bool> {
        self.faults.check_online()?;
        let mut documents = self.documents.write();
        match self.find_id(&documents, filter) {
            Some(id) => Ok(documents.remove(&id).is_some()),
            None => Ok(false),
        }
    }

    async fn create_index(&self, field: &str) -> Result<()> {
        self.index_requests.fetch_add(1, Ordering::AcqRel);
        self.faults.check_online()?;
        if self.faults.fail_indexes.load(Ordering::Acquire) {
            return Err(Error::Backend(format!(
                "index build on {}.{} failed",
                self.name, field
            )));
        }
        self.indexes.write().insert(field.to_string());
        Ok(())
    }
}
