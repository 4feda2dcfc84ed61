//! # Store
//!
//! Tables of JSON documents keyed by `i64` id.
//!
//! The [`Store`] trait only moves opaque strings. [`Repository`] sits on top
//! and owns everything typed: (de)serialisation, id assignment, ordering and
//! the per-table uniqueness rules declared by [`Record::unique_keys`].
//!
//! Writes that check uniqueness hold the table's [`TableLocks`] entry from
//! the check until the document is stored, so two concurrent inserts can
//! not both claim the same key within one server process.
//!
//! Two backends exist:
//! - [`crate::database::RedisStore`] when `REDIS_URL` is configured
//! - [`MemoryStore`] otherwise, and in tests
use std::{
    collections::{BTreeMap, HashMap, HashSet},
    marker::PhantomData,
    sync::Arc,
};

use async_trait::async_trait;
use ledger::Record;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to encode {table} record: {source}")]
    Encode {
        table: &'static str,
        source: serde_json::Error,
    },

    #[error("Corrupt {table} record {id}: {source}")]
    Corrupt {
        table: &'static str,
        id: i64,
        source: serde_json::Error,
    },

    #[error("{field} '{value}' already exists")]
    Conflict { field: &'static str, value: String },
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Reserves `count` consecutive ids and returns the first.
    async fn reserve_ids(&self, table: &str, count: u64) -> Result<i64, StoreError>;

    async fn next_id(&self, table: &str) -> Result<i64, StoreError> {
        self.reserve_ids(table, 1).await
    }

    async fn put(&self, table: &str, id: i64, document: String) -> Result<(), StoreError>;

    async fn put_many(&self, table: &str, documents: Vec<(i64, String)>) -> Result<(), StoreError>;

    async fn get(&self, table: &str, id: i64) -> Result<Option<String>, StoreError>;

    async fn all(&self, table: &str) -> Result<Vec<(i64, String)>, StoreError>;

    /// Returns whether a document was removed.
    async fn remove(&self, table: &str, id: i64) -> Result<bool, StoreError>;

    async fn clear(&self, table: &str) -> Result<(), StoreError>;

    /// Write locks shared by every [`Repository`] over this store.
    fn locks(&self) -> &TableLocks;
}

/// One async mutex per table, created on first use.
#[derive(Default)]
pub struct TableLocks {
    tables: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl TableLocks {
    pub async fn lock(&self, table: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut tables = self.tables.lock().await;
            Arc::clone(tables.entry(table.to_string()).or_default())
        };

        lock.lock_owned().await
    }
}

#[derive(Default)]
struct Table {
    seq: i64,
    rows: BTreeMap<i64, String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
    locks: TableLocks,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn reserve_ids(&self, table: &str, count: u64) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let table = tables.entry(table.to_string()).or_default();

        let first = table.seq + 1;
        table.seq += count as i64;

        Ok(first)
    }

    async fn put(&self, table: &str, id: i64, document: String) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().rows.insert(id, document);

        Ok(())
    }

    async fn put_many(&self, table: &str, documents: Vec<(i64, String)>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.entry(table.to_string()).or_default().rows.extend(documents);

        Ok(())
    }

    async fn get(&self, table: &str, id: i64) -> Result<Option<String>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables.get(table).and_then(|t| t.rows.get(&id).cloned()))
    }

    async fn all(&self, table: &str) -> Result<Vec<(i64, String)>, StoreError> {
        let tables = self.tables.read().await;

        Ok(tables
            .get(table)
            .map(|t| t.rows.iter().map(|(id, doc)| (*id, doc.clone())).collect())
            .unwrap_or_default())
    }

    async fn remove(&self, table: &str, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        Ok(tables
            .get_mut(table)
            .is_some_and(|t| t.rows.remove(&id).is_some()))
    }

    async fn clear(&self, table: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if let Some(t) = tables.get_mut(table) {
            t.rows.clear();
        }

        Ok(())
    }

    fn locks(&self) -> &TableLocks {
        &self.locks
    }
}

/// Typed view over one table.
pub struct Repository<T> {
    store: Arc<dyn Store>,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _record: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// Every record, ordered by id.
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        let mut rows = self.store.all(T::TABLE).await?;
        rows.sort_by_key(|(id, _)| *id);

        rows.into_iter()
            .map(|(id, document)| decode(id, &document))
            .collect()
    }

    pub async fn filter<F>(&self, predicate: F) -> Result<Vec<T>, StoreError>
    where
        F: Fn(&T) -> bool,
    {
        let mut records = self.list().await?;
        records.retain(|record| predicate(record));

        Ok(records)
    }

    pub async fn find(&self, id: i64) -> Result<Option<T>, StoreError> {
        match self.store.get(T::TABLE, id).await? {
            Some(document) => decode(id, &document).map(Some),
            None => Ok(None),
        }
    }

    pub async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.store.all(T::TABLE).await?.len())
    }

    /// Assigns an id and stores the record.
    pub async fn insert(&self, mut record: T) -> Result<T, StoreError> {
        let _guard = self.store.locks().lock(T::TABLE).await;
        self.check_unique(&record, None).await?;

        record.set_id(self.store.next_id(T::TABLE).await?);
        self.store
            .put(T::TABLE, record.id(), encode(&record)?)
            .await?;

        Ok(record)
    }

    /// Stores a batch with consecutive ids in one write.
    pub async fn insert_many(&self, mut records: Vec<T>) -> Result<Vec<T>, StoreError> {
        if records.is_empty() {
            return Ok(records);
        }

        let _guard = self.store.locks().lock(T::TABLE).await;
        let mut taken = self.taken_keys(None).await?;
        for record in &records {
            for key in record.unique_keys() {
                if !taken.insert(key.clone()) {
                    return Err(conflict(key));
                }
            }
        }

        let first = self
            .store
            .reserve_ids(T::TABLE, records.len() as u64)
            .await?;
        let mut documents = Vec::with_capacity(records.len());
        for (offset, record) in records.iter_mut().enumerate() {
            record.set_id(first + offset as i64);
            documents.push((record.id(), encode(record)?));
        }
        self.store.put_many(T::TABLE, documents).await?;

        Ok(records)
    }

    /// Overwrites an existing record.
    pub async fn update(&self, record: &T) -> Result<(), StoreError> {
        let _guard = self.store.locks().lock(T::TABLE).await;
        self.check_unique(record, Some(record.id())).await?;

        self.store.put(T::TABLE, record.id(), encode(record)?).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.store.remove(T::TABLE, id).await
    }

    pub async fn clear(&self) -> Result<(), StoreError> {
        self.store.clear(T::TABLE).await
    }

    async fn check_unique(&self, record: &T, except: Option<i64>) -> Result<(), StoreError> {
        let keys = record.unique_keys();
        if keys.is_empty() {
            return Ok(());
        }

        let taken = self.taken_keys(except).await?;
        match keys.into_iter().find(|key| taken.contains(key)) {
            Some(key) => Err(conflict(key)),
            None => Ok(()),
        }
    }

    async fn taken_keys(
        &self,
        except: Option<i64>,
    ) -> Result<HashSet<(&'static str, String)>, StoreError> {
        Ok(self
            .list()
            .await?
            .iter()
            .filter(|existing| Some(existing.id()) != except)
            .flat_map(Record::unique_keys)
            .collect())
    }
}

fn conflict((field, value): (&'static str, String)) -> StoreError {
    StoreError::Conflict { field, value }
}

fn encode<T: Record>(record: &T) -> Result<String, StoreError> {
    serde_json::to_string(record).map_err(|source| StoreError::Encode {
        table: T::TABLE,
        source,
    })
}

fn decode<T: Record>(id: i64, document: &str) -> Result<T, StoreError> {
    serde_json::from_str(document).map_err(|source| StoreError::Corrupt {
        table: T::TABLE,
        id,
        source,
    })
}
