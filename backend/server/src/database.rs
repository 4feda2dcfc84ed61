//! # Redis
//!
//! Persistent backend for the [`Store`] trait.
//!
//! ## Layout
//!
//! - One hash per table: `erp:<table>`, field = id, value = JSON document
//! - One counter per table: `erp:<table>:seq`, advanced with `INCRBY`
//! - Batches go through a single pipeline
//!
//! Clearing a table drops the hash but keeps the counter, so ids are never
//! reused.
use std::time::Duration;

use async_trait::async_trait;
use redis::{
    AsyncCommands, Client,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::info;

use crate::store::{Store, StoreError, TableLocks};

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, StoreError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;
    info!("Connected to Redis at {redis_url}");

    Ok(connection_manager)
}

pub struct RedisStore {
    connection: ConnectionManager,
    locks: TableLocks,
}

impl RedisStore {
    pub fn new(connection: ConnectionManager) -> Self {
        Self {
            connection,
            locks: TableLocks::default(),
        }
    }

    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        Ok(Self::new(init_redis(redis_url).await?))
    }
}

fn hash_key(table: &str) -> String {
    format!("erp:{table}")
}

fn seq_key(table: &str) -> String {
    format!("erp:{table}:seq")
}

#[async_trait]
impl Store for RedisStore {
    async fn reserve_ids(&self, table: &str, count: u64) -> Result<i64, StoreError> {
        let mut connection = self.connection.clone();
        let last: i64 = connection.incr(seq_key(table), count).await?;

        Ok(last - count as i64 + 1)
    }

    async fn put(&self, table: &str, id: i64, document: String) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.hset(hash_key(table), id, document).await?;

        Ok(())
    }

    async fn put_many(&self, table: &str, documents: Vec<(i64, String)>) -> Result<(), StoreError> {
        if documents.is_empty() {
            return Ok(());
        }

        let key = hash_key(table);
        let mut pipe = redis::pipe();
        for (id, document) in documents {
            pipe.hset(&key, id, document).ignore();
        }

        let mut connection = self.connection.clone();
        let _: () = pipe.query_async(&mut connection).await?;

        Ok(())
    }

    async fn get(&self, table: &str, id: i64) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hget(hash_key(table), id).await?)
    }

    async fn all(&self, table: &str) -> Result<Vec<(i64, String)>, StoreError> {
        let mut connection = self.connection.clone();

        Ok(connection.hgetall(hash_key(table)).await?)
    }

    async fn remove(&self, table: &str, id: i64) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();
        let removed: i64 = connection.hdel(hash_key(table), id).await?;

        Ok(removed > 0)
    }

    async fn clear(&self, table: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.del(hash_key(table)).await?;

        Ok(())
    }

    fn locks(&self) -> &TableLocks {
        &self.locks
    }
}
