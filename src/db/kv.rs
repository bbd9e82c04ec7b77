use std::collections::HashMap;

use redis::{aio::ConnectionManager, AsyncCommands, Client};
use tokio::sync::RwLock;

use crate::error::AppResult;

/// String key-value storage, the shape of a browser's local storage
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> AppResult<()>;

    /// Stores `value` only if `key` is unset; `false` when it was already taken
    async fn set_if_absent(&self, key: &str, value: String) -> AppResult<bool>;

    async fn delete(&self, key: &str) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Process-local key-value storage
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> AppResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Redis-backed key-value storage shared across processes
#[derive(Clone)]
pub struct RedisKeyValueStore {
    conn: ConnectionManager,
}

impl RedisKeyValueStore {
    /// Connects to Redis; the manager reconnects on its own after failures
    pub async fn connect(client: Client) -> AppResult<Self> {
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: String) -> AppResult<bool> {
        let mut conn = self.conn.clone();
        let stored: bool = conn.set_nx(key, value).await?;
        Ok(stored)
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
