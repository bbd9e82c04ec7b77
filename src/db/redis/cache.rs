use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

const SEARCH_TTL: u64 = 3600; // 1 hour
const DISCOVER_TTL: u64 = 600; // 10 minutes
const MOVIE_TTL: u64 = 86400; // 1 day

/// Keys for cached TMDB responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search(String),
    Discover,
    Detail(i64),
    Credits(i64),
    Videos(i64),
}

impl CacheKey {
    /// Seconds a cached response stays valid
    pub fn ttl(&self) -> u64 {
        match self {
            CacheKey::Search(_) => SEARCH_TTL,
            CacheKey::Discover => DISCOVER_TTL,
            CacheKey::Detail(_) | CacheKey::Credits(_) | CacheKey::Videos(_) => MOVIE_TTL,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search(query) => write!(f, "tmdb:search:{}", query.trim().to_lowercase()),
            CacheKey::Discover => write!(f, "tmdb:discover"),
            CacheKey::Detail(id) => write!(f, "tmdb:movie:{}", id),
            CacheKey::Credits(id) => write!(f, "tmdb:credits:{}", id),
            CacheKey::Videos(id) => write!(f, "tmdb:videos:{}", id),
        }
    }
}

/// Creates a Redis client
///
/// Connections are opened lazily per operation.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

#[derive(Clone)]
struct CacheBackend {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

/// Read-through response cache backed by Redis
///
/// A disabled cache misses on every read and drops every write, so callers
/// use the same code path whether or not Redis is configured.
#[derive(Clone)]
pub struct Cache {
    backend: Option<CacheBackend>,
}

/// Handle for gracefully shutting down the cache writer
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer task to flush pending writes and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Creates a cache that never stores anything
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Creates a Redis-backed cache and spawns its background writer
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::cache_writer_task(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            backend: Some(CacheBackend {
                redis_client,
                write_tx,
            }),
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Drains write messages into Redis until shutdown, then flushes what is left
    async fn cache_writer_task(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<CacheWriteMessage>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(msg) = write_rx.recv() => {
                    if let Err(e) = Self::write_to_redis(&client, msg).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(msg) = write_rx.recv().await {
                        match Self::write_to_redis(&client, msg).await {
                            Ok(()) => flushed += 1,
                            Err(e) => tracing::error!(error = %e, "Failed to flush cache write during shutdown"),
                        }
                    }

                    tracing::info!(flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Looks up a cached value; `None` on a miss or when the cache is disabled
    ///
    /// Redis failures and unreadable entries are logged and count as a miss,
    /// so an unavailable cache never fails the request behind it.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let backend = self.backend.as_ref()?;

        match Self::read_from_redis(&backend.redis_client, key).await {
            Ok(Some(data)) => {
                tracing::debug!(key = %key, "Cache hit");
                Some(data)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Cache read failed, treating as a miss");
                None
            }
        }
    }

    async fn read_from_redis<T: serde::de::DeserializeOwned>(
        client: &Client,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json)
                    .map_err(|e| AppError::Internal(format!("Cache deserialization error: {}", e)))
            })
            .transpose()
    }

    /// Queues a value for writing without waiting for Redis
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let Some(backend) = &self.backend else {
            return;
        };

        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: key.to_string(),
            value: json,
            ttl,
        };

        if let Err(e) = backend.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to send cache write message");
        }
    }
}
