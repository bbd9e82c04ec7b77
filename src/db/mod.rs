pub mod kv;
pub mod postgres;
pub mod redis;

pub use kv::{KeyValueStore, MemoryKeyValueStore, RedisKeyValueStore};
pub use postgres::create_pool;
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use redis::CacheWriterHandle;
