pub mod redis;
pub mod sqlite;
pub mod store;

pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use sqlite::create_pool;
pub use store::Store;
