pub mod history;
pub mod postgres;
pub mod redis;

pub use history::{MemoryWatchHistory, PgWatchHistory, WatchHistory};
pub use postgres::create_pool;
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
