//! Redis Cache Implementations

mod progress_cache;

pub use progress_cache::RedisProgressCache;
