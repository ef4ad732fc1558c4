//! Infrastructure Adapters
//!
//! Implementations of domain ports for external systems.

pub mod postgres;
pub mod redis;

// Re-exports
pub use postgres::PgProgressStore;
pub use redis::RedisProgressCache;
