//! FerrumCache - a small in-memory key-value cache served over HTTP
//!
//! Modules are kept loosely coupled:
//! - `store` holds the data and knows nothing about HTTP
//! - `partition` maps keys to logical nodes and knows nothing about the store
//! - `web` wires both behind an axum router

pub mod config;
pub mod partition;
pub mod store;
pub mod web;

/// Re-export commonly used types
pub use config::CacheConfig;
pub use partition::{djb2, Partitioner};
pub use store::{CacheStore, MemoryStore, ShardedStore, StoreError};
