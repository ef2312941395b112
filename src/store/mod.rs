//! In-memory storage module
//!
//! Provides the cache core: a bounded key-value map that is safe to share
//! between request-handling threads. This module knows nothing about HTTP or
//! partitioning (loose coupling).

mod entry;
mod error;
mod memory;
mod sharded;

pub use entry::Entry;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use sharded::ShardedStore;

use bytes::Bytes;
use std::sync::Arc;

/// Longest accepted key, in bytes
pub const MAX_KEY_LEN: usize = 127;

/// Longest accepted value, in bytes
pub const MAX_VALUE_LEN: usize = 1023;

/// Number of entries a store holds unless configured otherwise
pub const DEFAULT_CAPACITY: usize = 100;

/// Common interface of every cache store implementation
///
/// All methods take `&self`: implementations synchronise internally, so one
/// instance can be shared behind an `Arc` by any number of threads.
pub trait CacheStore: Send + Sync {
    /// Look up a key
    ///
    /// Returns `StoreError::NotFound` if the key is absent.
    fn get(&self, key: &[u8]) -> Result<Bytes, StoreError>;

    /// Insert or overwrite a key
    ///
    /// Returns `true` if the key was newly inserted, `false` if an existing
    /// value was replaced.
    fn set(&self, key: Bytes, value: Bytes) -> Result<bool, StoreError>;

    /// Remove a key, returns `true` if it existed
    fn delete(&self, key: &[u8]) -> Result<bool, StoreError>;

    /// Number of entries currently held
    fn len(&self) -> usize;

    /// Maximum number of entries
    fn capacity(&self) -> usize;

    /// Snapshot of store statistics
    fn stats(&self) -> StoreStats;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Statistics about a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub keys: usize,
    pub capacity: usize,
    pub used_memory_bytes: usize,
}

/// Which store implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum StoreKind {
    /// One lock over the whole map
    #[default]
    Locked,
    /// Lock-striped map
    Sharded,
}

/// Build a shared store of the requested kind
pub fn build(kind: StoreKind, capacity: usize, stripes: usize) -> Arc<dyn CacheStore> {
    match kind {
        StoreKind::Locked => Arc::new(MemoryStore::with_capacity(capacity)),
        StoreKind::Sharded => Arc::new(ShardedStore::new(capacity, stripes)),
    }
}

/// Validate a key against the length bounds
pub(crate) fn check_key(key: &[u8]) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::EmptyKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StoreError::KeyTooLong(key.len()));
    }
    Ok(())
}

/// Validate a value against the length bound
pub(crate) fn check_value(value: &[u8]) -> Result<(), StoreError> {
    if value.len() > MAX_VALUE_LEN {
        return Err(StoreError::ValueTooLong(value.len()));
    }
    Ok(())
}
