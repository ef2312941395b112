//! In-memory storage implementation

use super::entry::Entry;
use super::{check_key, check_value, CacheStore, StoreError, StoreStats, DEFAULT_CAPACITY};
use bytes::Bytes;
use parking_lot::RwLock;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;
use tracing::debug;

/// Type alias for our hash map with SipHasher
pub(super) type StoreMap = HashMap<Bytes, Entry, BuildHasherDefault<SipHasher13>>;

pub(super) fn new_map(capacity: usize) -> StoreMap {
    HashMap::with_capacity_and_hasher(capacity, BuildHasherDefault::<SipHasher13>::default())
}

/// Bounded in-memory key-value store behind one lock
///
/// Writers take the lock exclusively for the whole operation; readers share
/// it, so a `get` observes either the value before or after a concurrent
/// `set`, never a mix of both.
pub struct MemoryStore {
    /// The main storage map
    store: RwLock<StoreMap>,

    /// Maximum number of entries
    capacity: usize,
}

impl MemoryStore {
    /// Create a new memory store with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new memory store holding at most `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        MemoryStore {
            store: RwLock::new(new_map(capacity)),
            capacity,
        }
    }

    /// Get a copy of the entry for a key (including version metadata)
    pub fn get_entry(&self, key: &[u8]) -> Option<Entry> {
        self.store.read().get(key).cloned()
    }

    /// Get all keys (for debugging/admin)
    pub fn keys(&self) -> Vec<Bytes> {
        self.store.read().keys().cloned().collect()
    }

    /// Remove all keys
    pub fn clear(&self) {
        self.store.write().clear();
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &[u8]) -> Result<Bytes, StoreError> {
        check_key(key)?;

        self.store
            .read()
            .get(key)
            .map(|entry| entry.value.clone())
            .ok_or(StoreError::NotFound)
    }

    fn set(&self, key: Bytes, value: Bytes) -> Result<bool, StoreError> {
        check_key(&key)?;
        check_value(&value)?;

        let mut store = self.store.write();

        if let Some(entry) = store.get_mut(&key) {
            entry.replace(value);
            debug!("Overwrote key ({} bytes), version {}", key.len(), entry.version);
            return Ok(false);
        }

        if store.len() >= self.capacity {
            return Err(StoreError::CapacityExceeded(self.capacity));
        }

        store.insert(key.clone(), Entry::new(key, value));
        Ok(true)
    }

    fn delete(&self, key: &[u8]) -> Result<bool, StoreError> {
        check_key(key)?;
        Ok(self.store.write().remove(key).is_some())
    }

    fn len(&self) -> usize {
        self.store.read().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> StoreStats {
        let store = self.store.read();
        StoreStats {
            keys: store.len(),
            capacity: self.capacity,
            used_memory_bytes: store.values().map(Entry::memory_usage).sum(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
