//! Lock-striped storage implementation
//!
//! Keys are spread over several independently locked maps by SipHash, so
//! writers to different stripes do not contend. The capacity bound is global
//! across stripes.

use super::entry::Entry;
use super::memory::{new_map, StoreMap};
use super::{check_key, check_value, CacheStore, StoreError, StoreStats};
use bytes::Bytes;
use parking_lot::RwLock;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Bounded key-value store split over several locks
pub struct ShardedStore {
    stripes: Vec<RwLock<StoreMap>>,

    /// Slots reserved by inserted keys, never above `capacity`
    used: AtomicUsize,

    capacity: usize,
}

impl ShardedStore {
    /// Create a store holding at most `capacity` entries over `num_stripes` locks
    pub fn new(capacity: usize, num_stripes: usize) -> Self {
        let num_stripes = num_stripes.max(1);
        let per_stripe = capacity.div_ceil(num_stripes);

        ShardedStore {
            stripes: (0..num_stripes).map(|_| RwLock::new(new_map(per_stripe))).collect(),
            used: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Number of lock stripes
    pub fn num_stripes(&self) -> usize {
        self.stripes.len()
    }

    fn stripe_for(&self, key: &[u8]) -> &RwLock<StoreMap> {
        let mut hasher = SipHasher13::new();
        key.hash(&mut hasher);
        let index = (hasher.finish() as usize) % self.stripes.len();
        &self.stripes[index]
    }

    /// Claim one slot of the global capacity, fails if none are left
    fn reserve_slot(&self) -> bool {
        self.used
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |used| {
                (used < self.capacity).then_some(used + 1)
            })
            .is_ok()
    }
}

impl CacheStore for ShardedStore {
    fn get(&self, key: &[u8]) -> Result<Bytes, StoreError> {
        check_key(key)?;

        self.stripe_for(key)
            .read()
            .get(key)
            .map(|entry| entry.value.clone())
            .ok_or(StoreError::NotFound)
    }

    fn set(&self, key: Bytes, value: Bytes) -> Result<bool, StoreError> {
        check_key(&key)?;
        check_value(&value)?;

        let mut stripe = self.stripe_for(&key).write();

        if let Some(entry) = stripe.get_mut(&key) {
            entry.replace(value);
            return Ok(false);
        }

        if !self.reserve_slot() {
            return Err(StoreError::CapacityExceeded(self.capacity));
        }

        stripe.insert(key.clone(), Entry::new(key, value));
        Ok(true)
    }

    fn delete(&self, key: &[u8]) -> Result<bool, StoreError> {
        check_key(key)?;

        let removed = self.stripe_for(key).write().remove(key).is_some();
        if removed {
            self.used.fetch_sub(1, Ordering::AcqRel);
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.stripes.iter().map(|stripe| stripe.read().len()).sum()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> StoreStats {
        let mut keys = 0;
        let mut used_memory_bytes = 0;

        for stripe in &self.stripes {
            let stripe = stripe.read();
            keys += stripe.len();
            used_memory_bytes += stripe.values().map(Entry::memory_usage).sum::<usize>();
        }

        StoreStats {
            keys,
            capacity: self.capacity,
            used_memory_bytes,
        }
    }
}
