//! Entry structure for key-value pairs

use bytes::Bytes;

/// Represents a single entry in the store
#[derive(Debug, Clone)]
pub struct Entry {
    /// The key
    pub key: Bytes,

    /// The value
    pub value: Bytes,

    /// Number of times the value has been overwritten
    pub version: u64,
}

impl Entry {
    /// Create a new entry at version 0
    pub fn new(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Self {
        Entry {
            key: key.into(),
            value: value.into(),
            version: 0,
        }
    }

    /// Replace the value in place and bump the version
    pub fn replace(&mut self, value: Bytes) {
        self.value = value;
        self.version = self.version.wrapping_add(1);
    }

    /// Calculate approximate memory usage of this entry in bytes
    pub fn memory_usage(&self) -> usize {
        self.key.len() + self.value.len() + std::mem::size_of::<u64>()
    }
}
