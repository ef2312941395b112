//! Store error types

use std::fmt;

/// Errors returned by cache store operations
///
/// None of these are fatal: the caller reports them and carries on serving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The key is not present
    NotFound,

    /// The key is empty
    EmptyKey,

    /// The key is longer than `MAX_KEY_LEN` (actual length attached)
    KeyTooLong(usize),

    /// The value is longer than `MAX_VALUE_LEN` (actual length attached)
    ValueTooLong(usize),

    /// A new key was refused because the store holds its capacity of entries
    CapacityExceeded(usize),
}

impl StoreError {
    /// True for errors caused by a malformed key or value
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            StoreError::EmptyKey | StoreError::KeyTooLong(_) | StoreError::ValueTooLong(_)
        )
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "Key not found"),
            StoreError::EmptyKey => write!(f, "Invalid argument: empty key"),
            StoreError::KeyTooLong(len) => write!(
                f,
                "Invalid argument: key is {} bytes, max is {}",
                len,
                super::MAX_KEY_LEN
            ),
            StoreError::ValueTooLong(len) => write!(
                f,
                "Invalid argument: value is {} bytes, max is {}",
                len,
                super::MAX_VALUE_LEN
            ),
            StoreError::CapacityExceeded(cap) => {
                write!(f, "Capacity exceeded: store is full ({} entries)", cap)
            }
        }
    }
}

impl std::error::Error for StoreError {}
