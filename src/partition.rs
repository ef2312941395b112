//! Key partitioning for sharded deployments
//!
//! Maps a key to one of N logical nodes using the djb2 rolling hash. The
//! mapping must be identical in every process for a given N. Nothing here
//! routes requests.

use anyhow::bail;

/// Node count used when none is configured
pub const DEFAULT_NODE_COUNT: usize = 3;

/// Initial accumulator of the djb2 hash
const DJB2_SEED: u64 = 5381;

/// djb2 hash of a byte string
///
/// `hash = hash * 33 + byte` for each byte, wrapping on overflow.
pub fn djb2(key: &[u8]) -> u64 {
    key.iter().fold(DJB2_SEED, |hash, &b| {
        (hash << 5).wrapping_add(hash).wrapping_add(u64::from(b))
    })
}

/// Assigns keys to one of a fixed number of logical nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partitioner {
    node_count: usize,
}

impl Partitioner {
    /// Create a partitioner over `node_count` nodes
    pub fn new(node_count: usize) -> anyhow::Result<Self> {
        if node_count == 0 {
            bail!("node count must be > 0");
        }
        Ok(Partitioner { node_count })
    }

    /// Index in `[0, node_count)` of the node owning `key`
    pub fn partition(&self, key: &[u8]) -> usize {
        (djb2(key) % self.node_count as u64) as usize
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.node_count
    }
}

impl Default for Partitioner {
    fn default() -> Self {
        Partitioner {
            node_count: DEFAULT_NODE_COUNT,
        }
    }
}
