//! Server configuration
//!
//! Parsed from the command line, with `FERRUMCACHE_*` environment variables
//! as fallback.

use crate::partition::DEFAULT_NODE_COUNT;
use crate::store::{StoreKind, DEFAULT_CAPACITY};
use anyhow::ensure;
use clap::Parser;
use std::net::SocketAddr;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 9527;

#[derive(Parser, Debug, Clone)]
#[command(name = "ferrumcache")]
#[command(about = "In-memory key/value cache served over HTTP")]
pub struct CacheConfig {
    /// Address to bind to
    #[arg(short, long, env = "FERRUMCACHE_BIND", default_value = "0.0.0.0:9527")]
    pub bind: SocketAddr,

    /// Number of logical nodes keys are partitioned over
    #[arg(short, long, env = "FERRUMCACHE_NODES", default_value_t = DEFAULT_NODE_COUNT)]
    pub nodes: usize,

    /// Maximum number of entries held
    #[arg(short, long, env = "FERRUMCACHE_CAPACITY", default_value_t = DEFAULT_CAPACITY)]
    pub capacity: usize,

    /// Store implementation
    #[arg(long, env = "FERRUMCACHE_STORE", value_enum, default_value_t = StoreKind::Locked)]
    pub store: StoreKind,

    /// Lock stripes for the sharded store
    #[arg(long, env = "FERRUMCACHE_STRIPES", default_value_t = 16)]
    pub stripes: usize,

    /// Log level (trace, debug, info, warn, error), RUST_LOG takes precedence
    #[arg(short, long, env = "FERRUMCACHE_LOG_LEVEL", default_value = "info")]
    pub log_level: tracing::Level,
}

impl CacheConfig {
    /// Reject settings the server cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.nodes > 0, "--nodes must be > 0");
        ensure!(self.capacity > 0, "--capacity must be > 0");
        ensure!(self.stripes > 0, "--stripes must be > 0");
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            bind: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            nodes: DEFAULT_NODE_COUNT,
            capacity: DEFAULT_CAPACITY,
            store: StoreKind::Locked,
            stripes: 16,
            log_level: tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::try_parse_from(["ferrumcache"]).unwrap();
        assert_eq!(config.bind.port(), DEFAULT_PORT);
        assert_eq!(config.nodes, 3);
        assert_eq!(config.capacity, 100);
        assert_eq!(config.store, StoreKind::Locked);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_flags() {
        let config = CacheConfig::try_parse_from([
            "ferrumcache",
            "--bind",
            "127.0.0.1:8080",
            "--nodes",
            "5",
            "--store",
            "sharded",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.nodes, 5);
        assert_eq!(config.store, StoreKind::Sharded);
        assert_eq!(config.log_level, tracing::Level::DEBUG);
    }

    #[test]
    fn test_validate_rejects_zero() {
        let config = CacheConfig {
            capacity: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());

        let config = CacheConfig {
            nodes: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
