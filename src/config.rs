//! Configuration Module
//!
//! Handles loading cache and demo workload settings from environment
//! variables.

use std::env;
use std::str::FromStr;

/// Cache and workload configuration.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity bound of the cache
    pub capacity: i64,
    /// Number of threads the demo workload runs on
    pub workers: usize,
    /// Number of distinct keys the demo workload draws from
    pub key_space: u64,
    /// Operations each demo worker performs
    pub operations: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `LRU_CAPACITY` - Cache capacity (default: 1000)
    /// - `LRU_WORKERS` - Demo worker threads (default: 4)
    /// - `LRU_KEY_SPACE` - Distinct demo keys (default: 2000)
    /// - `LRU_OPERATIONS` - Operations per demo worker (default: 10000)
    ///
    /// Unset or unparsable variables fall back to their defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env_or("LRU_CAPACITY", defaults.capacity),
            workers: env_or("LRU_WORKERS", defaults.workers),
            key_space: env_or("LRU_KEY_SPACE", defaults.key_space),
            operations: env_or("LRU_OPERATIONS", defaults.operations),
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            workers: 4,
            key_space: 2000,
            operations: 10_000,
        }
    }
}
