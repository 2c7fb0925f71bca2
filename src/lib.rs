//! Bounded LRU - A thread-safe least-recently-used cache
//!
//! Holds at most a configurable total size of entries, evicting the least
//! recently used entry when the bound is exceeded. Values missing from the
//! cache can be created on demand, and every entry that leaves the cache is
//! reported to an optional listener.

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheBuilder, CacheStats, LruCache};
pub use config::Config;
pub use error::CacheError;
