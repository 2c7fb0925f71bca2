//! Cache Module
//!
//! Provides a bounded, thread-safe LRU cache with size accounting.

mod builder;
mod hooks;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use builder::CacheBuilder;
pub(crate) use lru::RecencyMap;
pub use hooks::{
    Creator, FnCreator, FnListener, FnSizer, NoCreate, NoopListener, RemovalListener, Sizer,
    UnitSizer,
};
pub use stats::CacheStats;
pub use store::LruCache;
