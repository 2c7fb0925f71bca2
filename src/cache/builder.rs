//! Cache Builder Module
//!
//! Assembles an [`LruCache`] from a capacity and optional hooks.

use std::fmt;
use std::hash::Hash;

use crate::cache::{
    Creator, FnCreator, FnListener, FnSizer, LruCache, NoCreate, NoopListener, RemovalListener,
    Sizer, UnitSizer,
};
use crate::error::Result;

// == Cache Builder ==
/// Builder for [`LruCache`].
///
/// ```
/// use bounded_lru::LruCache;
///
/// // Cap at 4 KiB of string data.
/// let cache = LruCache::<u64, String>::builder(4 * 1024)
///     .size_of(|_, value: &String| value.len() as i64)
///     .create(|key| Some(format!("value-{key}")))
///     .build()
///     .unwrap();
///
/// assert_eq!(cache.get(&7).unwrap(), Some("value-7".to_string()));
/// ```
pub struct CacheBuilder<K, V> {
    max_size: i64,
    sizer: Box<dyn Sizer<K, V>>,
    creator: Box<dyn Creator<K, V>>,
    listener: Box<dyn RemovalListener<K, V>>,
}

impl<K, V> CacheBuilder<K, V> {
    /// Starts a builder with unit sizes, no creator and no listener.
    pub fn new(max_size: i64) -> Self {
        Self {
            max_size,
            sizer: Box::new(UnitSizer),
            creator: Box::new(NoCreate),
            listener: Box::new(NoopListener),
        }
    }

    /// Measures entries with a closure instead of counting them.
    pub fn size_of<F>(self, size_of: F) -> Self
    where
        F: Fn(&K, &V) -> i64 + Send + Sync + 'static,
    {
        self.sizer(FnSizer(size_of))
    }

    pub fn sizer<S>(mut self, sizer: S) -> Self
    where
        S: Sizer<K, V> + 'static,
    {
        self.sizer = Box::new(sizer);
        self
    }

    /// Produces values for missing keys with a closure.
    pub fn create<F>(self, create: F) -> Self
    where
        F: Fn(&K) -> Option<V> + Send + Sync + 'static,
    {
        self.creator(FnCreator(create))
    }

    pub fn creator<C>(mut self, creator: C) -> Self
    where
        C: Creator<K, V> + 'static,
    {
        self.creator = Box::new(creator);
        self
    }

    /// Observes entries leaving the cache with a closure.
    pub fn on_removal<F>(self, on_removal: F) -> Self
    where
        F: Fn(bool, &K, &V, Option<&V>) + Send + Sync + 'static,
    {
        self.removal_listener(FnListener(on_removal))
    }

    pub fn removal_listener<L>(mut self, listener: L) -> Self
    where
        L: RemovalListener<K, V> + 'static,
    {
        self.listener = Box::new(listener);
        self
    }
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Builds the cache.
    ///
    /// # Errors
    /// `InvalidArgument` if the capacity is not positive.
    pub fn build(self) -> Result<LruCache<K, V>> {
        LruCache::from_parts(self.max_size, self.sizer, self.creator, self.listener)
    }
}

impl<K, V> fmt::Debug for CacheBuilder<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("max_size", &self.max_size)
            .finish_non_exhaustive()
    }
}
