//! Cache Hooks Module
//!
//! Embedder-supplied strategies: how big an entry is, how to produce a value
//! on a miss, and what to do when an entry leaves the cache.

// == Sizer ==
/// Computes the accounted size of an entry.
///
/// The result must be non-negative and must not change while the entry is
/// cached. Violations surface as [`CacheError::InvariantViolation`].
///
/// [`CacheError::InvariantViolation`]: crate::error::CacheError::InvariantViolation
pub trait Sizer<K, V>: Send + Sync {
    fn size_of(&self, key: &K, value: &V) -> i64;
}

/// Every entry costs one unit, so capacity is an entry count.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitSizer;

impl<K, V> Sizer<K, V> for UnitSizer {
    #[inline]
    fn size_of(&self, _key: &K, _value: &V) -> i64 {
        1
    }
}

/// A sizer backed by a closure.
pub struct FnSizer<F>(pub F);

impl<K, V, F> Sizer<K, V> for FnSizer<F>
where
    F: Fn(&K, &V) -> i64 + Send + Sync,
{
    #[inline]
    fn size_of(&self, key: &K, value: &V) -> i64 {
        (self.0)(key, value)
    }
}

// == Creator ==
/// Produces a value for a key that missed the cache.
///
/// Runs without the cache lock held, so it may be slow. If another value for
/// the same key lands in the cache first, the created value is discarded.
pub trait Creator<K, V>: Send + Sync {
    fn create(&self, key: &K) -> Option<V>;
}

/// Never creates anything; a miss stays a miss.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCreate;

impl<K, V> Creator<K, V> for NoCreate {
    #[inline]
    fn create(&self, _key: &K) -> Option<V> {
        None
    }
}

/// A creator backed by a closure.
pub struct FnCreator<F>(pub F);

impl<K, V, F> Creator<K, V> for FnCreator<F>
where
    F: Fn(&K) -> Option<V> + Send + Sync,
{
    #[inline]
    fn create(&self, key: &K) -> Option<V> {
        (self.0)(key)
    }
}

// == Removal Listener ==
/// Notified once for every entry that leaves the cache.
///
/// `evicted` is true when the entry was dropped to satisfy the capacity
/// bound, false when it was removed, overwritten by `put` or lost a creation
/// race. `new_value` is set only for overwrites.
///
/// Called without the cache lock held; other threads may use the cache
/// concurrently, and the listener may call back into it.
pub trait RemovalListener<K, V>: Send + Sync {
    fn on_removal(&self, evicted: bool, key: &K, old_value: &V, new_value: Option<&V>);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl<K, V> RemovalListener<K, V> for NoopListener {
    #[inline]
    fn on_removal(&self, _evicted: bool, _key: &K, _old_value: &V, _new_value: Option<&V>) {}
}

/// A removal listener backed by a closure.
pub struct FnListener<F>(pub F);

impl<K, V, F> RemovalListener<K, V> for FnListener<F>
where
    F: Fn(bool, &K, &V, Option<&V>) + Send + Sync,
{
    #[inline]
    fn on_removal(&self, evicted: bool, key: &K, old_value: &V, new_value: Option<&V>) {
        (self.0)(evicted, key, old_value, new_value)
    }
}
