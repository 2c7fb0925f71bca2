//! Cache Store Module
//!
//! Main cache engine combining the recency map with size accounting,
//! miss-time value creation and removal notification.

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;
use tracing::{debug, error, trace};

use crate::cache::{CacheBuilder, CacheStats, Creator, RecencyMap, RemovalListener, Sizer};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Trim target that evicts every entry, including zero-sized ones.
const EVICT_EVERYTHING: i64 = -1;

// == Cache State ==
/// Everything guarded by the cache lock. Never handed out by reference.
struct CacheState<K, V> {
    map: RecencyMap<K, V>,
    /// Sum of `size_of` over all entries in `map`
    size: i64,
    max_size: i64,
    stats: CacheStats,
}

// == LRU Cache ==
/// A bounded, thread-safe least-recently-used cache.
///
/// Holds at most `max_size` worth of entries, as measured by its [`Sizer`].
/// Every `get` or `put` moves the entry to the most recently used end; when
/// the total size goes over the bound, entries are evicted from the least
/// recently used end until it fits again.
///
/// All state sits behind one mutex. Hooks other than the sizer always run
/// with the lock released:
/// - the [`Creator`] runs on a miss and may take arbitrarily long,
/// - the [`RemovalListener`] runs after an entry has left the cache.
///
/// When a created value races with a `put` for the same key, the value that
/// reached the cache first wins and the created one is reported to the
/// listener as removed.
pub struct LruCache<K, V> {
    state: Mutex<CacheState<K, V>>,
    sizer: Box<dyn Sizer<K, V>>,
    creator: Box<dyn Creator<K, V>>,
    listener: Box<dyn RemovalListener<K, V>>,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates a cache that counts entries, creates nothing on a miss and
    /// ignores removals.
    ///
    /// # Errors
    /// `InvalidArgument` if `max_size` is not positive.
    pub fn new(max_size: i64) -> Result<Self> {
        CacheBuilder::new(max_size).build()
    }

    /// Starts building a cache with custom hooks.
    pub fn builder(max_size: i64) -> CacheBuilder<K, V> {
        CacheBuilder::new(max_size)
    }

    /// Creates a default cache sized from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.capacity)
    }

    pub(crate) fn from_parts(
        max_size: i64,
        sizer: Box<dyn Sizer<K, V>>,
        creator: Box<dyn Creator<K, V>>,
        listener: Box<dyn RemovalListener<K, V>>,
    ) -> Result<Self> {
        validate_max_size(max_size)?;
        Ok(Self {
            state: Mutex::new(CacheState {
                map: RecencyMap::new(),
                size: 0,
                max_size,
                stats: CacheStats::new(),
            }),
            sizer,
            creator,
            listener,
        })
    }

    // == Get ==
    /// Returns the value for `key`, creating it on a miss if the cache has a
    /// creator.
    ///
    /// A returned value becomes the most recently used entry. Returns
    /// `Ok(None)` when nothing is cached and nothing could be created.
    ///
    /// Unlike [`remove`](Self::remove), a miss needs an owned key: the
    /// creator is handed a `&K` and a created value is stored under it. The
    /// key is only converted with `to_owned` on that path, so borrowed forms
    /// such as `&str` for `String` keys still work:
    ///
    /// ```
    /// use bounded_lru::LruCache;
    ///
    /// let cache = LruCache::<String, usize>::builder(8)
    ///     .create(|key: &String| Some(key.len()))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(cache.get("four").unwrap(), Some(4));
    /// assert!(cache.contains_key("four"));
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ToOwned<Owned = K> + ?Sized,
    {
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if let Some(value) = state.map.get(key).cloned() {
                state.stats.record_hit();
                trace!("cache hit");
                return Ok(Some(value));
            }
            state.stats.record_miss();
            trace!("cache miss");
        }

        let key = key.to_owned();
        // The map may look different by the time create() returns.
        let Some(created) = self.creator.create(&key) else {
            return Ok(None);
        };

        let (conflict, max_size) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            state.stats.record_create();
            // A conflicting value stays and becomes most recently used.
            let conflict = state.map.get::<K>(&key).cloned();
            if conflict.is_none() {
                let added = self.safe_size_of(&key, &created)?;
                let size = account(state.size, 0, added)?;
                state.map.insert_or_replace(key.clone(), created.clone());
                state.size = size;
            }
            (conflict, state.max_size)
        };

        match conflict {
            Some(existing) => {
                debug!("created value lost a race, keeping the cached one");
                self.listener.on_removal(false, &key, &created, None);
                Ok(Some(existing))
            }
            None => {
                self.trim_to_size(max_size)?;
                Ok(Some(created))
            }
        }
    }

    // == Put ==
    /// Caches `value` for `key` as the most recently used entry.
    ///
    /// Returns the value previously cached for `key`, which is also reported
    /// to the removal listener.
    pub fn put(&self, key: K, value: V) -> Result<Option<V>> {
        let (replaced, max_size) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            let added = self.safe_size_of(&key, &value)?;
            let displaced = match state.map.peek(&key) {
                Some(old) => Some(self.safe_size_of(&key, old)?),
                None => None,
            };

            let size = account(state.size, displaced.unwrap_or(0), added)?;

            state.stats.record_put();
            state.size = size;
            let notify = displaced.map(|_| (key.clone(), value.clone()));
            let previous = state.map.insert_or_replace(key, value);
            (previous.zip(notify), state.max_size)
        };

        let previous = match replaced {
            Some((previous, (key, value))) => {
                self.listener.on_removal(false, &key, &previous, Some(&value));
                Some(previous)
            }
            None => None,
        };

        self.trim_to_size(max_size)?;
        Ok(previous)
    }

    // == Remove ==
    /// Removes the entry for `key` if present and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Result<Option<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let removed = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let size = match state.map.peek_entry(key) {
                Some((stored_key, value)) => self.safe_size_of(stored_key, value)?,
                None => return Ok(None),
            };
            let size = account(state.size, size, 0)?;
            let Some(entry) = state.map.remove_exact(key) else {
                return Ok(None);
            };
            state.size = size;
            entry
        };

        let (key, previous) = removed;
        self.listener.on_removal(false, &key, &previous, None);
        Ok(Some(previous))
    }

    // == Resize ==
    /// Changes the capacity bound, evicting entries if the cache no longer
    /// fits.
    ///
    /// # Errors
    /// `InvalidArgument` if `max_size` is not positive; the cache is left
    /// untouched.
    pub fn resize(&self, max_size: i64) -> Result<()> {
        validate_max_size(max_size)?;
        self.state.lock().max_size = max_size;
        debug!(max_size, "cache resized");
        self.trim_to_size(max_size)
    }

    // == Evict All ==
    /// Evicts every entry, reporting each one to the removal listener.
    pub fn evict_all(&self) -> Result<()> {
        self.trim_to_size(EVICT_EVERYTHING)
    }

    // == Trim ==
    /// Evicts least recently used entries until the total size is at most
    /// `max_size` or the cache is empty.
    ///
    /// Each pass removes exactly one entry or stops, so the loop runs at most
    /// once per entry.
    fn trim_to_size(&self, max_size: i64) -> Result<()> {
        loop {
            let (key, value) = {
                let mut guard = self.state.lock();
                let state = &mut *guard;

                if state.size < 0 || (state.map.is_empty() && state.size != 0) {
                    error!(
                        size = state.size,
                        entries = state.map.len(),
                        "size_of is reporting inconsistent results"
                    );
                    return Err(CacheError::InvariantViolation(format!(
                        "size_of is reporting inconsistent results: size={} with {} entries",
                        state.size,
                        state.map.len()
                    )));
                }

                if state.size <= max_size {
                    break;
                }

                let size = match state.map.peek_least_recently_used() {
                    Some((key, value)) => self.safe_size_of(key, value)?,
                    None => break,
                };
                let Some(entry) = state.map.remove_least_recently_used() else {
                    break;
                };
                state.size -= size;
                state.stats.record_eviction();
                entry
            };

            trace!("evicted least recently used entry");
            self.listener.on_removal(true, &key, &value, None);
        }
        Ok(())
    }

    fn safe_size_of(&self, key: &K, value: &V) -> Result<i64> {
        let size = self.sizer.size_of(key, value);
        if size < 0 {
            error!(size, "size_of returned a negative size");
            return Err(CacheError::InvariantViolation(format!(
                "negative size: {size}"
            )));
        }
        Ok(size)
    }

    // == Accessors ==
    /// Returns true if `key` is cached. Does not count as an access.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.state.lock().map.contains(key)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.state.lock().map.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.state.lock().map.is_empty()
    }

    /// Accounted size of all entries. With the default sizer this is the
    /// number of entries.
    pub fn size(&self) -> i64 {
        self.state.lock().size
    }

    /// Capacity bound. With the default sizer this is the maximum number of
    /// entries.
    pub fn max_size(&self) -> i64 {
        self.state.lock().max_size
    }

    /// Number of times `get` found a cached value.
    pub fn hit_count(&self) -> u64 {
        self.state.lock().stats.hits
    }

    /// Number of times `get` found nothing cached.
    pub fn miss_count(&self) -> u64 {
        self.state.lock().stats.misses
    }

    /// Number of times `put` stored a value.
    pub fn put_count(&self) -> u64 {
        self.state.lock().stats.puts
    }

    /// Number of times the creator returned a value.
    pub fn create_count(&self) -> u64 {
        self.state.lock().stats.creates
    }

    /// Number of entries dropped to satisfy the capacity bound.
    pub fn eviction_count(&self) -> u64 {
        self.state.lock().stats.evictions
    }

    // == Stats ==
    /// Returns every counter and the size accounting from one consistent
    /// point in time.
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        CacheStats {
            size: state.size,
            max_size: state.max_size,
            entries: state.map.len(),
            ..state.stats.clone()
        }
    }

    // == Snapshot ==
    /// Copies the current contents, least recently used first.
    pub fn snapshot(&self) -> Vec<(K, V)> {
        let state = self.state.lock();
        state
            .map
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }
}

/// Total size after swapping `removed` units for `added` ones.
fn account(total: i64, removed: i64, added: i64) -> Result<i64> {
    total
        .checked_sub(removed)
        .and_then(|total| total.checked_add(added))
        .ok_or_else(|| {
            error!(total, removed, added, "size accounting overflowed");
            CacheError::InvariantViolation(format!(
                "size accounting overflowed: {total} - {removed} + {added}"
            ))
        })
}

fn validate_max_size(max_size: i64) -> Result<()> {
    if max_size <= 0 {
        return Err(CacheError::InvalidArgument(format!(
            "max_size must be positive, got {max_size}"
        )));
    }
    Ok(())
}

impl<K, V> fmt::Display for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        write!(
            f,
            "LruCache[maxSize={},hits={},misses={},hitRate={}%]",
            state.max_size,
            state.stats.hits,
            state.stats.misses,
            state.stats.hit_percent()
        )
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("LruCache")
            .field("size", &state.size)
            .field("max_size", &state.max_size)
            .field("stats", &state.stats)
            .finish_non_exhaustive()
    }
}
