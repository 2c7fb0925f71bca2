//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a simple ordered-vector model.

use proptest::prelude::*;

use crate::cache::LruCache;

// == Test Configuration ==
const TEST_KEY_SPACE: u8 = 16;

/// Sizes range over 0..=3 so zero-sized entries are exercised too.
fn entry_size(_key: &u8, value: &u32) -> i64 {
    i64::from(value % 4)
}

// == Strategies ==
#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u8, value: u32 },
    Get { key: u8 },
    Remove { key: u8 },
    Resize { max_size: i64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (0..TEST_KEY_SPACE, any::<u32>()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        3 => (0..TEST_KEY_SPACE).prop_map(|key| CacheOp::Get { key }),
        2 => (0..TEST_KEY_SPACE).prop_map(|key| CacheOp::Remove { key }),
        1 => (1i64..24).prop_map(|max_size| CacheOp::Resize { max_size }),
    ]
}

// == Reference Model ==
/// Entries ordered least recently used first.
#[derive(Debug, Default)]
struct Model {
    entries: Vec<(u8, u32)>,
    max_size: i64,
    evictions: u64,
}

impl Model {
    fn size(&self) -> i64 {
        self.entries.iter().map(|(k, v)| entry_size(k, v)).sum()
    }

    fn position(&self, key: u8) -> Option<usize> {
        self.entries.iter().position(|(k, _)| *k == key)
    }

    fn trim(&mut self) {
        while self.size() > self.max_size && !self.entries.is_empty() {
            self.entries.remove(0);
            self.evictions += 1;
        }
    }

    fn put(&mut self, key: u8, value: u32) -> Option<u32> {
        let previous = self.position(key).map(|i| self.entries.remove(i).1);
        self.entries.push((key, value));
        self.trim();
        previous
    }

    fn get(&mut self, key: u8) -> Option<u32> {
        let i = self.position(key)?;
        let entry = self.entries.remove(i);
        self.entries.push(entry);
        Some(entry.1)
    }

    fn remove(&mut self, key: u8) -> Option<u32> {
        self.position(key).map(|i| self.entries.remove(i).1)
    }

    fn resize(&mut self, max_size: i64) {
        self.max_size = max_size;
        self.trim();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // Every operation agrees with the model on its return value, and the
    // contents, order and size accounting match after each step.
    #[test]
    fn prop_matches_reference_model(
        initial in 1i64..24,
        ops in prop::collection::vec(cache_op_strategy(), 1..80)
    ) {
        let cache = LruCache::<u8, u32>::builder(initial)
            .size_of(entry_size)
            .build()
            .unwrap();
        let mut model = Model { max_size: initial, ..Model::default() };

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    prop_assert_eq!(cache.put(key, value).unwrap(), model.put(key, value));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key).unwrap(), model.get(key));
                }
                CacheOp::Remove { key } => {
                    prop_assert_eq!(cache.remove(&key).unwrap(), model.remove(key));
                }
                CacheOp::Resize { max_size } => {
                    cache.resize(max_size).unwrap();
                    model.resize(max_size);
                }
            }

            prop_assert_eq!(cache.snapshot(), model.entries.clone());
            prop_assert_eq!(cache.size(), model.size());
            prop_assert!(cache.size() <= cache.max_size());
            prop_assert_eq!(cache.eviction_count(), model.evictions);
        }
    }

    // Hits and misses account for every get, and size always equals the
    // sum over the snapshot.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache = LruCache::<u8, u32>::builder(8)
            .size_of(entry_size)
            .build()
            .unwrap();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;
        let mut expected_puts: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    cache.put(key, value).unwrap();
                    expected_puts += 1;
                }
                CacheOp::Get { key } => match cache.get(&key).unwrap() {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Remove { key } => {
                    cache.remove(&key).unwrap();
                }
                CacheOp::Resize { max_size } => {
                    cache.resize(max_size).unwrap();
                }
            }

            let accounted: i64 = cache.snapshot().iter().map(|(k, v)| entry_size(k, v)).sum();
            prop_assert_eq!(cache.size(), accounted);
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.puts, expected_puts, "Puts mismatch");
        prop_assert_eq!(stats.creates, 0);
        prop_assert_eq!(stats.entries, cache.len());
    }

    // A hit never changes the size and never calls the creator.
    #[test]
    fn prop_get_hit_is_idempotent(
        keys in prop::collection::vec(0..TEST_KEY_SPACE, 1..20),
        probe in 0..TEST_KEY_SPACE
    ) {
        let cache = LruCache::<u8, u32>::builder(64)
            .create(|key| Some(u32::from(*key)))
            .build()
            .unwrap();
        for key in keys {
            cache.put(key, u32::from(key)).unwrap();
        }
        cache.get(&probe).unwrap();

        let size = cache.size();
        let creates = cache.create_count();
        let hits = cache.hit_count();

        prop_assert_eq!(cache.get(&probe).unwrap(), Some(u32::from(probe)));
        prop_assert_eq!(cache.size(), size);
        prop_assert_eq!(cache.create_count(), creates);
        prop_assert_eq!(cache.hit_count(), hits + 1);
    }

    // With unit sizes and capacity N, the first of N+1 untouched keys goes.
    #[test]
    fn prop_evicts_first_untouched_key(capacity in 1usize..12) {
        let cache: LruCache<usize, usize> = LruCache::new(capacity as i64).unwrap();
        for key in 0..=capacity {
            cache.put(key, key).unwrap();
        }

        prop_assert!(!cache.contains_key(&0));
        prop_assert_eq!(cache.len(), capacity);
        prop_assert_eq!(cache.eviction_count(), 1);
    }
}
