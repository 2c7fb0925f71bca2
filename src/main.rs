//! Bounded LRU - demo driver
//!
//! Runs a skewed multi-threaded workload against one shared cache and
//! prints the resulting statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bounded_lru::{Config, LruCache};

/// Entry point for the demo workload.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build a cache whose misses synthesize values
/// 4. Hammer it from `workers` threads
/// 5. Print the summary line and JSON statistics
fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bounded_lru=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, workers={}, key_space={}, operations={}",
        config.capacity, config.workers, config.key_space, config.operations
    );

    let evicted = Arc::new(AtomicU64::new(0));
    let listener_evicted = evicted.clone();
    let cache = LruCache::<u64, String>::builder(config.capacity)
        .create(|key| Some(format!("value-{key}")))
        .on_removal(move |was_evicted, key, _old, _new| {
            if was_evicted {
                listener_evicted.fetch_add(1, Ordering::Relaxed);
                debug!(key, "entry evicted");
            }
        })
        .build()
        .context("failed to build cache")?;

    thread::scope(|scope| -> anyhow::Result<()> {
        let handles: Vec<_> = (0..config.workers)
            .map(|worker| {
                let cache = &cache;
                let config = &config;
                scope.spawn(move || run_worker(cache, config, worker as u64))
            })
            .collect();

        for handle in handles {
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
        }
        Ok(())
    })?;

    let stats = cache.stats();
    info!(
        evicted = evicted.load(Ordering::Relaxed),
        hit_rate = stats.hit_rate(),
        "Workload complete"
    );
    println!("{cache}");
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Mostly reads, skewed towards low keys, with occasional writes and removes.
fn run_worker(cache: &LruCache<u64, String>, config: &Config, worker: u64) -> anyhow::Result<()> {
    let key_space = config.key_space.max(1);
    // Seeded per worker so runs are reproducible.
    let mut rng = StdRng::seed_from_u64(worker + 1);

    for _ in 0..config.operations {
        let roll = rng.random_range(0..100u64);
        // Squaring a uniform draw biases it towards the low end.
        let uniform = rng.random_range(0..key_space);
        let key = (u128::from(uniform) * u128::from(uniform) / u128::from(key_space)) as u64;

        match roll {
            0..=89 => {
                cache.get(&key)?;
            }
            90..=97 => {
                cache.put(key, format!("worker-{worker}-{key}"))?;
            }
            _ => {
                cache.remove(&key)?;
            }
        }
    }
    debug!(worker, "worker finished");
    Ok(())
}
