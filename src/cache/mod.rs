//! Response caching and request de-duplication for upstream APIs
//!
//! A [`RequestCache`] combines a [`TwoTierCache`] (memory + optional on-disk
//! store) with an [`InFlight`] map: a lookup is answered from the cache when
//! possible, otherwise concurrent callers share a single upstream request
//! whose successful result is cached before the in-flight slot is released.

pub mod inflight;
pub mod stats;
pub mod store;
pub mod two_tier;

pub use inflight::InFlight;
pub use stats::{CacheCounters, CacheStats, CounterSnapshot};
pub use store::{CacheError, FileStore, MemoryStore, PersistentStore, StoredEntry};
pub use two_tier::TwoTierCache;

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

/// Two-tier cache with in-flight de-duplication, for one kind of request
pub struct RequestCache<V, E> {
    namespace: String,
    cache: Arc<TwoTierCache<V>>,
    in_flight: InFlight<V, E>,
}

impl<V, E> RequestCache<V, E>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub fn new(
        namespace: impl Into<String>,
        persistent: Option<Arc<dyn PersistentStore>>,
        ttl: Duration,
    ) -> Self {
        let counters = Arc::new(CacheCounters::default());
        Self {
            namespace: namespace.into(),
            cache: Arc::new(TwoTierCache::with_counters(persistent, ttl, counters)),
            in_flight: InFlight::new(),
        }
    }

    /// Memory-only request cache
    pub fn in_memory(namespace: impl Into<String>, ttl: Duration) -> Self {
        Self::new(namespace, None, ttl)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Return the cached value for `key`, or run `fetch` (at most once across
    /// concurrent callers) and cache its successful result
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        if let Some(value) = self.cache.get(key).await {
            return Ok(value);
        }

        let cache = Arc::clone(&self.cache);
        let owned_key = key.to_string();

        let (result, joined) = self
            .in_flight
            .run(key, move || {
                let request = fetch();
                async move {
                    let value = request.await?;
                    cache.put(&owned_key, value.clone()).await;
                    Ok(value)
                }
            })
            .await;

        if joined {
            self.cache
                .counters()
                .joined_in_flight
                .fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Joined in-flight {} request for {}", self.namespace, key);
        }

        result
    }

    /// Cached value without fetching
    pub async fn peek(&self, key: &str) -> Option<V> {
        self.cache.get(key).await
    }

    pub async fn invalidate(&self, key: &str) {
        self.cache.remove(key).await;
    }

    pub async fn clear(&self) {
        self.cache.clear().await;
    }

    pub async fn purge_expired(&self) -> usize {
        self.cache.purge_expired().await
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            namespace: self.namespace.clone(),
            entries: self.cache.len(),
            in_flight: self.in_flight.len(),
            counters: self.cache.counters().snapshot(),
        }
    }
}

/// Open the persistent tier for `namespace`, or `None` when no cache
/// directory is configured or the store cannot be opened
///
/// Entries older than `ttl` are dropped while opening.
pub async fn open_store(
    cache_dir: Option<&Path>,
    namespace: &str,
    ttl: Duration,
) -> Option<Arc<dyn PersistentStore>> {
    let dir = cache_dir?;
    match FileStore::open(dir, namespace).await {
        Ok(store) => {
            if let Some(cutoff) = store::expiry_cutoff(ttl) {
                match store.purge_older_than(cutoff).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("Dropped {} expired {} cache entries", n, namespace),
                    Err(e) => tracing::warn!("Could not purge {} cache: {}", namespace, e),
                }
            }
            Some(Arc::new(store))
        }
        Err(e) => {
            tracing::warn!(
                "Persistent cache {} unavailable in {} ({}), continuing in memory",
                namespace,
                dir.display(),
                e
            );
            None
        }
    }
}
