use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::stats::CacheCounters;
use super::store::{expiry_cutoff, PersistentStore, StoredEntry};

struct MemoryEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// In-memory map in front of an optional persistent store
///
/// Reads check memory first, then the persistent tier (promoting hits into
/// memory). Writes go to both. The TTL applies to both tiers; there is no
/// other eviction.
pub struct TwoTierCache<V> {
    memory: DashMap<String, MemoryEntry<V>>,
    persistent: Option<Arc<dyn PersistentStore>>,
    ttl: Duration,
    counters: Arc<CacheCounters>,
}

impl<V> TwoTierCache<V>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(persistent: Option<Arc<dyn PersistentStore>>, ttl: Duration) -> Self {
        Self::with_counters(persistent, ttl, Arc::new(CacheCounters::default()))
    }

    pub(crate) fn with_counters(
        persistent: Option<Arc<dyn PersistentStore>>,
        ttl: Duration,
        counters: Arc<CacheCounters>,
    ) -> Self {
        Self {
            memory: DashMap::new(),
            persistent,
            ttl,
            counters,
        }
    }

    /// Memory-only cache
    pub fn in_memory(ttl: Duration) -> Self {
        Self::new(None, ttl)
    }

    fn is_expired(&self, stored_at: DateTime<Utc>) -> bool {
        // Entries stamped in the future (clock skew) count as fresh
        match (Utc::now() - stored_at).to_std() {
            Ok(age) => age > self.ttl,
            Err(_) => false,
        }
    }

    /// Look up a value in memory, then in the persistent tier
    pub async fn get(&self, key: &str) -> Option<V> {
        let cached = self
            .memory
            .get(key)
            .map(|entry| (entry.value.clone(), entry.stored_at));

        match cached {
            Some((value, stored_at)) if !self.is_expired(stored_at) => {
                self.counters.memory_hits.fetch_add(1, Ordering::Relaxed);
                return Some(value);
            }
            Some(_) => {
                self.memory.remove(key);
            }
            None => {}
        }

        if let Some(value) = self.load_persistent(key).await {
            self.counters.persistent_hits.fetch_add(1, Ordering::Relaxed);
            return Some(value);
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    async fn load_persistent(&self, key: &str) -> Option<V> {
        let store = self.persistent.as_ref()?;

        let entry = match store.load(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Persistent cache read failed for {}: {}", key, e);
                return None;
            }
        };

        if self.is_expired(entry.stored_at) {
            self.remove_persistent(store.as_ref(), key).await;
            return None;
        }

        match serde_json::from_value::<V>(entry.value) {
            Ok(value) => {
                self.memory.insert(
                    key.to_string(),
                    MemoryEntry {
                        value: value.clone(),
                        stored_at: entry.stored_at,
                    },
                );
                Some(value)
            }
            Err(e) => {
                tracing::warn!("Dropping undecodable cache entry {}: {}", key, e);
                self.remove_persistent(store.as_ref(), key).await;
                None
            }
        }
    }

    async fn remove_persistent(&self, store: &dyn PersistentStore, key: &str) {
        if let Err(e) = store.remove(key).await {
            tracing::warn!("Persistent cache remove failed for {}: {}", key, e);
        }
    }

    /// Store a value in both tiers; persistent failures are only logged
    pub async fn put(&self, key: &str, value: V) {
        let entry = match &self.persistent {
            Some(_) => match serde_json::to_value(&value) {
                Ok(json) => Some(StoredEntry::new(json)),
                Err(e) => {
                    tracing::warn!("Cache value for {} is not serializable: {}", key, e);
                    None
                }
            },
            None => None,
        };

        let stored_at = entry
            .as_ref()
            .map(|e| e.stored_at)
            .unwrap_or_else(Utc::now);
        self.memory
            .insert(key.to_string(), MemoryEntry { value, stored_at });

        if let (Some(store), Some(entry)) = (&self.persistent, entry) {
            if let Err(e) = store.store(key, entry).await {
                tracing::warn!("Persistent cache write failed for {}: {}", key, e);
            }
        }
    }

    pub async fn remove(&self, key: &str) {
        self.memory.remove(key);
        if let Some(store) = &self.persistent {
            self.remove_persistent(store.as_ref(), key).await;
        }
    }

    pub async fn clear(&self) {
        self.memory.clear();
        if let Some(store) = &self.persistent {
            if let Err(e) = store.clear().await {
                tracing::warn!("Persistent cache clear failed: {}", e);
            }
        }
    }

    /// Drop expired entries from both tiers; returns how many memory entries
    /// were removed
    pub async fn purge_expired(&self) -> usize {
        let Some(cutoff) = expiry_cutoff(self.ttl) else {
            return 0;
        };

        let before = self.memory.len();
        self.memory.retain(|_, entry| entry.stored_at >= cutoff);
        let removed = before.saturating_sub(self.memory.len());

        if let Some(store) = &self.persistent {
            match store.purge_older_than(cutoff).await {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Purged {} expired persistent cache entries", n),
                Err(e) => tracing::warn!("Persistent cache purge failed: {}", e),
            }
        }
        removed
    }

    /// Number of entries held in memory
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    pub(crate) fn counters(&self) -> &Arc<CacheCounters> {
        &self.counters
    }
}
