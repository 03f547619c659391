//! Persistent tier of the response cache
//!
//! Entries are stored as raw JSON values with the time they were written, so
//! the store stays agnostic of the cached type and TTL checks happen in the
//! layer above.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a persistent store
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A cached value as written to the persistent tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub value: serde_json::Value,
    pub stored_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(value: serde_json::Value) -> Self {
        Self {
            value,
            stored_at: Utc::now(),
        }
    }
}

/// Oldest `stored_at` still fresh under `ttl`, or `None` when the TTL
/// reaches past the representable range
pub(crate) fn expiry_cutoff(ttl: Duration) -> Option<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl).ok()?;
    Utc::now().checked_sub_signed(ttl)
}

fn retain_fresh(entries: &mut HashMap<String, StoredEntry>, cutoff: DateTime<Utc>) -> usize {
    let before = entries.len();
    entries.retain(|_, entry| entry.stored_at >= cutoff);
    before - entries.len()
}

/// Storage that outlives the process
#[async_trait::async_trait]
pub trait PersistentStore: Send + Sync {
    /// Load an entry by key
    async fn load(&self, key: &str) -> Result<Option<StoredEntry>, CacheError>;

    /// Insert or replace an entry
    async fn store(&self, key: &str, entry: StoredEntry) -> Result<(), CacheError>;

    /// Remove an entry; missing keys are not an error
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// Drop every entry
    async fn clear(&self) -> Result<(), CacheError>;

    /// Drop entries stored before `cutoff`; returns how many were removed
    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CacheError>;

    /// Number of stored entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Map-backed store, for running without a cache directory and for tests
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl PersistentStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<StoredEntry>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn store(&self, key: &str, entry: StoredEntry) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_string(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().clear();
        Ok(())
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CacheError> {
        Ok(retain_fresh(&mut self.entries.write(), cutoff))
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

/// JSON-file store: one document per namespace under the cache directory
///
/// The whole map is held in memory and rewritten on every mutation via a
/// temp file + rename, so a crash never leaves a half-written document.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, StoredEntry>>,
    // Serializes flushes so the last snapshot written is the newest one
    flush_lock: tokio::sync::Mutex<()>,
}

impl FileStore {
    /// Open (or create) `<dir>/<namespace>.json`
    pub async fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, CacheError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{}.json", namespace));
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable cache file {}: {}", path.display(), e);
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Opened cache store {} with {} entries",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            flush_lock: tokio::sync::Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let _guard = self.flush_lock.lock().await;

        let bytes = {
            let entries = self.entries.read();
            serde_json::to_vec(&*entries)?
        };

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PersistentStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<StoredEntry>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn store(&self, key: &str, entry: StoredEntry) -> Result<(), CacheError> {
        self.entries.write().insert(key.to_string(), entry);
        self.flush().await
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            self.flush().await?;
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().clear();
        self.flush().await
    }

    async fn purge_older_than(&self, cutoff: DateTime<Utc>) -> Result<usize, CacheError> {
        let removed = retain_fresh(&mut self.entries.write(), cutoff);
        if removed > 0 {
            self.flush().await?;
        }
        Ok(removed)
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileStore::open(dir.path(), "search").await.unwrap();
        store
            .store("pasta", StoredEntry::new(json!({"id": 1})))
            .await
            .unwrap();
        assert_eq!(store.len(), 1);
        drop(store);

        let reopened = FileStore::open(dir.path(), "search").await.unwrap();
        let entry = reopened.load("pasta").await.unwrap().unwrap();
        assert_eq!(entry.value, json!({"id": 1}));
    }

    #[tokio::test]
    async fn test_file_store_namespaces_are_separate_files() {
        let dir = tempfile::tempdir().unwrap();

        let search = FileStore::open(dir.path(), "search").await.unwrap();
        let random = FileStore::open(dir.path(), "random").await.unwrap();
        search.store("k", StoredEntry::new(json!(1))).await.unwrap();

        assert!(random.load("k").await.unwrap().is_none());
        assert!(dir.path().join("search.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.json"), b"{not json").unwrap();

        let store = FileStore::open(dir.path(), "broken").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "ns").await.unwrap();
        store.store("a", StoredEntry::new(json!("a"))).await.unwrap();
        store.store("b", StoredEntry::new(json!("b"))).await.unwrap();

        store.remove("a").await.unwrap();
        store.remove("missing").await.unwrap();
        assert_eq!(store.len(), 1);

        store.clear().await.unwrap();
        let reopened = FileStore::open(dir.path(), "ns").await.unwrap();
        assert!(reopened.is_empty());
    }

    #[tokio::test]
    async fn test_purge_drops_stale_entries_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path(), "translation").await.unwrap();
        let stale = StoredEntry {
            value: json!("velho"),
            stored_at: Utc::now() - chrono::Duration::days(2),
        };
        store.store("old", stale).await.unwrap();
        store.store("new", StoredEntry::new(json!("novo"))).await.unwrap();

        let cutoff = expiry_cutoff(Duration::from_secs(86_400)).unwrap();
        assert_eq!(store.purge_older_than(cutoff).await.unwrap(), 1);
        assert_eq!(store.purge_older_than(cutoff).await.unwrap(), 0);

        let reopened = FileStore::open(dir.path(), "translation").await.unwrap();
        assert!(reopened.load("old").await.unwrap().is_none());
        assert!(reopened.load("new").await.unwrap().is_some());
    }

    #[test]
    fn test_expiry_cutoff_out_of_range() {
        assert!(expiry_cutoff(Duration::from_secs(u64::MAX)).is_none());
        assert!(expiry_cutoff(Duration::from_secs(60)).unwrap() < Utc::now());
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryStore::new();
        store.store("k", StoredEntry::new(json!(true))).await.unwrap();
        assert_eq!(store.load("k").await.unwrap().unwrap().value, json!(true));
        store.remove("k").await.unwrap();
        assert!(store.is_empty());
    }
}
