//! In-process LRU tier.

use lru::LruCache;
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

/// Bounded in-memory cache with least-recently-used eviction.
///
/// One mutex guards the map; every operation holds it only for the map
/// mutation itself. Reads take the lock too, since a hit bumps recency.
pub struct LocalCache {
    entries: Mutex<LruCache<String, Value>>,
}

impl LocalCache {
    pub fn new(max_entries: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(max_entries)),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    /// Insert or overwrite; evicts the least recently used entry when full.
    pub fn set(&self, key: &str, value: Value) {
        if let Some((evicted, _)) = self.lock().push(key.to_string(), value) {
            if evicted != key {
                tracing::debug!(key = %evicted, "local cache evicted entry");
            }
        }
    }

    pub fn delete(&self, key: &str) {
        self.lock().pop(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock cannot leave the LRU map half-updated in a
    // way that matters to callers, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, LruCache<String, Value>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for LocalCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
