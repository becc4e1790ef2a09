//! Local + remote cache orchestration.

use super::config::CacheConfig;
use super::local::LocalCache;
use super::remote::{DisabledRemoteCache, RemoteCache, RestRemoteCache};
use crate::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub local_hits: u64,
    pub remote_hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub remote_errors: u64,
    pub decode_errors: u64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.local_hits + self.remote_hits
    }

    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits() + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits() as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct AtomicStats {
    local_hits: AtomicU64,
    remote_hits: AtomicU64,
    misses: AtomicU64,
    sets: AtomicU64,
    deletes: AtomicU64,
    remote_errors: AtomicU64,
    decode_errors: AtomicU64,
}

impl AtomicStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn to_stats(&self) -> CacheStats {
        CacheStats {
            local_hits: self.local_hits.load(Ordering::Relaxed),
            remote_hits: self.remote_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            remote_errors: self.remote_errors.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
        }
    }
}

/// Two-tier cache: an in-process LRU in front of an optional remote store.
///
/// - `get` reads local first, then remote, backfilling local on a remote hit.
/// - `set` writes local, then remote. Local visibility never waits on remote
///   success, and a remote failure is still reported.
/// - `delete` removes from local, then remote.
///
/// Remote errors surface as [`crate::Error::RemoteUnavailable`]; a missing key
/// is `Ok(None)`. The local lock is never held across a remote call.
pub struct MultiTierCache {
    local: LocalCache,
    remote: Box<dyn RemoteCache>,
    default_ttl: Option<Duration>,
    stats: AtomicStats,
}

impl MultiTierCache {
    pub fn new(local: LocalCache, remote: Box<dyn RemoteCache>) -> Self {
        Self {
            local,
            remote,
            default_ttl: None,
            stats: AtomicStats::default(),
        }
    }

    /// Cache with the remote tier disabled.
    pub fn local_only(max_entries: NonZeroUsize) -> Self {
        Self::new(LocalCache::new(max_entries), Box::new(DisabledRemoteCache))
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        let remote: Box<dyn RemoteCache> = match &config.remote {
            Some(endpoint) => Box::new(RestRemoteCache::new(endpoint)?),
            None => Box::new(DisabledRemoteCache),
        };
        let cache = Self::new(LocalCache::new(config.lru_size), remote)
            .with_default_ttl(config.default_ttl);
        info!(
            local_capacity = config.lru_size.get(),
            remote = cache.remote_name(),
            "multi-tier cache ready"
        );
        Ok(cache)
    }

    /// Expiry applied to remote writes made through [`set`](Self::set).
    pub fn with_default_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub async fn get(&self, key: &str) -> Result<Option<Value>> {
        if let Some(value) = self.local.get(key) {
            debug!(key, "local cache hit");
            AtomicStats::bump(&self.stats.local_hits);
            return Ok(Some(value));
        }
        if !self.remote.enabled() {
            AtomicStats::bump(&self.stats.misses);
            return Ok(None);
        }
        match self.remote.get(key).await {
            Ok(Some(value)) => {
                debug!(key, remote = self.remote.name(), "remote hit, backfilling local");
                AtomicStats::bump(&self.stats.remote_hits);
                self.local.set(key, value.clone());
                Ok(Some(value))
            }
            Ok(None) => {
                AtomicStats::bump(&self.stats.misses);
                Ok(None)
            }
            Err(e) => Err(self.remote_failed(key, "get", e)),
        }
    }

    pub async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    /// Like [`set`](Self::set) with an explicit remote expiry (`None` = never).
    pub async fn set_with_ttl(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        AtomicStats::bump(&self.stats.sets);
        self.local.set(key, value.clone());
        if !self.remote.enabled() {
            return Ok(());
        }
        self.remote
            .set(key, &value, ttl)
            .await
            .map_err(|e| self.remote_failed(key, "set", e))
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        AtomicStats::bump(&self.stats.deletes);
        self.local.delete(key);
        if !self.remote.enabled() {
            return Ok(());
        }
        self.remote
            .delete(key)
            .await
            .map_err(|e| self.remote_failed(key, "delete", e))
    }

    /// Typed read. A value that does not deserialize into `T` counts as a miss.
    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!(key, error = %e, "cached value has unexpected shape");
                AtomicStats::bump(&self.stats.decode_errors);
                Ok(None)
            }
        }
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.set(key, value).await
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.to_stats()
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.enabled()
    }

    pub fn remote_name(&self) -> &'static str {
        self.remote.name()
    }

    pub fn local(&self) -> &LocalCache {
        &self.local
    }

    fn remote_failed(&self, key: &str, op: &str, err: crate::Error) -> crate::Error {
        AtomicStats::bump(&self.stats.remote_errors);
        warn!(key, op, remote = self.remote.name(), error = %err, "remote cache operation failed");
        err
    }
}

impl std::fmt::Debug for MultiTierCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiTierCache")
            .field("local", &self.local)
            .field("remote", &self.remote.name())
            .field("default_ttl", &self.default_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::super::remote::InMemoryRemoteCache;
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[tokio::test]
    async fn test_local_only_never_touches_remote() {
        let cache = MultiTierCache::local_only(size(8));
        assert!(!cache.remote_enabled());
        assert_eq!(cache.get("missing").await.unwrap(), None);
        cache.set("k", json!("v")).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some(json!("v")));
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);

        let stats = cache.stats();
        assert_eq!(stats.local_hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.remote_errors, 0);
    }

    #[tokio::test]
    async fn test_write_through_reaches_both_tiers() {
        let cache = MultiTierCache::new(LocalCache::new(size(8)), Box::new(InMemoryRemoteCache::new()));
        cache.set("k", json!({"a": 1})).await.unwrap();
        assert!(cache.local().contains("k"));

        // Drop the local copy; the remote copy must serve it back.
        cache.local().delete("k");
        assert_eq!(cache.get("k").await.unwrap(), Some(json!({"a": 1})));
        assert!(cache.local().contains("k"));
        assert_eq!(cache.stats().remote_hits, 1);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        language: String,
    }

    #[tokio::test]
    async fn test_typed_helpers() {
        let cache = MultiTierCache::local_only(size(4));
        let prefs = Prefs {
            language: "German".into(),
        };
        cache.set_as("p", &prefs).await.unwrap();
        assert_eq!(cache.get_as::<Prefs>("p").await.unwrap(), Some(prefs));

        cache.set("bad", json!([1, 2, 3])).await.unwrap();
        assert_eq!(cache.get_as::<Prefs>("bad").await.unwrap(), None);
        assert_eq!(cache.stats().decode_errors, 1);
    }

    #[test]
    fn test_hit_ratio() {
        let stats = CacheStats {
            local_hits: 2,
            remote_hits: 1,
            misses: 1,
            ..Default::default()
        };
        assert_eq!(stats.hits(), 3);
        assert!((stats.hit_ratio() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_ratio(), 0.0);
    }

    #[test]
    fn test_from_config_local_only() {
        let cache = MultiTierCache::from_config(&CacheConfig::local_only(size(3))).unwrap();
        assert_eq!(cache.remote_name(), "disabled");
        assert_eq!(cache.local().capacity(), 3);
    }
}
