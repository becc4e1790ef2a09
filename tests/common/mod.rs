//! Shared test fixtures.

#![allow(dead_code)]

use async_trait::async_trait;
use gpt_ai_translator::cache::{InMemoryRemoteCache, LocalCache, MultiTierCache, RemoteCache};
use gpt_ai_translator::{Error, ErrorContext, Result};
use serde_json::Value;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Wraps an in-memory remote; while offline every call fails.
#[derive(Default)]
pub struct SwitchableRemote {
    pub inner: InMemoryRemoteCache,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl SwitchableRemote {
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::remote_unavailable(
                "backend offline",
                ErrorContext::new().with_source("test"),
            ));
        }
        Ok(())
    }
}

/// Handle given to the cache while the test keeps its own `Arc`.
pub struct RemoteHandle(pub Arc<SwitchableRemote>);

#[async_trait]
impl RemoteCache for RemoteHandle {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        self.0.check()?;
        self.0.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &Value, ttl: Option<Duration>) -> Result<()> {
        self.0.check()?;
        self.0.inner.set(key, value, ttl).await
    }
    async fn delete(&self, key: &str) -> Result<()> {
        self.0.check()?;
        self.0.inner.delete(key).await
    }
    fn name(&self) -> &'static str {
        "switchable"
    }
}

/// Multi-tier cache in front of `remote`.
pub fn tiered_with(capacity: usize, remote: &Arc<SwitchableRemote>) -> MultiTierCache {
    MultiTierCache::new(
        LocalCache::new(NonZeroUsize::new(capacity).unwrap()),
        Box::new(RemoteHandle(Arc::clone(remote))),
    )
}
