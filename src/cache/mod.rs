//! 多层缓存模块：进程内 LRU 缓存 + 可选的远程键值存储。
//!
//! # Multi-Tier Cache
//!
//! A bounded in-process LRU tier in front of an optional networked key-value
//! tier, with read-through on `get` and write-through on `set`/`delete`.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`MultiTierCache`] | The only type callers use: `get` / `set` / `delete` |
//! | [`LocalCache`] | Mutex-guarded LRU map, never fails |
//! | [`RemoteCache`] | Trait for the remote tier |
//! | [`RestRemoteCache`] | Redis-over-REST client (Upstash / Vercel KV) |
//! | [`DisabledRemoteCache`] | No-op remote tier when none is configured |
//! | [`InMemoryRemoteCache`] | In-process remote tier for development and tests |
//! | [`CacheSettings`] / [`CacheConfig`] | Partial, mergeable settings and the resolved snapshot |
//!
//! ## Example
//!
//! ```rust
//! use gpt_ai_translator::cache::{CacheConfig, MultiTierCache};
//! use serde_json::json;
//! use std::num::NonZeroUsize;
//!
//! # tokio_test::block_on(async {
//! let config = CacheConfig::local_only(NonZeroUsize::new(100).unwrap());
//! let cache = MultiTierCache::from_config(&config)?;
//!
//! cache.set("bot.U123.settings", json!({"translate_language": "English"})).await?;
//! assert!(cache.get("bot.U123.settings").await?.is_some());
//! # Ok::<(), gpt_ai_translator::Error>(())
//! # }).unwrap();
//! ```
//!
//! ## Failure model
//!
//! The local tier cannot fail. Remote failures are returned as
//! [`Error::RemoteUnavailable`](crate::Error::RemoteUnavailable) and are
//! never folded into a miss; what to do about them is up to the caller.

mod config;
mod local;
mod remote;
mod tiered;

pub use config::{
    CacheConfig, CacheSettings, RemoteEndpoint, DEFAULT_LRU_SIZE, DEFAULT_REMOTE_TIMEOUT_SECS,
    MAX_LRU_SIZE,
};
pub use local::LocalCache;
pub use remote::{
    decode_payload, DisabledRemoteCache, InMemoryRemoteCache, RemoteCache, RestRemoteCache,
};
pub use tiered::{CacheStats, MultiTierCache};
