//! Cache configuration: a mergeable partial form and the resolved snapshot.

use crate::config::EnvReader;
use crate::{Error, ErrorContext, Result};
use std::num::NonZeroUsize;
use std::time::Duration;

pub const DEFAULT_LRU_SIZE: f64 = 100.0;
/// Largest accepted local capacity. `LruCache` preallocates its table.
pub const MAX_LRU_SIZE: usize = 10_000_000;
pub const DEFAULT_REMOTE_TIMEOUT_SECS: u64 = 5;

/// Partial cache settings. `None` (or a blank string) means "not set here",
/// which is what lets an override carry only the fields it cares about.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheSettings {
    pub lru_size: Option<f64>,
    pub remote_enabled: Option<bool>,
    pub remote_url: Option<String>,
    pub remote_token: Option<String>,
    pub remote_timeout_secs: Option<u64>,
    pub remote_ttl_secs: Option<u64>,
}

impl CacheSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lru_size(mut self, size: f64) -> Self {
        self.lru_size = Some(size);
        self
    }

    pub fn with_remote_enabled(mut self, enabled: bool) -> Self {
        self.remote_enabled = Some(enabled);
        self
    }

    pub fn with_remote(mut self, url: impl Into<String>, token: impl Into<String>) -> Self {
        self.remote_url = Some(url.into());
        self.remote_token = Some(token.into());
        self
    }

    pub fn with_remote_timeout_secs(mut self, secs: u64) -> Self {
        self.remote_timeout_secs = Some(secs);
        self
    }

    pub fn with_remote_ttl_secs(mut self, secs: u64) -> Self {
        self.remote_ttl_secs = Some(secs);
        self
    }

    /// Base settings from the environment, with defaults applied.
    pub fn from_env(env: &EnvReader) -> Result<Self> {
        Ok(Self {
            lru_size: Some(env.get_float("LRU_CACHE_SIZE", Some(DEFAULT_LRU_SIZE))?),
            remote_enabled: Some(env.get_bool("REMOTE_CACHE_ENABLED", Some(false))?),
            remote_url: env.get_str("KV_REST_API_URL"),
            remote_token: env.get_str("KV_REST_API_TOKEN"),
            remote_timeout_secs: Some(
                env.get_u64_opt("REMOTE_CACHE_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS),
            ),
            remote_ttl_secs: env.get_u64_opt("REMOTE_CACHE_TTL_SECS")?,
        })
    }

    /// Field-wise merge: a set override field wins, otherwise the base value stays.
    pub fn merge(base: CacheSettings, overrides: Option<CacheSettings>) -> CacheSettings {
        let Some(o) = overrides else {
            return base;
        };
        CacheSettings {
            lru_size: o.lru_size.or(base.lru_size),
            remote_enabled: o.remote_enabled.or(base.remote_enabled),
            remote_url: non_blank(o.remote_url).or(base.remote_url),
            remote_token: non_blank(o.remote_token).or(base.remote_token),
            remote_timeout_secs: o.remote_timeout_secs.or(base.remote_timeout_secs),
            remote_ttl_secs: o.remote_ttl_secs.or(base.remote_ttl_secs),
        }
    }

    /// Validate and freeze into a [`CacheConfig`].
    pub fn resolve(self) -> Result<CacheConfig> {
        let raw_size = self.lru_size.unwrap_or(DEFAULT_LRU_SIZE);
        if !raw_size.is_finite() || raw_size < 1.0 {
            return Err(Error::configuration_with_context(
                "local cache size must be a positive number",
                ErrorContext::new()
                    .with_field_path("LRU_CACHE_SIZE")
                    .with_details(format!("got {}", raw_size)),
            ));
        }
        if raw_size >= (MAX_LRU_SIZE + 1) as f64 {
            return Err(Error::configuration_with_context(
                "local cache size is too large",
                ErrorContext::new()
                    .with_field_path("LRU_CACHE_SIZE")
                    .with_details(format!("got {}, max {}", raw_size, MAX_LRU_SIZE)),
            ));
        }
        // Truncates fractional sizes (100.0 -> 100); [1, MAX_LRU_SIZE] was checked above.
        let lru_size = NonZeroUsize::new(raw_size as usize).unwrap_or(NonZeroUsize::MIN);

        let remote = if self.remote_enabled.unwrap_or(false) {
            let url = non_blank(self.remote_url).ok_or_else(|| missing_remote("KV_REST_API_URL"))?;
            let token =
                non_blank(self.remote_token).ok_or_else(|| missing_remote("KV_REST_API_TOKEN"))?;
            let timeout_secs = self.remote_timeout_secs.unwrap_or(DEFAULT_REMOTE_TIMEOUT_SECS);
            if timeout_secs == 0 {
                return Err(Error::configuration_with_context(
                    "remote cache timeout must be at least one second",
                    ErrorContext::new().with_field_path("REMOTE_CACHE_TIMEOUT_SECS"),
                ));
            }
            Some(RemoteEndpoint {
                url,
                token,
                timeout: Duration::from_secs(timeout_secs),
            })
        } else {
            None
        };

        let default_ttl = match self.remote_ttl_secs {
            Some(0) => {
                return Err(Error::configuration_with_context(
                    "remote cache ttl must be positive (omit it for no expiry)",
                    ErrorContext::new().with_field_path("REMOTE_CACHE_TTL_SECS"),
                ))
            }
            other => other.map(Duration::from_secs),
        };

        Ok(CacheConfig {
            lru_size,
            remote,
            default_ttl,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn missing_remote(key: &str) -> Error {
    Error::configuration_with_context(
        "remote cache is enabled but not configured",
        ErrorContext::new()
            .with_field_path(key)
            .with_source("cache_config"),
    )
}

/// Endpoint and credential for the remote tier.
#[derive(Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Resolved, immutable cache configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub lru_size: NonZeroUsize,
    /// `None` means the remote tier is disabled.
    pub remote: Option<RemoteEndpoint>,
    /// Expiry applied to remote writes made through `set`.
    pub default_ttl: Option<Duration>,
}

impl CacheConfig {
    /// Local-only configuration of the given capacity.
    pub fn local_only(lru_size: NonZeroUsize) -> Self {
        Self {
            lru_size,
            remote: None,
            default_ttl: None,
        }
    }

    /// Resolve from the environment plus an optional caller override.
    pub fn from_env(env: &EnvReader, overrides: Option<CacheSettings>) -> Result<Self> {
        CacheSettings::merge(CacheSettings::from_env(env)?, overrides).resolve()
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }
}
