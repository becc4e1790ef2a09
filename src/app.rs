//! Startup wiring: everything request handlers need, built once and owned explicitly.

use crate::cache::{CacheConfig, CacheSettings, MultiTierCache};
use crate::config::{AppConfig, EnvReader};
use crate::dialog::SettingsDialog;
use crate::settings::UserSettingsManager;
use crate::Result;
use std::sync::Arc;

/// Application state shared (by reference or clone) with every handler.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub cache_config: CacheConfig,
    pub cache: Arc<MultiTierCache>,
    pub settings: UserSettingsManager,
    pub dialog: SettingsDialog,
}

impl AppContext {
    pub fn from_env() -> Result<Self> {
        Self::from_reader(&EnvReader::from_process())
    }

    /// Persistent user settings switch the remote tier on; everything else
    /// about the cache comes from its own environment keys.
    pub fn from_reader(env: &EnvReader) -> Result<Self> {
        let config = AppConfig::from_env(env)?;
        let overrides = CacheSettings::new().with_remote_enabled(config.persistent_user_settings_enabled);
        let cache_config = CacheConfig::from_env(env, Some(overrides))?;
        let cache = Arc::new(MultiTierCache::from_config(&cache_config)?);
        Ok(Self::assemble(config, cache_config, cache))
    }

    /// Build around an existing cache (custom remote tiers, tests).
    pub fn with_cache(config: AppConfig, cache_config: CacheConfig, cache: Arc<MultiTierCache>) -> Self {
        Self::assemble(config, cache_config, cache)
    }

    fn assemble(config: AppConfig, cache_config: CacheConfig, cache: Arc<MultiTierCache>) -> Self {
        let settings = UserSettingsManager::new(Arc::clone(&cache), config.app_name.clone());
        let dialog = SettingsDialog::new(settings.clone());
        tracing::info!(
            app = %config.app_name,
            environment = config.environment.as_str(),
            remote_cache = cache.remote_name(),
            "application context ready"
        );
        Self {
            config,
            cache_config,
            cache,
            settings,
            dialog,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_only_by_default() {
        let ctx = AppContext::from_reader(&EnvReader::from_pairs([("APP_NAME", "bot")])).unwrap();
        assert!(!ctx.cache.remote_enabled());
        assert_eq!(ctx.settings.settings_key("u"), "bot.u.settings");
        assert_eq!(ctx.cache_config.lru_size.get(), 100);
    }

    #[test]
    fn test_persistent_settings_enable_remote() {
        let env = EnvReader::from_pairs([
            ("APP_PERSISTENT_USER_SETTINGS_ENABLED", "true"),
            ("KV_REST_API_URL", "https://kv.example.com"),
            ("KV_REST_API_TOKEN", "token"),
        ]);
        let ctx = AppContext::from_reader(&env).unwrap();
        assert!(ctx.cache.remote_enabled());
        assert_eq!(ctx.cache.remote_name(), "rest");
    }

    #[test]
    fn test_persistent_settings_without_endpoint_fail_fast() {
        let env = EnvReader::from_pairs([("APP_PERSISTENT_USER_SETTINGS_ENABLED", "yes")]);
        assert!(AppContext::from_reader(&env).is_err());
    }
}
