//! 用户设置：以 `{app}.{user}.settings` 为键存放在多层缓存中的语言偏好。

use crate::cache::MultiTierCache;
use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const TRANSLATE_LANGUAGE_KEY: &str = "translate_language";
pub const AUDIO_LANGUAGE_KEY: &str = "audio_language";
pub const DEFAULT_TRANSLATE_LANGUAGE: &str = "English";
pub const DEFAULT_AUDIO_LANGUAGE: &str = "Traditional Chinese";

/// Typed view over a user's settings map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePreferences {
    /// Target for typed text (the other party's language).
    pub translate_language: String,
    /// Target for transcribed voice messages (the user's own language).
    pub audio_language: String,
}

impl Default for LanguagePreferences {
    fn default() -> Self {
        Self {
            translate_language: DEFAULT_TRANSLATE_LANGUAGE.to_string(),
            audio_language: DEFAULT_AUDIO_LANGUAGE.to_string(),
        }
    }
}

impl LanguagePreferences {
    /// Missing or non-string entries fall back to the defaults.
    pub fn from_settings(settings: &Map<String, Value>) -> Self {
        let pick = |key: &str, default: &str| {
            settings
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        Self {
            translate_language: pick(TRANSLATE_LANGUAGE_KEY, DEFAULT_TRANSLATE_LANGUAGE),
            audio_language: pick(AUDIO_LANGUAGE_KEY, DEFAULT_AUDIO_LANGUAGE),
        }
    }

    pub fn to_settings(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(
            TRANSLATE_LANGUAGE_KEY.to_string(),
            Value::from(self.translate_language.clone()),
        );
        map.insert(
            AUDIO_LANGUAGE_KEY.to_string(),
            Value::from(self.audio_language.clone()),
        );
        map
    }
}

/// Per-user settings stored through the shared [`MultiTierCache`].
///
/// Updates are read-merge-write and not atomic: two concurrent updates for
/// the same user can race, last write wins.
#[derive(Debug, Clone)]
pub struct UserSettingsManager {
    cache: Arc<MultiTierCache>,
    app_name: String,
}

impl UserSettingsManager {
    pub fn new(cache: Arc<MultiTierCache>, app_name: impl Into<String>) -> Self {
        Self {
            cache,
            app_name: app_name.into(),
        }
    }

    pub fn settings_key(&self, user_id: &str) -> String {
        format!("{}.{}.settings", self.app_name, user_id)
    }

    /// Empty map when nothing is stored (or the stored value is not an object).
    pub async fn get_settings(&self, user_id: &str) -> Result<Map<String, Value>> {
        let key = self.settings_key(user_id);
        Ok(match self.cache.get(&key).await? {
            Some(Value::Object(map)) => map,
            Some(_) => {
                tracing::warn!(key = %key, "stored settings are not an object, ignoring");
                Map::new()
            }
            None => Map::new(),
        })
    }

    /// Shallow-merge `partial` over the stored settings and write the result back.
    ///
    /// If the stored settings cannot be read because the remote tier is down,
    /// `partial` is merged over an empty map and still written (so it lands in
    /// the local tier), then the read error is returned.
    pub async fn set_settings(&self, user_id: &str, partial: Map<String, Value>) -> Result<()> {
        let (mut settings, read_error) = match self.get_settings(user_id).await {
            Ok(settings) => (settings, None),
            Err(e) if e.is_remote_unavailable() => {
                tracing::warn!(user_id, error = %e, "settings read failed, writing partial update");
                (Map::new(), Some(e))
            }
            Err(e) => return Err(e),
        };
        settings.extend(partial);
        let written = self
            .cache
            .set(&self.settings_key(user_id), Value::Object(settings))
            .await;
        match read_error {
            Some(e) => Err(e),
            None => written,
        }
    }

    pub async fn user_exists(&self, user_id: &str) -> Result<bool> {
        Ok(!self.get_settings(user_id).await?.is_empty())
    }

    /// Store default preferences for a first-time user. Returns `true` if it did.
    pub async fn ensure_initialized(&self, user_id: &str) -> Result<bool> {
        if self.user_exists(user_id).await? {
            return Ok(false);
        }
        tracing::info!(user_id, "initializing default language settings");
        self.set_settings(user_id, LanguagePreferences::default().to_settings())
            .await?;
        Ok(true)
    }

    pub async fn preferences(&self, user_id: &str) -> Result<LanguagePreferences> {
        Ok(LanguagePreferences::from_settings(
            &self.get_settings(user_id).await?,
        ))
    }

    pub async fn set_translate_language(&self, user_id: &str, language: &str) -> Result<()> {
        self.set_single(user_id, TRANSLATE_LANGUAGE_KEY, language).await
    }

    pub async fn set_audio_language(&self, user_id: &str, language: &str) -> Result<()> {
        self.set_single(user_id, AUDIO_LANGUAGE_KEY, language).await
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    async fn set_single(&self, user_id: &str, key: &str, value: &str) -> Result<()> {
        let mut partial = Map::new();
        partial.insert(key.to_string(), Value::from(value));
        self.set_settings(user_id, partial).await
    }
}
