//! Application-level settings.

use super::EnvReader;
use crate::{Error, ErrorContext, Result};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_APP_NAME: &str = "gpt-ai-translator";

/// Deployment target; decides debug mode and where temporary audio files go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
    Vercel,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "DEVELOPMENT",
            Self::Production => "PRODUCTION",
            Self::Vercel => "VERCEL",
        }
    }

    pub fn debug(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Serverless deployments only get a writable `/tmp`.
    pub fn audio_temp_path(&self) -> PathBuf {
        match self {
            Self::Development | Self::Production => PathBuf::from("data").join("audio"),
            Self::Vercel => PathBuf::from("/tmp"),
        }
    }
}

impl FromStr for AppEnvironment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "DEVELOPMENT" => Ok(Self::Development),
            "PRODUCTION" => Ok(Self::Production),
            "VERCEL" => Ok(Self::Vercel),
            other => Err(Error::configuration_with_context(
                "unknown application environment",
                ErrorContext::new()
                    .with_field_path("APP_ENVIRONMENT")
                    .with_details(format!(
                        "got {:?}, expected DEVELOPMENT, PRODUCTION or VERCEL",
                        other
                    )),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub app_name: String,
    pub environment: AppEnvironment,
    /// Backs user settings with the remote cache tier.
    pub persistent_user_settings_enabled: bool,
    pub push_translated_text_audio_enabled: bool,
}

impl AppConfig {
    pub fn from_env(env: &EnvReader) -> Result<Self> {
        let environment = match env.get_str("APP_ENVIRONMENT") {
            Some(raw) => raw.parse()?,
            None => AppEnvironment::Vercel,
        };
        Ok(Self {
            app_name: env.get_str_or("APP_NAME", DEFAULT_APP_NAME),
            environment,
            persistent_user_settings_enabled: env
                .get_bool("APP_PERSISTENT_USER_SETTINGS_ENABLED", Some(false))?,
            push_translated_text_audio_enabled: env
                .get_bool("APP_PUSH_TRANSLATED_TEXT_AUDIO_ENABLED", Some(false))?,
        })
    }

    pub fn audio_temp_path(&self) -> PathBuf {
        self.environment.audio_temp_path()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            environment: AppEnvironment::Vercel,
            persistent_user_settings_enabled: false,
            push_translated_text_audio_enabled: false,
        }
    }
}
