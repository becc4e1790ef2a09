//! 设定对话：解析用户输入的文字指令，更新语言设定并产生回覆。
//!
//! The dialog is independent of any messaging platform. It turns one line of
//! user text into a [`Reply`]; the surrounding bot decides how to render
//! menus and whether to call the translator for [`Reply::Translate`].

use crate::language;
use crate::settings::{LanguagePreferences, UserSettingsManager};
use crate::{Error, ErrorContext, Result};
use tracing::warn;

pub const AUDIO_LANGUAGE_PREFIX: &str = "設定語音辨識後翻譯為";
pub const TRANSLATE_LANGUAGE_PREFIX: &str = "設定打字後翻譯為";
const AUDIO_MENU_PROMPT: &str = "請選擇我方使用語言";
const TRANSLATE_MENU_PROMPT: &str = "請選擇對方使用語言";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    OpenSettings,
    SetAudioLanguage(String),
    SetTranslateLanguage(String),
    ShowCurrentSettings,
    Translate(String),
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed == "/setting" || trimmed == "設定" {
            Command::OpenSettings
        } else if trimmed.contains(AUDIO_LANGUAGE_PREFIX) {
            Command::SetAudioLanguage(second_word(trimmed))
        } else if trimmed.contains(TRANSLATE_LANGUAGE_PREFIX) {
            Command::SetTranslateLanguage(second_word(trimmed))
        } else if trimmed == "/current-setting" || trimmed == "目前設定" {
            Command::ShowCurrentSettings
        } else {
            Command::Translate(text.to_string())
        }
    }
}

fn second_word(text: &str) -> String {
    text.split_whitespace().nth(1).unwrap_or_default().to_string()
}

/// One tappable option of a menu reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickReplyOption {
    pub label: String,
    /// Text sent back when the option is chosen.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Menu {
        prompt: String,
        options: Vec<QuickReplyOption>,
    },
    Text(String),
    Translate {
        text: String,
        target_language: String,
    },
}

fn language_menu(prompt: &str, prefix: &str) -> Reply {
    Reply::Menu {
        prompt: prompt.to_string(),
        options: language::labels()
            .map(|label| QuickReplyOption {
                label: label.to_string(),
                text: format!("{} {}", prefix, label),
            })
            .collect(),
    }
}

fn describe(prefs: &LanguagePreferences) -> String {
    let line = |english: &str| {
        format!(
            "{}（{}）",
            language::label_for(english).unwrap_or(english),
            english
        )
    };
    format!(
        "我方語言：{}\n對方語言：{}",
        line(&prefs.audio_language),
        line(&prefs.translate_language)
    )
}

/// Settings conversation over a [`UserSettingsManager`].
///
/// When the remote cache tier is down the dialog keeps going on the local
/// tier: reads fall back to default preferences and writes stay local.
#[derive(Debug, Clone)]
pub struct SettingsDialog {
    settings: UserSettingsManager,
}

impl SettingsDialog {
    pub fn new(settings: UserSettingsManager) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &UserSettingsManager {
        &self.settings
    }

    pub async fn handle_text(&self, user_id: &str, text: &str) -> Result<Reply> {
        tolerate_remote(self.settings.ensure_initialized(user_id).await.map(|_| ()), "init")?;

        match Command::parse(text) {
            Command::OpenSettings => Ok(language_menu(AUDIO_MENU_PROMPT, AUDIO_LANGUAGE_PREFIX)),
            Command::SetAudioLanguage(label) => {
                let language = resolve_label(&label)?;
                tolerate_remote(
                    self.settings.set_audio_language(user_id, language).await,
                    "set audio language",
                )?;
                Ok(language_menu(TRANSLATE_MENU_PROMPT, TRANSLATE_LANGUAGE_PREFIX))
            }
            Command::SetTranslateLanguage(label) => {
                let language = resolve_label(&label)?;
                tolerate_remote(
                    self.settings.set_translate_language(user_id, language).await,
                    "set translate language",
                )?;
                let prefs = self.preferences(user_id).await?;
                Ok(Reply::Text(format!("設定完畢！\n{}", describe(&prefs))))
            }
            Command::ShowCurrentSettings => {
                let prefs = self.preferences(user_id).await?;
                Ok(Reply::Text(describe(&prefs)))
            }
            Command::Translate(text) => {
                let prefs = self.preferences(user_id).await?;
                Ok(Reply::Translate {
                    text,
                    target_language: prefs.translate_language,
                })
            }
        }
    }

    /// Target language for a transcribed voice message.
    pub async fn audio_target(&self, user_id: &str) -> Result<String> {
        tolerate_remote(self.settings.ensure_initialized(user_id).await.map(|_| ()), "init")?;
        Ok(self.preferences(user_id).await?.audio_language)
    }

    async fn preferences(&self, user_id: &str) -> Result<LanguagePreferences> {
        match self.settings.preferences(user_id).await {
            Err(e) if e.is_remote_unavailable() => {
                warn!(user_id, error = %e, "settings unavailable, using defaults");
                Ok(LanguagePreferences::default())
            }
            other => other,
        }
    }
}

fn resolve_label(label: &str) -> Result<&'static str> {
    language::english_name(label).ok_or_else(|| {
        Error::validation_with_context(
            "unsupported language",
            ErrorContext::new()
                .with_field_path("language")
                .with_details(format!("got {:?}", label))
                .with_source("dialog"),
        )
    })
}

fn tolerate_remote(result: Result<()>, op: &str) -> Result<()> {
    match result {
        Err(e) if e.is_remote_unavailable() => {
            warn!(op, error = %e, "remote settings tier unavailable, continuing locally");
            Ok(())
        }
        other => other,
    }
}
