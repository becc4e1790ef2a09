//! 翻译客户端：通过 OpenAI 兼容 API 进行文字翻译、语音合成与语音转文字。

use crate::config::EnvReader;
use crate::{Error, ErrorContext, Result};
use bytes::Bytes;
use keyring::Entry;
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-5-nano";
pub const DEFAULT_TEMPERATURE: f64 = 1.0;
pub const DEFAULT_TTS_MODEL: &str = "gpt-4o-mini-tts";
pub const DEFAULT_TTS_VOICE: &str = "alloy";
pub const DEFAULT_WHISPER_MODEL: &str = "whisper-1";

const KEYRING_SERVICE: &str = "gpt-ai-translator";
const KEYRING_USER: &str = "openai";

/// Client for translation, speech synthesis and transcription.
pub struct TranslatorClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f64,
    tts_model: String,
    tts_voice: String,
    whisper_model: String,
}

impl TranslatorClient {
    pub fn builder() -> TranslatorClientBuilder {
        TranslatorClientBuilder::new()
    }

    /// Build from `OPENAI_*` variables. The API key is looked up in the OS
    /// keyring first, then `OPENAI_API_KEY`.
    pub fn from_env(env: &EnvReader) -> Result<Self> {
        let api_key = match keyring_api_key() {
            Some(key) => key,
            None => env.get_required("OPENAI_API_KEY")?,
        };
        TranslatorClientBuilder::new()
            .api_key(api_key)
            .base_url(env.get_str_or("OPENAI_BASE_URL", DEFAULT_BASE_URL))
            .model(env.get_str_or("OPENAI_COMPLETION_MODEL", DEFAULT_COMPLETION_MODEL))
            .temperature(env.get_float("OPENAI_COMPLETION_TEMPERATURE", Some(DEFAULT_TEMPERATURE))?)
            .tts_model(env.get_str_or("OPENAI_TTS_MODEL", DEFAULT_TTS_MODEL))
            .tts_voice(env.get_str_or("OPENAI_TTS_VOICE", DEFAULT_TTS_VOICE))
            .whisper_model(env.get_str_or("OPENAI_WHISPER_MODEL", DEFAULT_WHISPER_MODEL))
            .build()
    }

    /// Translate `text` into `language` (an English language name).
    pub async fn translate(&self, text: &str, language: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "instructions": format!(
                "Translate the provided sentence into the {}, outputting only the translation.",
                language
            ),
            "input": text,
            "temperature": self.temperature,
        });
        let response = self
            .http_client
            .post(self.endpoint("/v1/responses"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| network("translate", e))?;
        let json: Value = serde_json::from_str(&checked_text(response, "translate").await?)?;
        Ok(output_text(&json))
    }

    /// Synthesize speech for `text`; returns the encoded audio (mp3).
    pub async fn synthesize(&self, text: &str) -> Result<Bytes> {
        let body = serde_json::json!({
            "model": self.tts_model,
            "voice": self.tts_voice,
            "input": text,
        });
        let response = self
            .http_client
            .post(self.endpoint("/v1/audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| network("tts", e))?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| network("tts", e))?;
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        Ok(bytes)
    }

    /// Transcribe an audio file's bytes; `file_name` carries the format hint.
    pub async fn transcribe(&self, audio: Vec<u8>, file_name: &str) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(audio).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.whisper_model.clone());
        let response = self
            .http_client
            .post(self.endpoint("/v1/audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| network("stt", e))?;
        let json: Value = serde_json::from_str(&checked_text(response, "stt").await?)?;
        Ok(json
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl std::fmt::Debug for TranslatorClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslatorClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("tts_model", &self.tts_model)
            .field("whisper_model", &self.whisper_model)
            .finish_non_exhaustive()
    }
}

fn keyring_api_key() -> Option<String> {
    Entry::new(KEYRING_SERVICE, KEYRING_USER)
        .ok()
        .and_then(|entry| entry.get_password().ok())
}

fn network(source: &str, e: reqwest::Error) -> Error {
    Error::network_with_context(
        format!("request failed: {}", e),
        ErrorContext::new().with_source(source),
    )
}

async fn checked_text(response: reqwest::Response, source: &str) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(|e| network(source, e))?;
    if !status.is_success() {
        return Err(Error::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(body)
}

/// Concatenate the `output_text` parts of a Responses API payload.
fn output_text(json: &Value) -> String {
    if let Some(text) = json.get("output_text").and_then(Value::as_str) {
        return text.to_string();
    }
    json.get("output")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|item| item.get("content").and_then(Value::as_array))
        .flatten()
        .filter(|part| part.get("type").and_then(Value::as_str) == Some("output_text"))
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect()
}

pub struct TranslatorClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    temperature: f64,
    tts_model: Option<String>,
    tts_voice: Option<String>,
    whisper_model: Option<String>,
    timeout_secs: u64,
}

impl TranslatorClientBuilder {
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: None,
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            tts_model: None,
            tts_voice: None,
            whisper_model: None,
            timeout_secs: 60,
        }
    }
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
    pub fn tts_model(mut self, model: impl Into<String>) -> Self {
        self.tts_model = Some(model.into());
        self
    }
    pub fn tts_voice(mut self, voice: impl Into<String>) -> Self {
        self.tts_voice = Some(voice.into());
        self
    }
    pub fn whisper_model(mut self, model: impl Into<String>) -> Self {
        self.whisper_model = Some(model.into());
        self
    }
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn build(self) -> Result<TranslatorClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::configuration_with_context(
                    "API key required",
                    ErrorContext::new().with_field_path("OPENAI_API_KEY"),
                )
            })?;
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(|e| Error::configuration(format!("Failed to create HTTP client: {}", e)))?;
        Ok(TranslatorClient {
            http_client,
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: self
                .model
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            temperature: self.temperature,
            tts_model: self.tts_model.unwrap_or_else(|| DEFAULT_TTS_MODEL.to_string()),
            tts_voice: self.tts_voice.unwrap_or_else(|| DEFAULT_TTS_VOICE.to_string()),
            whisper_model: self
                .whisper_model
                .unwrap_or_else(|| DEFAULT_WHISPER_MODEL.to_string()),
        })
    }
}

impl Default for TranslatorClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
