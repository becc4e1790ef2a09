//! # gpt-ai-translator
//!
//! 翻译机器人核心：多层用户设定缓存、语言设定对话与 AI 翻译客户端。
//!
//! Core of a chat translation bot: per-user language preferences held in a
//! multi-tier cache, the text-command settings dialog, and a thin client for
//! translation, speech synthesis and transcription.
//!
//! ## Overview
//!
//! The centre of the crate is [`cache::MultiTierCache`]: a bounded in-process
//! LRU tier in front of an optional Redis-over-REST tier. Reads go through
//! (local miss -> remote -> backfill), writes go to both tiers, and a remote
//! failure is always reported as [`Error::RemoteUnavailable`], never as a
//! missing key.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gpt_ai_translator::{AppContext, Reply};
//!
//! #[tokio::main]
//! async fn main() -> gpt_ai_translator::Result<()> {
//!     let ctx = AppContext::from_env()?;
//!     match ctx.dialog.handle_text("U123", "/setting").await? {
//!         Reply::Menu { prompt, options } => println!("{} ({} options)", prompt, options.len()),
//!         other => println!("{:?}", other),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Local LRU tier, remote tiers and the multi-tier orchestrator |
//! | [`config`] | Environment readers and application settings |
//! | [`settings`] | Per-user language preferences on top of the cache |
//! | [`dialog`] | Text-command parsing and the settings conversation |
//! | [`language`] | Supported languages |
//! | [`translator`] | Translation / TTS / STT HTTP client |
//! | [`app`] | Startup wiring ([`AppContext`]) |

pub mod app;
pub mod cache;
pub mod config;
pub mod dialog;
pub mod language;
pub mod settings;
pub mod translator;

// Re-export main types for convenience
pub use app::AppContext;
pub use cache::{CacheConfig, CacheSettings, MultiTierCache};
pub use dialog::{Command, Reply, SettingsDialog};
pub use settings::{LanguagePreferences, UserSettingsManager};
pub use translator::TranslatorClient;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
