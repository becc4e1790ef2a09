//! 配置模块：从环境变量读取启动配置，仅在启动时解析一次。
//!
//! # Configuration
//!
//! All settings are resolved once at startup through an [`EnvReader`]. The
//! reader wraps a lookup function, so tests substitute a plain map for the
//! process environment and nothing re-reads the environment at request time.

mod app;
mod env;

pub use app::{AppConfig, AppEnvironment};
pub use env::EnvReader;
