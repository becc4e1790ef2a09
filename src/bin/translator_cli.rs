//! translator-cli: 用户语言设定与翻译的命令行工具
//!
//! Usage:
//!   translator-cli get <user>                     Show stored settings
//!   translator-cli set <user> <key> <value>       Update one setting
//!   translator-cli say <user> <text...>           Run one line through the dialog
//!   translator-cli config                         Show resolved configuration

use anyhow::{bail, Context};
use gpt_ai_translator::config::EnvReader;
use gpt_ai_translator::{AppContext, Reply, TranslatorClient};
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; real deployments set variables directly.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    match args[1].as_str() {
        "get" => cmd_get(&args[2..]).await,
        "set" => cmd_set(&args[2..]).await,
        "say" => cmd_say(&args[2..]).await,
        "config" => cmd_config(),
        "version" | "--version" | "-V" => {
            println!("translator-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!(
        r#"translator-cli: 翻譯機器人設定工具

USAGE:
    translator-cli <COMMAND> [ARGS]

COMMANDS:
    get <user>                  Show stored settings for a user
    set <user> <key> <value>    Update one setting (value parsed as JSON, else string)
    say <user> <text...>        Run text through the settings dialog
    config                      Show resolved configuration (no secrets)
    version                     Show version information
    help                        Show this help message

ENVIRONMENT:
    APP_NAME, APP_PERSISTENT_USER_SETTINGS_ENABLED, LRU_CACHE_SIZE,
    KV_REST_API_URL, KV_REST_API_TOKEN, OPENAI_API_KEY (read from .env too)"#
    );
}

fn context() -> anyhow::Result<AppContext> {
    let ctx = AppContext::from_env().context("failed to load configuration")?;
    if !ctx.cache.remote_enabled() {
        eprintln!("note: remote cache disabled, settings live only for this process");
    }
    Ok(ctx)
}

async fn cmd_get(args: &[String]) -> anyhow::Result<()> {
    let [user] = args else {
        bail!("usage: translator-cli get <user>");
    };
    let ctx = context()?;
    let settings = ctx.settings.get_settings(user).await?;
    println!("{}", serde_json::to_string_pretty(&Value::Object(settings))?);
    Ok(())
}

async fn cmd_set(args: &[String]) -> anyhow::Result<()> {
    let [user, key, value] = args else {
        bail!("usage: translator-cli set <user> <key> <value>");
    };
    let ctx = context()?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.clone()));
    let mut partial = Map::new();
    partial.insert(key.clone(), value);
    ctx.settings.set_settings(user, partial).await?;
    println!("ok");
    Ok(())
}

async fn cmd_say(args: &[String]) -> anyhow::Result<()> {
    if args.len() < 2 {
        bail!("usage: translator-cli say <user> <text...>");
    }
    let ctx = context()?;
    let text = args[1..].join(" ");
    match ctx.dialog.handle_text(&args[0], &text).await? {
        Reply::Menu { prompt, options } => {
            println!("{}", prompt);
            for option in options {
                println!("  [{}] -> {}", option.label, option.text);
            }
        }
        Reply::Text(text) => println!("{}", text),
        Reply::Translate {
            text,
            target_language,
        } => match TranslatorClient::from_env(&EnvReader::from_process()) {
            Ok(client) => println!("{}", client.translate(&text, &target_language).await?),
            Err(e) => {
                tracing::debug!(error = %e, "translator not configured");
                println!("(would translate into {}) {}", target_language, text);
            }
        },
    }
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let ctx = AppContext::from_env().context("failed to load configuration")?;
    println!("app_name:        {}", ctx.config.app_name);
    println!("environment:     {}", ctx.config.environment.as_str());
    println!("audio_temp_path: {}", ctx.config.audio_temp_path().display());
    println!("push_audio:      {}", ctx.config.push_translated_text_audio_enabled);
    println!("lru_size:        {}", ctx.cache_config.lru_size);
    match &ctx.cache_config.remote {
        Some(remote) => {
            println!("remote_cache:    {} (timeout {:?})", remote.url, remote.timeout);
        }
        None => println!("remote_cache:    disabled"),
    }
    if let Some(ttl) = ctx.cache_config.default_ttl {
        println!("remote_ttl:      {:?}", ttl);
    }
    Ok(())
}
