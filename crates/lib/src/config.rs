//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.tvrelay/config.json`) and the
//! environment, then resolved once into [`Settings`], which is read-only for the
//! life of the process.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::sink::{DEFAULT_TIMEOUT, TELEGRAM_API_BASE};

/// Top-level config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Telegram delivery settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Relay settings (shared secret).
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Server bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Port for HTTP (default 10000). Overridden by PORT env.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default "0.0.0.0"; the webhook source must reach it).
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_port() -> u16 {
    10000
}

fn default_bind() -> String {
    "0.0.0.0".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind: default_bind(),
        }
    }
}

/// Telegram sink config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    /// Bot token from BotFather. Overridden by TELEGRAM_BOT_TOKEN env when set.
    pub bot_token: Option<String>,
    /// Destination chat id. Overridden by TELEGRAM_CHAT_ID env when set.
    pub chat_id: Option<String>,
    /// Bot API base URL (default https://api.telegram.org). Overridden by TELEGRAM_API_BASE.
    pub api_base: Option<String>,
    /// sendMessage timeout in seconds (default 20).
    pub timeout_secs: Option<u64>,
}

/// Relay config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayConfig {
    /// Expected `secret` field in alert payloads. Empty or absent disables the check.
    /// Overridden by TRADINGVIEW_SECRET env.
    pub secret: Option<String>,
}

/// Resolved, immutable settings used by the gateway, sink and relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind: String,
    pub port: u16,
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
    pub secret: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_config(&Config::default())
    }
}

impl Settings {
    /// Resolve settings from config with environment overrides applied.
    pub fn resolve(config: &Config) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolve settings from config alone, ignoring the environment.
    pub fn from_config(config: &Config) -> Self {
        Self::resolve_with(config, |_| None)
    }

    fn resolve_with(config: &Config, env: impl Fn(&str) -> Option<String>) -> Self {
        let pick = |key: &str, fallback: Option<&String>| {
            non_empty(env(key)).or_else(|| non_empty(fallback.cloned()))
        };
        let port = non_empty(env("PORT"))
            .and_then(|p| match p.parse::<u16>() {
                Ok(port) => Some(port),
                Err(_) => {
                    log::warn!("ignoring invalid PORT value: {}", p);
                    None
                }
            })
            .unwrap_or(config.server.port);
        Self {
            bind: config.server.bind.trim().to_string(),
            port,
            bot_token: pick("TELEGRAM_BOT_TOKEN", config.telegram.bot_token.as_ref()),
            chat_id: pick("TELEGRAM_CHAT_ID", config.telegram.chat_id.as_ref()),
            api_base: pick("TELEGRAM_API_BASE", config.telegram.api_base.as_ref())
                .unwrap_or_else(|| TELEGRAM_API_BASE.to_string()),
            timeout: config
                .telegram
                .timeout_secs
                .filter(|s| *s > 0)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            secret: pick("TRADINGVIEW_SECRET", config.relay.secret.as_ref()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("TVRELAY_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".tvrelay").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or TVRELAY_CONFIG_PATH).
/// Missing file => default config. Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

/// Create the config directory and write a default config file if none exists.
pub fn init_config(path: Option<PathBuf>) -> Result<PathBuf> {
    let path = path.unwrap_or_else(default_config_path);
    if let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating config directory {}", dir.display()))?;
    }
    if path.exists() {
        log::info!("config already exists at {}", path.display());
        return Ok(path);
    }
    let default = serde_json::to_string_pretty(&Config::default())
        .context("serializing default config")?;
    std::fs::write(&path, default)
        .with_context(|| format!("writing default config to {}", path.display()))?;
    log::info!("created default config at {}", path.display());
    Ok(path)
}
