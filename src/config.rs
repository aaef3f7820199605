//! Configuration file handling.
//!
//! This module handles loading, saving, and merging configuration from
//! `~/.lucky/config.toml`.

use crate::errors::ConfigError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Directory under the home directory holding the config file.
pub const CONFIG_DIR: &str = ".lucky";

/// Config file name.
pub const CONFIG_FILE: &str = "config.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// FRED API settings.
    #[serde(default)]
    pub fred: FredConfig,

    /// Telegram push settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Tencent Cloud settings.
    #[serde(default)]
    pub cloud: CloudConfig,

    /// SSH settings.
    #[serde(default)]
    pub ssh: SshConfig,

    /// ADB tap automation settings.
    #[serde(default)]
    pub game: GameConfig,

    /// Named destinations for `ssh` and `reboot`.
    #[serde(default)]
    pub dest: BTreeMap<String, Destination>,
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

/// FRED API settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FredConfig {
    /// API key. Falls back to `FRED_API_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl FredConfig {
    pub fn resolve_api_key(&self) -> Option<String> {
        resolve(&self.api_key, "FRED_API_KEY")
    }
}

/// Telegram bot settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token. Falls back to `TELEGRAM_BOT_TOKEN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Target chat. Falls back to `TELEGRAM_CHAT_ID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
}

impl TelegramConfig {
    pub fn resolve_bot_token(&self) -> Option<String> {
        resolve(&self.bot_token, "TELEGRAM_BOT_TOKEN")
    }

    pub fn resolve_chat_id(&self) -> Option<String> {
        resolve(&self.chat_id, "TELEGRAM_CHAT_ID")
    }
}

/// Tencent Cloud settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudConfig {
    /// Falls back to `TENCENT_CLOUD_SECRET_ID`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<String>,

    /// Falls back to `TENCENT_CLOUD_SECRET_KEY`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Path to the Tencent Cloud CLI.
    #[serde(default = "default_tccli_path")]
    pub tccli_path: String,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            secret_id: None,
            secret_key: None,
            tccli_path: default_tccli_path(),
        }
    }
}

impl CloudConfig {
    pub fn resolve_secret_id(&self) -> Option<String> {
        resolve(&self.secret_id, "TENCENT_CLOUD_SECRET_ID")
    }

    pub fn resolve_secret_key(&self) -> Option<String> {
        resolve(&self.secret_key, "TENCENT_CLOUD_SECRET_KEY")
    }
}

fn default_tccli_path() -> String {
    "tccli".to_string()
}

/// SSH settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SshConfig {
    /// SSH client program.
    #[serde(default = "default_ssh_program")]
    pub program: String,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            program: default_ssh_program(),
        }
    }
}

fn default_ssh_program() -> String {
    "ssh".to_string()
}

/// ADB tap automation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Path to the adb binary.
    #[serde(default = "default_adb_path")]
    pub adb_path: String,

    /// Tap X coordinate.
    #[serde(default = "default_tap_x")]
    pub tap_x: u32,

    /// Tap Y coordinate.
    #[serde(default = "default_tap_y")]
    pub tap_y: u32,

    /// Seconds between taps.
    #[serde(default = "default_interval")]
    pub interval_seconds: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            adb_path: default_adb_path(),
            tap_x: default_tap_x(),
            tap_y: default_tap_y(),
            interval_seconds: default_interval(),
        }
    }
}

fn default_adb_path() -> String {
    "adb".to_string()
}

fn default_tap_x() -> u32 {
    1800
}

fn default_tap_y() -> u32 {
    900
}

fn default_interval() -> u64 {
    5
}

/// A named remote machine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    /// SSH target, e.g. `user@host`.
    #[serde(default)]
    pub ssh: String,

    /// Cloud region, e.g. `ap-beijing`.
    #[serde(default)]
    pub region: String,

    /// Cloud instance id.
    #[serde(default)]
    pub instance_id: String,
}

/// Prefer a non-empty configured value, then a non-empty environment variable.
fn resolve(configured: &Option<String>, env_var: &str) -> Option<String> {
    configured
        .as_ref()
        .filter(|value| !value.trim().is_empty())
        .cloned()
        .or_else(|| std::env::var(env_var).ok().filter(|v| !v.trim().is_empty()))
}

impl Config {
    /// Default config file path (`~/.lucky/config.toml`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path.display(), e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;

        Ok(config)
    }

    /// Load configuration if the file exists.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_if_exists(path: &Path) -> Result<Option<Self>> {
        if path.exists() {
            Ok(Some(Self::load(path)?))
        } else {
            Ok(None)
        }
    }

    /// Save configuration, creating the parent directory if needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Look up a destination by name.
    pub fn destination(&self, name: &str) -> Result<&Destination, ConfigError> {
        if name.trim().is_empty() {
            return Err(ConfigError::EmptyDestination);
        }

        self.dest
            .get(name)
            .ok_or_else(|| ConfigError::UnknownDestination(name.to_string()))
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }

        if let crate::cli::Command::Game(ref game) = args.command {
            if let Some(interval) = game.interval {
                self.game.interval_seconds = interval;
            }
            if let Some(ref adb) = game.adb {
                self.game.adb_path = adb.clone();
            }
        }
    }

    /// Reject settings that would make every request or tap loop misbehave.
    ///
    /// Run after [`Config::merge_with_args`] so file values get the same
    /// checks as their command-line counterparts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_seconds == 0 {
            return Err(ConfigError::ZeroSetting {
                field: "http.timeout_seconds",
            });
        }

        if self.game.interval_seconds == 0 {
            return Err(ConfigError::ZeroSetting {
                field: "game.interval_seconds",
            });
        }

        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let mut config = Config::default();
        config.dest.insert(
            "example".to_string(),
            Destination {
                ssh: "user@example.com".to_string(),
                region: "ap-beijing".to_string(),
                instance_id: "lhins-00000000".to_string(),
            },
        );
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}
