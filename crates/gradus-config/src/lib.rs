use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const GRADUS_DIR_NAME: &str = ".gradus";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DB_FILE_NAME: &str = "gradus.sqlite";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7878;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GradusConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub alerts: AlertConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default = "default_stall_days")]
    pub stall_days: i64,
    #[serde(default = "default_watch_days")]
    pub watch_days: i64,
    #[serde(default = "default_low_percent")]
    pub low_percent: u8,
    #[serde(default = "default_fair_percent")]
    pub fair_percent: u8,
    #[serde(default = "default_milestone_window_days")]
    pub milestone_window_days: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            stall_days: default_stall_days(),
            watch_days: default_watch_days(),
            low_percent: default_low_percent(),
            fair_percent: default_fair_percent(),
            milestone_window_days: default_milestone_window_days(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_enabled")]
    pub enabled: bool,
    #[serde(default = "default_rate_limit_capacity")]
    pub capacity: f64,
    #[serde(default = "default_rate_limit_refill_per_sec")]
    pub refill_per_sec: f64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: default_rate_limit_enabled(),
            capacity: default_rate_limit_capacity(),
            refill_per_sec: default_rate_limit_refill_per_sec(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub fn gradus_dir(data_root: impl AsRef<Path>) -> PathBuf {
    data_root.as_ref().join(GRADUS_DIR_NAME)
}

pub fn config_path(data_root: impl AsRef<Path>) -> PathBuf {
    gradus_dir(data_root).join(CONFIG_FILE_NAME)
}

pub fn db_path(data_root: impl AsRef<Path>) -> PathBuf {
    gradus_dir(data_root).join(DB_FILE_NAME)
}

pub fn load_config(data_root: impl AsRef<Path>) -> Result<GradusConfig, ConfigError> {
    let path = config_path(data_root);
    if !path.exists() {
        return Ok(GradusConfig::default());
    }

    let raw = fs::read_to_string(path)?;
    let parsed: GradusConfig = toml::from_str(&raw)?;
    Ok(normalize_config(parsed))
}

pub fn ensure_config(data_root: impl AsRef<Path>) -> Result<GradusConfig, ConfigError> {
    let data_root = data_root.as_ref();
    fs::create_dir_all(gradus_dir(data_root))?;

    let path = config_path(data_root);
    if path.exists() {
        return load_config(data_root);
    }

    let config = GradusConfig::default();
    let content = toml::to_string_pretty(&config)?;
    fs::write(path, content)?;

    Ok(config)
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_stall_days() -> i64 {
    14
}

fn default_watch_days() -> i64 {
    7
}

fn default_low_percent() -> u8 {
    30
}

fn default_fair_percent() -> u8 {
    50
}

fn default_milestone_window_days() -> i64 {
    7
}

fn default_rate_limit_enabled() -> bool {
    true
}

fn default_rate_limit_capacity() -> f64 {
    100.0
}

fn default_rate_limit_refill_per_sec() -> f64 {
    100.0 / 60.0
}

fn normalize_config(mut config: GradusConfig) -> GradusConfig {
    let host = config.server.host.trim();
    config.server.host = if host.is_empty() {
        default_host()
    } else {
        host.to_owned()
    };

    config.alerts.low_percent = config.alerts.low_percent.min(100);
    config.alerts.fair_percent = config.alerts.fair_percent.min(100);
    config.alerts.stall_days = config.alerts.stall_days.max(0);
    config.alerts.watch_days = config.alerts.watch_days.max(0);
    config.alerts.milestone_window_days = config.alerts.milestone_window_days.max(0);

    if !config.rate_limit.capacity.is_finite() || config.rate_limit.capacity <= 0.0 {
        config.rate_limit.capacity = default_rate_limit_capacity();
    }
    if !config.rate_limit.refill_per_sec.is_finite() || config.rate_limit.refill_per_sec <= 0.0 {
        config.rate_limit.refill_per_sec = default_rate_limit_refill_per_sec();
    }

    config
}
