//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Configuration errors. Fatal and terminal: there is no retry path for a
/// bad configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing required setting: {0}")]
    Missing(&'static str),
}

/// Appliance configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Remote server endpoint.
    pub server: ServerConfig,
    /// Bot identity and channel.
    pub irc: IrcConfig,
    /// Display geometry.
    #[serde(default)]
    pub display: DisplayConfig,
    /// Retry timing for the two failure domains.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Remote server endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server hostname or IP address.
    pub host: String,
    /// Server port.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    /// Nickname to register with.
    pub nick: String,
    /// Channel to join (e.g., "#sensors").
    pub chan: String,
}

/// Display configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Character columns available for wrapped text.
    #[serde(default = "default_width")]
    pub width: usize,
}

/// Backoff timing configuration, in milliseconds.
///
/// Defaults match the appliance's coarse retry cadence: 5 s floor, 3 min
/// ceiling, for both the link and the registration domain.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Link reconnect backoff floor.
    #[serde(default = "default_retry_floor_ms")]
    pub link_floor_ms: u64,
    /// Link reconnect backoff ceiling.
    #[serde(default = "default_retry_ceiling_ms")]
    pub link_ceiling_ms: u64,
    /// Registration retry backoff floor.
    #[serde(default = "default_retry_floor_ms")]
    pub registration_floor_ms: u64,
    /// Registration retry backoff ceiling.
    #[serde(default = "default_retry_ceiling_ms")]
    pub registration_ceiling_ms: u64,
}

fn default_port() -> u16 {
    6667
}

fn default_width() -> usize {
    16
}

fn default_retry_floor_ms() -> u64 {
    5_000
}

fn default_retry_ceiling_ms() -> u64 {
    180_000
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            link_floor_ms: default_retry_floor_ms(),
            link_ceiling_ms: default_retry_ceiling_ms(),
            registration_floor_ms: default_retry_floor_ms(),
            registration_ceiling_ms: default_retry_ceiling_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check that every required setting is present and non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.is_empty() {
            return Err(ConfigError::Missing("server.host"));
        }
        if self.irc.nick.is_empty() {
            return Err(ConfigError::Missing("irc.nick"));
        }
        if self.irc.chan.is_empty() {
            return Err(ConfigError::Missing("irc.chan"));
        }
        Ok(())
    }

    /// Log a startup banner summarizing which settings are in effect.
    pub fn log_settings(&self) {
        let present = |s: &str| if s.is_empty() { "missing" } else { "ok" };
        info!(
            host = present(&self.server.host),
            port = self.server.port,
            nick = present(&self.irc.nick),
            chan = present(&self.irc.chan),
            width = self.display.width,
            "Settings"
        );
    }
}
