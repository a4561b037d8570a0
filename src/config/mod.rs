//! # Configuration Management Module
//!
//! TOML-backed configuration for the wishbot process.
//!
//! ## Sections
//!
//! - [`BotConfig`] - transport token and update-polling parameters
//! - [`StorageConfig`] - data directory for the embedded store
//! - [`SessionConfig`] - idle-session timeout and sweep interval
//! - [`LoggingConfig`] - log level and optional log file
//!
//! ```toml
//! [bot]
//! token = "123456:bot-token"
//! update_limit = 100
//! update_timeout_secs = 30
//!
//! [storage]
//! data_dir = "./data"
//!
//! [session]
//! idle_timeout_minutes = 60
//! ```
//!
//! All values are validated on load; a broken configuration is a
//! startup-fatal error, not something to limp along with.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub bot: BotConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Transport-facing settings. The token and polling parameters are consumed
/// by the chat-transport collaborator, not by the conversation core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default)]
    pub update_offset: i64,
    #[serde(default = "default_update_limit")]
    pub update_limit: u32,
    #[serde(default = "default_update_timeout")]
    pub update_timeout_secs: u64,
}

fn default_update_limit() -> u32 {
    100
}

fn default_update_timeout() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Minutes of inactivity before a session is evicted. Activity refreshes
    /// the deadline.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_minutes: u64,
    /// How often the background sweep clears expired sessions.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
}

fn default_idle_timeout() -> u64 {
    60
}

fn default_sweep_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout(),
            sweep_interval_secs: default_sweep_interval(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug or trace. Defaults to info.
    #[serde(default)]
    pub level: Option<String>,
    /// Optional log file. When set, log lines go to the file (and to the
    /// console as well when stdout is a TTY).
    #[serde(default)]
    pub file: Option<String>,
}

impl Config {
    /// Load and validate configuration from a TOML file.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;
        config.validate()?;
        Ok(config)
    }

    /// Write a starter configuration file. Refuses to overwrite an existing one.
    pub async fn create_default(path: &str) -> Result<()> {
        if fs::try_exists(path).await? {
            return Err(anyhow!("Config file {} already exists", path));
        }
        fs::write(path, DEFAULT_CONFIG).await?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.bot.token.is_empty() {
            return Err(anyhow!("bot.token must not be empty"));
        }
        if self.storage.data_dir.is_empty() {
            return Err(anyhow!("storage.data_dir must not be empty"));
        }
        if self.session.idle_timeout_minutes == 0 {
            return Err(anyhow!("session.idle_timeout_minutes must be at least 1"));
        }
        if !(1..=100).contains(&self.bot.update_limit) {
            return Err(anyhow!("bot.update_limit must be between 1 and 100"));
        }
        Ok(())
    }
}

const DEFAULT_CONFIG: &str = r#"# Wishbot configuration

[bot]
# Transport API token (required)
token = "CHANGE-ME"
update_offset = 0
update_limit = 100
update_timeout_secs = 30

[storage]
data_dir = "./data"

[session]
idle_timeout_minutes = 60
sweep_interval_secs = 60

[logging]
level = "info"
# file = "wishbot.log"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses_and_validates() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).expect("template parses");
        assert!(config.validate().is_ok());
        assert_eq!(config.session.idle_timeout_minutes, 60);
        assert_eq!(config.bot.update_limit, 100);
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let toml = r#"
            [bot]
            token = "t"
            [storage]
            data_dir = "./data"
        "#;
        let config: Config = toml::from_str(toml).expect("parses");
        assert!(config.validate().is_ok());
        assert_eq!(config.session.idle_timeout_minutes, 60);
        assert_eq!(config.bot.update_timeout_secs, 30);
        assert!(config.logging.level.is_none());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let toml = r#"
            [bot]
            token = "t"
            [storage]
            data_dir = "./data"
            [session]
            idle_timeout_minutes = 0
        "#;
        let config: Config = toml::from_str(toml).expect("parses");
        assert!(config.validate().is_err());
    }
}
