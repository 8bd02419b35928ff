//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `domobridge.toml` in the working directory. Every field has
//! a sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hub connection settings.
    pub hub: HubConfig,
    /// Data file locations.
    pub store: StoreConfig,
    /// Scheduler settings.
    pub scheduler: SchedulerConfig,
    /// Failure notification settings.
    pub telegram: TelegramSection,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Hub API endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Base URL of the hub's HTTP API.
    pub url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// Data file locations.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Device catalog file (read-only input).
    pub aliases: String,
    /// Schedule file (owned by the daemon).
    pub schedule: String,
    /// Audit log file (append-only).
    pub audit_log: String,
}

/// Scheduler loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Pause between schedule scans, in seconds.
    pub poll_secs: u64,
}

/// Telegram bot credentials; both fields required to enable delivery.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TelegramSection {
    pub bot_token: Option<String>,
    pub chat_id: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `domobridge.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// result fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("domobridge.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DOMOBRIDGE_HUB_URL") {
            self.hub.url = val;
        }
        if let Ok(val) = std::env::var("DOMOBRIDGE_ALIASES") {
            self.store.aliases = val;
        }
        if let Ok(val) = std::env::var("DOMOBRIDGE_SCHEDULE") {
            self.store.schedule = val;
        }
        if let Ok(val) = std::env::var("DOMOBRIDGE_AUDIT_LOG") {
            self.store.audit_log = val;
        }
        if let Ok(val) = std::env::var("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = Some(val);
        }
        if let Ok(val) = std::env::var("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = Some(val);
        }
        if let Ok(val) = std::env::var("DOMOBRIDGE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.hub.url.trim().is_empty() {
            return Err(ConfigError::Validation("hub url must be set".to_string()));
        }
        if self.hub.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "hub timeout must be non-zero".to_string(),
            ));
        }
        if self.scheduler.poll_secs == 0 {
            return Err(ConfigError::Validation(
                "scheduler poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request hub timeout.
    #[must_use]
    pub fn hub_timeout(&self) -> Duration {
        Duration::from_secs(self.hub.timeout_secs)
    }

    /// Pause between schedule scans.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.poll_secs)
    }

    /// Telegram credentials, when both halves are present.
    #[must_use]
    pub fn telegram_credentials(&self) -> Option<(String, String)> {
        match (&self.telegram.bot_token, &self.telegram.chat_id) {
            (Some(token), Some(chat)) => Some((token.clone(), chat.clone())),
            _ => None,
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            aliases: "devices.json".to_string(),
            schedule: "schedule.json".to_string(),
            audit_log: "audit.jsonl".to_string(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { poll_secs: 30 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "domobridged=info,domobridge=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
