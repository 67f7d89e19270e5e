//! Application configuration structures.
//!
//! Configuration is read from a TOML file, then overridden by `AOC_BOT__*`
//! environment variables, then by secret files in the secrets directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "AOC_BOT__";

/// Environment variable naming the secrets directory.
pub const SECRETS_DIR_ENV: &str = "SECRETS_DIR";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Leaderboard endpoint and HTTP behavior
    #[serde(default)]
    pub source: SourceConfig,

    /// Telegram delivery settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Polling cadence
    #[serde(default)]
    pub polling: PollingConfig,

    /// Report formatting
    #[serde(default)]
    pub report: ReportConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Load configuration from a TOML file, or `None` when it does not exist.
    ///
    /// Unreadable or malformed files are errors.
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(toml::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load the file, then apply environment and secret-file overrides.
    ///
    /// A missing file yields defaults; a malformed one is rejected.
    pub fn from_sources(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load_optional(path)?.unwrap_or_default();
        config.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())?;

        let secrets_dir = std::env::var(SECRETS_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(defaults::SECRETS_DIR));
        config.apply_secrets(&secrets_dir)?;

        Ok(config)
    }

    /// Apply overrides looked up by key (without the `AOC_BOT__` prefix).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SESSION_ID") {
            self.source.session_id = v;
        }
        if let Some(v) = lookup("LEADERBOARD_URL") {
            self.source.leaderboard_url = Some(v);
        }
        if let Some(v) = lookup("TELEGRAM_TOKEN") {
            self.telegram.token = v;
        }
        if let Some(v) = lookup("TELEGRAM_CHATS") {
            self.telegram.chats = parse_list(&v)?;
        }
        if let Some(v) = lookup("INTERVAL") {
            self.polling.interval_secs = v.trim().parse().map_err(|_| {
                AppError::config(format!("{ENV_PREFIX}INTERVAL is not a number: '{v}'"))
            })?;
        }
        if let Some(v) = lookup("STATE_FILE") {
            self.polling.state_file = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }
        Ok(())
    }

    /// Read credentials from secret files, if present.
    ///
    /// Files are named after the lowercase variable, e.g. `aoc_bot__session_id`.
    pub fn apply_secrets(&mut self, dir: &Path) -> Result<()> {
        if let Some(v) = read_secret(dir, "session_id")? {
            self.source.session_id = v;
        }
        if let Some(v) = read_secret(dir, "telegram_token")? {
            self.telegram.token = v;
        }
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let url = self
            .source
            .leaderboard_url
            .as_deref()
            .ok_or_else(|| AppError::config("source.leaderboard_url is not set"))?;
        Url::parse(url)?;

        if self.source.session_id.trim().is_empty() {
            return Err(AppError::config("source.session_id is empty"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::config("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::config("source.timeout_secs must be > 0"));
        }
        if self.polling.interval_secs == 0 {
            return Err(AppError::config("polling.interval_secs must be > 0"));
        }
        self.report.validate()?;
        if self.telegram.chats.is_empty() {
            log::warn!("No telegram chats configured; reports will not be delivered");
        } else if self.telegram.token.trim().is_empty() {
            return Err(AppError::config(
                "telegram.token is empty but chats are configured",
            ));
        }
        Ok(())
    }
}

/// Leaderboard endpoint and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Private leaderboard URL (`.json` is appended when missing)
    #[serde(default)]
    pub leaderboard_url: Option<String>,

    /// Value of the `session` cookie
    #[serde(default)]
    pub session_id: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            leaderboard_url: None,
            session_id: String::new(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Telegram Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub token: String,

    /// Chat identifiers to deliver reports to
    #[serde(default)]
    pub chats: Vec<String>,

    #[serde(default = "defaults::telegram_api_base")]
    pub api_base: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            chats: Vec::new(),
            api_base: defaults::telegram_api_base(),
        }
    }
}

/// Polling loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Base delay between cycles in seconds
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Where to keep the previous snapshot across restarts
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            state_file: None,
        }
    }
}

/// Report formatting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum user name width in tables
    #[serde(default = "defaults::name_width")]
    pub name_width: usize,

    /// Offset from UTC used for solve times
    #[serde(default = "defaults::utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl ReportConfig {
    /// Check the formatting settings on their own, without a leaderboard URL.
    pub fn validate(&self) -> Result<()> {
        if self.name_width == 0 {
            return Err(AppError::config("report.name_width must be > 0"));
        }
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(AppError::config(
                "report.utc_offset_minutes must be within ±24h",
            ));
        }
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            name_width: defaults::name_width(),
            utc_offset_minutes: defaults::utc_offset_minutes(),
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Parse a JSON list (`["a","b"]`) or a comma separated list.
fn parse_list(raw: &str) -> Result<Vec<String>> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let items: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        return Ok(items
            .into_iter()
            .map(|v| match v {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect());
    }
    Ok(trimmed
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect())
}

fn read_secret(dir: &Path, name: &str) -> Result<Option<String>> {
    let path = dir.join(format!("{}{}", ENV_PREFIX.to_lowercase(), name));
    match fs::read_to_string(&path) {
        Ok(s) => Ok(Some(s.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(AppError::Io(e)),
    }
}

mod defaults {
    pub const SECRETS_DIR: &str = "/run/secrets";

    // Source defaults
    pub fn user_agent() -> String {
        concat!("aoc-notifier/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Telegram defaults
    pub fn telegram_api_base() -> String {
        "https://api.telegram.org".into()
    }

    // Polling defaults
    pub fn interval() -> u64 {
        15 * 60
    }

    // Report defaults
    pub fn name_width() -> usize {
        18
    }
    pub fn utc_offset_minutes() -> i32 {
        3 * 60
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
