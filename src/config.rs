//! Configuration file parser for ~/.config/discussion-repl/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Environment variables and CLI flags are layered on top in `main`.
use secrecy::SecretString;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Environment variable holding the memory_jogger database URL.
pub const DATABASE_URL_ENV_VAR: &str = "MEMORY_JOGGER_DATABASE_URL";
/// Environment variable holding the memory_jogger user id.
pub const USER_ID_ENV_VAR: &str = "MEMORY_JOGGER_USER_ID";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid URL for `{key}`: {source}")]
    InvalidUrl {
        key: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("No database URL configured: set MEMORY_JOGGER_DATABASE_URL or pass --database-url")]
    MissingDatabaseUrl,
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connection string of memory_jogger's database.
    pub database_url: Option<SecretString>,

    /// memory_jogger executable used for archive/delete/favorite.
    pub memory_jogger_bin: String,

    /// memory_jogger user owning the saved items.
    pub user_id: Option<i64>,

    /// Timeout applied to every HTTP request, in seconds.
    pub http_timeout_secs: u64,

    pub user_agent: String,

    pub hn_item_api_url: String,
    pub hn_search_api_url: String,
    pub reddit_api_url: String,
    pub wayback_api_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            memory_jogger_bin: "memory_jogger".to_string(),
            user_id: None,
            http_timeout_secs: 10,
            user_agent: concat!("discussion-repl/", env!("CARGO_PKG_VERSION")).to_string(),
            hn_item_api_url: "https://hacker-news.firebaseio.com/v0/item".to_string(),
            hn_search_api_url: "https://hn.algolia.com/api/v1/search".to_string(),
            reddit_api_url: "https://www.reddit.com".to_string(),
            wayback_api_url: "http://archive.org/wayback/available".to_string(),
        }
    }
}

/// Mask database_url in Debug output; connection strings may carry passwords.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("memory_jogger_bin", &self.memory_jogger_bin)
            .field("user_id", &self.user_id)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("hn_item_api_url", &self.hn_item_api_url)
            .field("hn_search_api_url", &self.hn_search_api_url)
            .field("reddit_api_url", &self.reddit_api_url)
            .field("wayback_api_url", &self.wayback_api_url)
            .finish()
    }
}

/// Parsed API base URLs.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub hn_item_api: Url,
    pub hn_search_api: Url,
    pub reddit_api: Url,
    pub wayback_api: Url,
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 9] = [
        "database_url",
        "memory_jogger_bin",
        "user_id",
        "http_timeout_secs",
        "user_agent",
        "hn_item_api_url",
        "hn_search_api_url",
        "reddit_api_url",
        "wayback_api_url",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)`
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        tracing::info!(bin = %config.memory_jogger_bin, "Loaded configuration");
        Ok(config)
    }

    /// Layer environment variables over file values.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a closure.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(DATABASE_URL_ENV_VAR).filter(|v| !v.is_empty()) {
            self.database_url = Some(SecretString::from(url));
        }
        if let Some(value) = lookup(USER_ID_ENV_VAR).filter(|v| !v.is_empty()) {
            let user_id = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: USER_ID_ENV_VAR,
                value,
            })?;
            self.user_id = Some(user_id);
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        fn parse(key: &'static str, value: &str) -> Result<Url, ConfigError> {
            Url::parse(value).map_err(|source| ConfigError::InvalidUrl { key, source })
        }
        Ok(Endpoints {
            hn_item_api: parse("hn_item_api_url", &self.hn_item_api_url)?,
            hn_search_api: parse("hn_search_api_url", &self.hn_search_api_url)?,
            reddit_api: parse("reddit_api_url", &self.reddit_api_url)?,
            wayback_api: parse("wayback_api_url", &self.wayback_api_url)?,
        })
    }

    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or(ConfigError::MissingDatabaseUrl)
    }
}

// ============================================================================
// Tests
// ============================================================================
