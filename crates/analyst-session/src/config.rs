//! Session configuration.

use std::env;
use std::time::Duration;

use crate::error::SessionError;

/// Default analyst API base URL.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8790";

/// Default SQLite database URL.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:analyst.db?mode=rwc";

/// Default time allowed for connecting and receiving response headers.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the analyst API (no trailing slash).
    pub api_url: String,
    /// SQLite URL for conversation persistence, `None` to keep chats in memory.
    pub database_url: Option<String>,
    /// Connect and first-byte timeout for API calls.
    pub timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            database_url: Some(DEFAULT_DATABASE_URL.to_string()),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SessionConfig {
    /// Create a config pointing at the given API, with persistence disabled.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: trim_base(api_url.into()),
            database_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ANALYST_API_URL` | Analyst API base URL | `http://127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite URL, empty to disable persistence | `sqlite:analyst.db?mode=rwc` |
    /// | `ANALYST_TIMEOUT_SECS` | Connect and first-byte timeout | `60` |
    pub fn from_env() -> Result<Self, SessionError> {
        let api_url = env::var("ANALYST_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(SessionError::Config(format!(
                "ANALYST_API_URL must be an http(s) URL, got '{}'",
                api_url
            )));
        }

        let database_url = match env::var("SQLITE_PATH") {
            Ok(url) if url.trim().is_empty() => None,
            Ok(url) => Some(url),
            Err(_) => Some(DEFAULT_DATABASE_URL.to_string()),
        };

        let timeout = match env::var("ANALYST_TIMEOUT_SECS") {
            Ok(secs) => secs
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| SessionError::Config("ANALYST_TIMEOUT_SECS must be a number".into()))?,
            Err(_) => DEFAULT_TIMEOUT,
        };

        Ok(Self {
            api_url: trim_base(api_url),
            database_url,
            timeout,
        })
    }

    /// Set the SQLite URL used for persistence.
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for an API path such as `/ai-analyst`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
