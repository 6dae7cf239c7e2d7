//! Configuration loaded from environment variables.

use std::env;
use std::net::SocketAddr;

use crate::rate_limit::FailurePolicy;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Shared secret for `/verify-password`, if configured.
    pub demo_password: Option<String>,
    /// What the rate limiter does when its ledger is unavailable.
    pub rate_limit_policy: FailurePolicy,
    /// Insert the demo business dataset at startup.
    pub seed_demo_data: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `ANALYST_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:analyst.db?mode=rwc` |
    /// | `DEMO_PASSWORD` | Shared access password | (none) |
    /// | `RATE_LIMIT_FAIL_CLOSED` | Deny requests when the ledger errors | `false` |
    /// | `ANALYST_SEED_DEMO` | Seed demo business data | `false` |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("ANALYST_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("SQLITE_PATH")
            .unwrap_or_else(|_| "sqlite:analyst.db?mode=rwc".to_string());

        let demo_password = env::var("DEMO_PASSWORD")
            .ok()
            .filter(|password| !password.is_empty());

        let rate_limit_policy = if env_flag("RATE_LIMIT_FAIL_CLOSED") {
            FailurePolicy::FailClosed
        } else {
            FailurePolicy::FailOpen
        };

        Ok(Self {
            addr,
            database_url,
            demo_password,
            rate_limit_policy,
            seed_demo_data: env_flag("ANALYST_SEED_DEMO"),
        })
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid ANALYST_ADDR format")]
    InvalidAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_vars() {
            for name in [
                "ANALYST_ADDR",
                "SQLITE_PATH",
                "DEMO_PASSWORD",
                "RATE_LIMIT_FAIL_CLOSED",
                "ANALYST_SEED_DEMO",
            ] {
                std::env::remove_var(name);
            }
        }

        clear_vars();
        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.database_url, "sqlite:analyst.db?mode=rwc");
        assert!(config.demo_password.is_none());
        assert_eq!(config.rate_limit_policy, FailurePolicy::FailOpen);
        assert!(!config.seed_demo_data);

        std::env::set_var("DEMO_PASSWORD", "open-sesame");
        std::env::set_var("RATE_LIMIT_FAIL_CLOSED", "TRUE");
        std::env::set_var("ANALYST_SEED_DEMO", "1");
        let config = Config::from_env().unwrap();
        assert_eq!(config.demo_password.as_deref(), Some("open-sesame"));
        assert_eq!(config.rate_limit_policy, FailurePolicy::FailClosed);
        assert!(config.seed_demo_data);

        std::env::set_var("ANALYST_ADDR", "not-an-addr");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidAddr)));

        clear_vars();
    }
}
