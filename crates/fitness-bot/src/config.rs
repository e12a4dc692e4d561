//! Configuration for the fitness bot binary.

use std::env;
use std::time::Duration;

use thiserror::Error;

/// Default SQLite location.
const DEFAULT_DATABASE_URL: &str = "sqlite:fitness.db?mode=rwc";

/// Default connection pool size.
const DEFAULT_POOL_SIZE: u32 = 20;

/// Errors while reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    Missing(&'static str),

    #[error("{var} has an invalid value: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub telegram_token: String,
    /// Handle of the administrator, without "@".
    pub admin_username: String,
    pub database_url: String,
    pub pool_size: u32,
    pub api_url: Option<String>,
    pub poll_timeout: Option<Duration>,
    /// Drop updates that arrived while the bot was down.
    pub skip_backlog: bool,
}

impl BotConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `TELEGRAM_BOT_TOKEN`
    /// - `ADMIN_USERNAME`
    ///
    /// Optional env vars:
    /// - `DATABASE_URL` (path or sqlite URL, default: fitness.db)
    /// - `DB_POOL_SIZE` (default: 20)
    /// - `TELEGRAM_API_URL` (default: public Bot API)
    /// - `TELEGRAM_POLL_TIMEOUT` (seconds, default: 30)
    /// - `SKIP_BACKLOG` (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_token =
            get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let admin_username = get("ADMIN_USERNAME")
            .map(|u| u.trim_start_matches('@').to_string())
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::Missing("ADMIN_USERNAME"))?;

        let database_url = get("DATABASE_URL")
            .map(|path| sqlite_url_from_path(&path))
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let pool_size = match get("DB_POOL_SIZE") {
            Some(value) => match value.parse::<u32>() {
                Ok(size) if size > 0 => size,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DB_POOL_SIZE",
                        value,
                    })
                }
            },
            None => DEFAULT_POOL_SIZE,
        };

        let poll_timeout = match get("TELEGRAM_POLL_TIMEOUT") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) => Some(Duration::from_secs(secs)),
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        var: "TELEGRAM_POLL_TIMEOUT",
                        value,
                    })
                }
            },
            None => None,
        };

        let skip_backlog = get("SKIP_BACKLOG")
            .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false);

        Ok(Self {
            telegram_token,
            admin_username,
            database_url,
            pool_size,
            api_url: get("TELEGRAM_API_URL"),
            poll_timeout,
            skip_backlog,
        })
    }
}

/// Accept either a sqlite URL or a plain file path.
pub fn sqlite_url_from_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<BotConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|var| map.get(var).cloned())
    }

    #[test]
    fn test_minimal_config() {
        let config = load(&[("TELEGRAM_BOT_TOKEN", "1:abc"), ("ADMIN_USERNAME", "@Boss")]).unwrap();
        assert_eq!(config.telegram_token, "1:abc");
        assert_eq!(config.admin_username, "Boss");
        assert_eq!(config.database_url, "sqlite:fitness.db?mode=rwc");
        assert_eq!(config.pool_size, 20);
        assert!(config.api_url.is_none());
        assert!(config.poll_timeout.is_none());
        assert!(!config.skip_backlog);
    }

    #[test]
    fn test_missing_required() {
        assert_eq!(
            load(&[("ADMIN_USERNAME", "boss")]).unwrap_err(),
            ConfigError::Missing("TELEGRAM_BOT_TOKEN")
        );
        assert_eq!(
            load(&[("TELEGRAM_BOT_TOKEN", "1:abc"), ("ADMIN_USERNAME", " @ ")]).unwrap_err(),
            ConfigError::Missing("ADMIN_USERNAME")
        );
    }

    #[test]
    fn test_optional_values() {
        let config = load(&[
            ("TELEGRAM_BOT_TOKEN", "1:abc"),
            ("ADMIN_USERNAME", "boss"),
            ("DATABASE_URL", "./data/gym.db"),
            ("DB_POOL_SIZE", "4"),
            ("TELEGRAM_POLL_TIMEOUT", "10"),
            ("SKIP_BACKLOG", "yes"),
        ])
        .unwrap();
        assert_eq!(config.database_url, "sqlite:./data/gym.db?mode=rwc");
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.poll_timeout, Some(Duration::from_secs(10)));
        assert!(config.skip_backlog);
    }

    #[test]
    fn test_invalid_pool_size() {
        let err = load(&[
            ("TELEGRAM_BOT_TOKEN", "1:abc"),
            ("ADMIN_USERNAME", "boss"),
            ("DB_POOL_SIZE", "0"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "DB_POOL_SIZE",
                value: "0".into()
            }
        );
    }

    #[test]
    fn test_sqlite_url_from_path() {
        assert_eq!(sqlite_url_from_path("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(sqlite_url_from_path("bot.db"), "sqlite:bot.db?mode=rwc");
    }
}
