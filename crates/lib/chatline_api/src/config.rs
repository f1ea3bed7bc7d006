//! Gateway configuration.

use std::time::Duration;

use thiserror::Error;

/// Default listen address for the HTTP adapter.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3100";

/// Default upper bound on pooled database connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default time to wait for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Configuration for the chat message gateway.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// PostgreSQL connection URL. Required.
    pub database_url: String,
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3100").
    pub bind_addr: String,
    /// Maximum number of pooled database connections.
    pub max_connections: u32,
    /// How long a request waits for a connection before failing.
    pub acquire_timeout: Duration,
}

impl GatewayConfig {
    /// Config with defaults for everything but the database URL.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }

    /// Reads configuration from environment variables.
    ///
    /// | Variable               | Default          |
    /// |------------------------|------------------|
    /// | `DATABASE_URL`         | required         |
    /// | `BIND_ADDR`            | `127.0.0.1:3100` |
    /// | `MAX_CONNECTIONS`      | `5`              |
    /// | `ACQUIRE_TIMEOUT_SECS` | `30`             |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Fails fast when `DATABASE_URL` is absent or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let mut config = Self::new(database_url);

        if let Some(addr) = lookup("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(raw) = lookup("MAX_CONNECTIONS") {
            config.max_connections = match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_CONNECTIONS",
                        value: raw,
                    });
                }
            };
        }
        if let Some(raw) = lookup("ACQUIRE_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::Invalid {
                name: "ACQUIRE_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config.acquire_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_database_url_fails_fast() {
        let err = GatewayConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
        assert_eq!(err.to_string(), "DATABASE_URL must be set");
    }

    #[test]
    fn blank_database_url_is_missing() {
        let err = GatewayConfig::from_lookup(lookup(&[("DATABASE_URL", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn defaults_apply() {
        let config =
            GatewayConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://db/chat")])).unwrap();
        assert_eq!(config.database_url, "postgres://db/chat");
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(config.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[test]
    fn overrides_are_read() {
        let config = GatewayConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/chat"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("MAX_CONNECTIONS", "12"),
            ("ACQUIRE_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn zero_connections_is_invalid() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/chat"),
            ("MAX_CONNECTIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                name: "MAX_CONNECTIONS",
                ..
            }
        ));
    }

    #[test]
    fn non_numeric_timeout_is_invalid() {
        let err = GatewayConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://db/chat"),
            ("ACQUIRE_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "ACQUIRE_TIMEOUT_SECS has an invalid value: soon"
        );
    }
}
