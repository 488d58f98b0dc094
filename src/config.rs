//! Environment-sourced configuration.
//!
//! Every variable is optional. Values that are present but unparseable are
//! rejected at startup instead of silently falling back to a default.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use thiserror::Error;

use crate::app::ServiceConfig;
use crate::infra::PostgresConfig;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Server run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Debug,
    Release,
    Test,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::Test => "test",
        }
    }
}

impl FromStr for RunMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "test" => Ok(Self::Test),
            _ => Err(format!("Invalid run mode: {}", s)),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for receiving a request body
    pub read_timeout: Duration,
    /// Upper bound for producing a response
    pub write_timeout: Duration,
    /// How long in-flight requests may run after a shutdown signal
    pub shutdown_grace: Duration,
    pub mode: RunMode,
}

/// Database connection and pool settings
#[derive(Debug)]
pub struct DatabaseConfig {
    /// Overrides the individual connection fields when set
    pub url: Option<SecretString>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: SecretString,
    pub name: String,
    pub ssl_mode: PgSslMode,
    pub max_open_conns: u32,
    pub max_idle_conns: u32,
    pub conn_max_lifetime: Duration,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Build driver connect options
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return PgConnectOptions::from_str(url.expose_secret()).map_err(|e| {
                ConfigError::InvalidValue {
                    key: "DATABASE_URL",
                    value: "<redacted>".to_string(),
                    reason: e.to_string(),
                }
            });
        }

        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(self.password.expose_secret())
            .database(&self.name)
            .ssl_mode(self.ssl_mode))
    }

    /// Pool sizing derived from the configured limits
    #[must_use]
    pub fn pool_config(&self) -> PostgresConfig {
        PostgresConfig {
            max_connections: self.max_open_conns,
            min_connections: self.max_idle_conns.min(self.max_open_conns),
            acquire_timeout: self.acquire_timeout,
            max_lifetime: self.conn_max_lifetime,
            ..PostgresConfig::default()
        }
    }
}

/// Logging settings
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default filter directive, overridable with `RUST_LOG`
    pub level: String,
}

/// Complete application configuration
#[derive(Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub log: LogConfig,
    pub service: ServiceConfig,
}

impl AppConfig {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let mode = match vars.get("RUN_MODE").or_else(|| vars.get("GIN_MODE")) {
            Some(raw) => raw
                .parse::<RunMode>()
                .map_err(|reason| ConfigError::InvalidValue {
                    key: "RUN_MODE",
                    value: raw,
                    reason,
                })?,
            None => RunMode::default(),
        };

        let server = ServerConfig {
            host: vars.string("SERVER_HOST", "0.0.0.0"),
            port: vars.parsed("SERVER_PORT", 8080)?,
            read_timeout: vars.seconds("SERVER_READ_TIMEOUT", 10)?,
            write_timeout: vars.seconds("SERVER_WRITE_TIMEOUT", 10)?,
            shutdown_grace: vars.seconds("SERVER_SHUTDOWN_GRACE", 10)?,
            mode,
        };

        let ssl_raw = vars.string("DB_SSLMODE", "disable");
        let ssl_mode = PgSslMode::from_str(&ssl_raw).map_err(|e| ConfigError::InvalidValue {
            key: "DB_SSLMODE",
            value: ssl_raw.clone(),
            reason: e.to_string(),
        })?;

        let database = DatabaseConfig {
            url: vars.get("DATABASE_URL").map(SecretString::from),
            host: vars.string("DB_HOST", "localhost"),
            port: vars.parsed("DB_PORT", 5432)?,
            user: vars.string("DB_USER", "postgres"),
            password: SecretString::from(vars.string("DB_PASSWORD", "postgres")),
            name: vars.string("DB_NAME", "gin_crud"),
            ssl_mode,
            max_open_conns: vars.parsed("DB_MAX_OPEN_CONNS", 10)?,
            max_idle_conns: vars.parsed("DB_MAX_IDLE_CONNS", 2)?,
            conn_max_lifetime: vars.seconds("DB_CONN_MAX_LIFETIME", 1800)?,
            acquire_timeout: vars.seconds("DB_ACQUIRE_TIMEOUT", 3)?,
        };

        let defaults = ServiceConfig::default();
        let service = ServiceConfig {
            operation_timeout: vars.seconds("SERVICE_TIMEOUT", defaults.operation_timeout.as_secs())?,
            hash_cost: vars.parsed("BCRYPT_COST", defaults.hash_cost)?,
        };

        let log = LogConfig {
            level: vars.string("LOG_LEVEL", "info"),
        };

        Ok(Self {
            server,
            database,
            log,
            service,
        })
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key,
                value: raw.clone(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn seconds(&self, key: &'static str, default: u64) -> Result<Duration, ConfigError> {
        self.parsed(key, default).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.read_timeout, Duration::from_secs(10));
        assert_eq!(config.server.write_timeout, Duration::from_secs(10));
        assert_eq!(config.server.mode, RunMode::Debug);
        assert_eq!(config.database.host, "localhost");
        assert_eq!(config.database.port, 5432);
        assert_eq!(config.database.name, "gin_crud");
        assert_eq!(config.database.password.expose_secret(), "postgres");
        assert!(matches!(config.database.ssl_mode, PgSslMode::Disable));
        assert_eq!(config.log.level, "info");
        assert_eq!(config.service.operation_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("SERVER_PORT", "9090"),
            ("SERVER_WRITE_TIMEOUT", "30"),
            ("GIN_MODE", "release"),
            ("DB_HOST", "db"),
            ("DB_SSLMODE", "require"),
            ("DB_MAX_OPEN_CONNS", "25"),
            ("LOG_LEVEL", "debug"),
            ("BCRYPT_COST", "4"),
        ])
        .unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.write_timeout, Duration::from_secs(30));
        assert_eq!(config.server.mode, RunMode::Release);
        assert_eq!(config.database.host, "db");
        assert!(matches!(config.database.ssl_mode, PgSslMode::Require));
        assert_eq!(config.database.max_open_conns, 25);
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.service.hash_cost, 4);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = load(&[("SERVER_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("SERVER_PORT"));
    }

    #[test]
    fn test_invalid_mode_is_rejected() {
        assert!(load(&[("GIN_MODE", "turbo")]).is_err());
    }

    #[test]
    fn test_pool_config_caps_idle_at_open() {
        let config = load(&[("DB_MAX_OPEN_CONNS", "3"), ("DB_MAX_IDLE_CONNS", "8")]).unwrap();
        let pool = config.database.pool_config();
        assert_eq!(pool.max_connections, 3);
        assert_eq!(pool.min_connections, 3);
    }

    #[test]
    fn test_database_url_overrides_fields() {
        let config = load(&[("DATABASE_URL", "postgres://app:pw@db.internal:6543/shop")]).unwrap();
        let options = config.database.connect_options().unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("shop"));
    }
}
