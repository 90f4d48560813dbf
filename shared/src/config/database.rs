//! Database configuration module

use serde::{Deserialize, Serialize};
use std::env;

use super::ConfigError;

/// Network transport used to reach the MySQL server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// TCP socket (`host:port`)
    Tcp,
    /// Unix domain socket (`host` is the socket path)
    Unix,
}

impl std::str::FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tcp" => Ok(Network::Tcp),
            "unix" | "socket" => Ok(Network::Unix),
            other => Err(ConfigError::Invalid(format!("unknown network: {}", other))),
        }
    }
}

/// Database configuration for MySQL connections
///
/// Supplied once at startup and never mutated afterwards; the pool
/// manager and the schema synchronizer only ever borrow it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Server host name, or the socket path for [`Network::Unix`]
    pub host: String,

    /// Server port (ignored for unix sockets)
    pub port: u16,

    /// Network transport
    #[serde(default = "default_network")]
    pub network: Network,

    /// Account name
    pub username: String,

    /// Account password
    #[serde(default)]
    pub password: String,

    /// Target database (schema) name
    pub database: String,

    /// Pool ceiling: maximum simultaneously open connections
    pub max_open_connections: u32,

    /// Maximum lifetime of a connection in seconds
    pub max_lifetime: u64,

    /// Longest wait for a pooled connection in seconds
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout: u64,

    /// Enable SQL statement logging
    #[serde(default)]
    pub enable_logging: bool,

    /// Slow query threshold in milliseconds
    #[serde(default = "default_slow_query_threshold")]
    pub slow_query_threshold: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 3306,
            network: default_network(),
            username: String::from("root"),
            password: String::new(),
            database: String::from("test"),
            max_open_connections: 100,
            max_lifetime: 100,
            acquire_timeout: default_acquire_timeout(),
            enable_logging: false,
            slow_query_threshold: default_slow_query_threshold(),
        }
    }
}

impl DatabaseConfig {
    /// Create from environment variables
    ///
    /// Unset or unparsable variables fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("DATABASE_HOST").unwrap_or(defaults.host),
            port: parse_env("DATABASE_PORT").unwrap_or(defaults.port),
            network: parse_env("DATABASE_NETWORK").unwrap_or(defaults.network),
            username: env::var("DATABASE_USER").unwrap_or(defaults.username),
            password: env::var("DATABASE_PASSWORD").unwrap_or(defaults.password),
            database: env::var("DATABASE_NAME").unwrap_or(defaults.database),
            max_open_connections: parse_env("DATABASE_MAX_OPEN_CONNECTIONS")
                .unwrap_or(defaults.max_open_connections),
            max_lifetime: parse_env("DATABASE_MAX_LIFETIME").unwrap_or(defaults.max_lifetime),
            acquire_timeout: parse_env("DATABASE_ACQUIRE_TIMEOUT").unwrap_or(defaults.acquire_timeout),
            enable_logging: parse_env("DATABASE_ENABLE_LOGGING").unwrap_or(false),
            slow_query_threshold: defaults.slow_query_threshold,
        }
    }

    /// Create a new database configuration for a host and database
    pub fn new(host: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            database: database.into(),
            ..Default::default()
        }
    }

    /// Set the account credentials
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    /// Set the pool ceiling
    pub fn with_max_open_connections(mut self, max: u32) -> Self {
        self.max_open_connections = max;
        self
    }

    /// Set the maximum connection lifetime in seconds
    pub fn with_max_lifetime(mut self, seconds: u64) -> Self {
        self.max_lifetime = seconds;
        self
    }

    /// Set the longest wait for a pooled connection in seconds
    pub fn with_acquire_timeout(mut self, seconds: u64) -> Self {
        self.acquire_timeout = seconds;
        self
    }

    /// Enable SQL query logging
    pub fn with_logging(mut self, enable: bool) -> Self {
        self.enable_logging = enable;
        self
    }

    /// Maximum connection lifetime as a duration
    pub fn max_lifetime(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.max_lifetime)
    }

    /// Longest wait for a pooled connection as a duration
    pub fn acquire_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.acquire_timeout)
    }

    /// Data source name with the password masked, suitable for logs
    pub fn display_dsn(&self) -> String {
        match self.network {
            Network::Tcp => format!(
                "{}:***@tcp({}:{})/{}",
                self.username, self.host, self.port, self.database
            ),
            Network::Unix => format!("{}:***@unix({})/{}", self.username, self.host, self.database),
        }
    }

    /// Check the settings the pool manager relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_open_connections < 1 {
            return Err(ConfigError::Invalid(
                "max_open_connections must be at least 1".to_string(),
            ));
        }
        if self.acquire_timeout == 0 {
            return Err(ConfigError::Invalid("acquire_timeout must be positive".to_string()));
        }
        if self.max_lifetime == 0 {
            return Err(ConfigError::Invalid("max_lifetime must be positive".to_string()));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("database host is empty".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::Invalid("database name is empty".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn default_network() -> Network {
    Network::Tcp
}

fn default_acquire_timeout() -> u64 {
    30
}

fn default_slow_query_threshold() -> u64 {
    1000 // 1 second
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_settings() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_open_connections, 100);
        assert_eq!(config.max_lifetime(), std::time::Duration::from_secs(100));
        assert_eq!(config.network, Network::Tcp);
        assert_eq!(config.acquire_timeout(), std::time::Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ceiling() {
        let config = DatabaseConfig::default().with_max_open_connections(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_acquire_timeout() {
        let config = DatabaseConfig::default().with_acquire_timeout(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_database() {
        let config = DatabaseConfig::new("db.internal", "  ");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_display_dsn_masks_password() {
        let config = DatabaseConfig::new("db.internal", "shop").with_credentials("app", "s3cret");
        let dsn = config.display_dsn();
        assert_eq!(dsn, "app:***@tcp(db.internal:3306)/shop");
        assert!(!dsn.contains("s3cret"));
    }

    #[test]
    fn test_network_from_str() {
        assert_eq!("TCP".parse::<Network>().unwrap(), Network::Tcp);
        assert_eq!("socket".parse::<Network>().unwrap(), Network::Unix);
        assert!("udp".parse::<Network>().is_err());
    }
}
