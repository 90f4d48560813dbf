//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `database` - MySQL connection and pool configuration
//! - `environment` - Environment detection
//! - `logging` - Log filter and format
//! - `server` - HTTP server and CORS configuration
//!
//! [`AppConfig::load`] layers, lowest precedence first: per-environment
//! defaults (seeded from the flat `DATABASE_*` variables), an optional
//! TOML file named by [`Environment::config_file`], and `MC__`-prefixed
//! environment variables such as `MC__DATABASE__MAX_OPEN_CONNECTIONS`.

pub mod database;
pub mod environment;
pub mod logging;
pub mod server;

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Re-export commonly used types
pub use database::{DatabaseConfig, Network};
pub use environment::Environment;
pub use logging::{LogFormat, LoggingConfig};
pub use server::{CorsConfig, ServerConfig};

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// CORS configuration
    #[serde(default)]
    pub cors: CorsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_environment(Environment::default())
    }
}

impl AppConfig {
    /// Built-in defaults for an environment
    pub fn for_environment(environment: Environment) -> Self {
        let server = match environment {
            Environment::Development => ServerConfig::new("127.0.0.1", 8080),
            _ => ServerConfig::default(),
        };

        Self {
            environment,
            server,
            database: DatabaseConfig::from_env(),
            cors: CorsConfig::default(),
            logging: LoggingConfig::for_environment(environment),
        }
    }

    /// Load configuration for the current environment
    ///
    /// Reads `.env` if present, then looks for the environment's TOML file
    /// in the working directory.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let environment = Environment::from_env();
        Self::load_with(environment, Path::new(&environment.config_file()))
    }

    /// Load configuration from an explicit file (which may be absent)
    pub fn load_with(environment: Environment, file: &Path) -> Result<Self, ConfigError> {
        let defaults = config::Config::try_from(&Self::for_environment(environment))?;

        let loaded: AppConfig = config::Config::builder()
            .add_source(defaults)
            .add_source(config::File::from(file).required(false))
            .add_source(
                config::Environment::with_prefix("MC")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Validate cross-cutting settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.database.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("mc-config-does-not-exist.toml");
        let config = AppConfig::load_with(Environment::Development, &path).unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let path = std::env::temp_dir().join(format!("mc-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[server]
host = "0.0.0.0"
port = 9090

[database]
host = "db.internal"
port = 3307
username = "app"
database = "shop"
max_open_connections = 8
max_lifetime = 30
"#
        )
        .unwrap();

        let config = AppConfig::load_with(Environment::Production, &path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.max_open_connections, 8);
        assert_eq!(config.database.max_lifetime, 30);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_invalid_ceiling_is_rejected() {
        let path = std::env::temp_dir().join(format!("mc-config-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "[database]\nmax_open_connections = 0\n").unwrap();

        let result = AppConfig::load_with(Environment::Development, &path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
