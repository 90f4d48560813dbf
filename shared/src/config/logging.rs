//! Log filtering and output format

use serde::{Deserialize, Serialize};

use super::Environment;

/// Output format of the log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
    Compact,
}

/// Logging configuration
///
/// `RUST_LOG`, when set, replaces [`filter_directive`](Self::filter_directive)
/// entirely.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,

    /// Per-target overrides such as `sqlx=warn`
    #[serde(default)]
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: LogFormat::default(),
            directives: Vec::new(),
        }
    }
}

impl LoggingConfig {
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Development => Self {
                level: String::from("debug"),
                format: LogFormat::Pretty,
                // per-connection chatter from the HTTP server
                directives: vec![String::from("actix_server=info")],
            },
            Environment::Staging => Self {
                level: String::from("info"),
                format: LogFormat::Json,
                directives: Vec::new(),
            },
            Environment::Production => Self {
                level: String::from("warn"),
                format: LogFormat::Json,
                // startup and shutdown lines stay visible
                directives: vec![String::from("mc_api=info"), String::from("mc_infra=info")],
            },
        }
    }

    /// `EnvFilter` directive string: the level, then the overrides
    pub fn filter_directive(&self) -> String {
        std::iter::once(self.level.as_str())
            .chain(self.directives.iter().map(String::as_str))
            .map(str::trim)
            .filter(|directive| !directive.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults() {
        let dev = LoggingConfig::for_environment(Environment::Development);
        assert_eq!(dev.level, "debug");
        assert_eq!(dev.format, LogFormat::Pretty);

        let prod = LoggingConfig::for_environment(Environment::Production);
        assert_eq!(prod.format, LogFormat::Json);
        assert_eq!(prod.filter_directive(), "warn,mc_api=info,mc_infra=info");
    }

    #[test]
    fn test_blank_directives_are_skipped() {
        let config = LoggingConfig {
            level: String::from("info"),
            format: LogFormat::Compact,
            directives: vec![String::new(), String::from(" sqlx=warn ")],
        };
        assert_eq!(config.filter_directive(), "info,sqlx=warn");
    }
}
