//! Root configuration type.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use netpath_middleware::stages::CorsConfig;
use netpath_pool::{CacheConfig, DatabaseConfig};
use netpath_telemetry::LogFormat;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, FormsConfig, LoggingConfig, MetricsConfig, ServerConfig};

/// Complete Netpath service configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use netpath_config::NetpathConfig;
///
/// let config = NetpathConfig::default();
/// assert_eq!(config.server.http_addr, "0.0.0.0:8080");
/// assert!(config.databases.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct NetpathConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// CORS settings for the `cors` middleware.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Form binding settings.
    #[serde(default)]
    pub forms: FormsConfig,

    /// Relational databases by alias.
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,

    /// Caches by alias.
    #[serde(default)]
    pub caches: BTreeMap<String, CacheConfig>,
}

impl NetpathConfig {
    /// Validates cross-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.http_addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.metrics.enabled && self.metrics.addr.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::invalid_value(
                "metrics.addr",
                format!("invalid socket address: {}", self.metrics.addr),
            ));
        }

        if self.cors.allow_origins.is_empty() {
            return Err(ConfigError::invalid_value(
                "cors.allow_origins",
                "at least one origin (or \"*\") is required",
            ));
        }

        for (alias, database) in &self.databases {
            if database.host.is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("databases.{alias}.host"),
                    "must not be empty",
                ));
            }
            if database.port == 0 {
                return Err(ConfigError::invalid_value(
                    format!("databases.{alias}.port"),
                    "must be greater than zero",
                ));
            }
        }

        for (alias, cache) in &self.caches {
            if cache.addr.is_empty() {
                return Err(ConfigError::invalid_value(
                    format!("caches.{alias}.addr"),
                    "must not be empty",
                ));
            }
        }

        Ok(())
    }

    /// Development preset: pretty debug logs with source locations, no
    /// metrics listener.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config.metrics.enabled = false;
        config
    }

    /// Production preset: JSON logs at `info`.
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();
        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpath_pool::{DatabaseDriver, PoolLimits};

    fn database(host: &str, port: u16) -> DatabaseConfig {
        DatabaseConfig {
            driver: DatabaseDriver::Mysql,
            host: host.to_string(),
            port,
            user: "svc".to_string(),
            password: String::new(),
            name: "app".to_string(),
            limits: PoolLimits::default(),
        }
    }

    #[test]
    fn test_default_is_valid() {
        assert!(NetpathConfig::default().validate().is_ok());
    }

    #[test]
    fn test_presets() {
        let dev = NetpathConfig::development();
        assert_eq!(dev.logging.format, LogFormat::Pretty);
        assert!(!dev.metrics.enabled);
        assert!(dev.validate().is_ok());

        let prod = NetpathConfig::production();
        assert_eq!(prod.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_server_addr() {
        let mut config = NetpathConfig::default();
        config.server.http_addr = "not-an-address".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.http_addr"));
    }

    #[test]
    fn test_metrics_addr_ignored_when_disabled() {
        let mut config = NetpathConfig::default();
        config.metrics.enabled = false;
        config.metrics.addr = "nowhere".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_validation_names_alias() {
        let mut config = NetpathConfig::default();
        config.databases.insert("main".to_string(), database("db", 3306));
        assert!(config.validate().is_ok());

        config.databases.insert("replica".to_string(), database("db", 0));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("databases.replica.port"));
    }

    #[test]
    fn test_empty_cors_origins_rejected() {
        let mut config = NetpathConfig::default();
        config.cors.allow_origins.clear();
        assert!(config.validate().is_err());
    }
}
