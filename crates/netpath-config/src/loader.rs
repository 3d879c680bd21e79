//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use netpath_core::FormCoercion;
use netpath_pool::DatabaseDriver;
use netpath_telemetry::LogFormat;

use crate::{ConfigError, NetpathConfig};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (built into the code)
/// 2. Configuration file (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use netpath_config::ConfigLoader;
///
/// # fn main() -> Result<(), netpath_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("netpath.toml")?
///     .with_env_prefix("NETPATH")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: NetpathConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: NetpathConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = NetpathConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// ```
    /// use netpath_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = NetpathConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = NetpathConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format (TOML or JSON) follows the file extension. Sections the
    /// file omits take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing, unreadable, malformed
    /// or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be loaded.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`toml` or `json`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails.
    ///
    /// # Example
    ///
    /// ```
    /// use netpath_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [server]
    ///     http_addr = "127.0.0.1:3000"
    ///
    ///     [forms]
    ///     coercion = "lenient"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => {
                return Err(ConfigError::validation_error(format!(
                    "unsupported configuration format: {format}"
                )))
            }
        };
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `NETPATH__SERVER__HTTP_ADDR=0.0.0.0:9000` or
    /// `NETPATH__DATABASES__MAIN__PASSWORD=secret`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply environment overrides (if a prefix was set), validate and
    /// return the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation
    /// fails.
    pub fn load(mut self) -> Result<NetpathConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Return the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> NetpathConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<NetpathConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::validation_error(format!(
                "unsupported configuration file format: {}",
                path.display()
            ))),
        }
    }

    fn apply_env_vars<I>(&mut self, prefix: &str, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let marker = format!("{prefix}__");
        for (key, value) in vars {
            if key.starts_with(&marker) {
                self.apply_env_var(&key, &value, prefix)?;
            }
        }
        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            // Server section
            ["SERVER", "HTTP_ADDR"] => {
                self.config.server.http_addr = value.to_string();
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                self.config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                self.config.server.request_timeout_ms = parse_number(key, value)?;
            }

            // Logging section
            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_flag(key, value)?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_flag(key, value)?;
            }

            // Metrics section
            ["METRICS", "ENABLED"] => {
                self.config.metrics.enabled = parse_flag(key, value)?;
            }
            ["METRICS", "ADDR"] => {
                self.config.metrics.addr = value.to_string();
            }

            // CORS section
            ["CORS", "ALLOW_ORIGINS"] => {
                self.config.cors.allow_origins = parse_list(value);
            }
            ["CORS", "ALLOW_METHODS"] => {
                self.config.cors.allow_methods = parse_list(value);
            }
            ["CORS", "ALLOW_HEADERS"] => {
                self.config.cors.allow_headers = parse_list(value);
            }
            ["CORS", "ALLOW_CREDENTIALS"] => {
                self.config.cors.allow_credentials = parse_flag(key, value)?;
            }

            // Forms section
            ["FORMS", "COERCION"] => {
                self.config.forms.coercion = match value.to_lowercase().as_str() {
                    "strict" => FormCoercion::Strict,
                    "lenient" => FormCoercion::Lenient,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'strict' or 'lenient'",
                        ))
                    }
                };
            }

            // Databases by alias; the alias must already be configured
            ["DATABASES", alias, field] => {
                let alias = alias.to_lowercase();
                let database = self.config.databases.get_mut(&alias).ok_or_else(|| {
                    ConfigError::env_parse_error(key, format!("no database alias '{alias}'"))
                })?;
                match *field {
                    "DRIVER" => {
                        database.driver = value
                            .parse::<DatabaseDriver>()
                            .map_err(|e| ConfigError::env_parse_error(key, e.to_string()))?;
                    }
                    "HOST" => database.host = value.to_string(),
                    "PORT" => database.port = parse_number(key, value)?,
                    "USER" => database.user = value.to_string(),
                    "PASSWORD" => database.password = value.to_string(),
                    "NAME" => database.name = value.to_string(),
                    _ => {}
                }
            }

            // Caches by alias
            ["CACHES", alias, field] => {
                let alias = alias.to_lowercase();
                let cache = self.config.caches.get_mut(&alias).ok_or_else(|| {
                    ConfigError::env_parse_error(key, format!("no cache alias '{alias}'"))
                })?;
                match *field {
                    "ADDR" => cache.addr = value.to_string(),
                    "USERNAME" => cache.username = value.to_string(),
                    "PASSWORD" => cache.password = value.to_string(),
                    "DB" => cache.db = parse_number(key, value)?,
                    "POOL_SIZE" => cache.pool_size = parse_number(key, value)?,
                    _ => {}
                }
            }

            // Unknown keys are ignored
            _ => {}
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    const WITH_DATABASE: &str = r#"
        [databases.main]
        driver = "mysql"
        host = "localhost"
        port = 3306
        user = "svc"
        name = "app"

        [caches.session]
        addr = "localhost:6379"
    "#;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_with_development() {
        let config = ConfigLoader::new().with_development().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json =
            r#"{"server": {"http_addr": "127.0.0.1:3000"}, "forms": {"coercion": "lenient"}}"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.server.http_addr, "127.0.0.1:3000");
        assert_eq!(config.forms.coercion, FormCoercion::Lenient);
    }

    #[test]
    fn test_loader_rejects_unknown_section() {
        let result = ConfigLoader::new().with_string("[contract]\nenabled = true", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_rejects_unsupported_driver() {
        let toml = WITH_DATABASE.replace("\"mysql\"", "\"sqlite\"");
        let err = ConfigLoader::new().with_string(&toml, "toml").unwrap_err();
        assert!(err.to_string().contains("unsupported database driver"));
    }

    #[test]
    fn test_loader_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server]\nrequest_timeout_ms = 500").unwrap();

        let config = ConfigLoader::new()
            .with_file(file.path())
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.request_timeout_ms, 500);
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_loader_with_file_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        let result = ConfigLoader::new().with_file(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/netpath.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/netpath.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.server.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_env_overrides_sections() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_vars(
                "TEST",
                vars(&[
                    ("TEST__SERVER__HTTP_ADDR", "192.168.1.1:9000"),
                    ("TEST__LOGGING__FORMAT", "pretty"),
                    ("TEST__METRICS__ENABLED", "off"),
                    ("TEST__CORS__ALLOW_ORIGINS", "https://a.example, https://b.example"),
                    ("TEST__FORMS__COERCION", "lenient"),
                    ("OTHER__SERVER__HTTP_ADDR", "ignored"),
                ]),
            )
            .unwrap();

        let config = loader.load_unvalidated();
        assert_eq!(config.server.http_addr, "192.168.1.1:9000");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(!config.metrics.enabled);
        assert_eq!(
            config.cors.allow_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert_eq!(config.forms.coercion, FormCoercion::Lenient);
    }

    #[test]
    fn test_env_overrides_database_and_cache_aliases() {
        let mut loader = ConfigLoader::new().with_string(WITH_DATABASE, "toml").unwrap();
        loader
            .apply_env_vars(
                "TEST",
                vars(&[
                    ("TEST__DATABASES__MAIN__PASSWORD", "s3cret"),
                    ("TEST__DATABASES__MAIN__DRIVER", "postgres"),
                    ("TEST__CACHES__SESSION__POOL_SIZE", "32"),
                ]),
            )
            .unwrap();

        let config = loader.load_unvalidated();
        let main = &config.databases["main"];
        assert_eq!(main.password, "s3cret");
        assert_eq!(main.driver, DatabaseDriver::Postgres);
        assert_eq!(config.caches["session"].pool_size, 32);
    }

    #[test]
    fn test_env_unknown_alias() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__DATABASES__GHOST__HOST", "db", "TEST");
        assert!(matches!(result, Err(ConfigError::EnvParseError { .. })));
    }

    #[test]
    fn test_env_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(loader
            .apply_env_var("TEST__SERVER__REQUEST_TIMEOUT_MS", "soon", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__METRICS__ENABLED", "maybe", "TEST")
            .is_err());
        assert!(loader
            .apply_env_var("TEST__FORMS__COERCION", "loose", "TEST")
            .is_err());
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
