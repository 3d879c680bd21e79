//! Typed configuration for Netpath services.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults → file → env → validate)
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! http_addr = "0.0.0.0:8080"
//! shutdown_timeout_secs = 30
//! request_timeout_ms = 30000
//!
//! [logging]
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! addr = "0.0.0.0:9090"
//!
//! [cors]
//! allow_origins = ["https://app.example.com"]
//! allow_credentials = true
//!
//! [forms]
//! coercion = "strict"
//!
//! [databases.main]
//! driver = "postgres"
//! host = "localhost"
//! port = 5432
//! user = "app"
//! name = "orders"
//!
//! [caches.session]
//! addr = "localhost:6379"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with `PREFIX__SECTION__KEY` variables:
//!
//! - `NETPATH__SERVER__HTTP_ADDR=0.0.0.0:9000`
//! - `NETPATH__LOGGING__LEVEL=debug`
//! - `NETPATH__DATABASES__MAIN__PASSWORD=secret`

#![doc(html_root_url = "https://docs.rs/netpath-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::NetpathConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{FormsConfig, LoggingConfig, MetricsConfig, ServerConfig};
