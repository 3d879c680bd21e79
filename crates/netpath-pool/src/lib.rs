//! # Netpath Pool
//!
//! Alias-keyed connection management for relational databases and caches.
//!
//! Drivers are not bundled. An application implements [`Connector`] for the
//! client library it uses, registers settings per alias and connects each
//! alias once during startup:
//!
//! ```text
//! add_config("main", cfg) → connect("main") → get("main") from handlers
//! ```
//!
//! [`DatabaseConfig`] and [`CacheConfig`] are the settings the
//! configuration loader reads from the `[databases.*]` and `[caches.*]`
//! sections.

#![doc(html_root_url = "https://docs.rs/netpath-pool/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod pool;
mod settings;

pub use error::PoolError;
pub use pool::{ConnectionPool, Connector};
pub use settings::{CacheConfig, DatabaseConfig, DatabaseDriver, PoolLimits};
