//! Pool error types.

use thiserror::Error;

/// Errors from connection pools and their settings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// No configuration was registered under the alias.
    #[error("no connection config registered for alias '{0}'")]
    UnknownAlias(String),

    /// The alias has a configuration but was never connected.
    #[error("no connection established for alias '{0}'")]
    NotConnected(String),

    /// The database driver name is not supported.
    #[error("unsupported database driver '{0}', expected 'mysql' or 'postgres'")]
    UnsupportedDriver(String),

    /// The connector failed to establish or verify a connection.
    #[error("failed to connect [{alias}]: {reason}")]
    Connect {
        /// Alias being connected
        alias: String,
        /// Connector's error message
        reason: String,
    },
}

impl PoolError {
    /// Creates a [`PoolError::Connect`] from any displayable error.
    pub fn connect(alias: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Connect {
            alias: alias.into(),
            reason: reason.to_string(),
        }
    }
}
