//! Server errors.

use thiserror::Error;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address does not parse.
    #[error("invalid listen address '{addr}': {reason}")]
    InvalidAddress {
        /// The rejected address
        addr: String,
        /// Parse failure
        reason: String,
    },

    /// The listener could not bind.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: std::net::SocketAddr,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}
