//! Route registration errors.

use thiserror::Error;

/// Errors raised while parsing a route pattern.
///
/// These surface at registration time, never during lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The pattern does not start with `/`.
    #[error("route pattern '{pattern}' must start with '/'")]
    MissingLeadingSlash {
        /// The offending pattern
        pattern: String,
    },

    /// A parameter segment has no name (`/users/:`).
    #[error("route pattern '{pattern}' has a parameter segment without a name")]
    EmptyParamName {
        /// The offending pattern
        pattern: String,
    },

    /// The same parameter name appears twice.
    #[error("route pattern '{pattern}' binds parameter '{name}' more than once")]
    DuplicateParam {
        /// The offending pattern
        pattern: String,
        /// The repeated parameter name
        name: String,
    },
}
