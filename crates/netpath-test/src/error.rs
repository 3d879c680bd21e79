//! Test client errors.

use thiserror::Error;

/// Errors raised while building a request or reading a response.
#[derive(Debug, Error)]
pub enum TestError {
    /// The request could not be assembled.
    #[error("request build error: {0}")]
    RequestBuild(String),

    /// A header name or value is invalid.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// The response body is not UTF-8.
    #[error("response body is not utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Form encoding failed.
    #[error("form error: {0}")]
    Form(#[from] serde_urlencoded::ser::Error),

    /// The response body could not be collected.
    #[error("body read error: {0}")]
    BodyRead(String),
}
