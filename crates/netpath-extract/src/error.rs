//! Binding error types.

use netpath_core::Faults;
use thiserror::Error;

/// Error raised while binding a request body.
///
/// Field-level failures keep their [`Faults`] as the error source, so
/// reporting the error with `ctx.bad_input(err)` renders the per-field map.
///
/// # Example
///
/// ```rust
/// use netpath_extract::BindError;
///
/// let err = BindError::PayloadTooLarge { max: 10, actual: 20 };
/// assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
/// assert!(err.to_string().contains("20"));
/// ```
#[derive(Debug, Error)]
pub enum BindError {
    /// The body was empty where a document was expected.
    #[error("request body is empty")]
    EmptyBody,

    /// The body exceeds the binder's limit.
    #[error("payload too large: max {max} bytes, got {actual} bytes")]
    PayloadTooLarge {
        /// Limit in bytes
        max: usize,
        /// Actual body size in bytes
        actual: usize,
    },

    /// The body is not valid JSON for the target type.
    #[error("failed to decode json body: {0}")]
    Json(#[from] serde_json::Error),

    /// The body or query string is not valid URL-encoded data.
    #[error("failed to decode form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),

    /// One or more form values could not be parsed as their declared kind.
    #[error("invalid form values")]
    Coercion(#[source] Faults),

    /// The decoded value failed validation.
    #[error("validation failed")]
    Validation(#[source] Faults),

    /// The request does not carry the expected content type.
    #[error("unsupported content type: expected '{expected}', got '{actual}'")]
    UnsupportedMediaType {
        /// Expected media type
        expected: &'static str,
        /// Received media type, or `none`
        actual: String,
    },

    /// No uploaded file exists under the requested field.
    #[error("no file uploaded under field '{0}'")]
    MissingFile(String),

    /// The multipart body could not be parsed.
    #[error("malformed multipart body: {0}")]
    Multipart(#[from] multer::Error),
}

impl BindError {
    /// Machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyBody => "EMPTY_BODY",
            Self::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            Self::Json(_) | Self::Form(_) | Self::Multipart(_) => "DESERIALIZATION_FAILED",
            Self::Coercion(_) => "INVALID_FORM_VALUE",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            Self::MissingFile(_) => "MISSING_FILE",
        }
    }

    /// The field faults, for coercion and validation failures.
    #[must_use]
    pub fn faults(&self) -> Option<&Faults> {
        match self {
            Self::Coercion(faults) | Self::Validation(faults) => Some(faults),
            _ => None,
        }
    }
}
