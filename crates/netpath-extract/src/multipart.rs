//! Uploaded file extraction from `multipart/form-data` bodies.

use std::io;

use bytes::Bytes;
use http::header::{HeaderMap, CONTENT_TYPE};

use crate::BindError;

/// Configuration for multipart parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultipartConfig {
    /// Maximum total body size in bytes (default 32 MB).
    pub max_body_size: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_body_size: 32 * 1024 * 1024,
        }
    }
}

/// A file part taken from a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Name of the form field that carried the file
    pub field_name: String,
    /// File name sent by the client
    pub file_name: String,
    /// Content type sent by the client
    pub content_type: Option<String>,
    /// File contents
    pub data: Bytes,
}

impl UploadedFile {
    /// File size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true for an empty file.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Extension of the client file name, if any.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}

/// Finds the first file uploaded under `field`.
///
/// Parts without a file name are plain form values and are skipped.
pub async fn find_file(
    headers: &HeaderMap,
    body: Bytes,
    field: &str,
    config: MultipartConfig,
) -> Result<UploadedFile, BindError> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        BindError::UnsupportedMediaType {
            expected: "multipart/form-data",
            actual: if content_type.is_empty() {
                "none".to_owned()
            } else {
                content_type.to_owned()
            },
        }
    })?;

    if body.len() > config.max_body_size {
        return Err(BindError::PayloadTooLarge {
            max: config.max_body_size,
            actual: body.len(),
        });
    }

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    while let Some(part) = multipart.next_field().await? {
        if part.name() != Some(field) {
            continue;
        }
        let Some(file_name) = part.file_name().map(str::to_owned) else {
            continue;
        };
        let content_type = part.content_type().map(ToString::to_string);
        let data = part.bytes().await?;

        return Ok(UploadedFile {
            field_name: field.to_owned(),
            file_name,
            content_type,
            data,
        });
    }

    Err(BindError::MissingFile(field.to_owned()))
}
