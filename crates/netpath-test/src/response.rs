//! Collected responses with assertion helpers.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, StatusCode};
use http_body_util::BodyExt;
use netpath_core::Response;
use serde::de::DeserializeOwned;

use crate::error::TestError;

/// A fully collected response.
#[derive(Debug, Clone)]
pub struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl TestResponse {
    /// Collects `response` into memory.
    pub async fn from_http(response: Response) -> Result<Self, TestError> {
        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|err| TestError::BodyRead(err.to_string()))?
            .to_bytes();
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header as a string, if present and visible ASCII.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(CONTENT_TYPE.as_str())
    }

    /// Raw body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> Result<String, TestError> {
        Ok(String::from_utf8(self.body.to_vec())?)
    }

    /// Body decoded as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body decoded as an untyped JSON value.
    pub fn json_value(&self) -> Result<serde_json::Value, TestError> {
        self.json()
    }

    /// Panics unless the status equals `expected`.
    #[track_caller]
    pub fn assert_status(&self, expected: StatusCode) -> &Self {
        assert_eq!(
            self.status,
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Panics unless the numeric status equals `expected`.
    #[track_caller]
    pub fn assert_status_code(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status.as_u16(),
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }

    /// Panics unless header `name` equals `expected`.
    #[track_caller]
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(self.header_str(name), Some(expected), "header {name}");
        self
    }

    /// Panics unless the body equals `expected`.
    #[track_caller]
    pub fn assert_body_eq(&self, expected: &str) -> &Self {
        assert_eq!(String::from_utf8_lossy(&self.body), expected);
        self
    }

    /// Panics unless the body is JSON equal to `expected`.
    #[track_caller]
    pub fn assert_json_eq(&self, expected: &serde_json::Value) -> &Self {
        match self.json_value() {
            Ok(actual) => assert_eq!(&actual, expected),
            Err(err) => panic!(
                "body is not json ({err}): {}",
                String::from_utf8_lossy(&self.body)
            ),
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;

    fn response(status: StatusCode, body: &'static str) -> Response {
        let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, http::HeaderValue::from_static("application/json"));
        response
    }

    #[tokio::test]
    async fn test_collects_and_decodes() {
        let collected = TestResponse::from_http(response(StatusCode::CREATED, r#"{"code":201}"#))
            .await
            .unwrap();

        collected
            .assert_status(StatusCode::CREATED)
            .assert_status_code(201)
            .assert_header("content-type", "application/json")
            .assert_json_eq(&serde_json::json!({ "code": 201 }));
        assert_eq!(collected.content_type(), Some("application/json"));
        assert_eq!(collected.text().unwrap(), r#"{"code":201}"#);
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let collected = TestResponse::from_http(response(StatusCode::OK, "plain"))
            .await
            .unwrap();
        assert!(matches!(collected.json_value(), Err(TestError::Json(_))));
    }

    #[tokio::test]
    #[should_panic(expected = "unexpected status")]
    async fn test_assert_status_panics() {
        let collected = TestResponse::from_http(response(StatusCode::OK, "{}"))
            .await
            .unwrap();
        collected.assert_status(StatusCode::NOT_FOUND);
    }
}
