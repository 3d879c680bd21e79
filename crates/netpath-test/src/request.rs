//! Request builder for [`TestClient`](crate::TestClient).

use std::net::SocketAddr;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::Method;
use netpath_server::App;
use serde::Serialize;

use crate::error::TestError;
use crate::response::TestResponse;

/// A request being built against an app.
///
/// Builder errors are kept until [`send`](Self::send), which reports the
/// first one.
#[must_use]
#[derive(Debug)]
pub struct TestClientRequest<'a> {
    app: &'a App,
    method: Method,
    uri: String,
    query: Vec<(String, String)>,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    error: Option<TestError>,
}

impl<'a> TestClientRequest<'a> {
    pub(crate) fn new(app: &'a App, method: Method, uri: String) -> Self {
        Self {
            app,
            method,
            uri,
            query: Vec::new(),
            headers: Vec::new(),
            body: Bytes::new(),
            remote_addr: None,
            error: None,
        }
    }

    fn fail(mut self, error: TestError) -> Self {
        self.error.get_or_insert(error);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = match HeaderName::from_bytes(name.as_ref().as_bytes()) {
            Ok(name) => name,
            Err(err) => return self.fail(TestError::InvalidHeader(err.to_string())),
        };
        let value = match HeaderValue::from_str(value.as_ref()) {
            Ok(value) => value,
            Err(err) => return self.fail(TestError::InvalidHeader(err.to_string())),
        };
        self.headers.push((name, value));
        self
    }

    /// Appends a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a raw body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body and `Content-Type: application/json`.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => {
                self.body = Bytes::from(body);
                self.header(CONTENT_TYPE.as_str(), "application/json")
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Sets a URL-encoded form body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(body) => {
                self.body = Bytes::from(body);
                self.header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Sets the peer address the request appears to come from.
    pub fn remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    fn full_uri(&self) -> String {
        if self.query.is_empty() {
            return self.uri.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        let separator = if self.uri.contains('?') { '&' } else { '?' };
        format!("{}{separator}{query}", self.uri)
    }

    /// Dispatches the request and collects the response.
    pub async fn send(self) -> Result<TestResponse, TestError> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut builder = http::Request::builder()
            .method(self.method.clone())
            .uri(self.full_uri());
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let request = builder
            .body(self.body.clone())
            .map_err(|err| TestError::RequestBuild(err.to_string()))?;

        let response = self.app.dispatch(request, self.remote_addr).await;
        TestResponse::from_http(response).await
    }
}

