//! In-memory client that dispatches straight into an [`App`].

use std::net::SocketAddr;

use http::Method;
use netpath_server::App;

use crate::request::TestClientRequest;

/// Sends requests to an [`App`] without binding a socket.
///
/// Requests run the full global, group and route middleware chains.
///
/// ```rust
/// use netpath_core::{Context, Handler};
/// use netpath_server::AppBuilder;
/// use netpath_test::TestClient;
///
/// # tokio_test::block_on(async {
/// let mut builder = AppBuilder::new();
/// builder
///     .get(
///         "/ping",
///         Handler::new(|ctx: &mut Context| Box::pin(async move { ctx.success("pong") })),
///     )
///     .unwrap();
///
/// let client = TestClient::new(builder.build());
/// let response = client.get("/ping").send().await.unwrap();
/// response.assert_status_code(200);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TestClient {
    app: App,
    default_headers: Vec<(String, String)>,
    remote_addr: Option<SocketAddr>,
}

impl TestClient {
    /// Creates a client for `app`.
    #[must_use]
    pub fn new(app: App) -> Self {
        Self {
            app,
            default_headers: Vec::new(),
            remote_addr: None,
        }
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// Sets the peer address every request appears to come from.
    #[must_use]
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// The app under test.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Starts a request with an arbitrary method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        let mut request = TestClientRequest::new(&self.app, method, uri.into());
        for (name, value) in &self.default_headers {
            request = request.header(name, value);
        }
        if let Some(addr) = self.remote_addr {
            request = request.remote_addr(addr);
        }
        request
    }

    /// Starts a `GET` request.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a `POST` request.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a `PUT` request.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a `PATCH` request.
    pub fn patch(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a `DELETE` request.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts an `OPTIONS` request.
    pub fn options(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::OPTIONS, uri)
    }
}
