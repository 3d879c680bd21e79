//! CORS (Cross-Origin Resource Sharing) headers and preflight handling.
//!
//! Every response gets:
//!
//! - `Access-Control-Allow-Origin`: `*`, or the request's `Origin` when it
//!   is on the allow list (with `Vary: Origin`)
//! - `Access-Control-Allow-Methods`
//! - `Access-Control-Allow-Headers`
//! - `Access-Control-Allow-Credentials`
//!
//! `OPTIONS` requests are answered with `204 No Content` and never reach
//! the handler.
//!
//! ## Example
//!
//! ```
//! use netpath_middleware::stages::{cors, CorsConfig};
//!
//! let config = CorsConfig::default()
//!     .with_origins(["https://app.example.com"])
//!     .with_credentials(true);
//! let middleware = cors(&config);
//! assert_eq!(middleware.name(), "cors");
//! ```

use std::sync::Arc;

use http::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
    ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
};
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};

use crate::Middleware;

const ANY_ORIGIN: &str = "*";

/// CORS settings, loadable from the `[cors]` configuration section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins. `*` allows every origin.
    pub allow_origins: Vec<String>,
    /// Allowed methods.
    pub allow_methods: Vec<String>,
    /// Allowed request headers.
    pub allow_headers: Vec<String>,
    /// Whether credentials are allowed.
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origins: vec![ANY_ORIGIN.to_owned()],
            allow_methods: ["GET", "POST", "OPTIONS"].map(String::from).to_vec(),
            allow_headers: ["Origin", "Content-Type", "Accept", "Authorization"]
                .map(String::from)
                .to_vec(),
            allow_credentials: false,
        }
    }
}

impl CorsConfig {
    /// Replaces the allowed origins.
    #[must_use]
    pub fn with_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_origins = origins.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allowed methods.
    #[must_use]
    pub fn with_methods<I>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = Method>,
    {
        self.allow_methods = methods.into_iter().map(|m| m.as_str().to_owned()).collect();
        self
    }

    /// Replaces the allowed request headers.
    #[must_use]
    pub fn with_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allow_headers = headers.into_iter().map(Into::into).collect();
        self
    }

    /// Sets whether credentials are allowed.
    #[must_use]
    pub fn with_credentials(mut self, allow: bool) -> Self {
        self.allow_credentials = allow;
        self
    }

    /// Returns true if every origin is allowed.
    #[must_use]
    pub fn allows_any_origin(&self) -> bool {
        self.allow_origins.iter().any(|origin| origin == ANY_ORIGIN)
    }

    /// Returns true if `origin` is allowed.
    #[must_use]
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allows_any_origin() || self.allow_origins.iter().any(|allowed| allowed == origin)
    }
}

/// Header values computed once per middleware instance.
#[derive(Debug)]
struct CorsPolicy {
    config: CorsConfig,
    any_origin: bool,
    methods: Option<HeaderValue>,
    headers: Option<HeaderValue>,
    credentials: HeaderValue,
}

impl CorsPolicy {
    fn new(config: &CorsConfig) -> Self {
        Self {
            any_origin: config.allows_any_origin(),
            methods: joined("allow_methods", &config.allow_methods),
            headers: joined("allow_headers", &config.allow_headers),
            credentials: HeaderValue::from_static(if config.allow_credentials {
                "true"
            } else {
                "false"
            }),
            config: config.clone(),
        }
    }

    fn allow_origin(&self, request: &HeaderMap) -> Option<HeaderValue> {
        if self.any_origin {
            return Some(HeaderValue::from_static(ANY_ORIGIN));
        }
        let origin = request.get(ORIGIN)?;
        let allowed = origin
            .to_str()
            .is_ok_and(|origin| self.config.is_origin_allowed(origin));
        allowed.then(|| origin.clone())
    }

    fn apply(&self, allow_origin: Option<HeaderValue>, response: &mut HeaderMap) {
        if let Some(origin) = allow_origin {
            response.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin);
            if !self.any_origin {
                response.append(VARY, HeaderValue::from_static("Origin"));
            }
        }
        if let Some(methods) = &self.methods {
            response.insert(ACCESS_CONTROL_ALLOW_METHODS, methods.clone());
        }
        if let Some(headers) = &self.headers {
            response.insert(ACCESS_CONTROL_ALLOW_HEADERS, headers.clone());
        }
        response.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, self.credentials.clone());
    }
}

fn joined(field: &str, values: &[String]) -> Option<HeaderValue> {
    match HeaderValue::from_str(&values.join(", ")) {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(field, "ignoring CORS setting that is not a valid header value");
            None
        }
    }
}

/// Adds CORS headers to every response and answers `OPTIONS` with 204.
pub fn cors(config: &CorsConfig) -> Middleware {
    let policy = Arc::new(CorsPolicy::new(config));
    Middleware::around("cors", move |ctx, next| {
        let policy = Arc::clone(&policy);
        Box::pin(async move {
            let allow_origin = policy.allow_origin(ctx.headers());
            policy.apply(allow_origin, ctx.response_headers_mut());

            if ctx.method() == Method::OPTIONS {
                // Nothing else has run, so this is the first write.
                let _ = ctx.empty(StatusCode::NO_CONTENT);
                return Ok(());
            }
            next.call(ctx).await
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use netpath_core::{Context, Handler, HandlerResult};

    async fn must_not_run(_ctx: &mut Context) -> HandlerResult {
        panic!("handler must not run for preflight")
    }

    fn ok_handler() -> Handler {
        Handler::new(|ctx: &mut Context| Box::pin(async move { ctx.success("ok") }))
    }

    async fn run(config: &CorsConfig, request: http::Request<Bytes>) -> netpath_core::Response {
        let handler = cors(config).wrap(ok_handler());
        let mut ctx = Context::for_request(request);
        handler.call(&mut ctx).await.unwrap();
        ctx.into_response()
    }

    #[test]
    fn test_default_config() {
        let config = CorsConfig::default();
        assert!(config.allows_any_origin());
        assert_eq!(config.allow_methods, vec!["GET", "POST", "OPTIONS"]);
        assert_eq!(
            config.allow_headers,
            vec!["Origin", "Content-Type", "Accept", "Authorization"]
        );
        assert!(!config.allow_credentials);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: CorsConfig = from_json(r#"{"allow_credentials": true}"#);
        assert!(config.allow_credentials);
        assert!(config.allows_any_origin());
    }

    fn from_json(json: &str) -> CorsConfig {
        serde_json::from_str(json).unwrap()
    }

    #[tokio::test]
    async fn test_wildcard_origin_headers() {
        let request = http::Request::get("/")
            .header(ORIGIN, "https://a.example")
            .body(Bytes::new())
            .unwrap();
        let response = run(&CorsConfig::default(), request).await;

        let headers = response.headers();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, OPTIONS");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_HEADERS],
            "Origin, Content-Type, Accept, Authorization"
        );
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "false");
        assert!(headers.get(VARY).is_none());
    }

    #[tokio::test]
    async fn test_listed_origin_is_echoed() {
        let config = CorsConfig::default()
            .with_origins(["https://a.example", "https://b.example"])
            .with_credentials(true);
        let request = http::Request::get("/")
            .header(ORIGIN, "https://b.example")
            .body(Bytes::new())
            .unwrap();
        let response = run(&config, request).await;

        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://b.example");
        assert_eq!(headers[VARY], "Origin");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[tokio::test]
    async fn test_unlisted_origin_gets_no_allow_origin() {
        let config = CorsConfig::default().with_origins(["https://a.example"]);
        let request = http::Request::get("/")
            .header(ORIGIN, "https://evil.example")
            .body(Bytes::new())
            .unwrap();
        let response = run(&config, request).await;

        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_METHODS).is_some());
    }

    #[tokio::test]
    async fn test_preflight_short_circuits() {
        let request = http::Request::options("/users")
            .header(ORIGIN, "https://a.example")
            .body(Bytes::new())
            .unwrap();
        let handler = cors(&CorsConfig::default())
            .wrap(Handler::new(|ctx: &mut Context| Box::pin(must_not_run(ctx))));

        let mut ctx = Context::for_request(request);
        handler.call(&mut ctx).await.unwrap();
        let response = ctx.into_response();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_with_methods() {
        let config = CorsConfig::default().with_methods([Method::GET, Method::DELETE]);
        assert_eq!(config.allow_methods, vec!["GET", "DELETE"]);
    }
}
