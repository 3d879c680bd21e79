//! Route registration and request dispatch.
//!
//! Routes are registered on an [`AppBuilder`], optionally through nested
//! [`Group`]s that contribute a path prefix and middleware. `build()`
//! freezes everything into an [`App`], which is cheap to clone and shared
//! across connection tasks without locking.
//!
//! # Example
//!
//! ```rust
//! use netpath_core::{Context, Handler};
//! use netpath_server::AppBuilder;
//!
//! # fn main() -> Result<(), netpath_router::RouteError> {
//! let show = Handler::new(|ctx: &mut Context| {
//!     Box::pin(async move {
//!         let id = ctx.param("id").unwrap_or_default().to_owned();
//!         ctx.success(serde_json::json!({ "id": id }))
//!     })
//! });
//!
//! let mut builder = AppBuilder::new();
//! builder.group("/api", Vec::new()).get("/users/:id", show)?;
//! let app = builder.build();
//! assert_eq!(app.route_count(), 1);
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS};
use http::{Method, StatusCode};
use http_body_util::Full;
use netpath_config::NetpathConfig;
use netpath_core::{
    Context, FormCoercion, Handler, RequestId, Response, Session, SessionError, SessionRegistry,
};
use netpath_middleware::{compose, Middleware};
use netpath_router::{Pattern, RouteError, RouteMatch, RouteTable};

/// Body sent for unregistered routes.
pub const NOT_FOUND_BODY: &str = "404 page not found\n";

/// A registered handler with its frozen middleware chain
/// (group middleware first, then route middleware).
#[derive(Clone)]
struct RouteEntry {
    handler: Handler,
    middleware: Vec<Middleware>,
}

fn register(
    table: &mut RouteTable<RouteEntry>,
    method: Method,
    pattern: String,
    handler: Handler,
    middleware: Vec<Middleware>,
) -> Result<(), RouteError> {
    let pattern = Pattern::parse(pattern)?;
    tracing::debug!(
        method = %method,
        pattern = pattern.as_str(),
        middleware = middleware.len(),
        "route registered"
    );

    let raw = pattern.as_str().to_owned();
    let entry = RouteEntry {
        handler,
        middleware,
    };
    if table.insert(method.clone(), pattern, entry).is_some() {
        tracing::warn!(method = %method, pattern = %raw, "route replaced");
    }
    Ok(())
}

/// Registers routes, groups, global middleware and session types.
pub struct AppBuilder {
    table: RouteTable<RouteEntry>,
    global: Vec<Middleware>,
    sessions: Arc<SessionRegistry>,
    form_coercion: FormCoercion,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AppBuilder {
    /// Creates an empty builder with strict form coercion.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: RouteTable::new(),
            global: Vec::new(),
            sessions: Arc::new(SessionRegistry::new()),
            form_coercion: FormCoercion::default(),
        }
    }

    /// Creates a builder that takes its settings from `config`.
    #[must_use]
    pub fn from_config(config: &NetpathConfig) -> Self {
        let mut builder = Self::new();
        builder.form_coercion(config.forms.coercion);
        builder
    }

    /// Appends global middleware, which wraps every route.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.global.push(middleware);
        self
    }

    /// Registers `handler` for `method` and `pattern` with route middleware.
    ///
    /// Registering the same method and pattern again replaces the entry.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the pattern does not parse.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        middleware: Vec<Middleware>,
    ) -> Result<&mut Self, RouteError> {
        register(&mut self.table, method, pattern.to_owned(), handler, middleware)?;
        Ok(self)
    }

    /// Registers a `GET` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the pattern does not parse.
    pub fn get(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, pattern, handler, Vec::new())
    }

    /// Registers a `POST` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the pattern does not parse.
    pub fn post(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::POST, pattern, handler, Vec::new())
    }

    /// Registers a `PUT` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the pattern does not parse.
    pub fn put(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::PUT, pattern, handler, Vec::new())
    }

    /// Registers a `PATCH` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the pattern does not parse.
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::PATCH, pattern, handler, Vec::new())
    }

    /// Registers a `DELETE` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the pattern does not parse.
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::DELETE, pattern, handler, Vec::new())
    }

    /// Opens a route group under `prefix` whose routes run `middleware`
    /// ahead of their own.
    pub fn group(&mut self, prefix: &str, middleware: Vec<Middleware>) -> Group<'_> {
        Group {
            table: &mut self.table,
            prefix: prefix.to_owned(),
            middleware,
        }
    }

    /// Binds a session's discriminator to its concrete type.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Absent` for `None` and `SessionError::Conflict`
    /// when the discriminator is already bound to another type. Both should
    /// abort startup.
    pub fn register_session_type(
        &mut self,
        session: Option<&dyn Session>,
    ) -> Result<&mut Self, SessionError> {
        self.sessions.register(session)?;
        Ok(self)
    }

    /// Sets how form binding treats values that fail to parse.
    pub fn form_coercion(&mut self, mode: FormCoercion) -> &mut Self {
        self.form_coercion = mode;
        self
    }

    /// The session registry every request context will share.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Freezes the registered routes into an [`App`].
    #[must_use]
    pub fn build(self) -> App {
        tracing::info!(
            routes = self.table.len(),
            global_middleware = self.global.len(),
            session_types = self.sessions.len(),
            "app built"
        );
        App {
            inner: Arc::new(AppInner {
                table: self.table,
                global: self.global,
                sessions: self.sessions,
                form_coercion: self.form_coercion,
            }),
        }
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("routes", &self.table.len())
            .field("global", &self.global)
            .field("form_coercion", &self.form_coercion)
            .finish_non_exhaustive()
    }
}

/// A set of routes sharing a path prefix and leading middleware.
///
/// Groups write straight into the builder's route table.
pub struct Group<'a> {
    table: &'a mut RouteTable<RouteEntry>,
    prefix: String,
    middleware: Vec<Middleware>,
}

impl Group<'_> {
    /// Opens a child group. Its prefix and middleware extend this group's.
    pub fn group(&mut self, prefix: &str, middleware: Vec<Middleware>) -> Group<'_> {
        let mut inherited = self.middleware.clone();
        inherited.extend(middleware);
        Group {
            table: &mut *self.table,
            prefix: format!("{}{prefix}", self.prefix),
            middleware: inherited,
        }
    }

    /// Appends middleware for routes registered on this group from now on.
    pub fn use_middleware(&mut self, middleware: Middleware) -> &mut Self {
        self.middleware.push(middleware);
        self
    }

    /// The group's full path prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers `handler` under the group prefix with extra route middleware.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the prefixed pattern does not parse.
    pub fn route(
        &mut self,
        method: Method,
        pattern: &str,
        handler: Handler,
        middleware: Vec<Middleware>,
    ) -> Result<&mut Self, RouteError> {
        let mut chain = self.middleware.clone();
        chain.extend(middleware);
        register(
            &mut *self.table,
            method,
            format!("{}{pattern}", self.prefix),
            handler,
            chain,
        )?;
        Ok(self)
    }

    /// Registers a `GET` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the prefixed pattern does not parse.
    pub fn get(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::GET, pattern, handler, Vec::new())
    }

    /// Registers a `POST` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the prefixed pattern does not parse.
    pub fn post(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::POST, pattern, handler, Vec::new())
    }

    /// Registers a `PUT` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the prefixed pattern does not parse.
    pub fn put(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::PUT, pattern, handler, Vec::new())
    }

    /// Registers a `PATCH` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the prefixed pattern does not parse.
    pub fn patch(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::PATCH, pattern, handler, Vec::new())
    }

    /// Registers a `DELETE` route.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` if the prefixed pattern does not parse.
    pub fn delete(&mut self, pattern: &str, handler: Handler) -> Result<&mut Self, RouteError> {
        self.route(Method::DELETE, pattern, handler, Vec::new())
    }
}

impl fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("prefix", &self.prefix)
            .field("middleware", &self.middleware)
            .finish_non_exhaustive()
    }
}

struct AppInner {
    table: RouteTable<RouteEntry>,
    global: Vec<Middleware>,
    sessions: Arc<SessionRegistry>,
    form_coercion: FormCoercion,
}

/// A frozen route table plus global middleware.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    /// Number of registered routes across all methods.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.inner.table.len()
    }

    /// Registered patterns for `method`, in match order.
    pub fn patterns(&self, method: &Method) -> impl Iterator<Item = &str> {
        self.inner
            .table
            .routes(method)
            .map(|route| route.pattern().as_str())
    }

    /// The shared session registry.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.inner.sessions
    }

    /// Runs one request through the matching route.
    ///
    /// Unmatched requests get a plain-text 404 and run no middleware. A
    /// handler error is logged as the request outcome; it never produces a
    /// response by itself, so a chain that wrote nothing yields an empty 200.
    pub async fn dispatch(
        &self,
        request: http::Request<Bytes>,
        remote_addr: Option<SocketAddr>,
    ) -> Response {
        let mut ctx = Context::new(request, Arc::clone(&self.inner.sessions))
            .with_remote_addr(remote_addr)
            .with_form_coercion(self.inner.form_coercion);

        let Some(RouteMatch {
            value: entry,
            params,
            ..
        }) = self.inner.table.lookup(ctx.method(), ctx.path())
        else {
            tracing::debug!(method = %ctx.method(), path = ctx.path(), "no route matched");
            return not_found();
        };
        ctx.set_params(params);

        let handler = compose(entry.handler.clone(), &entry.middleware, &self.inner.global);
        let result = handler.call(&mut ctx).await;

        log_request(&ctx, &result);
        ctx.into_response()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("routes", &self.inner.table.len())
            .field("global", &self.inner.global)
            .finish_non_exhaustive()
    }
}

fn log_request(ctx: &Context, result: &netpath_core::HandlerResult) {
    let outcome: Cow<'_, str> = match result {
        Ok(()) => Cow::Borrowed("success"),
        Err(err) => Cow::Owned(err.to_string()),
    };
    RequestLog {
        method: ctx.method(),
        status: ctx.status().map_or(0, |status| status.as_u16()),
        path: ctx.path(),
        remote_addr: ctx.remote_addr(),
        outcome: &outcome,
        elapsed: ctx.elapsed(),
        request_id: Some(ctx.request_id()),
    }
    .emit();
}

/// One request-log line plus its request metrics.
pub(crate) struct RequestLog<'a> {
    pub(crate) method: &'a Method,
    pub(crate) status: u16,
    pub(crate) path: &'a str,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) outcome: &'a str,
    pub(crate) elapsed: Duration,
    /// `None` when the context was dropped before logging.
    pub(crate) request_id: Option<RequestId>,
}

impl RequestLog<'_> {
    pub(crate) fn emit(&self) {
        let remote = self
            .remote_addr
            .map_or_else(String::new, |addr| addr.to_string());
        let request_id = self
            .request_id
            .map_or_else(String::new, |id| id.to_string());

        tracing::info!(
            http.method = %self.method,
            http.status_code = self.status,
            http.path = self.path,
            remote_addr = %remote,
            outcome = %self.outcome,
            duration_ms = self.elapsed.as_secs_f64() * 1000.0,
            request_id = %request_id,
            "request"
        );
        netpath_telemetry::record_request(self.method.as_str(), self.status, self.elapsed);
    }
}

/// A `text/plain` response, as sent for transport-level failures.
pub(crate) fn plain_text(status: StatusCode, body: &'static str) -> Response {
    let mut response = Response::new(Full::new(Bytes::from_static(body.as_bytes())));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

fn not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}
