//! Per-request context.
//!
//! The [`Context`] is created by the dispatcher for every matched request,
//! passed by `&mut` through the middleware chain into the handler, and
//! finally turned into the HTTP response.

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::header::HeaderMap;
use http::request::Parts;
use http::{Method, StatusCode, Uri};
use netpath_router::Params;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::binding::FormCoercion;
use crate::locale::Locale;
use crate::response::Response;
use crate::session::{Session, SessionError, SessionRegistry};

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, so ids sort by arrival in the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new request id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request state handed to middleware and handlers.
///
/// Holds the request, the parameters bound by the matched route, the
/// response locale, an optional session and the single response slot.
///
/// # Example
///
/// ```
/// use netpath_core::{Context, Locale};
///
/// let request = http::Request::get("/users/42?lang=id")
///     .body(bytes::Bytes::new())
///     .unwrap();
/// let ctx = Context::for_request(request);
///
/// assert_eq!(ctx.path(), "/users/42");
/// assert_eq!(ctx.query("lang").as_deref(), Some("id"));
/// assert_eq!(ctx.locale(), Locale::English);
/// ```
#[derive(Debug)]
pub struct Context {
    request_id: RequestId,
    started_at: Instant,
    parts: Parts,
    body: Bytes,
    remote_addr: Option<SocketAddr>,
    params: Params,
    locale: Locale,
    form_coercion: FormCoercion,
    session: Option<Box<dyn Session>>,
    sessions: Arc<SessionRegistry>,
    pub(crate) status: Option<StatusCode>,
    pub(crate) response: Option<Response>,
    pub(crate) response_headers: HeaderMap,
}

impl Context {
    /// Creates a context for `request` that checks sessions against `sessions`.
    pub fn new(request: http::Request<Bytes>, sessions: Arc<SessionRegistry>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            request_id: RequestId::new(),
            started_at: Instant::now(),
            parts,
            body,
            remote_addr: None,
            params: Params::new(),
            locale: Locale::default(),
            form_coercion: FormCoercion::default(),
            session: None,
            sessions,
            status: None,
            response: None,
            response_headers: HeaderMap::new(),
        }
    }

    /// Creates a context with its own empty session registry.
    pub fn for_request(request: http::Request<Bytes>) -> Self {
        Self::new(request, Arc::new(SessionRegistry::new()))
    }

    /// Sets the peer address.
    pub fn with_remote_addr(mut self, remote_addr: Option<SocketAddr>) -> Self {
        self.remote_addr = remote_addr;
        self
    }

    /// Sets how form binding treats unparsable values.
    pub fn with_form_coercion(mut self, coercion: FormCoercion) -> Self {
        self.form_coercion = coercion;
        self
    }

    /// Replaces the bound path parameters.
    pub fn set_params(&mut self, params: Params) {
        self.params = params;
    }

    // Request

    /// Unique id of this request.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Time since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    /// Request path, without the query string.
    pub fn path(&self) -> &str {
        self.parts.uri.path()
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// Collected request body.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Peer address, when the transport knows it.
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote_addr
    }

    /// Raw value bound to the path parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// All bound path parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First decoded query string value for `name`.
    pub fn query(&self, name: &str) -> Option<String> {
        self.query_pairs()
            .into_iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// All decoded query string pairs, in order. A malformed query yields none.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.parts
            .uri
            .query()
            .and_then(|query| serde_urlencoded::from_str(query).ok())
            .unwrap_or_default()
    }

    /// How form binding treats unparsable values.
    pub fn form_coercion(&self) -> FormCoercion {
        self.form_coercion
    }

    // Locale

    /// Locale used to render faults.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Switches the locale used to render faults.
    pub fn use_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    // Session

    /// The attached session, if any.
    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    /// Attaches a session after checking its kind against the registry.
    pub fn attach_session(&mut self, session: Box<dyn Session>) -> Result<(), SessionError> {
        self.sessions.check(&*session)?;
        self.session = Some(session);
        Ok(())
    }

    /// The attached session viewed as `S`.
    ///
    /// Fails unless the session's kind is registered as `S`, so a session
    /// is never reinterpreted as a type other than the registered one.
    pub fn session_as<S: Session>(&self) -> Result<&S, SessionError> {
        let session = self.session.as_deref().ok_or(SessionError::Missing)?;
        let kind = session.kind();
        let expected = self
            .sessions
            .expected_type(kind)
            .ok_or(SessionError::Unregistered(kind))?;

        let mismatch = || SessionError::TypeMismatch {
            kind,
            expected: expected.name(),
            actual: std::any::type_name::<S>(),
        };
        if !expected.is::<S>() {
            return Err(mismatch());
        }
        session.as_any().downcast_ref::<S>().ok_or_else(mismatch)
    }

    /// The registry sessions are checked against.
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    // Response

    /// Status recorded by the response write, if any.
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns true once a response has been written.
    pub fn is_written(&self) -> bool {
        self.response.is_some()
    }

    /// Headers merged into whichever response is eventually sent.
    ///
    /// Headers already present on the written response take precedence.
    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Consumes the context into the response to send.
    ///
    /// Without a written response this is an empty `200 OK`.
    pub fn into_response(self) -> Response {
        let mut response = self.response.unwrap_or_default();
        let headers = response.headers_mut();
        for name in self.response_headers.keys() {
            if headers.contains_key(name) {
                continue;
            }
            for value in self.response_headers.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        response
    }
}
