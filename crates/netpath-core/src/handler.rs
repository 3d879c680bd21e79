//! Type-erased request handlers.
//!
//! A [`Handler`] is an async function from `&mut Context` to
//! [`HandlerResult`]. Middleware wraps handlers in other handlers, so the
//! whole chain for a route is itself a single `Handler`.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result returned by every handler and middleware layer.
///
/// The error is returned as-is to the caller of the chain; it never becomes
/// a response on its own.
pub type HandlerResult = anyhow::Result<()>;

type HandlerFn = dyn for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync;

/// A cheaply clonable async request handler.
///
/// # Example
///
/// ```rust
/// use netpath_core::{Context, Handler};
///
/// let health = Handler::new(|ctx: &mut Context| {
///     Box::pin(async move { ctx.success("ok") })
/// });
/// # let _ = health;
/// ```
#[derive(Clone)]
pub struct Handler {
    call: Arc<HandlerFn>,
}

impl Handler {
    /// Wraps a closure returning a boxed future.
    pub fn new<F>(f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        Self { call: Arc::new(f) }
    }

    /// Runs the handler against `ctx`.
    pub fn call<'a>(&self, ctx: &'a mut Context) -> BoxFuture<'a, HandlerResult> {
        (self.call)(ctx)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
