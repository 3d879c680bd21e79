//! Middleware as handler decorators.
//!
//! A [`Middleware`] takes the next [`Handler`] and returns a new one that
//! runs around it. Chains are built by wrapping from the innermost layer
//! outwards, so the first middleware in a list is the first to run.
//!
//! # Example
//!
//! ```rust
//! use netpath_core::{Context, Handler};
//! use netpath_middleware::{compose, Middleware};
//!
//! let timing = Middleware::around("timing", |ctx, next| {
//!     Box::pin(async move {
//!         let result = next.call(ctx).await;
//!         tracing::debug!(elapsed_ms = ctx.elapsed().as_millis() as u64, "handled");
//!         result
//!     })
//! });
//!
//! let handler = Handler::new(|ctx: &mut Context| Box::pin(async move { ctx.success("ok") }));
//! let chained = compose(handler, &[], &[timing]);
//! # let _ = chained;
//! ```

use std::fmt;
use std::sync::Arc;

use netpath_core::{BoxFuture, Context, Handler, HandlerResult};

type WrapFn = dyn Fn(Handler) -> Handler + Send + Sync;

/// A named handler decorator.
#[derive(Clone)]
pub struct Middleware {
    name: &'static str,
    wrap: Arc<WrapFn>,
}

impl Middleware {
    /// Creates middleware from a `Handler -> Handler` decorator.
    pub fn new<F>(name: &'static str, wrap: F) -> Self
    where
        F: Fn(Handler) -> Handler + Send + Sync + 'static,
    {
        Self {
            name,
            wrap: Arc::new(wrap),
        }
    }

    /// Creates middleware from a function that receives the context and
    /// the next handler.
    ///
    /// The function decides whether, and when, to call `next`.
    pub fn around<F>(name: &'static str, f: F) -> Self
    where
        F: for<'a> Fn(&'a mut Context, Handler) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let f = Arc::new(f);
        Self::new(name, move |next: Handler| {
            let f = Arc::clone(&f);
            Handler::new(move |ctx: &mut Context| f(ctx, next.clone()))
        })
    }

    /// The middleware's name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Wraps `next` in this middleware.
    pub fn wrap(&self, next: Handler) -> Handler {
        (self.wrap)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Wraps `handler` so that `middleware[0]` runs first.
pub fn chain(handler: Handler, middleware: &[Middleware]) -> Handler {
    middleware
        .iter()
        .rev()
        .fold(handler, |next, layer| layer.wrap(next))
}

/// Builds the handler for one request.
///
/// The route's chain (group middleware followed by route middleware) wraps
/// the terminal handler, and the global chain wraps that, so global
/// middleware runs outermost.
pub fn compose(handler: Handler, route: &[Middleware], global: &[Middleware]) -> Handler {
    chain(chain(handler, route), global)
}
