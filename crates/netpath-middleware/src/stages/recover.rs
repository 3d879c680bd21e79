//! Panic recovery.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use netpath_core::Context;

use crate::Middleware;

/// Error text reported to the client after a recovered panic.
pub const PANIC_MESSAGE: &str = "internal panic recover";

/// Catches panics from the rest of the chain.
///
/// A panic is logged with its payload and reported as a server error, so
/// the request still gets a 500 envelope and a log line.
pub fn recover() -> Middleware {
    Middleware::around("recover", |ctx, next| {
        Box::pin(async move {
            let outcome = AssertUnwindSafe(next.call(ctx)).catch_unwind().await;
            match outcome {
                Ok(result) => result,
                Err(payload) => {
                    log_panic(ctx, &*payload);
                    Err(ctx.server_error(anyhow::anyhow!(PANIC_MESSAGE)))
                }
            }
        })
    })
}

fn log_panic(ctx: &Context, payload: &(dyn Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned());

    tracing::error!(
        request_id = %ctx.request_id(),
        method = %ctx.method(),
        path = ctx.path(),
        panic = %message,
        "handler panicked"
    );
}
