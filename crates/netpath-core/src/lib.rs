//! # Netpath Core
//!
//! Per-request types shared by every Netpath crate.
//!
//! - [`Context`] - Per-request state: request, params, locale, session, response slot
//! - [`Handler`] - Type-erased async handler invoked with `&mut Context`
//! - [`Session`] / [`SessionRegistry`] - Typed sessions guarded by a discriminator registry
//! - [`Fault`] / [`Faults`] - Localized, coded errors rendered into response envelopes
//! - [`Locale`] - Language used when rendering faults
//! - [`Validate`] - Post-decode validation hook for bound request bodies
//!
//! Handlers report their outcome through the response operations on
//! [`Context`] (`success`, `bad_input`, `server_error`, ...). Each writes a
//! JSON envelope and hands the error back so the handler can return it:
//!
//! ```rust
//! use netpath_core::{Context, Handler};
//! use serde_json::json;
//!
//! let get_user = Handler::new(|ctx: &mut Context| {
//!     Box::pin(async move {
//!         let Some(id) = ctx.param("id").map(str::to_owned) else {
//!             return Err(ctx.bad_input(anyhow::anyhow!("missing id")));
//!         };
//!         ctx.success(json!({ "id": id }))
//!     })
//! });
//! # let _ = get_user;
//! ```

#![doc(html_root_url = "https://docs.rs/netpath-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binding;
mod context;
mod fault;
mod handler;
mod locale;
mod response;
mod session;

pub use binding::{FormCoercion, Validate};
pub use context::{Context, RequestId};
pub use fault::{Fault, Faults};
pub use handler::{BoxFuture, Handler, HandlerResult};
pub use locale::{Locale, UnsupportedLocale};
pub use response::{Outcome, Response, ResponseError};
pub use session::{AsAny, Session, SessionError, SessionKind, SessionRegistry, SessionType};

pub use netpath_router::Params;
