//! Request dispatch and HTTP serving for Netpath.
//!
//! - [`AppBuilder`] / [`Group`] - route registration with prefixes and middleware
//! - [`App`] - the frozen route table; [`App::dispatch`] runs one request
//! - [`Server`] - hyper HTTP/1.1 server with graceful shutdown
//!
//! # Example
//!
//! ```rust,no_run
//! use netpath_config::ServerConfig;
//! use netpath_core::{Context, Handler};
//! use netpath_server::{AppBuilder, Server};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let mut builder = AppBuilder::new();
//! builder.get(
//!     "/ping",
//!     Handler::new(|ctx: &mut Context| Box::pin(async move { ctx.success("pong") })),
//! )?;
//!
//! Server::new(builder.build(), ServerConfig::default()).run().await?;
//! # Ok(())
//! # }
//! ```

mod app;
mod error;
mod server;
pub mod shutdown;

pub use app::{App, AppBuilder, Group, NOT_FOUND_BODY};
pub use error::ServerError;
pub use server::Server;
pub use shutdown::{ConnectionTracker, ShutdownSignal};
