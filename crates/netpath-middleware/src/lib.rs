//! # Netpath Middleware
//!
//! Handler decorators and the built-in stages.
//!
//! Middleware wraps a [`Handler`](netpath_core::Handler) and decides
//! whether to call the next one. For a matched route the chain is:
//!
//! ```text
//! global[0] → … → global[n] → group[0] → … → route[n] → handler
//! ```
//!
//! The route's part of the chain is fixed when the route is registered.
//! [`compose`] stacks the global part on top for every request.
//!
//! ## Built-in stages
//!
//! | Stage                     | Purpose                                     |
//! |---------------------------|---------------------------------------------|
//! | [`stages::recover`]       | Convert handler panics into a 500 envelope  |
//! | [`stages::locale`]        | Pick the response locale from `?lang=`      |
//! | [`stages::cors`]          | CORS headers and `OPTIONS` preflight replies |

#![doc(html_root_url = "https://docs.rs/netpath-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod middleware;
pub mod stages;

pub use middleware::{chain, compose, Middleware};
