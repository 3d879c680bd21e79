//! Built-in middleware stages.
//!
//! - [`recover`] - turn handler panics into a 500 envelope
//! - [`locale`] - select the response locale from `?lang=`
//! - [`cors`] - add CORS headers and answer preflight requests

pub mod cors;
pub mod locale;
pub mod recover;

pub use cors::{cors, CorsConfig};
pub use locale::{locale, LANG_QUERY_PARAM};
pub use recover::{recover, PANIC_MESSAGE};
