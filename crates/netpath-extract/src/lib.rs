//! Request body binding for Netpath.
//!
//! The [`Bind`] trait adds three operations to
//! [`Context`](netpath_core::Context):
//!
//! - `bind::<T>()` - decode the JSON body, then run `T`'s [`Validate`](netpath_core::Validate)
//! - `bind_form::<T>()` - bind from URL-encoded body and query values using
//!   `T`'s [`FromForm`] field descriptors, then validate
//! - `form_file(name)` - pull an uploaded file out of a `multipart/form-data` body
//!
//! Validation and coercion failures carry their field
//! [`Faults`](netpath_core::Faults) as the error source, so reporting a
//! [`BindError`] through `ctx.bad_input(err)` renders a per-field message map
//! in the request's locale.

mod bind;
mod error;
mod form;
mod json;
mod multipart;

pub use bind::Bind;
pub use error::BindError;
pub use form::{
    bind_form, decode_form, form_pairs, parse_bool, FieldKind, FormField, FormValue, FromForm,
    DEFAULT_MAX_FORM_SIZE, INVALID_FORM_VALUE,
};
pub use json::{decode_json, DEFAULT_MAX_JSON_SIZE};
pub use multipart::{find_file, MultipartConfig, UploadedFile};
