//! Binding operations on the request context.

use async_trait::async_trait;
use netpath_core::{Context, Validate};
use serde::de::DeserializeOwned;

use crate::form::{self, FromForm};
use crate::json::decode_json;
use crate::multipart::{find_file, MultipartConfig, UploadedFile};
use crate::BindError;

/// Body binding for [`Context`].
///
/// # Example
///
/// ```rust
/// use netpath_core::{Context, Handler, Validate};
/// use netpath_extract::Bind;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct CreateUser { name: String }
/// impl Validate for CreateUser {}
///
/// let create = Handler::new(|ctx: &mut Context| {
///     Box::pin(async move {
///         let input: CreateUser = match ctx.bind() {
///             Ok(input) => input,
///             Err(err) => return Err(ctx.bad_input(err)),
///         };
///         ctx.success(serde_json::json!({ "name": input.name }))
///     })
/// });
/// # let _ = create;
/// ```
#[async_trait]
pub trait Bind {
    /// Decodes the JSON body into `T` and validates it.
    fn bind<T>(&self) -> Result<T, BindError>
    where
        T: DeserializeOwned + Validate;

    /// Binds `T` from the form body and query string, then validates it.
    fn bind_form<T>(&self) -> Result<T, BindError>
    where
        T: FromForm + Validate;

    /// Returns the first file uploaded under `field`.
    async fn form_file(&self, field: &str) -> Result<UploadedFile, BindError>;
}

#[async_trait]
impl Bind for Context {
    fn bind<T>(&self) -> Result<T, BindError>
    where
        T: DeserializeOwned + Validate,
    {
        decode_json(self.body())
    }

    fn bind_form<T>(&self) -> Result<T, BindError>
    where
        T: FromForm + Validate,
    {
        form::bind_form(self)
    }

    async fn form_file(&self, field: &str) -> Result<UploadedFile, BindError> {
        find_file(
            self.headers(),
            self.body().clone(),
            field,
            MultipartConfig::default(),
        )
        .await
    }
}
