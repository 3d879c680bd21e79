//! Response shaping.
//!
//! Handlers finish a request through one of the operations below. Each
//! writes the response exactly once, records the status for the request log
//! and, for the failure outcomes, hands the error back unchanged:
//!
//! ```text
//! success(data)          200  {"code":200,"data":data}
//! unauthorized(err)      401  ┐
//! bad_input(err)         400  │
//! not_found(err)         404  │ {"code":<int>,"data":{"description":"<err>"}}
//! forbidden(err)         403  │
//! rate_limited(err)      429  │
//! conflict(err)          409  ┘
//! not_allowed(err)       405  ┐
//! bad_gateway(err)       502  │ {"code":"<str>","error":{"description":"<label>: <err>"}}
//! unavailable(err)       503  │
//! server_error(err)      500  ┘
//! ```
//!
//! A [`Fault`] anywhere in the error's source chain replaces the shape with
//! `{"code":<fault code>,"data":{"description":<localized>}}`, and a
//! [`Faults`] collection with `{"code":<int>,"data":{<field>:<localized>}}`.

use bytes::Bytes;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::context::Context;
use crate::fault::{Fault, Faults};
use crate::handler::HandlerResult;
use crate::locale::Locale;

/// The response type produced by a [`Context`].
pub type Response = http::Response<Full<Bytes>>;

/// Errors from writing a response.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// A response was already written for this request.
    #[error("response already written")]
    AlreadyWritten,

    /// The payload could not be encoded as JSON.
    #[error("failed to encode response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failure outcomes a handler can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// 401
    Unauthorized,
    /// 400
    BadInput,
    /// 404
    NotFound,
    /// 403
    Forbidden,
    /// 429
    RateLimited,
    /// 409
    Conflict,
    /// 405
    NotAllowed,
    /// 502
    BadGateway,
    /// 503
    Unavailable,
    /// 500
    ServerError,
}

impl Outcome {
    /// The HTTP status written for this outcome.
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadInput => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Conflict => StatusCode::CONFLICT,
            Self::NotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::BadGateway => StatusCode::BAD_GATEWAY,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Prefix for plain errors rendered under the `error` key.
    ///
    /// `None` for outcomes rendered under `data`.
    const fn error_label(self) -> Option<&'static str> {
        match self {
            Self::NotAllowed => Some("not allowed"),
            Self::BadGateway => Some("bad gateway"),
            Self::Unavailable => Some("service unavailable"),
            Self::ServerError => Some("server error"),
            _ => None,
        }
    }

    /// Builds the JSON envelope for `err` in `locale`.
    #[must_use]
    pub fn envelope(self, err: &anyhow::Error, locale: Locale) -> Value {
        if let Some(fault) = find_in_chain::<Fault>(err) {
            return json!({
                "code": fault.code(),
                "data": { "description": fault.localized(locale) },
            });
        }

        if let Some(faults) = find_in_chain::<Faults>(err) {
            return json!({
                "code": self.status().as_u16(),
                "data": faults.localized(locale),
            });
        }

        match self.error_label() {
            Some(label) => json!({
                "code": self.status().as_str(),
                "error": { "description": format!("{label}: {err}") },
            }),
            None => json!({
                "code": self.status().as_u16(),
                "data": { "description": err.to_string() },
            }),
        }
    }
}

fn find_in_chain<E>(err: &anyhow::Error) -> Option<&E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    err.chain().find_map(|cause| cause.downcast_ref::<E>())
}

#[derive(Serialize)]
struct SuccessEnvelope<'a, T: ?Sized> {
    code: u16,
    data: &'a T,
}

impl Context {
    /// Writes `response` as the single response for this request.
    ///
    /// A second write is rejected and the first response is kept.
    pub fn write(&mut self, response: Response) -> Result<(), ResponseError> {
        if self.response.is_some() {
            tracing::warn!(
                request_id = %self.request_id(),
                status = response.status().as_u16(),
                "response already written, ignoring"
            );
            return Err(ResponseError::AlreadyWritten);
        }
        self.status = Some(response.status());
        self.response = Some(response);
        Ok(())
    }

    /// Writes `data` as a JSON body with `status`.
    pub fn json<T: Serialize + ?Sized>(
        &mut self,
        status: StatusCode,
        data: &T,
    ) -> Result<(), ResponseError> {
        let body = serde_json::to_vec(data)?;
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.write(response)
    }

    /// Writes `status` with an empty body.
    pub fn empty(&mut self, status: StatusCode) -> Result<(), ResponseError> {
        let mut response = Response::default();
        *response.status_mut() = status;
        self.write(response)
    }

    /// Writes `{"code":200,"data":data}`.
    ///
    /// Fails only if `data` cannot be encoded.
    pub fn success<T: Serialize>(&mut self, data: T) -> HandlerResult {
        let envelope = SuccessEnvelope {
            code: StatusCode::OK.as_u16(),
            data: &data,
        };
        match self.json(StatusCode::OK, &envelope) {
            Err(ResponseError::Serialize(err)) => Err(err.into()),
            Ok(()) | Err(ResponseError::AlreadyWritten) => Ok(()),
        }
    }

    /// Writes the envelope for `outcome` and returns `err` unchanged.
    pub fn fail(&mut self, outcome: Outcome, err: impl Into<anyhow::Error>) -> anyhow::Error {
        let err = err.into();
        let envelope = outcome.envelope(&err, self.locale());
        // A second write is already logged by `write`.
        let _ = self.json(outcome.status(), &envelope);
        err
    }

    /// 401 Unauthorized.
    pub fn unauthorized(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::Unauthorized, err)
    }

    /// 400 Bad Request.
    pub fn bad_input(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::BadInput, err)
    }

    /// 404 Not Found.
    pub fn not_found(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::NotFound, err)
    }

    /// 403 Forbidden.
    pub fn forbidden(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::Forbidden, err)
    }

    /// 429 Too Many Requests.
    pub fn rate_limited(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::RateLimited, err)
    }

    /// 409 Conflict.
    pub fn conflict(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::Conflict, err)
    }

    /// 405 Method Not Allowed.
    pub fn not_allowed(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::NotAllowed, err)
    }

    /// 502 Bad Gateway.
    pub fn bad_gateway(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::BadGateway, err)
    }

    /// 503 Service Unavailable.
    pub fn unavailable(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::Unavailable, err)
    }

    /// 500 Internal Server Error.
    pub fn server_error(&mut self, err: impl Into<anyhow::Error>) -> anyhow::Error {
        self.fail(Outcome::ServerError, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context as _};
    use http_body_util::BodyExt;

    fn context() -> Context {
        Context::for_request(http::Request::get("/").body(Bytes::new()).unwrap())
    }

    async fn body_json(ctx: Context) -> (StatusCode, Value) {
        let response = ctx.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_success_envelope() {
        let mut ctx = context();
        ctx.success(json!({ "id": "42" })).unwrap();

        let (status, body) = body_json(ctx).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "code": 200, "data": { "id": "42" } }));
    }

    #[tokio::test]
    async fn test_bad_input_plain_error() {
        let mut ctx = context();
        let err = ctx.bad_input(anyhow!("missing field"));
        assert_eq!(err.to_string(), "missing field");
        assert_eq!(ctx.status(), Some(StatusCode::BAD_REQUEST));

        let (_, body) = body_json(ctx).await;
        assert_eq!(body, json!({ "code": 400, "data": { "description": "missing field" } }));
    }

    #[tokio::test]
    async fn test_server_kinds_use_error_key() {
        let cases = [
            (Outcome::NotAllowed, "405", "not allowed: nope"),
            (Outcome::BadGateway, "502", "bad gateway: nope"),
            (Outcome::Unavailable, "503", "service unavailable: nope"),
            (Outcome::ServerError, "500", "server error: nope"),
        ];

        for (outcome, code, description) in cases {
            let mut ctx = context();
            ctx.fail(outcome, anyhow!("nope"));
            let (status, body) = body_json(ctx).await;
            assert_eq!(status, outcome.status());
            assert_eq!(body, json!({ "code": code, "error": { "description": description } }));
        }
    }

    #[tokio::test]
    async fn test_client_kinds_use_data_key() {
        for outcome in [
            Outcome::Unauthorized,
            Outcome::NotFound,
            Outcome::Forbidden,
            Outcome::RateLimited,
            Outcome::Conflict,
        ] {
            let mut ctx = context();
            ctx.fail(outcome, anyhow!("denied"));
            let (status, body) = body_json(ctx).await;
            assert_eq!(status, outcome.status());
            assert_eq!(body["code"], json!(status.as_u16()));
            assert_eq!(body["data"]["description"], "denied");
        }
    }

    #[tokio::test]
    async fn test_fault_is_found_through_context() {
        let fault = Fault::new("USER_NOT_FOUND", "user not found")
            .with_message(Locale::Bahasa, "pengguna tidak ditemukan");
        let err = Err::<(), _>(fault).context("loading profile").unwrap_err();

        let mut ctx = context();
        ctx.use_locale(Locale::Bahasa);
        let returned = ctx.not_found(err);
        assert_eq!(returned.to_string(), "loading profile");

        let (status, body) = body_json(ctx).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({
                "code": "USER_NOT_FOUND",
                "data": { "description": "pengguna tidak ditemukan" }
            })
        );
    }

    #[tokio::test]
    async fn test_faults_render_field_map() {
        let faults = Faults::new()
            .with("email", Fault::new("REQUIRED", "email is required"))
            .with("age", Fault::new("RANGE", "age out of range"));

        let mut ctx = context();
        ctx.bad_input(faults);

        let (_, body) = body_json(ctx).await;
        assert_eq!(
            body,
            json!({
                "code": 400,
                "data": { "age": "age out of range", "email": "email is required" },
            })
        );
    }

    #[tokio::test]
    async fn test_first_write_wins() {
        let mut ctx = context();
        ctx.conflict(anyhow!("first"));
        assert!(matches!(
            ctx.json(StatusCode::OK, &json!({})),
            Err(ResponseError::AlreadyWritten)
        ));
        ctx.success("second").unwrap();

        let (status, body) = body_json(ctx).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["data"]["description"], "first");
    }

    #[test]
    fn test_empty_records_status() {
        let mut ctx = context();
        ctx.empty(StatusCode::NO_CONTENT).unwrap();
        assert_eq!(ctx.status(), Some(StatusCode::NO_CONTENT));
        assert!(ctx.is_written());
    }
}
