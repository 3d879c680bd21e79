//! # Netpath
//!
//! Path-routed HTTP dispatch with composable middleware.
//!
//! - routes are `method + pattern` pairs such as `GET /users/:id`, matched in
//!   registration order with literal segments outranking parameters
//! - middleware is a named `Handler -> Handler` decorator; global middleware
//!   wraps group middleware, which wraps route middleware
//! - handlers answer through outcome operations on the [`Context`](core::Context)
//!   (`success`, `bad_input`, `not_found`, ...) that write a JSON envelope
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netpath::prelude::*;
//!
//! async fn show_user(ctx: &mut Context) -> HandlerResult {
//!     let id = ctx.param("id").unwrap_or_default().to_owned();
//!     ctx.success(serde_json::json!({ "id": id }))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new()
//!         .with_optional_file("netpath.toml")?
//!         .with_env_prefix("NETPATH")
//!         .load()?;
//!     init_logging(&config.logging.to_log_config())?;
//!
//!     let mut builder = AppBuilder::from_config(&config);
//!     builder
//!         .use_middleware(recover())
//!         .use_middleware(locale())
//!         .use_middleware(cors(&config.cors));
//!     builder
//!         .group("/api", Vec::new())
//!         .get("/users/:id", Handler::new(|ctx: &mut Context| Box::pin(show_user(ctx))))?;
//!
//!     Server::new(builder.build(), config.server.clone()).run().await?;
//!     Ok(())
//! }
//! ```

pub use netpath_config as config;
pub use netpath_core as core;
pub use netpath_extract as extract;
pub use netpath_middleware as middleware;
pub use netpath_pool as pool;
pub use netpath_router as router;
pub use netpath_server as server;
pub use netpath_telemetry as telemetry;

/// Common imports for building an app.
pub mod prelude {
    pub use netpath_config::{ConfigLoader, NetpathConfig};
    pub use netpath_core::{
        Context, Fault, Faults, FormCoercion, Handler, HandlerResult, Locale, Session,
        SessionKind, Validate,
    };
    pub use netpath_extract::{Bind, FieldKind, FormField, FormValue, FromForm};
    pub use netpath_middleware::stages::{cors, locale, recover, CorsConfig};
    pub use netpath_middleware::Middleware;
    pub use netpath_server::{App, AppBuilder, Group, Server, ShutdownSignal};
    pub use netpath_telemetry::{init_logging, init_telemetry};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use netpath_test::TestClient;

    async fn health(ctx: &mut Context) -> HandlerResult {
        ctx.success("ok")
    }

    #[tokio::test]
    async fn test_prelude_builds_a_working_app() {
        let mut builder = AppBuilder::new();
        builder.use_middleware(recover()).use_middleware(locale());
        builder
            .get("/health", Handler::new(|ctx: &mut Context| Box::pin(health(ctx))))
            .unwrap();

        TestClient::new(builder.build())
            .get("/health")
            .send()
            .await
            .unwrap()
            .assert_status_code(200)
            .assert_json_eq(&serde_json::json!({ "code": 200, "data": "ok" }));
    }
}
