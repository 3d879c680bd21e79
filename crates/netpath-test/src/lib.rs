//! In-memory testing for Netpath apps.
//!
//! [`TestClient`] dispatches requests directly into an
//! [`App`](netpath_server::App), so tests exercise routing, middleware and
//! response writing without a socket.
//!
//! ```rust,ignore
//! let client = TestClient::new(app);
//! let response = client
//!     .post("/users")
//!     .json(&serde_json::json!({ "name": "Alice" }))
//!     .send()
//!     .await?;
//! response.assert_status_code(201);
//! ```

mod client;
mod error;
mod request;
mod response;

pub use client::TestClient;
pub use error::TestError;
pub use request::TestClientRequest;
pub use response::TestResponse;
