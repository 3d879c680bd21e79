//! HTTP/1.1 server.
//!
//! Accepts TCP connections, serves each on its own task with hyper, and
//! feeds every request through [`App::dispatch`]. Shutdown stops the accept
//! loop, then waits up to the configured timeout for open connections.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use netpath_config::ServerConfig;
use netpath_core::Response;
use tokio::net::{TcpListener, TcpStream};

use crate::app::{plain_text, App, RequestLog};
use crate::error::ServerError;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Serves an [`App`] over HTTP/1.1.
#[derive(Debug, Clone)]
pub struct Server {
    app: App,
    config: ServerConfig,
}

impl Server {
    /// Creates a server for `app`.
    #[must_use]
    pub fn new(app: App, config: ServerConfig) -> Self {
        Self { app, config }
    }

    /// The served app.
    #[must_use]
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Binds the configured address and serves until SIGTERM or SIGINT.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals())
            .await
    }

    /// Binds the configured address and serves until `shutdown` triggers.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let http_addr = &self.config.http_addr;
        let addr: SocketAddr = http_addr.parse().map_err(|err: std::net::AddrParseError| {
            ServerError::InvalidAddress {
                addr: http_addr.clone(),
                reason: err.to_string(),
            }
        })?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        self.serve(listener, shutdown).await;
        Ok(())
    }

    /// Serves connections from an already bound listener.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) {
        if let Ok(addr) = listener.local_addr() {
            tracing::info!(addr = %addr, routes = self.app.route_count(), "server listening");
        }

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();
                        tokio::spawn(async move {
                            let served = server.handle_connection(stream, remote_addr, shutdown);
                            if let Err(err) = served.await {
                                tracing::debug!(
                                    remote_addr = %remote_addr,
                                    error = %err,
                                    "connection error"
                                );
                            }
                            drop(token);
                        });
                    }
                    Err(err) => tracing::error!(error = %err, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown requested, no longer accepting connections");
                    break;
                }
            }
        }

        let grace = server.config.shutdown_timeout();
        tracing::info!(
            active = tracker.active_connections(),
            grace_secs = grace.as_secs(),
            "draining connections"
        );
        tokio::select! {
            () = tracker.wait_for_drain() => tracing::info!("all connections closed"),
            () = tokio::time::sleep(grace) => tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            ),
        }
        tracing::info!("server stopped");
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let server = Arc::clone(self);
        let service = service_fn(move |request: Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(request, remote_addr).await) }
        });

        let connection = http1::Builder::new().serve_connection(TokioIo::new(stream), service);
        tokio::select! {
            result = connection => result,
            () = shutdown.recv() => {
                tracing::debug!(remote_addr = %remote_addr, "connection closed by shutdown");
                Ok(())
            }
        }
    }

    async fn handle_request(
        &self,
        request: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Response {
        let limit = self.config.request_timeout();
        let (parts, body) = request.into_parts();

        let body = match tokio::time::timeout(limit, body.collect()).await {
            Ok(Ok(collected)) => collected.to_bytes(),
            Ok(Err(err)) => {
                tracing::warn!(
                    error = %err,
                    path = parts.uri.path(),
                    "failed to read request body"
                );
                return plain_text(StatusCode::BAD_REQUEST, "400 bad request\n");
            }
            Err(_) => {
                tracing::warn!(path = parts.uri.path(), "request body timed out");
                return plain_text(StatusCode::REQUEST_TIMEOUT, "408 request timeout\n");
            }
        };

        let request = Request::from_parts(parts, body);
        dispatch_within(&self.app, request, Some(remote_addr), limit).await
    }
}

/// Dispatches `request`, answering 504 if it runs longer than `limit`.
pub(crate) async fn dispatch_within(
    app: &App,
    request: Request<Bytes>,
    remote_addr: Option<SocketAddr>,
    limit: Duration,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    match tokio::time::timeout(limit, app.dispatch(request, remote_addr)).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(method = %method, path = %path, "request timed out");
            let status = StatusCode::GATEWAY_TIMEOUT;
            RequestLog {
                method: &method,
                status: status.as_u16(),
                path: &path,
                remote_addr,
                outcome: "request timed out",
                elapsed: started.elapsed(),
                request_id: None,
            }
            .emit();
            plain_text(status, "504 gateway timeout\n")
        }
    }
}
