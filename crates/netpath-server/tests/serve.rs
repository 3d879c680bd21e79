//! Serves a real socket and talks raw HTTP/1.1 to it.

use std::time::Duration;

use netpath_config::ServerConfig;
use netpath_core::{Context, Handler, HandlerResult};
use netpath_server::{AppBuilder, Server, ShutdownSignal};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

async fn show_user(ctx: &mut Context) -> HandlerResult {
    let id = ctx.param("id").unwrap_or_default().to_owned();
    let from = ctx.remote_addr().map(|addr| addr.ip().to_string());
    ctx.success(serde_json::json!({ "id": id, "loopback": from.as_deref() == Some("127.0.0.1") }))
}

async fn roundtrip(addr: std::net::SocketAddr, raw: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(raw.as_bytes()).await.unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8(response).unwrap()
}

#[tokio::test]
async fn test_serves_routes_and_shuts_down() {
    let mut builder = AppBuilder::new();
    builder
        .get(
            "/users/:id",
            Handler::new(|ctx: &mut Context| Box::pin(show_user(ctx))),
        )
        .unwrap();
    let server = Server::new(builder.build(), ServerConfig::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = ShutdownSignal::new();
    let task = tokio::spawn(server.serve(listener, shutdown.clone()));

    let found = roundtrip(
        addr,
        "GET /users/42 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(found.starts_with("HTTP/1.1 200 OK"), "{found}");
    assert!(found.contains("application/json"), "{found}");
    assert!(found.ends_with(r#"{"code":200,"data":{"id":"42","loopback":true}}"#), "{found}");

    let missing = roundtrip(
        addr,
        "GET /nope HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(missing.starts_with("HTTP/1.1 404 Not Found"), "{missing}");
    assert!(missing.contains("text/plain; charset=utf-8"), "{missing}");
    assert!(missing.ends_with("404 page not found\n"), "{missing}");

    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), task)
        .await
        .unwrap()
        .unwrap();
}
