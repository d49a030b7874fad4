//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use centauri_broadcast::broadcast::protocol::{read_frame, DEFAULT_MAX_PAYLOAD};
use centauri_broadcast::config::ListenerConfig;
use centauri_broadcast::{BroadcastServer, Shutdown};
use tokio::net::TcpStream;

pub const WAIT: Duration = Duration::from_secs(10);

/// Start a server on an ephemeral loopback port.
///
/// Keep the returned `Shutdown` alive for as long as the server should run.
pub async fn start_server(config: ListenerConfig) -> (Arc<BroadcastServer>, SocketAddr, Shutdown) {
    let config = ListenerConfig {
        bind_address: "127.0.0.1:0".to_string(),
        ..config
    };
    let server = Arc::new(BroadcastServer::new(config));
    let shutdown = Shutdown::new();
    let addr = server.start(shutdown.subscribe()).await.unwrap();
    (server, addr, shutdown)
}

/// Connect a client and wait until the server has registered it.
pub async fn connect(server: &BroadcastServer, addr: SocketAddr) -> TcpStream {
    let before = server.client_count().await;
    let stream = TcpStream::connect(addr).await.unwrap();
    wait_for_clients(server, before + 1).await;
    stream
}

/// Poll until the server tracks exactly `expected` clients.
pub async fn wait_for_clients(server: &BroadcastServer, expected: usize) {
    tokio::time::timeout(WAIT, async {
        while server.client_count().await != expected {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("server never reached {expected} clients"));
}

/// Read one frame's payload as a string.
pub async fn recv(stream: &mut TcpStream) -> String {
    let payload = tokio::time::timeout(WAIT, read_frame(stream, DEFAULT_MAX_PAYLOAD))
        .await
        .expect("timed out waiting for frame")
        .expect("failed to read frame");
    String::from_utf8(payload).unwrap()
}

/// Assert nothing arrives within `window`.
pub async fn assert_silent(stream: &mut TcpStream, window: Duration) {
    let mut byte = [0u8; 1];
    let read = tokio::time::timeout(window, stream.peek(&mut byte)).await;
    assert!(read.is_err(), "unexpected data on connection");
}
