//! Broadcast server.
//!
//! # Responsibilities
//! - Bind the listener and run the accept loop
//! - Track connected clients until their reader sees EOF or an error
//! - Cache the last payload and sync it to newly connected clients
//! - Fan each new payload out to every registered client

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::RwLock;

use crate::broadcast::client::{Client, ConnectionId};
use crate::broadcast::protocol::{write_frame, ProtocolError};
use crate::config::ListenerConfig;
use crate::lifecycle::ShutdownSignal;
use crate::net::listener::{Listener, ListenerError};
use crate::observability::metrics::{self, MessageKind};

/// Errors surfaced by the broadcast server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listener could not be created. Fatal at startup.
    #[error(transparent)]
    Bind(ListenerError),

    /// The server was already started.
    #[error("server already started on {0}")]
    AlreadyStarted(SocketAddr),
}

/// Failure to deliver one frame to one client.
#[derive(Debug, Error)]
pub enum SendError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),
}

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Clients that received the full frame.
    pub delivered: usize,
    /// Clients whose frame was abandoned.
    pub failed: usize,
}

/// Shared mutable state, guarded by a single reader/writer lock.
#[derive(Debug, Default)]
struct ServerState {
    clients: HashMap<ConnectionId, Arc<Client>>,
    last_payload: Option<Arc<[u8]>>,
}

/// TCP server that pushes configuration documents to every connected client.
#[derive(Debug)]
pub struct BroadcastServer {
    config: ListenerConfig,
    state: RwLock<ServerState>,
    local_addr: OnceLock<SocketAddr>,
    next_id: AtomicU64,
}

impl BroadcastServer {
    pub fn new(config: ListenerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ServerState::default()),
            local_addr: OnceLock::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Bind the listener and spawn the accept loop.
    ///
    /// Returns as soon as the listener is bound. The accept loop runs until
    /// `shutdown` fires.
    pub async fn start(
        self: &Arc<Self>,
        shutdown: ShutdownSignal,
    ) -> Result<SocketAddr, ServerError> {
        if let Some(addr) = self.local_addr.get() {
            return Err(ServerError::AlreadyStarted(*addr));
        }

        let listener = Listener::bind(&self.config.bind_address)
            .await
            .map_err(ServerError::Bind)?;
        let addr = listener.local_addr();
        if self.local_addr.set(addr).is_err() {
            return Err(ServerError::AlreadyStarted(addr));
        }

        tracing::info!(address = %addr, "Broadcast server listening");

        let server = Arc::clone(self);
        tokio::spawn(async move {
            server.accept_loop(listener, shutdown).await;
        });

        Ok(addr)
    }

    /// Address the listener is bound to, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Number of currently registered clients.
    pub async fn client_count(&self) -> usize {
        self.state.read().await.clients.len()
    }

    /// The most recently broadcast payload, if any.
    pub async fn last_payload(&self) -> Option<Arc<[u8]>> {
        self.state.read().await.last_payload.clone()
    }

    /// Send `document` to every registered client and remember it for
    /// clients that connect later.
    ///
    /// Clients are sent to one after another, outside the state lock. A
    /// failing client is logged and its connection closed; its reader
    /// removes it once the peer goes away.
    pub async fn broadcast(&self, document: &str) -> BroadcastReport {
        let payload: Arc<[u8]> = Arc::from(document.as_bytes());

        let clients: Vec<Arc<Client>> = {
            let mut state = self.state.write().await;
            state.last_payload = Some(Arc::clone(&payload));
            state.clients.values().cloned().collect()
        };

        metrics::record_broadcast(payload.len());
        tracing::debug!(
            clients = clients.len(),
            size = payload.len(),
            "Broadcasting config"
        );

        let mut report = BroadcastReport::default();
        for client in clients {
            let mut writer = client.writer.lock().await;
            if self
                .send(&client, &mut writer, &payload, MessageKind::Broadcast)
                .await
            {
                report.delivered += 1;
            } else {
                report.failed += 1;
            }
        }
        report
    }

    async fn accept_loop(self: Arc<Self>, listener: Listener, mut shutdown: ShutdownSignal) {
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr)) => {
                        let id = ConnectionId::from(self.next_id.fetch_add(1, Ordering::Relaxed));
                        let server = Arc::clone(&self);
                        tokio::spawn(async move {
                            server.serve_client(stream, peer_addr, id).await;
                        });
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to accept connection");
                        tokio::time::sleep(self.config.accept_error_delay()).await;
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("Broadcast server received shutdown signal, exiting accept loop");
                    break;
                }
            }
        }
    }

    /// Register a connection, sync it, then watch it until it goes away.
    async fn serve_client(self: Arc<Self>, stream: TcpStream, peer_addr: SocketAddr, id: ConnectionId) {
        let (reader, writer) = stream.into_split();
        let client = Arc::new(Client::new(id, peer_addr, writer));

        // Held across registration so no broadcast can reach this client
        // before its sync message.
        let mut writer = client.writer.lock().await;

        let (last_payload, count) = {
            let mut state = self.state.write().await;
            state.clients.insert(id, Arc::clone(&client));
            (state.last_payload.clone(), state.clients.len())
        };

        metrics::record_clients(count);
        tracing::info!(
            connection_id = %id,
            peer_addr = %peer_addr,
            clients = count,
            "Client connected"
        );

        if let Some(payload) = last_payload {
            self.send(&client, &mut writer, &payload, MessageKind::Sync)
                .await;
        }
        drop(writer);

        self.watch_disconnect(client, reader).await;
    }

    /// Read and discard until EOF or error, then drop the client.
    async fn watch_disconnect(&self, client: Arc<Client>, mut reader: OwnedReadHalf) {
        let mut buf = [0u8; 512];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) => {
                    tracing::info!(
                        connection_id = %client.id(),
                        peer_addr = %client.peer_addr(),
                        "Client disconnected"
                    );
                    break;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::info!(
                        connection_id = %client.id(),
                        peer_addr = %client.peer_addr(),
                        error = %e,
                        "Client disconnected"
                    );
                    break;
                }
            }
        }

        let count = {
            let mut state = self.state.write().await;
            state.clients.remove(&client.id());
            state.clients.len()
        };
        metrics::record_clients(count);

        // A broadcast stalled on this peer still holds the writer; it fails
        // on its own once the peer is gone.
        if let Ok(mut writer) = client.writer.try_lock() {
            let _ = writer.shutdown().await;
        }
    }

    /// Send one frame, logging the outcome. Returns whether it was delivered.
    ///
    /// On failure the write half is shut down: a frame cut short leaves the
    /// peer mid-message, so nothing more may be written on this stream.
    async fn send(
        &self,
        client: &Client,
        writer: &mut OwnedWriteHalf,
        payload: &[u8],
        kind: MessageKind,
    ) -> bool {
        let result = match self.config.send_timeout() {
            Some(limit) => match tokio::time::timeout(limit, write_frame(writer, payload)).await {
                Ok(sent) => sent.map_err(SendError::from),
                Err(_) => Err(SendError::Timeout(limit)),
            },
            None => write_frame(writer, payload).await.map_err(SendError::from),
        };

        metrics::record_send(kind, result.is_ok());
        match result {
            Ok(()) => {
                tracing::info!(
                    connection_id = %client.id(),
                    peer_addr = %client.peer_addr(),
                    kind = kind.as_str(),
                    size = payload.len(),
                    "Sent config to client"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    connection_id = %client.id(),
                    peer_addr = %client.peer_addr(),
                    kind = kind.as_str(),
                    size = payload.len(),
                    error = %e,
                    "Failed to send config to client"
                );
                if let Err(e) = writer.shutdown().await {
                    tracing::debug!(
                        connection_id = %client.id(),
                        error = %e,
                        "Failed to close client connection"
                    );
                }
                false
            }
        }
    }
}
