//! A registered broadcast client.

use std::net::SocketAddr;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;

/// Key of a client in the server's client set, also shown in logs.
///
/// Assigned by the owning server in accept order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl From<u64> for ConnectionId {
    fn from(seq: u64) -> Self {
        Self(seq)
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One accepted connection in the broadcast set.
///
/// The write half sits behind its own mutex so that whole frames to the
/// same peer are never interleaved, whichever task is sending.
#[derive(Debug)]
pub struct Client {
    id: ConnectionId,
    peer_addr: SocketAddr,
    pub(crate) writer: Mutex<OwnedWriteHalf>,
}

impl Client {
    pub fn new(id: ConnectionId, peer_addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id,
            peer_addr,
            writer: Mutex::new(writer),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_display() {
        assert_eq!(ConnectionId::from(7).to_string(), "conn-7");
    }
}
