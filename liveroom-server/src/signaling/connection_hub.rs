use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use liveroom_core::{ConnectionId, ServerMessage};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Outbound queues of every live signaling connection.
pub struct ConnectionHub {
    next_id: AtomicU64,
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<ServerMessage>>,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            peers: DashMap::new(),
        }
    }

    /// Allocates a fresh connection id and stores its outbound queue.
    pub fn register(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> ConnectionId {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.peers.insert(id, tx);
        id
    }

    /// Drops the outbound queue. Only the first caller for an id gets `true`.
    pub fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.peers.remove(connection_id).is_some()
    }

    pub fn is_connected(&self, connection_id: &ConnectionId) -> bool {
        self.peers.contains_key(connection_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalingOutput for ConnectionHub {
    fn deliver(&self, to: ConnectionId, msg: ServerMessage) -> bool {
        let Some(peer) = self.peers.get(&to) else {
            warn!("Attempted to send signal to disconnected connection {}", to);
            return false;
        };
        if let Err(e) = peer.send(msg) {
            error!("Failed to queue message for {}: {}", to, e);
            return false;
        }
        true
    }
}
