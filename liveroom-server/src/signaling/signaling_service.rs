use crate::room::{RelayPayload, RoomRegistry};
use crate::signaling::{ConnectionHub, SignalingConfig, SignalingOutput};
use liveroom_core::{ClientMessage, ConnectionId, ErrorCode, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

struct SignalingInner {
    hub: Arc<ConnectionHub>,
    registry: RoomRegistry,
    config: SignalingConfig,
}

/// Server half of the signaling channel: owns the connection table and the
/// room registry, decodes client events and routes them.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(config: SignalingConfig) -> Self {
        let hub = Arc::new(ConnectionHub::new());
        let registry = RoomRegistry::new(hub.clone());

        Self {
            inner: Arc::new(SignalingInner {
                hub,
                registry,
                config,
            }),
        }
    }

    pub fn config(&self) -> &SignalingConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn hub(&self) -> &ConnectionHub {
        &self.inner.hub
    }

    /// Registers a new connection and queues `welcome` and `ice-config`.
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = self.inner.hub.register(tx);

        self.send(connection_id, ServerMessage::Welcome { connection_id });
        self.send(
            connection_id,
            ServerMessage::IceConfig {
                ice_servers: self.inner.config.ice_servers.clone(),
            },
        );

        info!("New signaling connection: {}", connection_id);
        (connection_id, rx)
    }

    /// Tears down a connection and leaves its room.
    ///
    /// Every closure path (read error, close frame, send failure, heartbeat
    /// timeout) calls this; only the first call for an id reaches the
    /// registry.
    pub async fn disconnect(&self, connection_id: ConnectionId) -> bool {
        if !self.inner.hub.unregister(&connection_id) {
            return false;
        }
        if let Some(room_id) = self.inner.registry.leave(connection_id).await {
            info!("{} disconnected, removed from room '{}'", connection_id, room_id);
        } else {
            info!("{} disconnected", connection_id);
        }
        true
    }

    /// Decodes one text frame and dispatches it. Malformed frames are
    /// answered with a soft `error` and otherwise ignored.
    pub async fn handle_text(&self, connection_id: ConnectionId, text: &str) {
        match serde_json::from_str::<ClientMessage>(text) {
            Ok(msg) => self.dispatch(connection_id, msg).await,
            Err(e) => {
                warn!("Invalid ClientMessage from {}: {}", connection_id, e);
                self.send(
                    connection_id,
                    ServerMessage::error(ErrorCode::MalformedMessage, e.to_string()),
                );
            }
        }
    }

    pub async fn dispatch(&self, connection_id: ConnectionId, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinRoom { room_id, identity } => {
                self.on_join(connection_id, room_id, identity).await
            }
            ClientMessage::LeaveRoom { room_id } => self.on_leave(connection_id, room_id).await,
            ClientMessage::Offer { to, sdp } => {
                self.on_relay(connection_id, to, RelayPayload::Offer(sdp)).await
            }
            ClientMessage::Answer { to, sdp } => {
                self.on_relay(connection_id, to, RelayPayload::Answer(sdp)).await
            }
            ClientMessage::IceCandidate { to, candidate } => {
                self.on_relay(connection_id, to, RelayPayload::IceCandidate(candidate))
                    .await
            }
            ClientMessage::Ping => {
                self.send(connection_id, ServerMessage::Pong);
            }
        }
    }

    async fn on_join(&self, connection_id: ConnectionId, room_id: RoomId, identity: String) {
        info!("{} wants to join room '{}'", connection_id, room_id);

        if let Err(e) = self
            .inner
            .registry
            .join(connection_id, room_id, identity)
            .await
        {
            warn!("Join rejected for {}: {}", connection_id, e);
            self.send(connection_id, ServerMessage::error(e.code(), e.to_string()));
        }
    }

    async fn on_leave(&self, connection_id: ConnectionId, room_id: RoomId) {
        if self.inner.registry.room_of(&connection_id).as_ref() != Some(&room_id) {
            warn!("{} asked to leave '{}' but is not in it", connection_id, room_id);
            self.send(
                connection_id,
                ServerMessage::error(
                    ErrorCode::NotInRoom,
                    format!("not a member of room '{}'", room_id),
                ),
            );
            return;
        }
        self.inner.registry.leave(connection_id).await;
    }

    async fn on_relay(&self, from: ConnectionId, to: ConnectionId, payload: RelayPayload) {
        if self.inner.registry.room_of(&from).is_none() {
            self.send(
                from,
                ServerMessage::error(ErrorCode::NotInRoom, "join a room before signaling"),
            );
            return;
        }
        self.inner.registry.relay(from, to, payload).await;
    }

    fn send(&self, connection_id: ConnectionId, msg: ServerMessage) {
        self.inner.hub.deliver(connection_id, msg);
    }
}
