use crate::model::connection::ConnectionId;
use crate::model::participant::ParticipantInfo;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

/// Events a client sends to the signaling server.
///
/// Negotiation payloads (`sdp`, `candidate`) are opaque to the server and are
/// forwarded to `to` unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    JoinRoom {
        room_id: RoomId,
        identity: String,
    },
    LeaveRoom {
        room_id: RoomId,
    },
    Offer {
        to: ConnectionId,
        sdp: String,
    },
    Answer {
        to: ConnectionId,
        sdp: String,
    },
    IceCandidate {
        to: ConnectionId,
        candidate: Value,
    },
    Ping,
}

/// Events the signaling server sends to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    Welcome {
        connection_id: ConnectionId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    /// Members present before the recipient joined, in join order.
    RoomParticipants {
        room_id: RoomId,
        participants: Vec<ParticipantInfo>,
    },
    ParticipantJoined {
        room_id: RoomId,
        participant: ParticipantInfo,
    },
    ParticipantLeft {
        room_id: RoomId,
        connection_id: ConnectionId,
    },
    Offer {
        from: ConnectionId,
        to: ConnectionId,
        sdp: String,
    },
    Answer {
        from: ConnectionId,
        to: ConnectionId,
        sdp: String,
    },
    IceCandidate {
        from: ConnectionId,
        to: ConnectionId,
        candidate: Value,
    },
    Pong,
    Error {
        code: ErrorCode,
        message: String,
    },
}

impl ServerMessage {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

/// Soft warning codes reported back to the sender. None of them close the
/// channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    MalformedMessage,
    InvalidJoin,
    AlreadyJoined,
    NotInRoom,
}
