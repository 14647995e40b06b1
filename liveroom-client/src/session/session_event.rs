use crate::transport::RemoteTrack;
use liveroom_core::{ConnectionId, ErrorCode, ParticipantInfo};

/// What the room session reports to the UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    ParticipantJoined(ParticipantInfo),
    ParticipantLeft(ConnectionId),
    PeerConnected(ConnectionId),
    /// Negotiation failed or timed out. The peer is not retried; the user
    /// has to rejoin to try again.
    PeerUnreachable(ConnectionId),
    PeerClosed(ConnectionId),
    TrackAdded {
        peer: ConnectionId,
        track: RemoteTrack,
    },
    ServerWarning {
        code: ErrorCode,
        message: String,
    },
}
