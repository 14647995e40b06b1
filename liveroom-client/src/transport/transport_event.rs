use liveroom_core::ConnectionId;
use serde_json::Value;

/// Description of one remote media track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub stream_id: String,
    pub track_id: String,
    pub kind: String,
}

/// Events a transport produces for the room session loop.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// A local ICE candidate that must reach the remote peer via signaling.
    CandidateGenerated(ConnectionId, Value),

    /// The remote peer started sending a track.
    TrackAdded(ConnectionId, RemoteTrack),

    /// The media connection failed or closed underneath us.
    Disconnected(ConnectionId),
}
