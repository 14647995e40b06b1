use liveroom_core::{ConnectionId, ServerMessage};
use serde_json::Value;

/// Negotiation payload forwarded between two members of the same room.
/// The registry never looks inside it.
#[derive(Debug, Clone)]
pub enum RelayPayload {
    Offer(String),
    Answer(String),
    IceCandidate(Value),
}

impl RelayPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Offer(_) => "offer",
            Self::Answer(_) => "answer",
            Self::IceCandidate(_) => "ice-candidate",
        }
    }

    pub(crate) fn into_message(self, from: ConnectionId, to: ConnectionId) -> ServerMessage {
        match self {
            Self::Offer(sdp) => ServerMessage::Offer { from, to, sdp },
            Self::Answer(sdp) => ServerMessage::Answer { from, to, sdp },
            Self::IceCandidate(candidate) => ServerMessage::IceCandidate {
                from,
                to,
                candidate,
            },
        }
    }
}

/// Result of a relay attempt. A discard is an expected race, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    Discarded,
}
