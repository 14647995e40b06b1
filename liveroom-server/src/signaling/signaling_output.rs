use liveroom_core::{ConnectionId, ServerMessage};

/// Sink the room registry pushes server events into.
///
/// `deliver` must only enqueue: it is called while a room lock is held.
/// Returns false when the recipient has no live outbound queue.
pub trait SignalingOutput: Send + Sync {
    fn deliver(&self, to: ConnectionId, msg: ServerMessage) -> bool;
}
