use liveroom_core::{ConnectionId, ParticipantInfo, RoomId};

/// Membership of one live room, in join order.
///
/// A `Room` only lives behind the registry's per-room lock. Once the last
/// participant leaves it is marked closed and dropped from the registry; a
/// join that raced with the close sees the flag and retries on a fresh room.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    participants: Vec<ParticipantInfo>,
    closed: bool,
}

impl Room {
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            participants: Vec::new(),
            closed: false,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn participants(&self) -> &[ParticipantInfo] {
        &self.participants
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.participants
            .iter()
            .any(|p| &p.connection_id == connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub(crate) fn insert(&mut self, participant: ParticipantInfo) {
        self.participants.push(participant);
    }

    pub(crate) fn remove(&mut self, connection_id: &ConnectionId) -> Option<ParticipantInfo> {
        let idx = self
            .participants
            .iter()
            .position(|p| &p.connection_id == connection_id)?;
        Some(self.participants.remove(idx))
    }

    pub(crate) fn close(&mut self) {
        self.closed = true;
    }
}
