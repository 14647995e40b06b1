use crate::error::RegistryError;
use crate::room::{RelayOutcome, RelayPayload, Room};
use crate::signaling::SignalingOutput;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use liveroom_core::{ConnectionId, ParticipantInfo, RoomId, ServerMessage};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Authoritative map from room to members.
///
/// Every mutation of a room happens under that room's own lock, so joins and
/// leaves on one room are applied in a single total order while other rooms
/// proceed independently. Broadcasts are pushed into the recipients'
/// outbound queues while the lock is held (which fixes their order) but no
/// socket I/O happens under it.
pub struct RoomRegistry {
    rooms: DashMap<RoomId, Arc<Mutex<Room>>>,
    memberships: DashMap<ConnectionId, RoomId>,
    output: Arc<dyn SignalingOutput>,
}

impl RoomRegistry {
    pub fn new(output: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            output,
        }
    }

    /// Admits `connection_id` into `room_id`, creating the room if needed.
    ///
    /// Returns the members present before the join. The joiner receives the
    /// same list as `room-participants`; every earlier member receives
    /// `participant-joined`.
    pub async fn join(
        &self,
        connection_id: ConnectionId,
        room_id: RoomId,
        identity: String,
    ) -> Result<Vec<ParticipantInfo>, RegistryError> {
        if room_id.as_str().trim().is_empty() {
            return Err(RegistryError::InvalidJoin("room id must not be empty"));
        }
        if identity.trim().is_empty() {
            return Err(RegistryError::InvalidJoin("identity must not be empty"));
        }

        match self.memberships.entry(connection_id) {
            Entry::Occupied(entry) => {
                return Err(RegistryError::AlreadyJoined {
                    connection_id,
                    room_id: entry.get().clone(),
                });
            }
            Entry::Vacant(entry) => {
                entry.insert(room_id.clone());
            }
        }

        loop {
            let room_lock = self
                .rooms
                .entry(room_id.clone())
                .or_insert_with(|| {
                    info!("Creating new room: {}", room_id);
                    Arc::new(Mutex::new(Room::new(room_id.clone())))
                })
                .value()
                .clone();

            let mut room = room_lock.lock().await;
            if room.is_closed() {
                // Lost a race with the last leave; the entry is gone now.
                continue;
            }

            // A leave for this connection may have run between recording the
            // membership and taking the lock. Admitting it now would leave a
            // participant no later leave can reach.
            let still_member = self
                .memberships
                .get(&connection_id)
                .is_some_and(|r| *r.value() == room_id);
            if !still_member {
                warn!("{} left before its join to '{}' completed", connection_id, room_id);
                self.drop_if_empty(&mut room, &room_lock);
                return Err(RegistryError::InvalidJoin("connection left while joining"));
            }

            let existing = room.participants().to_vec();
            let participant = ParticipantInfo {
                connection_id,
                identity: identity.clone(),
                joined_at: Utc::now(),
            };

            for other in &existing {
                self.output.deliver(
                    other.connection_id,
                    ServerMessage::ParticipantJoined {
                        room_id: room_id.clone(),
                        participant: participant.clone(),
                    },
                );
            }
            room.insert(participant);
            self.output.deliver(
                connection_id,
                ServerMessage::RoomParticipants {
                    room_id: room_id.clone(),
                    participants: existing.clone(),
                },
            );

            info!(
                "{} joined room '{}' as '{}' ({} members)",
                connection_id,
                room_id,
                identity,
                room.participants().len()
            );
            return Ok(existing);
        }
    }

    /// Removes `connection_id` from whatever room it is in.
    ///
    /// Idempotent: an unknown connection is a no-op and returns `None`.
    /// Explicit `leave-room` and transport disconnects both end up here.
    pub async fn leave(&self, connection_id: ConnectionId) -> Option<RoomId> {
        let (_, room_id) = self.memberships.remove(&connection_id)?;

        let Some(room_lock) = self.rooms.get(&room_id).map(|r| r.value().clone()) else {
            warn!(
                "{} was registered in room '{}' but the room is gone",
                connection_id, room_id
            );
            return Some(room_id);
        };

        let mut room = room_lock.lock().await;
        if room.remove(&connection_id).is_some() {
            for other in room.participants() {
                self.output.deliver(
                    other.connection_id,
                    ServerMessage::ParticipantLeft {
                        room_id: room_id.clone(),
                        connection_id,
                    },
                );
            }
            info!("{} left room '{}'", connection_id, room_id);
        } else {
            // The join was cancelled before it reached the room.
            warn!("{} missing from room '{}' on leave", connection_id, room_id);
        }

        self.drop_if_empty(&mut room, &room_lock);
        Some(room_id)
    }

    fn drop_if_empty(&self, room: &mut Room, room_lock: &Arc<Mutex<Room>>) {
        if !room.is_empty() {
            return;
        }
        room.close();
        self.rooms
            .remove_if(room.id(), |_, current| Arc::ptr_eq(current, room_lock));
        info!("Room '{}' is empty, removed", room.id());
    }

    /// Forwards `payload` from one member to another, stamping `from`.
    ///
    /// Delivered only if both connections are in the same room right now;
    /// otherwise the message is dropped and logged.
    pub async fn relay(
        &self,
        from: ConnectionId,
        to: ConnectionId,
        payload: RelayPayload,
    ) -> RelayOutcome {
        let kind = payload.kind();

        let Some(room_id) = self.room_of(&from) else {
            debug!("Discarded {} from {} to {}: sender not in a room", kind, from, to);
            return RelayOutcome::Discarded;
        };
        let Some(room_lock) = self.rooms.get(&room_id).map(|r| r.value().clone()) else {
            debug!("Discarded {} from {} to {}: room gone", kind, from, to);
            return RelayOutcome::Discarded;
        };

        let room = room_lock.lock().await;
        if from == to || !room.contains(&from) || !room.contains(&to) {
            debug!(
                "Discarded {} from {} to {}: not sharing room '{}'",
                kind, from, to, room_id
            );
            return RelayOutcome::Discarded;
        }

        if self.output.deliver(to, payload.into_message(from, to)) {
            debug!("Relayed {} from {} to {}", kind, from, to);
            RelayOutcome::Delivered
        } else {
            RelayOutcome::Discarded
        }
    }

    pub fn room_of(&self, connection_id: &ConnectionId) -> Option<RoomId> {
        self.memberships
            .get(connection_id)
            .map(|r| r.value().clone())
    }

    /// Snapshot of a room's members in join order.
    pub async fn participants(&self, room_id: &RoomId) -> Option<Vec<ParticipantInfo>> {
        let room_lock = self.rooms.get(room_id).map(|r| r.value().clone())?;
        let room = room_lock.lock().await;
        if room.is_closed() {
            return None;
        }
        Some(room.participants().to_vec())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
