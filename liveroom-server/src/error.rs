use liveroom_core::{ConnectionId, ErrorCode, RoomId};
use thiserror::Error;

/// Errors the room registry surfaces to its immediate caller.
///
/// Races inherent to a multi-party room (target already gone, repeated
/// leave) are absorbed by the registry and never show up here.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection {connection_id} is already in room '{room_id}'")]
    AlreadyJoined {
        connection_id: ConnectionId,
        room_id: RoomId,
    },

    #[error("invalid join request: {0}")]
    InvalidJoin(&'static str),
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::AlreadyJoined { .. } => ErrorCode::AlreadyJoined,
            Self::InvalidJoin(_) => ErrorCode::InvalidJoin,
        }
    }
}
