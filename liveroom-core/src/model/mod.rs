mod connection;
mod participant;
mod room;
mod signaling;

pub use connection::ConnectionId;
pub use participant::ParticipantInfo;
pub use room::RoomId;
pub use signaling::{ClientMessage, ErrorCode, IceServerConfig, ServerMessage};
