mod negotiation_state;
mod peer_link;
mod room_session;
mod session_config;
mod session_event;

pub use negotiation_state::*;
pub use peer_link::*;
pub use room_session::*;
pub use session_config::*;
pub use session_event::*;
