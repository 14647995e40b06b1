mod relay_payload;
mod room;
mod room_registry;

pub use relay_payload::*;
pub use room::*;
pub use room_registry::*;
