mod error;
mod signal_sender;
mod signaling_client;

pub use error::*;
pub use signal_sender::*;
pub use signaling_client::*;
