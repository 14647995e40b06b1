mod connection_hub;
mod signaling_config;
mod signaling_output;
mod signaling_service;
mod ws_handler;

pub use connection_hub::*;
pub use signaling_config::*;
pub use signaling_output::*;
pub use signaling_service::*;
pub use ws_handler::*;
