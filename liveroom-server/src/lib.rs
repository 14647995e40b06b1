mod app;
mod config;
mod error;
mod room;
mod signaling;

pub use app::router;
pub use config::ServerConfig;
pub use error::RegistryError;
pub use room::*;
pub use signaling::*;
