mod session;
mod signaling;
mod transport;

pub use session::*;
pub use signaling::*;
pub use transport::*;
