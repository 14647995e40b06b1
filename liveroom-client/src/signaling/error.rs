use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum SignalingClientError {
    #[error("failed to connect to signaling server: {0}")]
    Connect(#[from] tungstenite::Error),
}
