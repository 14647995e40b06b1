use crate::signaling::{SignalSender, SignalingClientError};
use futures::{SinkExt, StreamExt};
use liveroom_core::ServerMessage;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Client half of the signaling channel.
///
/// Inbound frames are decoded into `ServerMessage`s; frames that do not
/// decode are logged and dropped. When the socket closes for any reason the
/// inbound receiver ends, which is how the room session learns about it.
pub struct SignalingConnection {
    pub sender: SignalSender,
    pub inbound: mpsc::UnboundedReceiver<ServerMessage>,
}

impl SignalingConnection {
    pub async fn connect(url: &str) -> Result<Self, SignalingClientError> {
        let (ws, _) = connect_async(url).await?;
        info!("Connected to signaling server at {}", url);

        let (mut write, mut read) = ws.split();
        let (sender, mut outbound) = SignalSender::channel();
        let (inbound_tx, inbound) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            while let Some(msg) = outbound.recv().await {
                let json = match serde_json::to_string(&msg) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize client message: {}", e);
                        continue;
                    }
                };
                if let Err(e) = write.send(Message::text(json)).await {
                    warn!("Signaling send failed: {}", e);
                    break;
                }
            }
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => {
                        match serde_json::from_str::<ServerMessage>(text.as_str()) {
                            Ok(msg) => {
                                if inbound_tx.send(msg).is_err() {
                                    break;
                                }
                            }
                            Err(e) => warn!("Invalid ServerMessage: {}", e),
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        debug!("Signaling read failed: {}", e);
                        break;
                    }
                }
            }
            info!("Signaling connection closed");
        });

        Ok(Self { sender, inbound })
    }

    /// Split into the outbound handle and the inbound stream. The socket
    /// tasks keep running until either side closes.
    pub fn into_parts(self) -> (SignalSender, mpsc::UnboundedReceiver<ServerMessage>) {
        (self.sender, self.inbound)
    }
}
