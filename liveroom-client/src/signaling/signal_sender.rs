use liveroom_core::ClientMessage;
use tokio::sync::mpsc;
use tracing::warn;

/// Handle for queueing events onto the signaling channel.
///
/// Sending never waits on the network; the socket writer drains the queue.
#[derive(Debug, Clone)]
pub struct SignalSender {
    tx: mpsc::UnboundedSender<ClientMessage>,
}

impl SignalSender {
    pub fn new(tx: mpsc::UnboundedSender<ClientMessage>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    /// Returns false once the channel is gone.
    pub fn send(&self, msg: ClientMessage) -> bool {
        if self.tx.send(msg).is_err() {
            warn!("Signaling channel closed, message dropped");
            return false;
        }
        true
    }
}
