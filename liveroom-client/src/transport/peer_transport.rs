use crate::transport::{TransportConfig, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use liveroom_core::ConnectionId;
use serde_json::Value;
use tokio::sync::mpsc;

/// Media-layer connection to one remote participant.
///
/// Descriptions and candidates are opaque here; the orchestrator only cares
/// about the order in which they are produced and applied.
#[async_trait]
pub trait PeerTransport: Send + Sync + 'static {
    /// Produce and apply a local offer.
    async fn create_offer(&self) -> Result<String>;

    /// Apply a remote offer, then produce and apply the local answer.
    async fn accept_offer(&self, sdp: String) -> Result<String>;

    /// Apply the remote answer to a previously produced offer.
    async fn accept_answer(&self, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: Value) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Creates one transport per peer link. Asynchronous transport activity
/// (trickle candidates, remote tracks, failures) is reported on `events`.
#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    type Transport: PeerTransport;

    async fn create(
        &self,
        remote: ConnectionId,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Self::Transport>;
}
