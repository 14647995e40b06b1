use crate::transport::{PeerTransport, RemoteTrack, TransportConfig, TransportEvent, TransportFactory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use liveroom_core::ConnectionId;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::RTPCodecType;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// Builds `webrtc` peer connections for the mesh.
///
/// With no local tracks the connection still negotiates one audio and one
/// video transceiver so remote media can flow in.
#[derive(Default, Clone)]
pub struct WebRtcTransportFactory {
    local_tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
}

impl WebRtcTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_local_tracks(local_tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>) -> Self {
        Self { local_tracks }
    }
}

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    type Transport = WebRtcTransport;

    async fn create(
        &self,
        remote: ConnectionId,
        config: &TransportConfig,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<WebRtcTransport> {
        WebRtcTransport::new(remote, config, &self.local_tracks, events).await
    }
}

pub struct WebRtcTransport {
    pub remote: ConnectionId,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl WebRtcTransport {
    pub async fn new(
        remote: ConnectionId,
        config: &TransportConfig,
        local_tracks: &[Arc<dyn TrackLocal + Send + Sync>],
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        if local_tracks.is_empty() {
            peer_connection
                .add_transceiver_from_kind(RTPCodecType::Audio, None)
                .await?;
            peer_connection
                .add_transceiver_from_kind(RTPCodecType::Video, None)
                .await?;
        } else {
            for track in local_tracks {
                peer_connection.add_track(track.clone()).await?;
            }
        }

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state with {} changed: {:?}", remote, s);
                    if matches!(
                        s,
                        RTCPeerConnectionState::Failed | RTCPeerConnectionState::Closed
                    ) {
                        let _ = tx.send(TransportEvent::Disconnected(remote)).await;
                    }
                })
            },
        ));

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Ok(value) = serde_json::to_value(&init) else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(remote, value))
                    .await;
            })
        }));

        let track_tx = event_tx;
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let remote_track = RemoteTrack {
                        stream_id: track.stream_id(),
                        track_id: track.id(),
                        kind: track.kind().to_string(),
                    };
                    debug!("Remote {} track from {}", remote_track.kind, remote);
                    let _ = tx.send(TransportEvent::TrackAdded(remote, remote_track)).await;
                })
            },
        ));

        Ok(Self {
            remote,
            peer_connection,
        })
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        let desc = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn accept_answer(&self, sdp: String) -> Result<()> {
        let desc = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: Value) -> Result<()> {
        let candidate: RTCIceCandidateInit =
            serde_json::from_value(candidate).context("Failed to parse ICE candidate JSON")?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
