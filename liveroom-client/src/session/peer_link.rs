use crate::session::NegotiationState;
use crate::signaling::SignalSender;
use crate::transport::{PeerTransport, RemoteTrack};
use liveroom_core::{ClientMessage, ConnectionId, ParticipantInfo};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Media received from one remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub peer: ConnectionId,
    pub tracks: Vec<RemoteTrack>,
}

/// Result of feeding one event into a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkUpdate {
    /// Accepted, no state change worth reporting.
    Unchanged,
    /// Stale, duplicate or malformed input; dropped.
    Discarded,
    /// Negotiation completed.
    Connected,
    /// Negotiation cannot proceed; the link should be closed.
    Failed(String),
}

/// Client-side negotiation state machine for one remote participant.
pub struct PeerLink<T: PeerTransport> {
    remote: ParticipantInfo,
    state: NegotiationState,
    transport: T,
    signals: SignalSender,
    local_description: Option<String>,
    remote_description: Option<String>,
    // Candidates that arrived before the remote description was applied.
    pending_candidates: Vec<Value>,
    stream: Option<RemoteStream>,
    deadline: Option<Instant>,
}

impl<T: PeerTransport> PeerLink<T> {
    pub fn new(remote: ParticipantInfo, transport: T, signals: SignalSender) -> Self {
        Self {
            remote,
            state: NegotiationState::Idle,
            transport,
            signals,
            local_description: None,
            remote_description: None,
            pending_candidates: Vec::new(),
            stream: None,
            deadline: None,
        }
    }

    pub fn remote_id(&self) -> ConnectionId {
        self.remote.connection_id
    }

    pub fn remote(&self) -> &ParticipantInfo {
        &self.remote
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn local_description(&self) -> Option<&str> {
        self.local_description.as_deref()
    }

    pub fn remote_description(&self) -> Option<&str> {
        self.remote_description.as_deref()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn stream(&self) -> Option<&RemoteStream> {
        self.stream.as_ref()
    }

    /// Start the offering side of the negotiation.
    pub async fn start_offer(&mut self, timeout: Duration) -> LinkUpdate {
        if self.state != NegotiationState::Idle {
            warn!(
                "Ignoring offer start for {} in state {:?}",
                self.remote_id(),
                self.state
            );
            return LinkUpdate::Discarded;
        }

        self.state = NegotiationState::Offering;
        self.deadline = Some(Instant::now() + timeout);

        let sdp = match self.transport.create_offer().await {
            Ok(sdp) => sdp,
            Err(e) => return LinkUpdate::Failed(format!("create offer: {e:#}")),
        };
        self.local_description = Some(sdp.clone());

        if !self.signals.send(ClientMessage::Offer {
            to: self.remote_id(),
            sdp,
        }) {
            return LinkUpdate::Failed("signaling channel closed".into());
        }

        self.state = NegotiationState::AwaitingAnswer;
        debug!("Sent offer to {}", self.remote_id());
        LinkUpdate::Unchanged
    }

    pub async fn handle_offer(&mut self, sdp: String, timeout: Duration) -> LinkUpdate {
        if !matches!(
            self.state,
            NegotiationState::Idle | NegotiationState::Answering
        ) {
            warn!(
                "Discarding offer from {} in state {:?}",
                self.remote_id(),
                self.state
            );
            return LinkUpdate::Discarded;
        }

        if self.state == NegotiationState::Idle {
            self.state = NegotiationState::Answering;
            self.deadline = Some(Instant::now() + timeout);
        }

        let answer = match self.transport.accept_offer(sdp.clone()).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Dropping unusable offer from {}: {:#}", self.remote_id(), e);
                return LinkUpdate::Discarded;
            }
        };
        self.remote_description = Some(sdp);
        self.local_description = Some(answer.clone());
        self.flush_candidates().await;

        if !self.signals.send(ClientMessage::Answer {
            to: self.remote_id(),
            sdp: answer,
        }) {
            return LinkUpdate::Failed("signaling channel closed".into());
        }

        self.mark_connected();
        LinkUpdate::Connected
    }

    pub async fn handle_answer(&mut self, sdp: String) -> LinkUpdate {
        if self.state != NegotiationState::AwaitingAnswer || self.local_description.is_none() {
            warn!(
                "Discarding stale answer from {} in state {:?}",
                self.remote_id(),
                self.state
            );
            return LinkUpdate::Discarded;
        }

        if let Err(e) = self.transport.accept_answer(sdp.clone()).await {
            warn!("Dropping unusable answer from {}: {:#}", self.remote_id(), e);
            return LinkUpdate::Discarded;
        }
        self.remote_description = Some(sdp);
        self.flush_candidates().await;

        self.mark_connected();
        LinkUpdate::Connected
    }

    pub async fn handle_candidate(&mut self, candidate: Value) -> LinkUpdate {
        if self.state == NegotiationState::Closed {
            return LinkUpdate::Discarded;
        }
        if self.remote_description.is_none() {
            self.pending_candidates.push(candidate);
            return LinkUpdate::Unchanged;
        }
        if let Err(e) = self.transport.add_ice_candidate(candidate).await {
            warn!("Dropping ICE candidate from {}: {:#}", self.remote_id(), e);
            return LinkUpdate::Discarded;
        }
        LinkUpdate::Unchanged
    }

    pub fn add_track(&mut self, track: RemoteTrack) {
        let peer = self.remote_id();
        let stream = self.stream.get_or_insert_with(|| RemoteStream {
            peer,
            tracks: Vec::new(),
        });
        if !stream.tracks.contains(&track) {
            stream.tracks.push(track);
        }
    }

    /// True when a pending negotiation has outlived its deadline.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.state.is_pending() && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Release everything. Terminal.
    pub async fn close(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }
        self.state = NegotiationState::Closed;
        self.deadline = None;
        self.pending_candidates.clear();
        self.stream = None;

        if let Err(e) = self.transport.close().await {
            warn!("Failed to close transport for {}: {:#}", self.remote_id(), e);
        }
        info!("Peer link to {} closed", self.remote_id());
    }

    fn mark_connected(&mut self) {
        self.state = NegotiationState::Connected;
        self.deadline = None;
        info!("Negotiation with {} complete", self.remote_id());
    }

    async fn flush_candidates(&mut self) {
        for candidate in std::mem::take(&mut self.pending_candidates) {
            if let Err(e) = self.transport.add_ice_candidate(candidate).await {
                warn!(
                    "Dropping buffered ICE candidate from {}: {:#}",
                    self.remote_id(),
                    e
                );
            }
        }
    }
}
