use crate::session::{LinkUpdate, NegotiationState, PeerLink, RemoteStream, SessionConfig, SessionEvent};
use crate::signaling::SignalSender;
use crate::transport::{TransportConfig, TransportEvent, TransportFactory};
use liveroom_core::{ClientMessage, ConnectionId, ParticipantInfo, RoomId, ServerMessage};
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const TRANSPORT_EVENT_CAPACITY: usize = 256;

/// Requests from the UI layer to a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Leave,
}

/// Owns every peer link of the local participant in one room and keeps
/// them matched to the server's membership view.
///
/// All mutation happens on the task driving the session: server messages,
/// transport events and timeout sweeps are handled one at a time, and
/// transports only talk back through the event queue.
pub struct RoomSession<F: TransportFactory> {
    room_id: RoomId,
    identity: String,
    local_id: Option<ConnectionId>,
    factory: F,
    config: SessionConfig,
    transport_config: TransportConfig,
    joined: bool,
    members: BTreeMap<ConnectionId, ParticipantInfo>,
    links: HashMap<ConnectionId, PeerLink<F::Transport>>,
    // Peers whose negotiation failed; not retried while they stay in the room.
    unreachable: HashSet<ConnectionId>,
    signals: SignalSender,
    transport_tx: mpsc::Sender<TransportEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl<F: TransportFactory> RoomSession<F> {
    pub fn new(
        room_id: impl Into<RoomId>,
        identity: impl Into<String>,
        factory: F,
        config: SessionConfig,
        signals: SignalSender,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (transport_tx, transport_rx) = mpsc::channel(TRANSPORT_EVENT_CAPACITY);
        let (events, events_rx) = mpsc::unbounded_channel();

        let session = Self {
            room_id: room_id.into(),
            identity: identity.into(),
            local_id: None,
            factory,
            config,
            transport_config: TransportConfig::default(),
            joined: false,
            members: BTreeMap::new(),
            links: HashMap::new(),
            unreachable: HashSet::new(),
            signals,
            transport_tx,
            transport_rx,
            events,
        };
        (session, events_rx)
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    pub fn local_id(&self) -> Option<ConnectionId> {
        self.local_id
    }

    pub fn members(&self) -> impl Iterator<Item = &ParticipantInfo> {
        self.members.values()
    }

    pub fn peer_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<_> = self.links.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn link(&self, remote: ConnectionId) -> Option<&PeerLink<F::Transport>> {
        self.links.get(&remote)
    }

    pub fn link_state(&self, remote: ConnectionId) -> Option<NegotiationState> {
        self.links.get(&remote).map(|link| link.state())
    }

    pub fn is_unreachable(&self, remote: ConnectionId) -> bool {
        self.unreachable.contains(&remote)
    }

    /// Remote media currently exposed to the UI.
    pub fn streams(&self) -> Vec<&RemoteStream> {
        self.links.values().filter_map(|link| link.stream()).collect()
    }

    pub fn transport_config(&self) -> &TransportConfig {
        &self.transport_config
    }

    pub fn join(&mut self) {
        if self.joined {
            return;
        }
        info!("Joining room '{}' as '{}'", self.room_id, self.identity);
        self.joined = self.signals.send(ClientMessage::JoinRoom {
            room_id: self.room_id.clone(),
            identity: self.identity.clone(),
        });
    }

    /// Sends `leave-room` and closes every link.
    pub async fn leave(&mut self) {
        if self.joined {
            self.signals.send(ClientMessage::LeaveRoom {
                room_id: self.room_id.clone(),
            });
            self.joined = false;
            info!("Left room '{}'", self.room_id);
        }
        self.shutdown().await;
    }

    pub async fn handle_server_message(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { connection_id } => {
                info!("Signaling assigned id {}", connection_id);
                self.local_id = Some(connection_id);
                self.reconcile().await;
            }
            ServerMessage::IceConfig { ice_servers } => {
                debug!("Received {} ICE servers", ice_servers.len());
                self.transport_config.ice_servers = ice_servers;
            }
            ServerMessage::RoomParticipants {
                room_id,
                participants,
            } => {
                if room_id != self.room_id {
                    warn!("Ignoring participant list for room '{}'", room_id);
                    return;
                }
                self.replace_members(participants);
                self.reconcile().await;
            }
            ServerMessage::ParticipantJoined {
                room_id,
                participant,
            } => {
                if room_id != self.room_id {
                    return;
                }
                self.add_member(participant);
                self.reconcile().await;
            }
            ServerMessage::ParticipantLeft {
                room_id,
                connection_id,
            } => {
                if room_id != self.room_id {
                    return;
                }
                if self.members.remove(&connection_id).is_some() {
                    info!("{} left room '{}'", connection_id, self.room_id);
                    self.emit(SessionEvent::ParticipantLeft(connection_id));
                }
                self.reconcile().await;
            }
            ServerMessage::Offer { from, sdp, .. } => {
                let timeout = self.config.negotiation_timeout;
                let Some(link) = self.links.get_mut(&from) else {
                    warn!("Discarding offer from unknown peer {}", from);
                    return;
                };
                let update = link.handle_offer(sdp, timeout).await;
                self.apply_update(from, update).await;
            }
            ServerMessage::Answer { from, sdp, .. } => {
                let Some(link) = self.links.get_mut(&from) else {
                    warn!("Discarding answer from unknown peer {}", from);
                    return;
                };
                let update = link.handle_answer(sdp).await;
                self.apply_update(from, update).await;
            }
            ServerMessage::IceCandidate {
                from, candidate, ..
            } => {
                let Some(link) = self.links.get_mut(&from) else {
                    debug!("Discarding ICE candidate from unknown peer {}", from);
                    return;
                };
                let update = link.handle_candidate(candidate).await;
                self.apply_update(from, update).await;
            }
            ServerMessage::Pong => debug!("pong"),
            ServerMessage::Error { code, message } => {
                warn!("Server warning {:?}: {}", code, message);
                self.emit(SessionEvent::ServerWarning { code, message });
            }
        }
    }

    /// Bring the link map in line with current membership.
    ///
    /// Opens a link for every member without one and closes links whose
    /// member is gone. Running it again with the same membership does
    /// nothing.
    pub async fn reconcile(&mut self) {
        let Some(local_id) = self.local_id else {
            debug!("Deferring reconciliation until the server assigns an id");
            return;
        };

        let gone: Vec<ConnectionId> = self
            .links
            .keys()
            .filter(|id| !self.members.contains_key(id))
            .copied()
            .collect();
        for remote in gone {
            self.close_link(remote).await;
        }
        self.unreachable.retain(|id| self.members.contains_key(id));

        let missing: Vec<ParticipantInfo> = self
            .members
            .values()
            .filter(|p| p.connection_id != local_id)
            .filter(|p| !self.links.contains_key(&p.connection_id))
            .filter(|p| !self.unreachable.contains(&p.connection_id))
            .cloned()
            .collect();
        for participant in missing {
            self.open_link(local_id, participant).await;
        }
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(remote, candidate) => {
                if !self.links.contains_key(&remote) {
                    return;
                }
                self.signals.send(ClientMessage::IceCandidate {
                    to: remote,
                    candidate,
                });
            }
            TransportEvent::TrackAdded(remote, track) => {
                let Some(link) = self.links.get_mut(&remote) else {
                    return;
                };
                link.add_track(track.clone());
                self.emit(SessionEvent::TrackAdded {
                    peer: remote,
                    track,
                });
            }
            TransportEvent::Disconnected(remote) => {
                if self.links.contains_key(&remote) {
                    warn!("Media connection to {} dropped", remote);
                    self.fail_link(remote).await;
                }
            }
        }
    }

    /// Handle whatever transports have queued without waiting for more.
    pub async fn process_pending_transport_events(&mut self) {
        while let Ok(event) = self.transport_rx.try_recv() {
            self.handle_transport_event(event).await;
        }
    }

    /// Give up on every negotiation that has been pending past its deadline.
    pub async fn expire_negotiations(&mut self, now: Instant) {
        let expired: Vec<ConnectionId> = self
            .links
            .iter()
            .filter(|(_, link)| link.is_expired(now))
            .map(|(id, _)| *id)
            .collect();

        for remote in expired {
            warn!("Negotiation with {} timed out", remote);
            self.fail_link(remote).await;
        }
    }

    /// Drive the session until the signaling channel closes or the UI asks
    /// to leave.
    pub async fn run(
        mut self,
        mut inbound: mpsc::UnboundedReceiver<ServerMessage>,
        mut commands: mpsc::UnboundedReceiver<SessionCommand>,
    ) {
        self.join();

        let mut sweep = tokio::time::interval(self.config.sweep_interval);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                msg = inbound.recv() => match msg {
                    Some(msg) => self.handle_server_message(msg).await,
                    None => {
                        info!("Signaling channel closed, ending session");
                        break;
                    }
                },
                Some(event) = self.transport_rx.recv() => {
                    self.handle_transport_event(event).await;
                }
                cmd = commands.recv() => match cmd {
                    Some(SessionCommand::Leave) | None => {
                        self.leave().await;
                        break;
                    }
                },
                _ = sweep.tick() => {
                    self.expire_negotiations(Instant::now()).await;
                }
            }
        }

        self.shutdown().await;
    }

    fn replace_members(&mut self, participants: Vec<ParticipantInfo>) {
        let previous = std::mem::take(&mut self.members);
        for participant in participants {
            if Some(participant.connection_id) == self.local_id {
                continue;
            }
            if !previous.contains_key(&participant.connection_id) {
                self.emit(SessionEvent::ParticipantJoined(participant.clone()));
            }
            self.members.insert(participant.connection_id, participant);
        }
        for gone in previous.keys().filter(|id| !self.members.contains_key(id)) {
            info!("{} no longer in room '{}'", gone, self.room_id);
            self.emit(SessionEvent::ParticipantLeft(*gone));
        }
    }

    fn add_member(&mut self, participant: ParticipantInfo) {
        if Some(participant.connection_id) == self.local_id
            || self.members.contains_key(&participant.connection_id)
        {
            return;
        }
        info!(
            "{} ('{}') joined room '{}'",
            participant.connection_id, participant.identity, self.room_id
        );
        self.emit(SessionEvent::ParticipantJoined(participant.clone()));
        self.members.insert(participant.connection_id, participant);
    }

    async fn open_link(&mut self, local_id: ConnectionId, participant: ParticipantInfo) {
        let remote = participant.connection_id;
        let transport = match self
            .factory
            .create(remote, &self.transport_config, self.transport_tx.clone())
            .await
        {
            Ok(transport) => transport,
            Err(e) => {
                warn!("Failed to create transport for {}: {:#}", remote, e);
                self.unreachable.insert(remote);
                self.emit(SessionEvent::PeerUnreachable(remote));
                return;
            }
        };

        let mut link = PeerLink::new(participant, transport, self.signals.clone());
        let update = if local_id.initiates_with(&remote) {
            link.start_offer(self.config.negotiation_timeout).await
        } else {
            LinkUpdate::Unchanged
        };
        debug!("Opened peer link to {} ({:?})", remote, link.state());
        self.links.insert(remote, link);
        self.apply_update(remote, update).await;
    }

    async fn apply_update(&mut self, remote: ConnectionId, update: LinkUpdate) {
        match update {
            LinkUpdate::Unchanged | LinkUpdate::Discarded => {}
            LinkUpdate::Connected => self.emit(SessionEvent::PeerConnected(remote)),
            LinkUpdate::Failed(reason) => {
                warn!("Negotiation with {} failed: {}", remote, reason);
                self.fail_link(remote).await;
            }
        }
    }

    async fn close_link(&mut self, remote: ConnectionId) {
        if let Some(mut link) = self.links.remove(&remote) {
            link.close().await;
            self.emit(SessionEvent::PeerClosed(remote));
        }
    }

    async fn fail_link(&mut self, remote: ConnectionId) {
        if let Some(mut link) = self.links.remove(&remote) {
            link.close().await;
            self.unreachable.insert(remote);
            self.emit(SessionEvent::PeerUnreachable(remote));
        }
    }

    async fn shutdown(&mut self) {
        let remotes: Vec<ConnectionId> = self.links.keys().copied().collect();
        for remote in remotes {
            self.close_link(remote).await;
        }
        self.members.clear();
        self.unreachable.clear();
    }

    fn emit(&self, event: SessionEvent) {
        // The UI may have stopped listening; the session keeps going.
        let _ = self.events.send(event);
    }
}
