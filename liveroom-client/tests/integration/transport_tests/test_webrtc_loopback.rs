use liveroom_client::{
    PeerTransport, RemoteTrack, TransportConfig, TransportEvent, WebRtcTransport, opus_track,
    spawn_silence,
};
use liveroom_core::ConnectionId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_local::TrackLocal;

use crate::integration::init_tracing;

type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

async fn transport(
    remote: u64,
    local_tracks: &[LocalTrack],
) -> (WebRtcTransport, mpsc::Receiver<TransportEvent>) {
    let (tx, rx) = mpsc::channel(256);
    // Host candidates only; both ends live in this process.
    let config = TransportConfig {
        ice_servers: Vec::new(),
    };
    let transport = WebRtcTransport::new(ConnectionId(remote), &config, local_tracks, tx)
        .await
        .expect("Failed to build transport");
    (transport, rx)
}

/// Hand `from`'s queued events to `to`. Returns the tracks `from` reported.
async fn forward(
    from: &mut mpsc::Receiver<TransportEvent>,
    to: &WebRtcTransport,
    applied: &mut usize,
) -> Vec<RemoteTrack> {
    let mut tracks = Vec::new();
    while let Ok(event) = from.try_recv() {
        match event {
            TransportEvent::CandidateGenerated(_, candidate) => {
                to.add_ice_candidate(candidate)
                    .await
                    .expect("Candidate rejected");
                *applied += 1;
            }
            TransportEvent::TrackAdded(_, track) => tracks.push(track),
            TransportEvent::Disconnected(remote) => panic!("Link to {} dropped", remote),
        }
    }
    tracks
}

fn connected(t: &WebRtcTransport) -> bool {
    t.peer_connection.connection_state() == RTCPeerConnectionState::Connected
}

#[tokio::test]
async fn test_offer_answer_and_candidates_connect_two_transports() {
    init_tracing();

    let (a, mut a_events) = transport(2, &[]).await;
    let (b, mut b_events) = transport(1, &[]).await;

    let offer = a.create_offer().await.expect("Offer failed");
    let answer = b.accept_offer(offer).await.expect("Answer failed");
    a.accept_answer(answer).await.expect("Applying answer failed");

    let (mut to_b, mut to_a) = (0, 0);
    let deadline = Instant::now() + Duration::from_secs(20);
    while !(connected(&a) && connected(&b)) {
        assert!(Instant::now() < deadline, "Transports never connected");
        forward(&mut a_events, &b, &mut to_b).await;
        forward(&mut b_events, &a, &mut to_a).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    assert!(to_b > 0 && to_a > 0, "no candidates exchanged");

    a.close().await.expect("Close failed");
    b.close().await.expect("Close failed");
}

#[tokio::test]
async fn test_published_track_reaches_the_other_side() {
    init_tracing();

    let track = opus_track("lecture-cam");
    let local: Vec<LocalTrack> = vec![track.clone() as LocalTrack];
    let (publisher, mut pub_events) = transport(2, &local).await;
    let (viewer, mut view_events) = transport(1, &[]).await;

    let offer = publisher.create_offer().await.expect("Offer failed");
    let answer = viewer.accept_offer(offer).await.expect("Answer failed");
    publisher
        .accept_answer(answer)
        .await
        .expect("Applying answer failed");

    let silence = spawn_silence(track);

    let (mut applied_v, mut applied_p) = (0, 0);
    let mut received = Vec::new();
    let deadline = Instant::now() + Duration::from_secs(20);
    while received.is_empty() {
        assert!(Instant::now() < deadline, "No remote track surfaced");
        forward(&mut pub_events, &viewer, &mut applied_v).await;
        received.extend(forward(&mut view_events, &publisher, &mut applied_p).await);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    silence.abort();

    assert_eq!(received[0].kind, "audio");
    assert_eq!(received[0].stream_id, "lecture-cam");

    publisher.close().await.expect("Close failed");
    viewer.close().await.expect("Close failed");
}
