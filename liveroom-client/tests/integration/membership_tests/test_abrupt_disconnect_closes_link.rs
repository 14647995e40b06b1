use liveroom_client::{NegotiationState, SessionEvent};

use crate::integration::init_tracing;
use crate::utils::Mesh;

#[tokio::test]
async fn test_peer_vanishing_mid_negotiation_closes_link_once() {
    init_tracing();

    let mut mesh = Mesh::new();
    let mut c1 = mesh.add_peer("room-42", "teacher");
    let mut c2 = mesh.add_peer("room-42", "student");

    // Let c1 learn about c2 and send its offer, but never let c2 answer.
    mesh.step(&mut c1).await;
    mesh.step(&mut c2).await;
    mesh.step(&mut c1).await;
    assert_eq!(
        c1.session.link_state(c2.id),
        Some(NegotiationState::AwaitingAnswer)
    );
    c1.drain_events();

    // Socket drops: the server runs the same leave path as an explicit
    // leave-room, once.
    assert!(mesh.service.disconnect(c2.id).await);
    assert!(!mesh.service.disconnect(c2.id).await);

    mesh.pump(&mut [&mut c1]).await;

    assert!(c1.session.link(c2.id).is_none());
    assert!(c1.session.streams().is_empty());
    assert!(c1.factory.record(c2.id).unwrap().is_closed());
    assert_eq!(
        c1.drain_events(),
        vec![
            SessionEvent::ParticipantLeft(c2.id),
            SessionEvent::PeerClosed(c2.id),
        ]
    );
}
