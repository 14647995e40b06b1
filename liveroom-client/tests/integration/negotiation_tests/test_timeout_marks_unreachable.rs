use liveroom_client::{NegotiationState, SessionEvent};
use liveroom_core::{ClientMessage, ServerMessage};
use std::time::Duration;
use tokio::time::Instant;

use crate::integration::init_tracing;
use crate::utils::Mesh;

#[tokio::test(start_paused = true)]
async fn test_silent_peer_times_out_and_is_not_retried() {
    init_tracing();

    let mut mesh = Mesh::new();
    let mut c1 = mesh.add_peer("room-42", "teacher");
    mesh.pump(&mut [&mut c1]).await;

    // A participant that joins but never answers.
    let (silent, mut silent_rx) = mesh.service.connect();
    mesh.service
        .dispatch(
            silent,
            ClientMessage::JoinRoom {
                room_id: "room-42".into(),
                identity: "ghost".into(),
            },
        )
        .await;
    mesh.pump(&mut [&mut c1]).await;
    assert_eq!(
        c1.session.link_state(silent),
        Some(NegotiationState::AwaitingAnswer)
    );

    let mut saw_offer = false;
    while let Ok(msg) = silent_rx.try_recv() {
        saw_offer |= matches!(msg, ServerMessage::Offer { from, .. } if from == c1.id);
    }
    assert!(saw_offer);

    tokio::time::advance(Duration::from_secs(5)).await;
    c1.session.expire_negotiations(Instant::now()).await;
    assert!(c1.session.link(silent).is_some());

    tokio::time::advance(mesh.config.negotiation_timeout).await;
    c1.session.expire_negotiations(Instant::now()).await;

    assert!(c1.session.link(silent).is_none());
    assert!(c1.session.is_unreachable(silent));
    assert!(c1.drain_events().contains(&SessionEvent::PeerUnreachable(silent)));
    assert!(c1.factory.record(silent).unwrap().is_closed());

    // Reconciling again does not bring the failed peer back.
    c1.session.reconcile().await;
    assert!(c1.session.link(silent).is_none());
    assert_eq!(c1.factory.created().len(), 1);

    // Once it leaves the room it is forgotten.
    mesh.service.disconnect(silent).await;
    mesh.pump(&mut [&mut c1]).await;
    assert!(!c1.session.is_unreachable(silent));
    assert_eq!(c1.drain_events(), vec![SessionEvent::ParticipantLeft(silent)]);
}

#[tokio::test]
async fn test_transport_creation_failure_is_unreachable() {
    init_tracing();

    let mut mesh = Mesh::new();
    let mut c1 = mesh.add_peer("room-9", "teacher");
    let mut c2 = mesh.add_peer("room-9", "student");
    c1.factory.refuse_new_transports();

    mesh.pump(&mut [&mut c1, &mut c2]).await;

    assert!(c1.session.link(c2.id).is_none());
    assert!(c1.session.is_unreachable(c2.id));
    assert!(c1.drain_events().contains(&SessionEvent::PeerUnreachable(c2.id)));

    // c2 is still waiting for an offer that will never come.
    assert_eq!(c2.session.link_state(c1.id), Some(NegotiationState::Idle));
}
