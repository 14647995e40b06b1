use liveroom_client::NegotiationState;
use liveroom_core::ServerMessage;

use crate::integration::init_tracing;
use crate::utils::Mesh;

#[tokio::test]
async fn test_duplicate_answer_keeps_connected_state() {
    init_tracing();

    let mut mesh = Mesh::new();
    let mut c1 = mesh.add_peer("room-42", "teacher");
    let mut c2 = mesh.add_peer("room-42", "student");
    mesh.pump(&mut [&mut c1, &mut c2]).await;
    c1.drain_events();

    let answer_before = c1
        .session
        .link(c2.id)
        .and_then(|link| link.remote_description().map(str::to_owned));

    c1.session
        .handle_server_message(ServerMessage::Answer {
            from: c2.id,
            to: c1.id,
            sdp: "answer-replayed".into(),
        })
        .await;

    let link = c1.session.link(c2.id).unwrap();
    assert_eq!(link.state(), NegotiationState::Connected);
    assert_eq!(link.remote_description().map(str::to_owned), answer_before);
    assert!(c1.drain_events().is_empty());
}

#[tokio::test]
async fn test_answer_from_answering_side_is_discarded() {
    init_tracing();

    let mut mesh = Mesh::new();
    let mut c1 = mesh.add_peer("room-7", "teacher");
    let mut c2 = mesh.add_peer("room-7", "student");

    // Deliver the joins to c2 only; its link to c1 waits for an offer.
    mesh.step(&mut c1).await;
    mesh.step(&mut c2).await;
    assert_eq!(c2.session.link_state(c1.id), Some(NegotiationState::Idle));

    c2.session
        .handle_server_message(ServerMessage::Answer {
            from: c1.id,
            to: c2.id,
            sdp: "answer-out-of-order".into(),
        })
        .await;
    assert_eq!(c2.session.link_state(c1.id), Some(NegotiationState::Idle));

    mesh.pump(&mut [&mut c1, &mut c2]).await;
    assert_eq!(c2.session.link_state(c1.id), Some(NegotiationState::Connected));
}
