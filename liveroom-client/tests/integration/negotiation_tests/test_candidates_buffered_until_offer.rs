use liveroom_client::NegotiationState;
use liveroom_core::ServerMessage;
use serde_json::json;

use crate::integration::init_tracing;
use crate::utils::Mesh;

#[tokio::test]
async fn test_early_candidate_is_applied_after_remote_description() {
    init_tracing();

    let mut mesh = Mesh::new();
    let mut c1 = mesh.add_peer("room-42", "teacher");
    let mut c2 = mesh.add_peer("room-42", "student");

    mesh.step(&mut c1).await;
    mesh.step(&mut c2).await;
    assert_eq!(c2.session.link_state(c1.id), Some(NegotiationState::Idle));

    // A candidate overtakes the offer it belongs to.
    c2.session
        .handle_server_message(ServerMessage::IceCandidate {
            from: c1.id,
            to: c2.id,
            candidate: json!({ "candidate": "candidate:early", "sdpMid": "0" }),
        })
        .await;

    let record = c2.factory.record(c1.id).unwrap();
    assert_eq!(c2.session.link(c1.id).unwrap().pending_candidates(), 1);
    assert!(record.applied_candidates().is_empty());

    mesh.pump(&mut [&mut c1, &mut c2]).await;

    assert_eq!(c2.session.link_state(c1.id), Some(NegotiationState::Connected));
    assert_eq!(c2.session.link(c1.id).unwrap().pending_candidates(), 0);

    let applied = record.applied_candidates();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0]["candidate"], "candidate:early");
}
