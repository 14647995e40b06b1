use liveroom_core::{ClientMessage, ServerMessage};
use serde_json::json;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{TestClient, quiet_config, spawn_server};

#[tokio::test]
async fn test_ice_candidate_is_relayed_verbatim() {
    init_tracing();

    let (addr, _service) = spawn_server(quiet_config()).await;
    let mut c1 = TestClient::connect(addr).await.expect("Client 1 failed");
    let mut c2 = TestClient::connect(addr).await.expect("Client 2 failed");
    c1.join("ice", "a").await.expect("Join failed");
    c2.join("ice", "b").await.expect("Join failed");
    c1.recv().await.expect("No joined event");

    let candidate = json!({
        "candidate": "candidate:842163049 1 udp 1677729535 203.0.113.7 46154 typ srflx",
        "sdpMid": "0",
        "sdpMLineIndex": 0
    });
    c2.send(&ClientMessage::IceCandidate {
        to: c1.connection_id,
        candidate: candidate.clone(),
    })
    .await
    .expect("Send failed");

    match c1.recv().await.expect("No candidate") {
        ServerMessage::IceCandidate { from, candidate: got, .. } => {
            assert_eq!(from, c2.connection_id);
            assert_eq!(got, candidate);
        }
        other => panic!("Expected ice-candidate, got {:?}", other),
    }

    c1.close().await.expect("Close failed");
    c2.close().await.expect("Close failed");
}

#[tokio::test]
async fn test_candidate_for_departed_peer_is_dropped_silently() {
    init_tracing();

    let (addr, _service) = spawn_server(quiet_config()).await;
    let mut c1 = TestClient::connect(addr).await.expect("Client 1 failed");
    let mut c2 = TestClient::connect(addr).await.expect("Client 2 failed");
    c1.join("ice", "a").await.expect("Join failed");
    c2.join("ice", "b").await.expect("Join failed");
    c1.recv().await.expect("No joined event");

    let departed = c2.connection_id;
    c2.close().await.expect("Close failed");
    assert!(matches!(
        c1.recv().await.expect("No left event"),
        ServerMessage::ParticipantLeft { .. }
    ));

    c1.send(&ClientMessage::IceCandidate {
        to: departed,
        candidate: json!({"candidate": "late"}),
    })
    .await
    .expect("Send failed");

    // No error comes back: a late relay is an expected race.
    let reply = c1
        .recv_within(Duration::from_millis(300))
        .await
        .expect("Read failed");
    assert!(reply.is_none(), "Unexpected reply: {:?}", reply);

    c1.close().await.expect("Close failed");
}
