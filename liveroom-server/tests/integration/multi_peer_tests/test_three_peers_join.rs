use liveroom_core::ServerMessage;

use crate::integration::init_tracing;
use crate::utils::{TestClient, quiet_config, spawn_server};

#[tokio::test]
async fn test_three_peers_join() {
    init_tracing();

    let (addr, service) = spawn_server(quiet_config()).await;

    let mut client1 = TestClient::connect(addr).await.expect("Failed to create client 1");
    let mut client2 = TestClient::connect(addr).await.expect("Failed to create client 2");
    let mut client3 = TestClient::connect(addr).await.expect("Failed to create client 3");

    assert!(client1.join("class", "1").await.expect("Join 1 failed").is_empty());
    assert_eq!(client2.join("class", "2").await.expect("Join 2 failed").len(), 1);

    let third_sees = client3.join("class", "3").await.expect("Join 3 failed");
    let ids: Vec<_> = third_sees.iter().map(|p| p.connection_id).collect();
    assert_eq!(ids, vec![client1.connection_id, client2.connection_id]);

    // client1 observes both later joins, in order.
    for expected in [client2.connection_id, client3.connection_id] {
        match client1.recv().await.expect("Missing joined event") {
            ServerMessage::ParticipantJoined { participant, .. } => {
                assert_eq!(participant.connection_id, expected)
            }
            other => panic!("Expected participant-joined, got {:?}", other),
        }
    }
    match client2.recv().await.expect("Missing joined event") {
        ServerMessage::ParticipantJoined { participant, .. } => {
            assert_eq!(participant.connection_id, client3.connection_id)
        }
        other => panic!("Expected participant-joined, got {:?}", other),
    }

    let members = service
        .registry()
        .participants(&"class".into())
        .await
        .expect("Room missing");
    assert_eq!(members.len(), 3);

    client1.close().await.expect("Failed to close client 1");
    client2.close().await.expect("Failed to close client 2");
    client3.close().await.expect("Failed to close client 3");
}
