use liveroom_core::{ClientMessage, ErrorCode, RoomId, ServerMessage};

use crate::integration::init_tracing;
use crate::utils::{TestClient, quiet_config, spawn_server};

#[tokio::test]
async fn test_leave_room_then_join_another() {
    init_tracing();

    let (addr, service) = spawn_server(quiet_config()).await;

    let mut stays = TestClient::connect(addr).await.expect("Client failed");
    let mut moves = TestClient::connect(addr).await.expect("Client failed");
    stays.join("first", "stays").await.expect("Join failed");
    moves.join("first", "moves").await.expect("Join failed");
    stays.recv().await.expect("No joined event");

    // Joining a second room while still in the first is refused.
    moves
        .send(&ClientMessage::JoinRoom {
            room_id: RoomId::from("second"),
            identity: "moves".into(),
        })
        .await
        .expect("Send failed");
    assert!(matches!(
        moves.recv().await.expect("No error"),
        ServerMessage::Error { code: ErrorCode::AlreadyJoined, .. }
    ));

    moves
        .send(&ClientMessage::LeaveRoom {
            room_id: RoomId::from("first"),
        })
        .await
        .expect("Send failed");
    assert!(matches!(
        stays.recv().await.expect("No left event"),
        ServerMessage::ParticipantLeft { connection_id, .. } if connection_id == moves.connection_id
    ));

    assert!(moves.join("second", "moves").await.expect("Rejoin failed").is_empty());
    assert_eq!(
        service.registry().room_of(&moves.connection_id),
        Some(RoomId::from("second"))
    );

    stays.close().await.expect("Close failed");
    moves.close().await.expect("Close failed");
}
