use liveroom_core::ClientMessage;
use std::time::Duration;

use crate::integration::init_tracing;
use crate::utils::{TestClient, quiet_config, spawn_server};

#[tokio::test]
async fn test_rooms_are_isolated() {
    init_tracing();

    let (addr, service) = spawn_server(quiet_config()).await;

    let mut math = TestClient::connect(addr).await.expect("Client failed");
    let mut art = TestClient::connect(addr).await.expect("Client failed");

    math.join("math", "a").await.expect("Join failed");
    assert!(art.join("art", "b").await.expect("Join failed").is_empty());

    art.send(&ClientMessage::Offer {
        to: math.connection_id,
        sdp: "cross-room".into(),
    })
    .await
    .expect("Send failed");

    let leaked = math
        .recv_within(Duration::from_millis(300))
        .await
        .expect("Read failed");
    assert!(leaked.is_none(), "Message crossed rooms: {:?}", leaked);
    assert_eq!(service.registry().room_count(), 2);

    math.close().await.expect("Close failed");
    art.close().await.expect("Close failed");
}
