use crate::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Why a signaling socket stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    ClientClosed,
    ReadError,
    SendFailed,
    HeartbeatTimeout,
    ServerClosed,
    TaskFailed,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: SignalingService) {
    let (connection_id, mut rx) = service.connect();
    let (mut sender, mut receiver) = socket.split();

    let started = Instant::now();
    // Milliseconds since `started` at which the last inbound frame arrived.
    let last_seen = Arc::new(AtomicU64::new(0));
    let heartbeat_interval = service.config().heartbeat_interval;
    let heartbeat_timeout = service.config().heartbeat_timeout;

    let mut send_task = tokio::spawn({
        let last_seen = last_seen.clone();

        async move {
            let mut heartbeat = tokio::time::interval(heartbeat_interval);
            heartbeat.tick().await;

            loop {
                tokio::select! {
                    msg = rx.recv() => {
                        let Some(msg) = msg else {
                            return CloseReason::ServerClosed;
                        };
                        let json = match serde_json::to_string(&msg) {
                            Ok(json) => json,
                            Err(e) => {
                                error!("Failed to serialize server message: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            warn!("Send to {} failed: {}", connection_id, e);
                            return CloseReason::SendFailed;
                        }
                    }

                    _ = heartbeat.tick() => {
                        let seen = Duration::from_millis(last_seen.load(Ordering::Relaxed));
                        if started.elapsed().saturating_sub(seen) > heartbeat_timeout {
                            return CloseReason::HeartbeatTimeout;
                        }
                        if sender.send(Message::Ping(Default::default())).await.is_err() {
                            return CloseReason::SendFailed;
                        }
                    }
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let last_seen = last_seen.clone();

        async move {
            while let Some(frame) = receiver.next().await {
                let msg = match frame {
                    Ok(msg) => msg,
                    Err(e) => {
                        debug!("Read error on {}: {}", connection_id, e);
                        return CloseReason::ReadError;
                    }
                };
                last_seen.store(started.elapsed().as_millis() as u64, Ordering::Relaxed);

                match msg {
                    Message::Text(text) => service.handle_text(connection_id, text.as_str()).await,
                    Message::Close(_) => return CloseReason::ClientClosed,
                    _ => {}
                }
            }
            CloseReason::ClientClosed
        }
    });

    let reason = tokio::select! {
        res = (&mut send_task) => {
            recv_task.abort();
            res.unwrap_or(CloseReason::TaskFailed)
        }
        res = (&mut recv_task) => {
            send_task.abort();
            res.unwrap_or(CloseReason::TaskFailed)
        }
    };

    // Run the leave on its own task so it completes even if this future is
    // dropped during shutdown.
    let leave = tokio::spawn({
        let service = service.clone();
        async move { service.disconnect(connection_id).await }
    });
    if let Err(e) = leave.await {
        error!("Leave task for {} failed: {}", connection_id, e);
    }

    info!("WebSocket disconnected: {} ({:?})", connection_id, reason);
}
