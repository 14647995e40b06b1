use crate::signaling::{SignalingService, ws_handler};
use axum::Router;
use axum::routing::get;

pub fn router(service: SignalingService) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .with_state(service)
}

async fn health() -> &'static str {
    "ok"
}
