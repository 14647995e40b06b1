use liveroom_core::IceServerConfig;
use std::time::Duration;

/// Runtime settings shared by every signaling connection.
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Sent to each client as `ice-config` right after `welcome`.
    pub ice_servers: Vec<IceServerConfig>,
    pub heartbeat_interval: Duration,
    /// A socket silent for longer than this is treated as disconnected.
    pub heartbeat_timeout: Duration,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
            heartbeat_interval: Duration::from_secs(15),
            heartbeat_timeout: Duration::from_secs(45),
        }
    }
}
