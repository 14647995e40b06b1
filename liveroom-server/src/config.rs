use crate::signaling::SignalingConfig;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use liveroom_core::IceServerConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

#[derive(Debug, Clone, Parser)]
#[command(name = "liveroom-server", about = "Signaling server for live classroom sessions")]
pub struct ServerConfig {
    /// Address the HTTP/WebSocket listener binds to.
    #[arg(long, env = "LIVEROOM_BIND", default_value = "0.0.0.0:3001")]
    pub bind: SocketAddr,

    /// Browser origins allowed to open the signaling socket. Empty allows any.
    #[arg(long = "allowed-origin", env = "LIVEROOM_ALLOWED_ORIGIN", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "STUN_URL", default_value = "stun:stun.l.google.com:19302")]
    pub stun_url: String,

    #[arg(long, env = "TURN_URL")]
    pub turn_url: Option<String>,

    #[arg(long, env = "TURN_USERNAME")]
    pub turn_username: Option<String>,

    #[arg(long, env = "TURN_CREDENTIAL")]
    pub turn_credential: Option<String>,

    #[arg(
        long,
        env = "LIVEROOM_HEARTBEAT_INTERVAL_SECS",
        default_value_t = 15,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub heartbeat_interval_secs: u64,

    #[arg(
        long,
        env = "LIVEROOM_HEARTBEAT_TIMEOUT_SECS",
        default_value_t = 45,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub heartbeat_timeout_secs: u64,
}

impl ServerConfig {
    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        let mut servers = vec![IceServerConfig {
            urls: vec![self.stun_url.clone()],
            username: None,
            credential: None,
        }];

        if let Some(turn_url) = &self.turn_url {
            servers.push(IceServerConfig {
                urls: vec![turn_url.clone()],
                username: self.turn_username.clone(),
                credential: self.turn_credential.clone(),
            });
        }
        servers
    }

    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            ice_servers: self.ice_servers(),
            heartbeat_interval: Duration::from_secs(self.heartbeat_interval_secs),
            heartbeat_timeout: Duration::from_secs(self.heartbeat_timeout_secs),
        }
    }

    pub fn cors_layer(&self) -> Result<CorsLayer> {
        let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

        if self.allowed_origins.is_empty() {
            return Ok(layer.allow_origin(Any));
        }

        let origins = self
            .allowed_origins
            .iter()
            .map(|o| {
                HeaderValue::from_str(o).with_context(|| format!("Invalid allowed origin '{}'", o))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(layer.allow_origin(AllowOrigin::list(origins)))
    }
}
