use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Input;
use liveroom::client::{
    RoomSession, SessionCommand, SessionConfig, SessionEvent, SignalingConnection,
    WebRtcTransportFactory, opus_track, spawn_silence,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use webrtc::track::track_local::TrackLocal;

#[derive(Parser)]
#[command(name = "cargo-liveroom")]
#[command(bin_name = "cargo-liveroom")]
enum Cli {
    Liveroom(LiveroomArgs),
}

#[derive(clap::Args)]
struct LiveroomArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a room as a headless participant and print what happens.
    Probe {
        #[arg(long, default_value = "ws://127.0.0.1:3001/ws")]
        url: String,

        #[arg(short, long)]
        room: String,

        /// Prompted for when omitted.
        #[arg(short, long)]
        identity: Option<String>,

        #[arg(long, default_value_t = 15)]
        negotiation_timeout_secs: u64,

        /// Publish a silent Opus track to every peer.
        #[arg(long)]
        publish_audio: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let Cli::Liveroom(args) = Cli::parse();

    match args.command {
        Commands::Probe {
            url,
            room,
            identity,
            negotiation_timeout_secs,
            publish_audio,
        } => {
            let identity = match identity {
                Some(identity) => identity,
                None => Input::<String>::new()
                    .with_prompt("Identity")
                    .default("probe".to_owned())
                    .interact_text()
                    .context("Failed to read identity")?,
            };
            let config = SessionConfig {
                negotiation_timeout: Duration::from_secs(negotiation_timeout_secs),
                ..SessionConfig::default()
            };
            probe(&url, &room, &identity, config, publish_audio).await?;
        }
    }

    Ok(())
}

async fn probe(
    url: &str,
    room: &str,
    identity: &str,
    config: SessionConfig,
    publish_audio: bool,
) -> Result<()> {
    println!("{}", format!("📡 Connecting to {}...", url).cyan());
    let connection = SignalingConnection::connect(url)
        .await
        .context("Could not reach the signaling server")?;
    let (sender, inbound) = connection.into_parts();

    let (factory, silence) = if publish_audio {
        let track = opus_track(identity);
        let local: Vec<Arc<dyn TrackLocal + Send + Sync>> = vec![track.clone()];
        println!("{}", "🔈 Publishing a silent audio track".cyan());
        (
            WebRtcTransportFactory::with_local_tracks(local),
            Some(spawn_silence(track)),
        )
    } else {
        (WebRtcTransportFactory::new(), None)
    };

    let (session, mut events) = RoomSession::new(room, identity, factory, config, sender);
    let (commands, command_rx) = mpsc::unbounded_channel();
    let mut task = tokio::spawn(session.run(inbound, command_rx));

    println!(
        "{}",
        format!("🚪 Joined '{}' as '{}' (Ctrl-C to leave)", room, identity)
            .green()
            .bold()
    );

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                let _ = commands.send(SessionCommand::Leave);
                break;
            }
            _ = &mut task => {
                println!("{}", "Signaling connection closed".yellow());
                return Ok(());
            }
        }
    }

    task.await.context("Session task failed")?;
    if let Some(silence) = silence {
        silence.abort();
    }
    println!("{}", "👋 Left the room".green());
    Ok(())
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::ParticipantJoined(p) => {
            println!("{} {} ({})", "+".green().bold(), p.identity, p.connection_id)
        }
        SessionEvent::ParticipantLeft(id) => println!("{} {}", "-".red().bold(), id),
        SessionEvent::PeerConnected(id) => println!("   {} {}", "connected".green(), id),
        SessionEvent::PeerUnreachable(id) => println!("   {} {}", "unreachable".red(), id),
        SessionEvent::PeerClosed(id) => println!("   {} {}", "closed".dimmed(), id),
        SessionEvent::TrackAdded { peer, track } => {
            println!("   {} {} from {}", "track".cyan(), track.kind, peer)
        }
        SessionEvent::ServerWarning { code, message } => {
            println!("{} {:?}: {}", "⚠".yellow(), code, message)
        }
    }
}
