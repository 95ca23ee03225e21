use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use roomhost_client::config::{parse_seconds, DEFAULT_DATABASE_URL, DEFAULT_JOIN_URL};
use roomhost_client::{ConsolePresenter, HostConfig, RemoteRooms, RoomHost};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "roomhost", about = "Hosts a game room in a realtime JSON database")]
struct Args {
    /// Base URL of the database (a Firebase Realtime Database or lobby-server)
    #[arg(long, env = "ROOMHOST_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Page players open to join; `?code=<ROOM>` is appended
    #[arg(long, env = "ROOMHOST_JOIN_URL", default_value = DEFAULT_JOIN_URL)]
    join_url: String,

    /// Use this room code instead of a random one
    #[arg(long, env = "ROOMHOST_ROOM_CODE")]
    room_code: Option<String>,

    /// Seconds between polls of the room
    #[arg(long, default_value = "1.0", value_parser = parse_seconds)]
    poll_interval: Duration,

    /// Seconds everyone has to stay ready before the game starts
    #[arg(long, default_value = "5.0", value_parser = parse_seconds)]
    countdown: Duration,

    /// Seconds between countdown label updates
    #[arg(long, default_value = "0.05", value_parser = parse_seconds)]
    frame_interval: Duration,
}

impl Args {
    fn into_config(self) -> HostConfig {
        let config = HostConfig::default()
            .with_database_url(self.database_url)
            .with_join_url(self.join_url)
            .with_poll_interval(self.poll_interval)
            .with_countdown(self.countdown)
            .with_frame_interval(self.frame_interval);
        match self.room_code {
            Some(code) => config.with_room_code(code),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Args::parse().into_config();
    config.validate()?;

    info!("🎮 Room host starting...");
    info!("📡 Database: {}", config.database_url);

    let rooms = RemoteRooms::new(config.database_url.clone());
    let mut host = RoomHost::new(config, rooms, ConsolePresenter::new());
    host.run(async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Could not listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    })
    .await;

    Ok(())
}
