use std::net::{IpAddr, SocketAddr};

use clap::Parser;
use lobby_server::{routes, RoomDatabase};
use tracing::info;
use tracing_subscriber::EnvFilter;
use warp::Filter;

#[derive(Parser)]
#[command(name = "lobby-server")]
#[command(about = "Local rooms database for the room host and its players")]
struct Args {
    #[arg(short, long, default_value = "3001")]
    port: u16,

    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let db = RoomDatabase::new();

    // CORS headers for web clients
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "PUT", "POST", "PATCH", "DELETE", "OPTIONS"]);

    let api = routes(db).with(cors).with(warp::log("lobby-server"));

    let addr = SocketAddr::new(args.host, args.port);
    info!("🚀 Lobby server running on http://{}", addr);

    warp::serve(api).run(addr).await;
}
