use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use roomhost_client::config::DEFAULT_DATABASE_URL;
use roomhost_client::{RemoteRooms, RoomStore};
use serde_json::{json, Value};
use shared::{resolve_room_code, ChatRecord, DirectionInputs, GameState, NewRoom, PlayerRecord, GAME_STATE_FIELD};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "lobby",
    about = "Pokes at a hosted room the way players and operators do"
)]
struct Cli {
    /// Base URL of the rooms database
    #[arg(long, env = "ROOMHOST_DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a room in the lobby state; prints its code
    Create {
        /// Room code to use instead of a random one
        #[arg(long)]
        code: Option<String>,
    },
    /// Print a room document
    Get { code: String },
    /// Add a player; prints the player id
    Join { code: String, name: String },
    /// Mark a player ready (or not ready with --not)
    Ready {
        code: String,
        player: String,
        #[arg(long)]
        not: bool,
    },
    /// Remove a player
    Leave { code: String, player: String },
    /// Post a chat message
    Chat {
        code: String,
        sender: String,
        message: String,
    },
    /// Press or release a direction (up, down, left, right) for a player
    Input {
        code: String,
        player: String,
        direction: String,
        #[arg(long)]
        release: bool,
    },
    /// Force the game state: lobby, in-game or post-game
    State { code: String, state: String },
    /// Delete a room
    Delete { code: String },
}

fn player_path(player: &str, field: &str) -> String {
    format!("players/{}/{}", player, field)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let rooms = RemoteRooms::new(cli.database_url);

    match cli.command {
        Commands::Create { code } => {
            let code = resolve_room_code(code.as_deref());
            rooms
                .create_room(&code, &serde_json::to_value(NewRoom::default())?)
                .await?;
            info!("🏠 Created room {}", code);
            println!("{}", code);
        }
        Commands::Get { code } => match rooms.fetch_room(&code).await? {
            Some(room) => println!("{}", serde_json::to_string_pretty(&room)?),
            None => bail!("room {} does not exist", code),
        },
        Commands::Join { code, name } => {
            let player = serde_json::to_value(PlayerRecord::new(name))?;
            let id = rooms.push(&code, "players", &player).await?;
            println!("{}", id);
        }
        Commands::Ready { code, player, not } => {
            rooms
                .write_field(&code, &player_path(&player, "isReady"), &json!(!not))
                .await?;
        }
        Commands::Leave { code, player } => {
            rooms
                .write_field(&code, &format!("players/{}", player), &Value::Null)
                .await?;
        }
        Commands::Chat { code, sender, message } => {
            let chat = serde_json::to_value(ChatRecord { sender, message })?;
            let id = rooms.push(&code, "chatMessages", &chat).await?;
            println!("{}", id);
        }
        Commands::Input {
            code,
            player,
            direction,
            release,
        } => {
            if !DirectionInputs::NAMES.contains(&direction.as_str()) {
                bail!("unknown direction '{}', expected one of {:?}", direction, DirectionInputs::NAMES);
            }
            rooms
                .update(&code, &player_path(&player, "inputs"), &json!({ direction: !release }))
                .await?;
        }
        Commands::State { code, state } => {
            let Some(state) = GameState::from_wire(&state) else {
                bail!("unknown game state '{}'", state);
            };
            rooms
                .write_field(&code, GAME_STATE_FIELD, &json!(state.as_wire()))
                .await?;
        }
        Commands::Delete { code } => {
            rooms.delete_room(&code).await?;
            info!("🗑️ Deleted room {}", code);
        }
    }

    Ok(())
}
