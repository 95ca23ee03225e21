use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Prompt written into every freshly created room.
pub const WAITING_PROMPT: &str = "Waiting for players...";

/// Field of the room document holding the game state.
pub const GAME_STATE_FIELD: &str = "gameState";

// 🎮 Game states, as stored under `gameState`
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    #[serde(rename = "lobby")]
    Lobby,
    #[serde(rename = "in-game")]
    InGame,
    #[serde(rename = "post-game")]
    PostGame,
}

impl GameState {
    /// Maps the wire name to a state. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<Self> {
        match name {
            "lobby" => Some(Self::Lobby),
            "in-game" => Some(Self::InGame),
            "post-game" => Some(Self::PostGame),
            _ => None,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Lobby => "lobby",
            Self::InGame => "in-game",
            Self::PostGame => "post-game",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// The whole room as served at `rooms/{code}`.
///
/// `gameState` is kept as the raw string so the host can tell an unknown
/// state apart from a missing one and log it. Missing `players` and
/// `chatMessages` decode as empty maps.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RoomDocument {
    #[serde(default)]
    pub game_state: String,
    #[serde(default)]
    pub prompt: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub players: BTreeMap<String, PlayerRecord>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub chat_messages: BTreeMap<String, ChatRecord>,
}

impl RoomDocument {
    pub fn state(&self) -> Option<GameState> {
        GameState::from_wire(&self.game_state)
    }
}

// Player entry written by a remote player
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_ready: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<BTreeMap<String, bool>>,
}

impl PlayerRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Direction flags, or `None` if the player never published inputs.
    pub fn directions(&self) -> Option<DirectionInputs> {
        self.inputs.as_ref().map(DirectionInputs::from_map)
    }
}

/// The four d-pad flags a player publishes under `inputs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DirectionInputs {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionInputs {
    pub const NAMES: [&'static str; 4] = ["up", "down", "left", "right"];

    pub fn from_map(inputs: &BTreeMap<String, bool>) -> Self {
        let pressed = |name: &str| inputs.get(name).copied().unwrap_or(false);
        Self {
            up: pressed("up"),
            down: pressed("down"),
            left: pressed("left"),
            right: pressed("right"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatRecord {
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub message: String,
}

/// Payload PUT when the room is created.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub game_state: GameState,
    pub prompt: String,
}

impl Default for NewRoom {
    fn default() -> Self {
        Self {
            game_state: GameState::Lobby,
            prompt: WAITING_PROMPT.to_string(),
        }
    }
}
