//! Room document types and helpers shared by the room host and the lobby tools.

pub mod protocol;
pub mod room_code;

pub use protocol::{
    ChatRecord, DirectionInputs, GameState, NewRoom, PlayerRecord, RoomDocument,
    GAME_STATE_FIELD, WAITING_PROMPT,
};
pub use room_code::{generate_room_code, resolve_room_code, ROOM_CODE_LEN};
