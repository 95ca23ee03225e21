//! Room host: creates a room in a realtime JSON database, polls it and keeps a
//! [`screens::Presenter`] in step with the players, chat and game state found
//! there.
//!
//! ```rust,no_run
//! use roomhost_client::{ConsolePresenter, HostConfig, RemoteRooms, RoomHost};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = HostConfig::default().with_room_code("ABCD");
//!     let rooms = RemoteRooms::new(config.database_url.clone());
//!     let mut host = RoomHost::new(config, rooms, ConsolePresenter::new());
//!     host.run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//! }
//! ```

pub mod config;
pub mod countdown;
pub mod reconcile;
pub mod remote;
pub mod room_host;
pub mod screens;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{ConfigError, HostConfig};
pub use countdown::{ReadyCheck, ReadyTransition};
pub use reconcile::{RoomMirror, SyncOutcome};
pub use remote::{RemoteRooms, RoomError, RoomStore};
pub use room_host::RoomHost;
pub use screens::{ConsolePresenter, Panel, Presenter};
