//! In-memory stand-in for a Firebase Realtime Database, enough for the room
//! host and browser players to meet locally.

pub mod database;
pub mod routes;

pub use database::{Db, RoomDatabase};
pub use routes::routes;
