//! The presentation side of the room host.
//!
//! The host never draws anything itself. Everything visible goes through a
//! [`Presenter`], which owns whatever a "player row" is on its side and hands
//! back an opaque [`Presenter::Row`] the host keeps per player id.

mod console;

pub use console::{ConsolePresenter, ConsoleRow};

use std::fmt;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Panel {
    Lobby,
    Game,
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Lobby => f.write_str("lobby"),
            Panel::Game => f.write_str("game"),
        }
    }
}

pub trait Presenter {
    /// Handle to one rendered player row.
    type Row;

    fn create_player_row(&mut self, name: &str) -> Self::Row;
    fn update_player_row(&mut self, row: &mut Self::Row, name: &str);
    fn destroy_player_row(&mut self, row: Self::Row);

    fn append_chat_line(&mut self, sender: &str, message: &str);

    fn show_panel(&mut self, panel: Panel);
    fn hide_panel(&mut self, panel: Panel);

    fn set_countdown_text(&mut self, text: &str);

    fn render_join_code(&mut self, code: &str);
    /// `payload` is the join link; turning it into an image is up to the presenter.
    fn render_join_image(&mut self, payload: &str);
}
