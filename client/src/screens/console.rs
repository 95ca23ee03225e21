use tracing::info;

use super::{Panel, Presenter};

/// Row handle of the console presenter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleRow {
    pub slot: usize,
    pub name: String,
}

// 🖥️ Presenter for headless hosts: every UI call becomes a log line
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    next_slot: usize,
    countdown_text: String,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for ConsolePresenter {
    type Row = ConsoleRow;

    fn create_player_row(&mut self, name: &str) -> ConsoleRow {
        let slot = self.next_slot;
        self.next_slot += 1;
        info!("🎮 Player joined: {} (row #{})", name, slot);
        ConsoleRow {
            slot,
            name: name.to_string(),
        }
    }

    fn update_player_row(&mut self, row: &mut ConsoleRow, name: &str) {
        if row.name != name {
            info!("✏️ Row #{} renamed: {} -> {}", row.slot, row.name, name);
            row.name = name.to_string();
        }
    }

    fn destroy_player_row(&mut self, row: ConsoleRow) {
        info!("👋 Player left: {} (row #{})", row.name, row.slot);
    }

    fn append_chat_line(&mut self, sender: &str, message: &str) {
        info!("💬 {}: {}", sender, message);
    }

    fn show_panel(&mut self, panel: Panel) {
        info!("🪟 Showing {} panel", panel);
    }

    fn hide_panel(&mut self, panel: Panel) {
        info!("🙈 Hiding {} panel", panel);
    }

    fn set_countdown_text(&mut self, text: &str) {
        // Labels repeat every frame; only log changes.
        if self.countdown_text != text {
            self.countdown_text = text.to_string();
            if !text.is_empty() {
                info!("⏳ {}", text);
            }
        }
    }

    fn render_join_code(&mut self, code: &str) {
        info!("🔑 Room code: {}", code);
    }

    fn render_join_image(&mut self, payload: &str) {
        info!("🔗 Join at {}", payload);
    }
}
