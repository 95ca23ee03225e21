//! In-memory presenter and store used by the unit tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::{Map, Value};
use shared::RoomDocument;

use crate::remote::{RoomError, RoomStore};
use crate::screens::{Panel, Presenter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    CreateRow(String),
    /// Old name, new name.
    UpdateRow(String, String),
    DestroyRow(String),
    Chat(String, String),
    Show(Panel),
    Hide(Panel),
    Countdown(String),
    JoinCode(String),
    JoinImage(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    Create { code: String, payload: Value },
    Fetch { code: String },
    Write { code: String, path: String, value: Value },
    Delete { code: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Ui(UiEvent),
    Store(StoreCall),
}

/// Presenter and store calls in the order they happened.
pub type Journal = Arc<Mutex<Vec<Call>>>;

#[derive(Default)]
pub struct RecordingPresenter {
    journal: Journal,
    names: HashMap<u32, String>,
    next_row: u32,
}

impl RecordingPresenter {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.journal
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Ui(event) => Some(event.clone()),
                Call::Store(_) => None,
            })
            .collect()
    }

    pub fn count(&self, pred: impl Fn(&UiEvent) -> bool) -> usize {
        self.events().iter().filter(|event| pred(event)).count()
    }

    pub fn countdown_text(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|event| match event {
            UiEvent::Countdown(text) => Some(text),
            _ => None,
        })
    }

    pub fn clear(&self) {
        self.journal.lock().clear();
    }

    fn record(&self, event: UiEvent) {
        self.journal.lock().push(Call::Ui(event));
    }
}

impl Presenter for RecordingPresenter {
    type Row = u32;

    fn create_player_row(&mut self, name: &str) -> u32 {
        let row = self.next_row;
        self.next_row += 1;
        self.names.insert(row, name.to_string());
        self.record(UiEvent::CreateRow(name.to_string()));
        row
    }

    fn update_player_row(&mut self, row: &mut u32, name: &str) {
        let old = self.names.insert(*row, name.to_string()).unwrap_or_default();
        self.record(UiEvent::UpdateRow(old, name.to_string()));
    }

    fn destroy_player_row(&mut self, row: u32) {
        let name = self.names.remove(&row).unwrap_or_default();
        self.record(UiEvent::DestroyRow(name));
    }

    fn append_chat_line(&mut self, sender: &str, message: &str) {
        self.record(UiEvent::Chat(sender.to_string(), message.to_string()));
    }

    fn show_panel(&mut self, panel: Panel) {
        self.record(UiEvent::Show(panel));
    }

    fn hide_panel(&mut self, panel: Panel) {
        self.record(UiEvent::Hide(panel));
    }

    fn set_countdown_text(&mut self, text: &str) {
        self.record(UiEvent::Countdown(text.to_string()));
    }

    fn render_join_code(&mut self, code: &str) {
        self.record(UiEvent::JoinCode(code.to_string()));
    }

    fn render_join_image(&mut self, payload: &str) {
        self.record(UiEvent::JoinImage(payload.to_string()));
    }
}

#[derive(Default)]
struct StoreState {
    room: Option<Value>,
    fail_create: bool,
    fail_fetch: bool,
    fail_write: bool,
    fetch_delay: Option<Duration>,
}

/// A single-room store kept in memory. Writes land in the document so the
/// next fetch sees them, the way the real database behaves.
#[derive(Clone, Default)]
pub struct ScriptedRooms {
    journal: Journal,
    state: Arc<Mutex<StoreState>>,
}

impl ScriptedRooms {
    pub fn with_journal(journal: Journal) -> Self {
        Self {
            journal,
            ..Default::default()
        }
    }

    pub fn set_room(&self, room: Value) {
        self.state.lock().room = Some(room);
    }

    /// Every later fetch sleeps for `delay` before answering.
    pub fn delay_fetch(&self, delay: Duration) {
        self.state.lock().fetch_delay = Some(delay);
    }

    pub fn fail_create(&self) {
        self.state.lock().fail_create = true;
    }

    pub fn fail_fetch(&self, fail: bool) {
        self.state.lock().fail_fetch = fail;
    }

    pub fn fail_write(&self) {
        self.state.lock().fail_write = true;
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.journal
            .lock()
            .iter()
            .filter_map(|call| match call {
                Call::Store(call) => Some(call.clone()),
                Call::Ui(_) => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.journal.lock().push(Call::Store(call));
    }
}

fn scripted_failure() -> RoomError {
    RoomError::Decode {
        url: "memory://rooms".to_string(),
        source: serde_json::from_str::<Value>("scripted failure").unwrap_err(),
    }
}

impl RoomStore for ScriptedRooms {
    async fn create_room(&self, code: &str, payload: &Value) -> Result<(), RoomError> {
        self.record(StoreCall::Create {
            code: code.to_string(),
            payload: payload.clone(),
        });
        let mut state = self.state.lock();
        if state.fail_create {
            return Err(scripted_failure());
        }
        state.room = Some(payload.clone());
        Ok(())
    }

    async fn fetch_room(&self, code: &str) -> Result<Option<RoomDocument>, RoomError> {
        self.record(StoreCall::Fetch {
            code: code.to_string(),
        });
        let delay = self.state.lock().fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.lock();
        if state.fail_fetch {
            return Err(scripted_failure());
        }
        match &state.room {
            Some(room) => serde_json::from_value(room.clone())
                .map(Some)
                .map_err(|source| RoomError::Decode {
                    url: "memory://rooms".to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    async fn write_field(&self, code: &str, path: &str, value: &Value) -> Result<(), RoomError> {
        self.record(StoreCall::Write {
            code: code.to_string(),
            path: path.to_string(),
            value: value.clone(),
        });
        let mut state = self.state.lock();
        if state.fail_write {
            return Err(scripted_failure());
        }
        let mut node = state.room.get_or_insert_with(|| Value::Object(Map::new()));
        for key in path.split('/') {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = match node {
                Value::Object(map) => map.entry(key.to_string()).or_insert(Value::Null),
                _ => unreachable!("replaced by an object above"),
            };
        }
        *node = value.clone();
        Ok(())
    }

    async fn delete_room(&self, code: &str) -> Result<(), RoomError> {
        self.record(StoreCall::Delete {
            code: code.to_string(),
        });
        self.state.lock().room = None;
        Ok(())
    }
}
