use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;

use shared::{ChatRecord, GameState, PlayerRecord, RoomDocument};
use tracing::{debug, info, warn};

use crate::countdown::{countdown_label, CountdownStep, ReadyCheck, ReadyTransition, STARTING_LABEL};
use crate::screens::{Panel, Presenter};

/// What one reconciliation pass changed besides rows and chat lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Set when the held game state changed.
    pub entered: Option<GameState>,
    pub ready: Option<ReadyTransition>,
}

/// Everything the host has already put on screen, plus the held game state
/// and the ready-check. Used only to diff the next document against.
pub struct RoomMirror<R> {
    game_state: GameState,
    rows: HashMap<String, R>,
    displayed_messages: HashSet<String>,
    ready: ReadyCheck,
}

impl<R> RoomMirror<R> {
    pub fn new(countdown: Duration) -> Self {
        Self {
            game_state: GameState::Lobby,
            rows: HashMap::new(),
            displayed_messages: HashSet::new(),
            ready: ReadyCheck::new(countdown),
        }
    }

    pub fn game_state(&self) -> GameState {
        self.game_state
    }

    pub fn row(&self, player_id: &str) -> Option<&R> {
        self.rows.get(player_id)
    }

    pub fn player_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn displayed_messages(&self) -> &HashSet<String> {
        &self.displayed_messages
    }

    pub fn ready_check(&self) -> &ReadyCheck {
        &self.ready
    }

    /// Applies a freshly fetched document: game state first, then players,
    /// then chat, then (in game) input logging.
    pub fn reconcile<P>(&mut self, doc: &RoomDocument, presenter: &mut P) -> SyncOutcome
    where
        P: Presenter<Row = R>,
    {
        let mut outcome = SyncOutcome::default();

        match doc.state() {
            Some(state) => {
                outcome.entered = self.enter(state, presenter);
                if state == GameState::Lobby {
                    outcome.ready = self.check_ready(&doc.players, presenter);
                }
            }
            None => warn!("❓ Invalid game state '{}', ignoring", doc.game_state),
        }

        self.sync_players(&doc.players, presenter);
        self.sync_chat(&doc.chat_messages, presenter);

        if self.game_state == GameState::InGame {
            log_inputs(&doc.players);
        }

        outcome
    }

    /// Runs one countdown frame. Returns true on the frame the countdown
    /// completes, after the label has been set to [`STARTING_LABEL`].
    pub fn advance_countdown<P>(&mut self, elapsed: Duration, presenter: &mut P) -> bool
    where
        P: Presenter<Row = R>,
    {
        match self.ready.advance(elapsed) {
            Some(CountdownStep::Remaining(secs)) => {
                presenter.set_countdown_text(&countdown_label(secs));
                false
            }
            Some(CountdownStep::Finished) => {
                presenter.set_countdown_text(STARTING_LABEL);
                true
            }
            None => false,
        }
    }

    fn enter<P>(&mut self, state: GameState, presenter: &mut P) -> Option<GameState>
    where
        P: Presenter<Row = R>,
    {
        if state == self.game_state {
            return None;
        }

        info!("🎬 Entered {} state (was {})", state, self.game_state);
        match state {
            GameState::Lobby => {
                presenter.show_panel(Panel::Lobby);
                presenter.hide_panel(Panel::Game);
            }
            GameState::InGame => {
                presenter.hide_panel(Panel::Lobby);
                presenter.show_panel(Panel::Game);
            }
            GameState::PostGame => {}
        }
        self.game_state = state;
        Some(state)
    }

    fn check_ready<P>(
        &mut self,
        players: &BTreeMap<String, PlayerRecord>,
        presenter: &mut P,
    ) -> Option<ReadyTransition>
    where
        P: Presenter<Row = R>,
    {
        let transition = self.ready.evaluate(players.values().map(|player| player.is_ready));
        match transition {
            Some(ReadyTransition::Started) => {
                info!("✅ All {} players ready, starting countdown", players.len());
                presenter.set_countdown_text(&countdown_label(
                    self.ready.duration().as_secs_f64().ceil() as u32,
                ));
            }
            Some(ReadyTransition::Cancelled) => {
                info!("🛑 Countdown cancelled, not everyone is ready");
                presenter.set_countdown_text("");
            }
            None => {}
        }
        transition
    }

    fn sync_players<P>(&mut self, players: &BTreeMap<String, PlayerRecord>, presenter: &mut P)
    where
        P: Presenter<Row = R>,
    {
        let gone: Vec<String> = self
            .rows
            .keys()
            .filter(|id| !players.contains_key(*id))
            .cloned()
            .collect();
        for id in gone {
            if let Some(row) = self.rows.remove(&id) {
                presenter.destroy_player_row(row);
            }
        }

        for (id, player) in players {
            match self.rows.get_mut(id) {
                Some(row) => presenter.update_player_row(row, &player.name),
                None => {
                    let row = presenter.create_player_row(&player.name);
                    self.rows.insert(id.clone(), row);
                }
            }
        }
    }

    fn sync_chat<P>(&mut self, messages: &BTreeMap<String, ChatRecord>, presenter: &mut P)
    where
        P: Presenter<Row = R>,
    {
        for (id, chat) in messages {
            if self.displayed_messages.insert(id.clone()) {
                presenter.append_chat_line(&chat.sender, &chat.message);
            }
        }
    }
}

fn log_inputs(players: &BTreeMap<String, PlayerRecord>) {
    for player in players.values() {
        if let Some(inputs) = player.directions() {
            debug!(
                "🕹️ Player {} inputs - up: {}, down: {}, left: {}, right: {}",
                player.name, inputs.up, inputs.down, inputs.left, inputs.right
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingPresenter, UiEvent};
    use serde_json::json;

    fn doc(value: serde_json::Value) -> RoomDocument {
        serde_json::from_value(value).unwrap()
    }

    fn mirror() -> RoomMirror<u32> {
        RoomMirror::new(Duration::from_secs(5))
    }

    fn sorted_ids(mirror: &RoomMirror<u32>) -> Vec<String> {
        let mut ids: Vec<String> = mirror.player_ids().map(str::to_string).collect();
        ids.sort();
        ids
    }

    #[test]
    fn same_document_twice_adds_nothing() {
        let room = doc(json!({
            "gameState": "lobby",
            "players": {"a": {"name": "Ada"}, "b": {"name": "Bo"}},
            "chatMessages": {"m1": {"sender": "Ada", "message": "hi"}}
        }));
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();

        mirror.reconcile(&room, &mut ui);
        let created = ui.count(|e| matches!(e, UiEvent::CreateRow(_)));
        assert_eq!(created, 2);

        ui.clear();
        mirror.reconcile(&room, &mut ui);
        assert_eq!(
            ui.count(|e| matches!(
                e,
                UiEvent::CreateRow(_) | UiEvent::DestroyRow(_) | UiEvent::Chat(..)
            )),
            0
        );
        // Labels are refreshed every pass.
        assert_eq!(ui.count(|e| matches!(e, UiEvent::UpdateRow(..))), 2);
    }

    #[test]
    fn mirror_keys_follow_document_players() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();

        mirror.reconcile(
            &doc(json!({"gameState": "lobby", "players": {"a": {"name": "Ada"}, "b": {"name": "Bo"}}})),
            &mut ui,
        );
        assert_eq!(sorted_ids(&mirror), ["a", "b"]);

        ui.clear();
        mirror.reconcile(
            &doc(json!({"gameState": "lobby", "players": {"b": {"name": "Bob"}, "c": {"name": "Cy"}}})),
            &mut ui,
        );
        assert_eq!(sorted_ids(&mirror), ["b", "c"]);
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::DestroyRow("Ada".into()),
                UiEvent::UpdateRow("Bo".into(), "Bob".into()),
                UiEvent::CreateRow("Cy".into()),
            ]
        );

        mirror.reconcile(&doc(json!({"gameState": "lobby"})), &mut ui);
        assert_eq!(sorted_ids(&mirror), Vec::<String>::new());
    }

    #[test]
    fn chat_ids_only_accumulate() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();

        mirror.reconcile(
            &doc(json!({"gameState": "lobby", "chatMessages": {"m1": {"sender": "Ada", "message": "hi"}}})),
            &mut ui,
        );
        let before = mirror.displayed_messages().clone();

        mirror.reconcile(
            &doc(json!({"gameState": "lobby", "chatMessages": {"m2": {"sender": "Bo", "message": "yo"}}})),
            &mut ui,
        );
        assert!(before.is_subset(mirror.displayed_messages()));
        assert_eq!(mirror.displayed_messages().len(), 2);

        mirror.reconcile(&doc(json!({"gameState": "lobby"})), &mut ui);
        assert_eq!(mirror.displayed_messages().len(), 2);
        assert_eq!(
            ui.events(),
            vec![
                UiEvent::Chat("Ada".into(), "hi".into()),
                UiEvent::Chat("Bo".into(), "yo".into()),
            ]
        );
    }

    #[test]
    fn ready_players_start_and_unready_cancel_countdown() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();

        let outcome = mirror.reconcile(
            &doc(json!({"gameState": "lobby", "players": {
                "a": {"name": "Ada", "isReady": true},
                "b": {"name": "Bo", "isReady": true}
            }})),
            &mut ui,
        );
        assert_eq!(outcome.ready, Some(ReadyTransition::Started));
        assert!(mirror.ready_check().is_counting());
        assert_eq!(ui.countdown_text().as_deref(), Some("Game starting in 5..."));

        let outcome = mirror.reconcile(
            &doc(json!({"gameState": "lobby", "players": {
                "a": {"name": "Ada", "isReady": true},
                "b": {"name": "Bo", "isReady": false}
            }})),
            &mut ui,
        );
        assert_eq!(outcome.ready, Some(ReadyTransition::Cancelled));
        assert!(!mirror.ready_check().is_counting());
        assert_eq!(ui.countdown_text().as_deref(), Some(""));
    }

    #[test]
    fn empty_player_map_cancels_countdown() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();
        mirror.reconcile(
            &doc(json!({"gameState": "lobby", "players": {"a": {"name": "Ada", "isReady": true}}})),
            &mut ui,
        );
        assert!(mirror.ready_check().is_counting());

        let outcome = mirror.reconcile(&doc(json!({"gameState": "lobby", "players": {}})), &mut ui);
        assert_eq!(outcome.ready, Some(ReadyTransition::Cancelled));
        assert_eq!(ui.countdown_text().as_deref(), Some(""));
    }

    #[test]
    fn entering_game_toggles_panels_once_without_ready_check() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();
        mirror.reconcile(&doc(json!({"gameState": "lobby"})), &mut ui);
        assert!(ui.events().is_empty());

        let game = doc(json!({"gameState": "in-game", "players": {}}));
        let outcome = mirror.reconcile(&game, &mut ui);
        assert_eq!(outcome.entered, Some(GameState::InGame));
        assert_eq!(outcome.ready, None);
        mirror.reconcile(&game, &mut ui);

        assert_eq!(
            ui.events(),
            vec![UiEvent::Hide(Panel::Lobby), UiEvent::Show(Panel::Game)]
        );
        assert_eq!(mirror.game_state(), GameState::InGame);
    }

    #[test]
    fn ready_flags_are_ignored_outside_lobby() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();
        let outcome = mirror.reconcile(
            &doc(json!({"gameState": "in-game", "players": {"a": {"name": "Ada", "isReady": true}}})),
            &mut ui,
        );
        assert_eq!(outcome.ready, None);
        assert!(!mirror.ready_check().is_counting());
    }

    #[test]
    fn unknown_state_keeps_held_state_but_still_syncs_rows() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();
        let outcome = mirror.reconcile(
            &doc(json!({"gameState": "paused", "players": {"a": {"name": "Ada", "isReady": true}}})),
            &mut ui,
        );
        assert_eq!(outcome, SyncOutcome::default());
        assert_eq!(mirror.game_state(), GameState::Lobby);
        assert_eq!(sorted_ids(&mirror), ["a"]);
    }

    #[test]
    fn post_game_then_lobby_restores_lobby_panels() {
        let mut mirror = mirror();
        let mut ui = RecordingPresenter::default();
        mirror.reconcile(&doc(json!({"gameState": "post-game"})), &mut ui);
        assert_eq!(mirror.game_state(), GameState::PostGame);
        assert!(ui.events().is_empty());

        let outcome = mirror.reconcile(&doc(json!({"gameState": "lobby"})), &mut ui);
        assert_eq!(outcome.entered, Some(GameState::Lobby));
        assert_eq!(
            ui.events(),
            vec![UiEvent::Show(Panel::Lobby), UiEvent::Hide(Panel::Game)]
        );
    }

    #[test]
    fn countdown_frames_end_with_starting_label() {
        let mut mirror = RoomMirror::<u32>::new(Duration::from_secs(1));
        let mut ui = RecordingPresenter::default();
        mirror.reconcile(
            &doc(json!({"gameState": "lobby", "players": {"a": {"name": "Ada", "isReady": true}}})),
            &mut ui,
        );

        let frame = Duration::from_millis(500);
        assert!(!mirror.advance_countdown(frame, &mut ui));
        assert!(!mirror.advance_countdown(frame, &mut ui));
        assert!(mirror.advance_countdown(frame, &mut ui));
        assert_eq!(ui.countdown_text().as_deref(), Some(STARTING_LABEL));
        assert!(!mirror.advance_countdown(frame, &mut ui));
    }
}
