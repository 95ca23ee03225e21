use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde_json::Value;
use shared::{resolve_room_code, GameState, NewRoom, RoomDocument, GAME_STATE_FIELD};
use tokio::time::{interval, sleep, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::config::HostConfig;
use crate::countdown::ReadyTransition;
use crate::reconcile::RoomMirror;
use crate::remote::{RoomError, RoomStore};
use crate::screens::Presenter;

/// A store request that is in flight.
type Pending<'a, T> = Pin<Box<dyn Future<Output = Result<T, RoomError>> + 'a>>;

/// Owns one room for its whole life: creates it, keeps the presenter in step
/// with it, starts the game when everyone is ready and deletes it on shutdown.
///
/// Polling and the countdown are two cooperative activities on one task. An
/// in-flight fetch never holds up countdown frames, and the `in-game` write
/// never holds up polling. The countdown's frame timer only exists while
/// counting and is dropped as soon as the countdown is cancelled or finishes.
pub struct RoomHost<S, P: Presenter> {
    config: HostConfig,
    store: S,
    view: HostView<P>,
    room_code: Option<String>,
}

/// Everything the poll and the countdown both touch.
struct HostView<P: Presenter> {
    presenter: P,
    mirror: RoomMirror<P::Row>,
    frames: Option<Interval>,
    last_frame: Instant,
}

impl<S: RoomStore, P: Presenter> RoomHost<S, P> {
    pub fn new(config: HostConfig, store: S, presenter: P) -> Self {
        let mirror = RoomMirror::new(config.countdown_duration);
        Self {
            config,
            store,
            view: HostView {
                presenter,
                mirror,
                frames: None,
                last_frame: Instant::now(),
            },
            room_code: None,
        }
    }

    /// Code of the room once it has been created.
    pub fn room_code(&self) -> Option<&str> {
        self.room_code.as_deref()
    }

    pub fn mirror(&self) -> &RoomMirror<P::Row> {
        &self.view.mirror
    }

    pub fn presenter(&self) -> &P {
        &self.view.presenter
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Runs until `shutdown` resolves, then deletes the room.
    ///
    /// An invalid configuration or a failed room creation is logged and this
    /// returns immediately; nothing is polled and nothing is deleted.
    pub async fn run<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        if let Err(err) = self.config.validate() {
            error!("❌ Invalid host configuration: {}", err);
            return;
        }

        let Some(code) = self.create().await else {
            return;
        };

        self.serve(&code, shutdown).await;

        self.view.frames = None;
        self.close(&code).await;
    }

    async fn create(&mut self) -> Option<String> {
        let code = resolve_room_code(self.config.room_code.as_deref());
        let payload = match serde_json::to_value(NewRoom::default()) {
            Ok(payload) => payload,
            Err(err) => {
                error!("❌ Could not encode initial room data: {}", err);
                return None;
            }
        };

        if let Err(err) = self.store.create_room(&code, &payload).await {
            error!("❌ Error creating room {}: {}", code, err);
            return None;
        }

        info!("🏠 Room {} created", code);
        self.view.presenter.render_join_code(&code);
        self.view
            .presenter
            .render_join_image(&self.config.join_link(&code));
        self.room_code = Some(code.clone());
        Some(code)
    }

    async fn serve<F>(&mut self, code: &str, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let store = &self.store;
        let view = &mut self.view;
        let poll_interval = self.config.poll_interval;
        let frame_interval = self.config.frame_interval;

        let mut fetching: Option<Pending<'_, Option<RoomDocument>>> = None;
        let mut writing: Option<Pending<'_, ()>> = None;
        // The first fetch goes out right away; later ones wait a full
        // interval after the previous one finished.
        let pause = sleep(Duration::ZERO);
        tokio::pin!(pause, shutdown);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("🛑 Shutting down room {}", code);
                    break;
                }
                now = next_frame(&mut view.frames) => {
                    if view.countdown_frame(now) {
                        info!("🚀 Countdown finished, starting game in room {}", code);
                        let state = Value::from(GameState::InGame.as_wire());
                        writing = Some(Box::pin(async move {
                            store.write_field(code, GAME_STATE_FIELD, &state).await
                        }));
                    }
                }
                written = next_reply(&mut writing) => {
                    writing = None;
                    if let Err(err) = written {
                        // The next poll still shows the lobby; if everyone is
                        // still ready the countdown starts over.
                        error!("❌ Error setting game state: {}", err);
                    }
                }
                fetched = next_reply(&mut fetching) => {
                    fetching = None;
                    view.apply(code, fetched, frame_interval);
                    pause.as_mut().reset(Instant::now() + poll_interval);
                }
                _ = &mut pause, if fetching.is_none() => {
                    fetching = Some(Box::pin(store.fetch_room(code)));
                }
            }
        }
    }

    async fn close(&mut self, code: &str) {
        info!("🗑️ Deleting room {}...", code);
        match tokio::time::timeout(self.config.shutdown_timeout, self.store.delete_room(code)).await {
            Ok(Ok(())) => info!("👋 Room {} deleted", code),
            Ok(Err(err)) => warn!("⚠️ Could not delete room {}: {}", code, err),
            Err(_) => warn!("⌛ Gave up deleting room {}", code),
        }
        self.room_code = None;
    }
}

impl<P: Presenter> HostView<P> {
    /// Reconciles one fetch result. Failed or empty fetches are skipped.
    fn apply(
        &mut self,
        code: &str,
        fetched: Result<Option<RoomDocument>, RoomError>,
        frame_interval: Duration,
    ) {
        let room = match fetched {
            Ok(Some(room)) => room,
            Ok(None) => {
                debug!("📭 Room {} data is null", code);
                return;
            }
            Err(err) => {
                warn!("⚠️ Poll of room {} failed: {}", code, err);
                return;
            }
        };

        let outcome = self.mirror.reconcile(&room, &mut self.presenter);
        match outcome.ready {
            Some(ReadyTransition::Started) => {
                let mut frames = interval(frame_interval);
                frames.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.frames = Some(frames);
                self.last_frame = Instant::now();
            }
            Some(ReadyTransition::Cancelled) => self.frames = None,
            None => {}
        }
    }

    /// Runs one countdown frame; true once the countdown has finished.
    fn countdown_frame(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;

        if !self.mirror.advance_countdown(elapsed, &mut self.presenter) {
            return false;
        }
        self.frames = None;
        true
    }
}

async fn next_frame(frames: &mut Option<Interval>) -> Instant {
    match frames {
        Some(frames) => frames.tick().await,
        None => std::future::pending().await,
    }
}

async fn next_reply<T>(pending: &mut Option<Pending<'_, T>>) -> Result<T, RoomError> {
    match pending {
        Some(request) => request.await,
        None => std::future::pending().await,
    }
}
