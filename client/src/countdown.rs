use std::time::Duration;

/// Label shown on the frame after the countdown runs out.
pub const STARTING_LABEL: &str = "Starting!";

pub fn countdown_label(seconds_left: u32) -> String {
    format!("Game starting in {}...", seconds_left)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Countdown {
    Idle,
    Counting { remaining: Duration },
}

/// What a readiness check did to the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyTransition {
    Started,
    Cancelled,
}

/// Result of one countdown frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// Still counting; whole seconds to show, rounded up.
    Remaining(u32),
    /// The countdown ran out and is idle again.
    Finished,
}

/// Ready-check state machine: everyone ready starts the countdown, anyone
/// dropping out cancels it. A restart always counts the full duration.
#[derive(Debug, Clone)]
pub struct ReadyCheck {
    duration: Duration,
    state: Countdown,
}

impl ReadyCheck {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: Countdown::Idle,
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn state(&self) -> Countdown {
        self.state
    }

    pub fn is_counting(&self) -> bool {
        matches!(self.state, Countdown::Counting { .. })
    }

    /// Feeds the current ready flags, one per player.
    pub fn evaluate<I>(&mut self, ready_flags: I) -> Option<ReadyTransition>
    where
        I: IntoIterator<Item = bool>,
    {
        let mut any_player = false;
        let mut all_ready = true;
        for ready in ready_flags {
            any_player = true;
            all_ready &= ready;
        }
        let all_ready = any_player && all_ready;

        match (self.state, all_ready) {
            (Countdown::Idle, true) => {
                self.state = Countdown::Counting {
                    remaining: self.duration,
                };
                Some(ReadyTransition::Started)
            }
            (Countdown::Counting { .. }, false) => {
                self.state = Countdown::Idle;
                Some(ReadyTransition::Cancelled)
            }
            _ => None,
        }
    }

    /// Advances one frame of `elapsed` time.
    ///
    /// The frame that finds the countdown above zero reports the rounded-up
    /// seconds before subtracting, so the full duration is shown first. The
    /// first frame that finds it at zero finishes it.
    pub fn advance(&mut self, elapsed: Duration) -> Option<CountdownStep> {
        let Countdown::Counting { remaining } = self.state else {
            return None;
        };

        if remaining.is_zero() {
            self.state = Countdown::Idle;
            return Some(CountdownStep::Finished);
        }

        let shown = remaining.as_secs_f64().ceil() as u32;
        self.state = Countdown::Counting {
            remaining: remaining.saturating_sub(elapsed),
        };
        Some(CountdownStep::Remaining(shown))
    }
}
