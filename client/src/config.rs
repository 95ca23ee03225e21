use std::time::Duration;
use thiserror::Error;

/// Local lobby-server started by `cargo run -p lobby-server`.
pub const DEFAULT_DATABASE_URL: &str = "http://127.0.0.1:3001";
pub const DEFAULT_JOIN_URL: &str = "http://localhost:8080/game/play";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_COUNTDOWN: Duration = Duration::from_secs(5);
/// Roughly one display frame.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(50);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be longer than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field} must be an http(s) url, got '{value}'")]
    InvalidUrl { field: &'static str, value: String },
}

// 🏠 Room host configuration
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// Base of the realtime database, e.g. `https://<project>.firebaseio.com`.
    pub database_url: String,
    /// Web page players open to join; the room code is appended as `?code=`.
    pub join_url: String,
    /// Operator supplied room code. Blank means generate one.
    pub room_code: Option<String>,
    pub poll_interval: Duration,
    /// How long everyone has to stay ready before the game starts.
    pub countdown_duration: Duration,
    /// Step of the countdown label while counting.
    pub frame_interval: Duration,
    /// Upper bound on the room delete issued at shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            join_url: DEFAULT_JOIN_URL.to_string(),
            room_code: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            countdown_duration: DEFAULT_COUNTDOWN,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl HostConfig {
    #[must_use]
    pub fn with_database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = url.into();
        self
    }

    #[must_use]
    pub fn with_join_url(mut self, url: impl Into<String>) -> Self {
        self.join_url = url.into();
        self
    }

    #[must_use]
    pub fn with_room_code(mut self, code: impl Into<String>) -> Self {
        self.room_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_countdown(mut self, duration: Duration) -> Self {
        self.countdown_duration = duration;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("database_url", &self.database_url), ("join_url", &self.join_url)] {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl {
                    field,
                    value: value.clone(),
                });
            }
        }
        for (field, value) in [
            ("poll_interval", self.poll_interval),
            ("countdown_duration", self.countdown_duration),
            ("frame_interval", self.frame_interval),
        ] {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration { field });
            }
        }
        Ok(())
    }

    /// Link encoded into the join image, e.g. `https://host/game/play?code=ABCD`.
    pub fn join_link(&self, room_code: &str) -> String {
        format!("{}?code={}", self.join_url, room_code)
    }
}

/// clap value parser for durations given in (fractional) seconds.
pub fn parse_seconds(arg: &str) -> Result<Duration, String> {
    let secs: f64 = arg
        .trim()
        .parse()
        .map_err(|_| format!("'{arg}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(secs).map_err(|err| format!("'{arg}': {err}"))
}
