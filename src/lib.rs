//! Tilt Words - a hold-it-to-your-forehead word guessing party game
//!
//! Core modules:
//! - `gesture`: Orientation stream -> debounced tilt events
//! - `round`: Countdown/play/finish state machine and its session wiring
//! - `platform`: Browser/native collaborators (timers, sensors, wake lock)
//! - `deck`, `settings`, `scores`: Word lists and persisted preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod deck;
pub mod error;
pub mod feedback;
pub mod gesture;
pub mod input;
pub mod platform;
pub mod round;
pub mod scores;
pub mod settings;

pub use deck::DeckId;
pub use error::{ConfigError, WakeLockError};
pub use gesture::{Direction, GestureConfig, GestureRecognizer, RecognizerHandle, TiltEvent};
pub use round::{Action, RoundConfig, RoundController, RoundPhase, RoundResult, RoundSession};
pub use scores::ScoreBook;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Valid samples averaged into the calibration baseline
    pub const CALIBRATION_SAMPLES: usize = 10;
    /// Band around the baseline that counts as neutral (degrees)
    pub const DEFAULT_NEUTRAL_DEADZONE_DEG: f64 = 10.0;
    /// Distance from the baseline that registers a tilt (degrees)
    pub const DEFAULT_THRESHOLD_DEG: f64 = 30.0;

    /// Countdown shown before play starts
    pub const COUNTDOWN_FROM: u8 = 3;
    /// Period of both the countdown and the round clock
    pub const TICK_INTERVAL_MS: u32 = 1000;
    /// Seconds at the end of a round that get a beep each tick
    pub const FINAL_SECONDS_CUE: u32 = 5;

    /// Round length bounds
    pub const MIN_DURATION_SEC: u32 = 45;
    pub const MAX_DURATION_SEC: u32 = 180;
    pub const DURATION_STEP_SEC: u32 = 15;
    pub const DEFAULT_DURATION_SEC: u32 = 60;
}

/// Format seconds as `M:SS`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// True when a screen rotation angle means the device is held sideways.
///
/// Unknown angles count as portrait.
#[inline]
pub fn is_landscape(angle: Option<u16>) -> bool {
    angle.is_some_and(|a| a % 180 != 0)
}
