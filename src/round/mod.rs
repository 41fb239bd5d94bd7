//! Round lifecycle: countdown, timed play, scoring and the final result

pub mod controller;
pub mod session;
pub mod state;

pub use controller::{RoundController, RoundEffect, TimerToken};
pub use session::{RoundSession, Services};
pub use state::{Action, NO_MORE_WORDS, RoundConfig, RoundPhase, RoundResult, RoundSnapshot};
