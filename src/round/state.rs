//! Round configuration, phases, results and the presentation snapshot

use serde::{Deserialize, Serialize};

use crate::consts::FINAL_SECONDS_CUE;
use crate::deck::DeckId;
use crate::error::{ConfigError, validate_duration};
use crate::format_clock;
use crate::gesture::Direction;

/// Label shown once every word in the deck has been used
pub const NO_MORE_WORDS: &str = "No more words";

/// Player intent, from a tilt or from the fallback buttons/keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    MarkCorrect,
    MarkPass,
}

impl Action {
    /// Tilting up means correct, down means pass; neutral is informational
    pub fn from_direction(direction: Direction) -> Option<Self> {
        match direction {
            Direction::Up => Some(Action::MarkCorrect),
            Direction::Down => Some(Action::MarkPass),
            Direction::Neutral => None,
        }
    }
}

/// Immutable inputs for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundConfig {
    duration_sec: u32,
    words: Vec<String>,
    deck: DeckId,
}

impl RoundConfig {
    /// `words` should already be shuffled
    pub fn new(duration_sec: u32, words: Vec<String>, deck: DeckId) -> Result<Self, ConfigError> {
        let duration_sec = validate_duration(duration_sec)?;
        if words.is_empty() {
            return Err(ConfigError::EmptyWordList);
        }
        Ok(Self {
            duration_sec,
            words,
            deck,
        })
    }

    pub fn duration_sec(&self) -> u32 {
        self.duration_sec
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn deck(&self) -> DeckId {
        self.deck
    }
}

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// Seconds left before play starts (3, 2, 1, then 0 on the way to play)
    Countdown(u8),
    /// Active play with seconds remaining
    Playing(u32),
    /// Round ended; terminal
    Finished,
}

/// Outcome of one round, produced exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundResult {
    pub correct: Vec<String>,
    pub passed: Vec<String>,
    pub duration_sec: u32,
    pub deck: DeckId,
}

impl RoundResult {
    pub fn score(&self) -> usize {
        self.correct.len()
    }

    pub fn attempted(&self) -> usize {
        self.correct.len() + self.passed.len()
    }

    /// Rounded share of attempted words that were correct
    pub fn accuracy_percent(&self) -> Option<u32> {
        let attempted = self.attempted();
        if attempted == 0 {
            return None;
        }
        Some((self.score() as f64 * 100.0 / attempted as f64).round() as u32)
    }
}

/// Read-only view handed to the presentation layer after every transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSnapshot {
    pub phase: RoundPhase,
    pub score: usize,
    /// Countdown value while counting down
    pub countdown: Option<u8>,
    /// Seconds left while playing
    pub remaining_sec: Option<u32>,
    /// Word to show, or [`NO_MORE_WORDS`]
    pub current_word: String,
    /// `M:SS` of the round clock
    pub clock_label: String,
    /// Final seconds of play (pulse the screen)
    pub urgent: bool,
}

impl RoundSnapshot {
    pub(crate) fn new(phase: RoundPhase, score: usize, current_word: Option<&str>, duration_sec: u32) -> Self {
        let (countdown, remaining_sec) = match phase {
            RoundPhase::Countdown(n) => (Some(n), None),
            RoundPhase::Playing(r) => (None, Some(r)),
            RoundPhase::Finished => (None, None),
        };
        let clock = match phase {
            RoundPhase::Countdown(_) => duration_sec,
            RoundPhase::Playing(r) => r,
            RoundPhase::Finished => 0,
        };
        Self {
            phase,
            score,
            countdown,
            remaining_sec,
            current_word: current_word.unwrap_or(NO_MORE_WORDS).to_string(),
            clock_label: format_clock(clock),
            urgent: remaining_sec.is_some_and(|r| r > 0 && r <= FINAL_SECONDS_CUE),
        }
    }

    /// Ask the player to turn the phone sideways while still counting down
    pub fn shows_rotate_hint(&self, landscape: bool) -> bool {
        !landscape && matches!(self.phase, RoundPhase::Countdown(n) if n > 0)
    }
}
