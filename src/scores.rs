//! Score book: the last round plus a best-score table
//!
//! Persisted to LocalStorage, keeps the top 10 rounds.

use serde::{Deserialize, Serialize};

use crate::deck::DeckId;
use crate::round::RoundResult;

/// Maximum number of best scores to keep
pub const MAX_BEST_SCORES: usize = 10;

/// One finished round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// Words guessed correctly
    pub score: u32,
    /// Words guessed or passed
    pub attempted: u32,
    pub deck: DeckId,
    pub duration_sec: u32,
    /// Unix timestamp (ms) when played
    pub timestamp: f64,
}

impl ScoreEntry {
    pub fn from_result(result: &RoundResult, timestamp: f64) -> Self {
        Self {
            score: result.score() as u32,
            attempted: result.attempted() as u32,
            deck: result.deck,
            duration_sec: result.duration_sec,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreBook {
    /// Most recent round, whatever its score
    pub last: Option<ScoreEntry>,
    /// Best rounds, sorted descending by score
    pub best: Vec<ScoreEntry>,
}

impl ScoreBook {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "tilt_words_scores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score makes the best table
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        if self.best.len() < MAX_BEST_SCORES {
            return true;
        }
        self.best.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would take (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, score: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let rank = self.best.iter().position(|e| score > e.score);
        Some(rank.unwrap_or(self.best.len()) + 1)
    }

    /// Remember a finished round.
    /// Returns the best-table rank achieved, if any.
    pub fn record(&mut self, result: &RoundResult, timestamp: f64) -> Option<usize> {
        let entry = ScoreEntry::from_result(result, timestamp);
        self.last = Some(entry.clone());

        let rank = self.potential_rank(entry.score)?;
        self.best.insert(rank - 1, entry);
        self.best.truncate(MAX_BEST_SCORES);
        Some(rank)
    }

    /// Score of the most recent round, whether or not it made the table
    pub fn last_score(&self) -> Option<u32> {
        self.last.as_ref().map(|e| e.score)
    }

    pub fn top_score(&self) -> Option<u32> {
        self.best.first().map(|e| e.score)
    }

    /// Best score for one deck
    pub fn top_for_deck(&self, deck: DeckId) -> Option<u32> {
        self.best.iter().find(|e| e.deck == deck).map(|e| e.score)
    }

    /// Load scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(book) = serde_json::from_str::<ScoreBook>(&json) {
                    log::info!("Loaded {} best scores", book.best.len());
                    return book;
                }
            }
        }

        log::info!("No scores found, starting fresh");
        Self::new()
    }

    /// Save scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Scores saved ({} best)", self.best.len());
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(correct: usize, passed: usize, deck: DeckId) -> RoundResult {
        RoundResult {
            correct: (0..correct).map(|i| format!("c{i}")).collect(),
            passed: (0..passed).map(|i| format!("p{i}")).collect(),
            duration_sec: 60,
            deck,
        }
    }

    #[test]
    fn last_is_always_recorded() {
        let mut book = ScoreBook::new();
        assert_eq!(book.record(&result(0, 4, DeckId::Animals), 1.0), None);
        let last = book.last.as_ref().unwrap();
        assert_eq!(last.score, 0);
        assert_eq!(last.attempted, 4);
        assert!(book.best.is_empty());
    }

    #[test]
    fn last_score_follows_the_latest_round() {
        let mut book = ScoreBook::new();
        assert_eq!(book.last_score(), None);
        book.record(&result(6, 1, DeckId::Animals), 1.0);
        book.record(&result(2, 3, DeckId::Actions), 2.0);
        assert_eq!(book.last_score(), Some(2));
        assert_eq!(book.top_score(), Some(6));
    }

    #[test]
    fn best_table_stays_sorted() {
        let mut book = ScoreBook::new();
        assert_eq!(book.record(&result(3, 0, DeckId::Animals), 1.0), Some(1));
        assert_eq!(book.record(&result(5, 1, DeckId::Actions), 2.0), Some(1));
        assert_eq!(book.record(&result(4, 0, DeckId::Animals), 3.0), Some(2));
        let scores: Vec<u32> = book.best.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![5, 4, 3]);
        assert_eq!(book.top_score(), Some(5));
        assert_eq!(book.top_for_deck(DeckId::Animals), Some(4));
    }

    #[test]
    fn full_table_needs_a_better_score() {
        let mut book = ScoreBook::new();
        for i in 1..=MAX_BEST_SCORES {
            book.record(&result(i, 0, DeckId::Animals), i as f64);
        }
        assert_eq!(book.best.len(), MAX_BEST_SCORES);
        assert!(!book.qualifies(1));
        assert_eq!(book.potential_rank(2), Some(MAX_BEST_SCORES));
        assert_eq!(book.record(&result(20, 0, DeckId::Actions), 99.0), Some(1));
        assert_eq!(book.best.len(), MAX_BEST_SCORES);
        assert_eq!(book.best.last().map(|e| e.score), Some(2));
    }
}
