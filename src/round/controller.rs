//! Round state machine
//!
//! Countdown(3) -> ... -> Countdown(0) -> Playing(duration) -> ... -> Finished.
//!
//! The controller never touches the outside world. Every transition returns
//! the side effects it wants as [`RoundEffect`]s, in order, and the caller
//! (normally [`super::RoundSession`]) carries them out. Timer callbacks carry
//! the [`TimerToken`] they were started with so a tick that arrives after its
//! phase ended is recognised as stale and ignored.

use crate::consts::{COUNTDOWN_FROM, FINAL_SECONDS_CUE};
use crate::feedback::{Haptic, SoundEffect};

use super::state::{Action, RoundConfig, RoundPhase, RoundResult, RoundSnapshot};

/// Identifies one scheduled one-second timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEffect {
    /// Start a repeating one-second timer that calls `tick` with this token
    StartTimer(TimerToken),
    CancelTimer(TimerToken),
    AcquireWakeLock,
    ReleaseWakeLock,
    /// Start the tilt recognizer and accept fallback input
    StartListening,
    StopListening,
    Sound(SoundEffect),
    Haptic(Haptic),
    /// Deliver the result; emitted exactly once per round
    Finished(RoundResult),
}

/// Authoritative state for one round
#[derive(Debug, Clone)]
pub struct RoundController {
    config: RoundConfig,
    phase: RoundPhase,
    word_cursor: usize,
    correct: Vec<String>,
    passed: Vec<String>,
    started: bool,
    timer: Option<TimerToken>,
    next_token: u64,
}

impl RoundController {
    pub fn new(config: RoundConfig) -> Self {
        Self {
            config,
            phase: RoundPhase::Countdown(COUNTDOWN_FROM),
            word_cursor: 0,
            correct: Vec::new(),
            passed: Vec::new(),
            started: false,
            timer: None,
            next_token: 0,
        }
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == RoundPhase::Finished
    }

    pub fn word_cursor(&self) -> usize {
        self.word_cursor
    }

    /// Word on screen, `None` once the deck is used up
    pub fn current_word(&self) -> Option<&str> {
        self.config.words().get(self.word_cursor).map(String::as_str)
    }

    pub fn correct(&self) -> &[String] {
        &self.correct
    }

    pub fn passed(&self) -> &[String] {
        &self.passed
    }

    pub fn score(&self) -> usize {
        self.correct.len()
    }

    /// Token of the timer the current phase is waiting on
    pub fn active_timer(&self) -> Option<TimerToken> {
        self.timer
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        RoundSnapshot::new(
            self.phase,
            self.score(),
            self.current_word(),
            self.config.duration_sec(),
        )
    }

    /// Start the countdown. Only the first call does anything.
    pub fn begin(&mut self) -> Vec<RoundEffect> {
        let mut effects = Vec::new();
        if self.started {
            return effects;
        }
        self.started = true;
        log::info!(
            "Round starting: {}s, {} words, deck {}",
            self.config.duration_sec(),
            self.config.words().len(),
            self.config.deck().as_str()
        );
        self.start_timer(&mut effects);
        effects.push(RoundEffect::Sound(SoundEffect::Countdown {
            last: COUNTDOWN_FROM == 1,
        }));
        effects
    }

    /// One second elapsed on the timer identified by `token`
    pub fn tick(&mut self, token: TimerToken) -> Vec<RoundEffect> {
        let mut effects = Vec::new();
        if self.timer != Some(token) {
            log::debug!("Ignoring stale tick {:?}", token);
            return effects;
        }

        match self.phase {
            RoundPhase::Countdown(n) => {
                let next = n.saturating_sub(1);
                self.phase = RoundPhase::Countdown(next);
                if next > 0 {
                    effects.push(RoundEffect::Sound(SoundEffect::Countdown { last: next == 1 }));
                } else {
                    self.enter_playing(&mut effects);
                }
            }
            RoundPhase::Playing(remaining) => {
                if remaining == 1 {
                    effects.push(RoundEffect::Sound(SoundEffect::Countdown { last: true }));
                } else if remaining > 1 && remaining <= FINAL_SECONDS_CUE {
                    effects.push(RoundEffect::Sound(SoundEffect::Countdown { last: false }));
                }
                let remaining = remaining.saturating_sub(1);
                self.phase = RoundPhase::Playing(remaining);
                if remaining == 0 {
                    self.finish(&mut effects);
                }
            }
            RoundPhase::Finished => {}
        }
        effects
    }

    /// Score the current word. Ignored outside live play or once the deck is
    /// exhausted.
    pub fn apply(&mut self, action: Action) -> Vec<RoundEffect> {
        let mut effects = Vec::new();
        let live = matches!(self.phase, RoundPhase::Playing(r) if r > 0);
        let Some(word) = self.current_word().filter(|_| live).map(str::to_owned) else {
            log::debug!("Ignoring {:?} in {:?}", action, self.phase);
            return effects;
        };

        match action {
            Action::MarkCorrect => {
                self.correct.push(word);
                effects.push(RoundEffect::Sound(SoundEffect::Correct));
                effects.push(RoundEffect::Haptic(Haptic::Correct));
            }
            Action::MarkPass => {
                self.passed.push(word);
                effects.push(RoundEffect::Sound(SoundEffect::Pass));
                effects.push(RoundEffect::Haptic(Haptic::Pass));
            }
        }
        self.word_cursor += 1;
        if self.current_word().is_none() {
            log::info!("Deck exhausted; round continues until time is up");
        }
        effects
    }

    fn start_timer(&mut self, effects: &mut Vec<RoundEffect>) {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.timer = Some(token);
        effects.push(RoundEffect::StartTimer(token));
    }

    fn cancel_timer(&mut self, effects: &mut Vec<RoundEffect>) {
        if let Some(token) = self.timer.take() {
            effects.push(RoundEffect::CancelTimer(token));
        }
    }

    fn enter_playing(&mut self, effects: &mut Vec<RoundEffect>) {
        self.cancel_timer(effects);
        self.phase = RoundPhase::Playing(self.config.duration_sec());
        log::info!("Round playing ({}s)", self.config.duration_sec());
        effects.push(RoundEffect::AcquireWakeLock);
        effects.push(RoundEffect::StartListening);
        self.start_timer(effects);
    }

    fn finish(&mut self, effects: &mut Vec<RoundEffect>) {
        self.cancel_timer(effects);
        self.phase = RoundPhase::Finished;
        effects.push(RoundEffect::StopListening);
        effects.push(RoundEffect::ReleaseWakeLock);
        effects.push(RoundEffect::Sound(SoundEffect::TimeUp));
        effects.push(RoundEffect::Haptic(Haptic::TimeUp));

        let result = RoundResult {
            correct: self.correct.clone(),
            passed: self.passed.clone(),
            duration_sec: self.config.duration_sec(),
            deck: self.config.deck(),
        };
        log::info!(
            "Time up: {} correct, {} passed",
            result.correct.len(),
            result.passed.len()
        );
        effects.push(RoundEffect::Finished(result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::DeckId;

    fn controller(duration: u32, n_words: usize) -> RoundController {
        let words = (0..n_words).map(|i| format!("word{i}")).collect();
        RoundController::new(RoundConfig::new(duration, words, DeckId::Animals).unwrap())
    }

    /// Tick the active timer once
    fn tick(c: &mut RoundController) -> Vec<RoundEffect> {
        let token = c.active_timer().expect("a timer is running");
        c.tick(token)
    }

    fn start_playing(c: &mut RoundController) {
        c.begin();
        for _ in 0..COUNTDOWN_FROM {
            tick(c);
        }
        assert!(matches!(c.phase(), RoundPhase::Playing(_)));
    }

    fn results(effects: &[RoundEffect]) -> Vec<&RoundResult> {
        effects
            .iter()
            .filter_map(|e| match e {
                RoundEffect::Finished(r) => Some(r),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn countdown_beeps_then_plays() {
        let mut c = controller(60, 5);
        assert_eq!(c.phase(), RoundPhase::Countdown(3));
        assert!(c.active_timer().is_none());

        let fx = c.begin();
        let countdown_timer = c.active_timer().unwrap();
        assert_eq!(
            fx,
            vec![
                RoundEffect::StartTimer(countdown_timer),
                RoundEffect::Sound(SoundEffect::Countdown { last: false }),
            ]
        );
        assert!(c.begin().is_empty());

        assert_eq!(
            tick(&mut c),
            vec![RoundEffect::Sound(SoundEffect::Countdown { last: false })]
        );
        assert_eq!(c.phase(), RoundPhase::Countdown(2));
        assert_eq!(
            tick(&mut c),
            vec![RoundEffect::Sound(SoundEffect::Countdown { last: true })]
        );
        assert_eq!(c.phase(), RoundPhase::Countdown(1));

        let fx = tick(&mut c);
        let play_timer = c.active_timer().unwrap();
        assert_ne!(play_timer, countdown_timer);
        assert_eq!(c.phase(), RoundPhase::Playing(60));
        assert_eq!(
            fx,
            vec![
                RoundEffect::CancelTimer(countdown_timer),
                RoundEffect::AcquireWakeLock,
                RoundEffect::StartListening,
                RoundEffect::StartTimer(play_timer),
            ]
        );
    }

    #[test]
    fn lifecycle_without_actions() {
        let mut c = controller(60, 5);
        start_playing(&mut c);

        let mut finished = Vec::new();
        for _ in 0..60 {
            let fx = tick(&mut c);
            finished.extend(results(&fx).into_iter().cloned());
        }
        assert_eq!(c.phase(), RoundPhase::Finished);
        assert_eq!(
            finished,
            vec![RoundResult {
                correct: vec![],
                passed: vec![],
                duration_sec: 60,
                deck: DeckId::Animals,
            }]
        );
        assert!(c.active_timer().is_none());
    }

    #[test]
    fn finish_effects_in_order() {
        let mut c = controller(45, 2);
        start_playing(&mut c);
        for _ in 0..44 {
            tick(&mut c);
        }
        let timer = c.active_timer().unwrap();
        let fx = c.tick(timer);
        assert_eq!(fx[0], RoundEffect::Sound(SoundEffect::Countdown { last: true }));
        assert_eq!(fx[1], RoundEffect::CancelTimer(timer));
        assert_eq!(fx[2], RoundEffect::StopListening);
        assert_eq!(fx[3], RoundEffect::ReleaseWakeLock);
        assert_eq!(fx[4], RoundEffect::Sound(SoundEffect::TimeUp));
        assert_eq!(fx[5], RoundEffect::Haptic(Haptic::TimeUp));
        assert!(matches!(fx[6], RoundEffect::Finished(_)));
        assert_eq!(fx.len(), 7);
    }

    #[test]
    fn stale_and_post_finish_ticks_are_ignored() {
        let mut c = controller(45, 2);
        c.begin();
        let countdown_timer = c.active_timer().unwrap();
        for _ in 0..COUNTDOWN_FROM {
            tick(&mut c);
        }
        // The countdown timer fired late, after its phase ended
        assert!(c.tick(countdown_timer).is_empty());
        assert_eq!(c.phase(), RoundPhase::Playing(45));

        let play_timer = c.active_timer().unwrap();
        for _ in 0..45 {
            c.tick(play_timer);
        }
        assert!(c.is_finished());
        assert!(c.tick(play_timer).is_empty());
        assert_eq!(c.phase(), RoundPhase::Finished);
    }

    #[test]
    fn final_seconds_beep() {
        let mut c = controller(45, 2);
        start_playing(&mut c);
        for _ in 0..39 {
            assert!(tick(&mut c).is_empty());
        }
        // remaining 6 -> 5: still quiet
        assert!(tick(&mut c).is_empty());
        for _ in 0..4 {
            assert_eq!(
                tick(&mut c),
                vec![RoundEffect::Sound(SoundEffect::Countdown { last: false })]
            );
        }
        assert_eq!(c.phase(), RoundPhase::Playing(1));
    }

    #[test]
    fn scoring_keeps_order() {
        let mut c = controller(60, 3);
        start_playing(&mut c);
        assert_eq!(
            c.apply(Action::MarkCorrect),
            vec![
                RoundEffect::Sound(SoundEffect::Correct),
                RoundEffect::Haptic(Haptic::Correct)
            ]
        );
        assert_eq!(
            c.apply(Action::MarkPass),
            vec![
                RoundEffect::Sound(SoundEffect::Pass),
                RoundEffect::Haptic(Haptic::Pass)
            ]
        );
        c.apply(Action::MarkCorrect);

        assert_eq!(c.correct(), ["word0", "word2"]);
        assert_eq!(c.passed(), ["word1"]);

        let timer = c.active_timer().unwrap();
        let mut result = None;
        for _ in 0..60 {
            for fx in c.tick(timer) {
                if let RoundEffect::Finished(r) = fx {
                    result = Some(r);
                }
            }
        }
        let result = result.unwrap();
        assert_eq!(result.correct, vec!["word0", "word2"]);
        assert_eq!(result.passed, vec!["word1"]);
    }

    #[test]
    fn actions_outside_play_are_ignored() {
        let mut c = controller(45, 3);
        assert!(c.apply(Action::MarkCorrect).is_empty());
        c.begin();
        assert!(c.apply(Action::MarkPass).is_empty());
        assert_eq!(c.word_cursor(), 0);

        for _ in 0..COUNTDOWN_FROM {
            tick(&mut c);
        }
        for _ in 0..45 {
            tick(&mut c);
        }
        assert!(c.is_finished());
        assert!(c.apply(Action::MarkCorrect).is_empty());
        assert!(c.correct().is_empty());
    }

    #[test]
    fn exhaustion_is_a_no_op_and_round_continues() {
        let mut c = controller(60, 2);
        start_playing(&mut c);
        c.apply(Action::MarkCorrect);
        c.apply(Action::MarkPass);
        assert_eq!(c.current_word(), None);

        for _ in 0..5 {
            assert!(c.apply(Action::MarkCorrect).is_empty());
        }
        assert_eq!(c.word_cursor(), 2);
        assert_eq!(c.snapshot().current_word, crate::round::NO_MORE_WORDS);

        tick(&mut c);
        assert_eq!(c.phase(), RoundPhase::Playing(59));
        assert!(!c.is_finished());
    }
}
