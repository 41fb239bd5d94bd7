//! Sound and haptic cues emitted by a round

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Word guessed - two rising beeps
    Correct,
    /// Word skipped - short downward tone
    Pass,
    /// Round over - descending siren
    TimeUp,
    /// Countdown beep; `last` is the higher, longer final beep
    Countdown { last: bool },
}

/// Vibration patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    Correct,
    Pass,
    TimeUp,
}

impl Haptic {
    /// Alternating on/off durations in milliseconds
    pub fn pattern_ms(&self) -> &'static [u32] {
        match self {
            Haptic::Correct => &[100],
            Haptic::Pass => &[50, 50, 50],
            Haptic::TimeUp => &[500],
        }
    }
}

/// Sink for audio and haptic output.
///
/// Implementations must not fail loudly: missing audio or vibration support
/// simply produces nothing.
pub trait Feedback {
    fn sound(&self, effect: SoundEffect);
    fn haptic(&self, haptic: Haptic);
}

/// Feedback that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Feedback for Silent {
    fn sound(&self, _effect: SoundEffect) {}
    fn haptic(&self, _haptic: Haptic) {}
}
