//! Error types
//!
//! Only configuration and platform acquisition can fail. Gameplay itself
//! never errors: bad samples are dropped and out-of-phase actions are ignored.

use thiserror::Error;

use crate::consts::{DURATION_STEP_SEC, MAX_DURATION_SEC, MIN_DURATION_SEC};

/// Invalid round or gesture configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("round duration {0}s is outside {min}..={max}s", min = MIN_DURATION_SEC, max = MAX_DURATION_SEC)]
    DurationOutOfRange(u32),
    #[error("round duration {0}s is not a multiple of {step}s", step = DURATION_STEP_SEC)]
    DurationStep(u32),
    #[error("word list is empty")]
    EmptyWordList,
    #[error("neutral deadzone {deadzone}° must be non-negative and below threshold {threshold}°")]
    GestureBands { deadzone: f64, threshold: f64 },
}

/// Screen wake lock could not be taken
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WakeLockError {
    #[error("screen wake lock is not supported")]
    Unsupported,
    #[error("wake lock request rejected: {0}")]
    Rejected(String),
}

/// Check a round duration against the allowed range and step
pub fn validate_duration(duration_sec: u32) -> Result<u32, ConfigError> {
    if !(MIN_DURATION_SEC..=MAX_DURATION_SEC).contains(&duration_sec) {
        return Err(ConfigError::DurationOutOfRange(duration_sec));
    }
    if duration_sec % DURATION_STEP_SEC != 0 {
        return Err(ConfigError::DurationStep(duration_sec));
    }
    Ok(duration_sec)
}
