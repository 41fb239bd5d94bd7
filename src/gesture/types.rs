//! Sample, direction and event types shared by the gesture pipeline

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_NEUTRAL_DEADZONE_DEG, DEFAULT_THRESHOLD_DEG};
use crate::error::ConfigError;

/// One reading as delivered by the sensor, axes may be missing
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RawOrientation {
    /// Front-back tilt (degrees)
    pub beta: Option<f64>,
    /// Left-right tilt (degrees)
    pub gamma: Option<f64>,
}

impl RawOrientation {
    pub fn new(beta: f64, gamma: f64) -> Self {
        Self {
            beta: Some(beta),
            gamma: Some(gamma),
        }
    }

    /// A reading with no usable axes
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A validated orientation reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub beta: f64,
    pub gamma: f64,
}

impl OrientationSample {
    /// Accept a raw reading only when both axes are present and finite
    pub fn from_raw(raw: RawOrientation) -> Option<Self> {
        let beta = raw.beta.filter(|v| v.is_finite())?;
        let gamma = raw.gamma.filter(|v| v.is_finite())?;
        Some(Self { beta, gamma })
    }
}

/// Semantic meaning of a tilt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Tilted back (face up): correct
    Up,
    /// Tilted forward (face down): pass
    Down,
    #[default]
    Neutral,
}

/// Edge-triggered tilt notification, angles relative to the baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TiltEvent {
    pub direction: Direction,
    pub adjusted_beta: f64,
    pub adjusted_gamma: f64,
}

/// Angular bands used to classify the primary axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureConfig {
    /// |v| at or below this is neutral
    pub neutral_deadzone_deg: f64,
    /// |v| at or above this is a tilt
    pub threshold_deg: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            neutral_deadzone_deg: DEFAULT_NEUTRAL_DEADZONE_DEG,
            threshold_deg: DEFAULT_THRESHOLD_DEG,
        }
    }
}

impl GestureConfig {
    /// Build a config, requiring `0 <= deadzone < threshold`
    pub fn new(neutral_deadzone_deg: f64, threshold_deg: f64) -> Result<Self, ConfigError> {
        let valid = neutral_deadzone_deg.is_finite()
            && threshold_deg.is_finite()
            && neutral_deadzone_deg >= 0.0
            && neutral_deadzone_deg < threshold_deg;
        if !valid {
            return Err(ConfigError::GestureBands {
                deadzone: neutral_deadzone_deg,
                threshold: threshold_deg,
            });
        }
        Ok(Self {
            neutral_deadzone_deg,
            threshold_deg,
        })
    }

    /// Classify a primary-axis value.
    ///
    /// Values between the deadzone and the threshold keep `previous` so the
    /// classification does not flap near a boundary.
    pub fn classify(&self, value: f64, previous: Direction) -> Direction {
        if value <= -self.threshold_deg {
            Direction::Up
        } else if value >= self.threshold_deg {
            Direction::Down
        } else if value.abs() <= self.neutral_deadzone_deg {
            Direction::Neutral
        } else {
            previous
        }
    }
}
