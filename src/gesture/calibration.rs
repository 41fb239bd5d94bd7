//! Baseline calibration
//!
//! The first few valid samples after start are averaged into the neutral
//! pose. Once ready the baseline never changes for that recognizer.

use serde::{Deserialize, Serialize};

use super::types::OrientationSample;
use crate::consts::CALIBRATION_SAMPLES;

/// Neutral orientation the player holds the device in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationBaseline {
    pub beta: f64,
    pub gamma: f64,
}

impl CalibrationBaseline {
    /// Subtract the baseline from a sample, returning (beta, gamma)
    pub fn adjust(&self, sample: OrientationSample) -> (f64, f64) {
        (sample.beta - self.beta, sample.gamma - self.gamma)
    }
}

#[derive(Debug, Clone)]
pub enum Calibration {
    Collecting(Vec<OrientationSample>),
    Ready(CalibrationBaseline),
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new()
    }
}

impl Calibration {
    pub fn new() -> Self {
        Calibration::Collecting(Vec::with_capacity(CALIBRATION_SAMPLES))
    }

    pub fn baseline(&self) -> Option<CalibrationBaseline> {
        match self {
            Calibration::Ready(baseline) => Some(*baseline),
            Calibration::Collecting(_) => None,
        }
    }

    /// Samples buffered so far (saturates once ready)
    pub fn samples_seen(&self) -> usize {
        match self {
            Calibration::Collecting(samples) => samples.len(),
            Calibration::Ready(_) => CALIBRATION_SAMPLES,
        }
    }

    /// Buffer a sample while collecting.
    ///
    /// Returns the baseline on the call that completes calibration, `None`
    /// on every other call (including after it is ready).
    pub fn feed(&mut self, sample: OrientationSample) -> Option<CalibrationBaseline> {
        let Calibration::Collecting(samples) = self else {
            return None;
        };
        samples.push(sample);
        if samples.len() < CALIBRATION_SAMPLES {
            return None;
        }

        let n = samples.len() as f64;
        let baseline = CalibrationBaseline {
            beta: samples.iter().map(|s| s.beta).sum::<f64>() / n,
            gamma: samples.iter().map(|s| s.gamma).sum::<f64>() / n,
        };
        *self = Calibration::Ready(baseline);
        Some(baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(beta: f64, gamma: f64) -> OrientationSample {
        OrientationSample { beta, gamma }
    }

    #[test]
    fn baseline_is_mean_of_first_ten() {
        let mut cal = Calibration::new();
        for i in 0..9 {
            assert!(cal.feed(sample(i as f64, -(i as f64) * 2.0)).is_none());
            assert!(cal.baseline().is_none());
        }
        let baseline = cal.feed(sample(9.0, -18.0)).expect("tenth sample completes");
        // 0..=9 mean = 4.5, gammas mean = -9.0
        assert!((baseline.beta - 4.5).abs() < 1e-9);
        assert!((baseline.gamma + 9.0).abs() < 1e-9);
        assert_eq!(cal.baseline(), Some(baseline));
    }

    #[test]
    fn baseline_is_frozen_once_ready() {
        let mut cal = Calibration::new();
        for _ in 0..CALIBRATION_SAMPLES {
            cal.feed(sample(50.0, 5.0));
        }
        assert!(cal.feed(sample(-80.0, 90.0)).is_none());
        assert_eq!(
            cal.baseline(),
            Some(CalibrationBaseline {
                beta: 50.0,
                gamma: 5.0
            })
        );
        assert_eq!(cal.samples_seen(), CALIBRATION_SAMPLES);
    }

    #[test]
    fn adjust_subtracts() {
        let b = CalibrationBaseline {
            beta: 80.0,
            gamma: -4.0,
        };
        assert_eq!(b.adjust(sample(50.0, 6.0)), (-30.0, 10.0));
    }
}
