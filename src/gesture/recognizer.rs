//! Tilt recognizer
//!
//! Turns a continuous orientation stream into discrete tilt events:
//! calibrate, pick the axis for the current screen rotation, classify with
//! hysteresis, then edge-trigger so one physical tilt yields one event.

use std::cell::Cell;
use std::rc::Rc;

use super::calibration::{Calibration, CalibrationBaseline};
use super::source::{OrientationSource, RecognizerHandle, ScreenAngle};
use super::types::{Direction, GestureConfig, OrientationSample, RawOrientation, TiltEvent};
use crate::is_landscape;

/// Per-run recognizer state
#[derive(Debug, Clone)]
pub struct GestureRecognizer {
    config: GestureConfig,
    calibration: Calibration,
    last_direction: Direction,
    in_neutral_zone: bool,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            calibration: Calibration::new(),
            last_direction: Direction::Neutral,
            in_neutral_zone: true,
        }
    }

    /// Subscribe a fresh recognizer to `source`, pushing events to `subscriber`.
    ///
    /// Every call calibrates from scratch.
    pub fn start(
        config: GestureConfig,
        source: Rc<dyn OrientationSource>,
        screen: Rc<dyn ScreenAngle>,
        mut subscriber: impl FnMut(TiltEvent) + 'static,
    ) -> RecognizerHandle {
        let active = Rc::new(Cell::new(true));
        let mut recognizer = Self::new(config);

        let listener_active = active.clone();
        let id = source.subscribe(Box::new(move |raw| {
            if !listener_active.get() {
                return;
            }
            let landscape = is_landscape(screen.angle());
            if let Some(event) = recognizer.process(raw, landscape) {
                subscriber(event);
            }
        }));

        log::info!(
            "Tilt recognizer started (deadzone {}°, threshold {}°)",
            config.neutral_deadzone_deg,
            config.threshold_deg
        );
        RecognizerHandle::new(source, id, active)
    }

    pub fn baseline(&self) -> Option<CalibrationBaseline> {
        self.calibration.baseline()
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    pub fn in_neutral_zone(&self) -> bool {
        self.in_neutral_zone
    }

    /// Feed one reading; returns an event on a direction transition
    pub fn process(&mut self, raw: RawOrientation, landscape: bool) -> Option<TiltEvent> {
        let sample = OrientationSample::from_raw(raw)?;

        let Some(baseline) = self.calibration.baseline() else {
            if let Some(baseline) = self.calibration.feed(sample) {
                log::info!(
                    "Sensor calibration complete (beta {:.1}°, gamma {:.1}°)",
                    baseline.beta,
                    baseline.gamma
                );
            }
            return None;
        };

        let (adjusted_beta, adjusted_gamma) = baseline.adjust(sample);
        let primary = if landscape {
            adjusted_gamma
        } else {
            adjusted_beta
        };
        let direction = self.config.classify(primary, self.last_direction);

        let fire = match direction {
            Direction::Neutral => !self.in_neutral_zone,
            _ => direction != self.last_direction || self.in_neutral_zone,
        };
        self.in_neutral_zone = direction == Direction::Neutral;
        self.last_direction = direction;

        fire.then_some(TiltEvent {
            direction,
            adjusted_beta,
            adjusted_gamma,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::CALIBRATION_SAMPLES;

    /// Recognizer calibrated at (0, 0)
    fn calibrated() -> GestureRecognizer {
        let mut r = GestureRecognizer::new(GestureConfig::default());
        for _ in 0..CALIBRATION_SAMPLES {
            assert!(r.process(RawOrientation::new(0.0, 0.0), false).is_none());
        }
        r
    }

    fn feed_beta(r: &mut GestureRecognizer, values: &[f64]) -> Vec<(usize, Direction)> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| {
                r.process(RawOrientation::new(*v, 0.0), false)
                    .map(|e| (i, e.direction))
            })
            .collect()
    }

    #[test]
    fn calibration_emits_nothing_and_averages() {
        let mut r = GestureRecognizer::new(GestureConfig::default());
        for i in 0..CALIBRATION_SAMPLES {
            // Extreme values during calibration must still not fire
            let beta = if i % 2 == 0 { 60.0 } else { 80.0 };
            assert!(r.process(RawOrientation::new(beta, 4.0), false).is_none());
        }
        let baseline = r.baseline().unwrap();
        assert!((baseline.beta - 70.0).abs() < 1e-9);
        assert!((baseline.gamma - 4.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_samples_do_not_count_toward_calibration() {
        let mut r = GestureRecognizer::new(GestureConfig::default());
        for _ in 0..CALIBRATION_SAMPLES - 1 {
            r.process(RawOrientation::new(0.0, 0.0), false);
        }
        r.process(RawOrientation::empty(), false);
        assert!(r.baseline().is_none());
        r.process(RawOrientation::new(0.0, 0.0), false);
        assert!(r.baseline().is_some());
    }

    #[test]
    fn hysteresis_sequence() {
        // Sign convention: negative is Up; mirror the values to check Down too
        let mut r = calibrated();
        let events = feed_beta(&mut r, &[5.0, -20.0, -35.0, -35.0, -35.0, 5.0]);
        assert_eq!(events, vec![(2, Direction::Up), (5, Direction::Neutral)]);

        let mut r = calibrated();
        let events = feed_beta(&mut r, &[5.0, 20.0, 35.0, 35.0, 35.0, 5.0]);
        assert_eq!(events, vec![(2, Direction::Down), (5, Direction::Neutral)]);
    }

    #[test]
    fn band_value_keeps_previous_direction() {
        let mut r = calibrated();
        feed_beta(&mut r, &[-20.0]);
        assert_eq!(r.last_direction(), Direction::Neutral);
        feed_beta(&mut r, &[-40.0, -20.0]);
        assert_eq!(r.last_direction(), Direction::Up);
        assert!(!r.in_neutral_zone());
    }

    #[test]
    fn sustained_tilt_fires_once() {
        let mut r = calibrated();
        let events = feed_beta(&mut r, &[-40.0; 25]);
        assert_eq!(events, vec![(0, Direction::Up)]);
    }

    #[test]
    fn neutral_rearms() {
        let mut r = calibrated();
        let events = feed_beta(&mut r, &[-40.0, -40.0, 0.0, 0.0, -40.0]);
        assert_eq!(
            events,
            vec![
                (0, Direction::Up),
                (2, Direction::Neutral),
                (4, Direction::Up)
            ]
        );
    }

    #[test]
    fn direct_flip_without_neutral_fires() {
        let mut r = calibrated();
        let events = feed_beta(&mut r, &[-40.0, 40.0, 40.0]);
        assert_eq!(events, vec![(0, Direction::Up), (1, Direction::Down)]);
    }

    #[test]
    fn landscape_uses_gamma() {
        let mut r = calibrated();
        // Large beta is ignored in landscape
        assert!(r.process(RawOrientation::new(-60.0, 0.0), true).is_none());
        let ev = r.process(RawOrientation::new(0.0, 45.0), true).unwrap();
        assert_eq!(ev.direction, Direction::Down);
        assert_eq!(ev.adjusted_gamma, 45.0);
        assert_eq!(ev.adjusted_beta, 0.0);
    }

    #[test]
    fn event_carries_adjusted_angles() {
        let mut r = GestureRecognizer::new(GestureConfig::default());
        for _ in 0..CALIBRATION_SAMPLES {
            r.process(RawOrientation::new(80.0, 10.0), false);
        }
        let ev = r.process(RawOrientation::new(45.0, 12.0), false).unwrap();
        assert_eq!(ev.direction, Direction::Up);
        assert_eq!(ev.adjusted_beta, -35.0);
        assert_eq!(ev.adjusted_gamma, 2.0);
    }

    #[test]
    fn stop_twice_silences_the_subscriber() {
        use crate::platform::memory::{FixedScreen, MemoryOrientation};
        use std::cell::RefCell;

        let source = Rc::new(MemoryOrientation::new());
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let handle = GestureRecognizer::start(
            GestureConfig::default(),
            source.clone(),
            Rc::new(FixedScreen::portrait()),
            move |event| sink.borrow_mut().push(event.direction),
        );

        source.hold(0.0, 0.0, CALIBRATION_SAMPLES);
        source.push_angles(-40.0, 0.0);
        assert_eq!(*events.borrow(), vec![Direction::Up]);
        assert!(handle.is_active());

        handle.stop();
        source.hold(0.0, 0.0, 3);
        handle.stop();
        source.push_angles(40.0, 0.0);

        assert_eq!(*events.borrow(), vec![Direction::Up]);
        assert_eq!(source.listener_count(), 0);
        assert!(!handle.is_active());
    }

    #[test]
    fn malformed_samples_leave_state_alone() {
        let mut r = calibrated();
        feed_beta(&mut r, &[-40.0]);
        assert!(r.process(RawOrientation::empty(), false).is_none());
        assert_eq!(r.last_direction(), Direction::Up);
        assert!(!r.in_neutral_zone());
    }
}
