//! Round session
//!
//! Owns a [`RoundController`] and the platform collaborators, and carries out
//! the effects the controller asks for: schedules and cancels the one-second
//! timers, starts and stops the tilt recognizer, holds the wake lock, plays
//! cues and hands the result to whoever asked for it.
//!
//! Everything runs on one thread. Timer and sensor callbacks hold only a weak
//! reference, so dropping the session tears the round down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::consts::TICK_INTERVAL_MS;
use crate::feedback::Feedback;
use crate::gesture::{GestureConfig, GestureRecognizer, OrientationSource, RecognizerHandle, ScreenAngle};
use crate::input::{Button, InputAdapter};
use crate::platform::{Ticker, TimerHandle, WakeLockGuard, WakeLockProvider};

use super::controller::{RoundController, RoundEffect, TimerToken};
use super::state::{Action, RoundConfig, RoundPhase, RoundResult, RoundSnapshot};

/// Platform collaborators a round needs
#[derive(Clone)]
pub struct Services {
    pub ticker: Rc<dyn Ticker>,
    pub orientation: Rc<dyn OrientationSource>,
    pub screen: Rc<dyn ScreenAngle>,
    pub wake_lock: Rc<dyn WakeLockProvider>,
    pub feedback: Rc<dyn Feedback>,
}

type ResultSink = Box<dyn FnOnce(RoundResult)>;
type SnapshotSink = Box<dyn FnMut(&RoundSnapshot)>;

struct SessionState {
    controller: RoundController,
    timer: Option<(TimerToken, TimerHandle)>,
    recognizer: Option<RecognizerHandle>,
    wake_lock: Option<Box<dyn WakeLockGuard>>,
    listening: bool,
    on_result: Option<ResultSink>,
    on_update: Option<SnapshotSink>,
}

impl Drop for SessionState {
    fn drop(&mut self) {
        if let Some(mut guard) = self.wake_lock.take() {
            guard.release();
        }
    }
}

struct Shared {
    services: Services,
    gesture: GestureConfig,
    state: RefCell<SessionState>,
}

/// One live round wired to its collaborators
pub struct RoundSession {
    shared: Rc<Shared>,
}

impl RoundSession {
    pub fn new(config: RoundConfig, gesture: GestureConfig, services: Services) -> Self {
        let state = SessionState {
            controller: RoundController::new(config),
            timer: None,
            recognizer: None,
            wake_lock: None,
            listening: false,
            on_result: None,
            on_update: None,
        };
        Self {
            shared: Rc::new(Shared {
                services,
                gesture,
                state: RefCell::new(state),
            }),
        }
    }

    /// Called once with the result when time runs out
    pub fn on_result(&self, sink: impl FnOnce(RoundResult) + 'static) {
        self.shared.state.borrow_mut().on_result = Some(Box::new(sink));
    }

    /// Called with a fresh snapshot after every transition
    pub fn on_update(&self, sink: impl FnMut(&RoundSnapshot) + 'static) {
        self.shared.state.borrow_mut().on_update = Some(Box::new(sink));
    }

    /// Start the countdown
    pub fn begin(&self) {
        dispatch(&self.shared, RoundController::begin);
    }

    /// Fallback input. Returns false when input is not being listened to.
    pub fn handle(&self, action: Action) -> bool {
        if !self.is_listening() {
            return false;
        }
        dispatch(&self.shared, |c| c.apply(action));
        true
    }

    /// Keyboard input; false when the key means nothing or input is closed
    pub fn press_key(&self, key: &str) -> bool {
        InputAdapter::action_for_key(key).is_some_and(|action| self.handle(action))
    }

    pub fn press_button(&self, button: Button) -> bool {
        self.handle(InputAdapter::action_for_button(button))
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        self.shared.state.borrow().controller.snapshot()
    }

    pub fn phase(&self) -> RoundPhase {
        self.shared.state.borrow().controller.phase()
    }

    pub fn is_listening(&self) -> bool {
        self.shared.state.borrow().listening
    }

    pub fn holds_wake_lock(&self) -> bool {
        self.shared.state.borrow().wake_lock.is_some()
    }

    pub fn correct(&self) -> Vec<String> {
        self.shared.state.borrow().controller.correct().to_vec()
    }

    pub fn passed(&self) -> Vec<String> {
        self.shared.state.borrow().controller.passed().to_vec()
    }
}

/// Run one controller step, then carry out its effects and publish
fn dispatch(shared: &Rc<Shared>, step: impl FnOnce(&mut RoundController) -> Vec<RoundEffect>) {
    let effects = step(&mut shared.state.borrow_mut().controller);
    for effect in effects {
        execute(shared, effect);
    }
    publish(shared);
}

fn execute(shared: &Rc<Shared>, effect: RoundEffect) {
    let services = &shared.services;
    match effect {
        RoundEffect::StartTimer(token) => {
            let weak: Weak<Shared> = Rc::downgrade(shared);
            let handle = services.ticker.every(
                TICK_INTERVAL_MS,
                Box::new(move || {
                    if let Some(shared) = weak.upgrade() {
                        dispatch(&shared, |c| c.tick(token));
                    }
                }),
            );
            let previous = shared.state.borrow_mut().timer.replace((token, handle));
            drop(previous);
        }
        RoundEffect::CancelTimer(token) => {
            let timer = {
                let mut state = shared.state.borrow_mut();
                match &state.timer {
                    Some((active, _)) if *active == token => state.timer.take(),
                    _ => None,
                }
            };
            if let Some((_, mut handle)) = timer {
                handle.cancel();
            }
        }
        RoundEffect::AcquireWakeLock => match services.wake_lock.acquire() {
            Ok(guard) => {
                log::info!("Wake lock acquired");
                let previous = shared.state.borrow_mut().wake_lock.replace(guard);
                if let Some(mut previous) = previous {
                    previous.release();
                }
            }
            Err(e) => log::warn!("Playing without wake lock: {e}"),
        },
        RoundEffect::ReleaseWakeLock => {
            let guard = shared.state.borrow_mut().wake_lock.take();
            if let Some(mut guard) = guard {
                guard.release();
                log::info!("Wake lock released");
            }
        }
        RoundEffect::StartListening => {
            let weak: Weak<Shared> = Rc::downgrade(shared);
            let handle = GestureRecognizer::start(
                shared.gesture,
                services.orientation.clone(),
                services.screen.clone(),
                move |event| {
                    let Some(action) = Action::from_direction(event.direction) else {
                        return;
                    };
                    if let Some(shared) = weak.upgrade() {
                        dispatch(&shared, |c| c.apply(action));
                    }
                },
            );
            let previous = {
                let mut state = shared.state.borrow_mut();
                state.listening = true;
                state.recognizer.replace(handle)
            };
            if let Some(previous) = previous {
                previous.stop();
            }
        }
        RoundEffect::StopListening => {
            let recognizer = {
                let mut state = shared.state.borrow_mut();
                state.listening = false;
                state.recognizer.take()
            };
            if let Some(recognizer) = recognizer {
                recognizer.stop();
            }
        }
        RoundEffect::Sound(effect) => services.feedback.sound(effect),
        RoundEffect::Haptic(haptic) => services.feedback.haptic(haptic),
        RoundEffect::Finished(result) => {
            let sink = shared.state.borrow_mut().on_result.take();
            match sink {
                Some(sink) => sink(result),
                None => log::warn!("Round finished with nobody listening for the result"),
            }
        }
    }
}

fn publish(shared: &Rc<Shared>) {
    let (snapshot, sink) = {
        let mut state = shared.state.borrow_mut();
        (state.controller.snapshot(), state.on_update.take())
    };
    if let Some(mut sink) = sink {
        sink(&snapshot);
        let mut state = shared.state.borrow_mut();
        if state.on_update.is_none() {
            state.on_update = Some(sink);
        }
    }
}
