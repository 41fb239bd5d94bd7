//! Sensor-side collaborators and the recognizer's subscription handle

use std::cell::Cell;
use std::rc::Rc;

use super::types::RawOrientation;

/// Listener registered with an orientation source
pub type SampleListener = Box<dyn FnMut(RawOrientation)>;

/// Opaque id returned by [`OrientationSource::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Push-based stream of device orientation readings.
///
/// Sources deliver on the caller's thread; a source that never delivers
/// (sensor missing or permission denied) is valid.
pub trait OrientationSource {
    fn subscribe(&self, listener: SampleListener) -> SubscriptionId;
    /// Remove a listener. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}

/// Outcome of asking the platform for motion-sensor access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPermission {
    Granted,
    Denied,
    /// The platform delivers orientation events without asking
    NotRequired,
}

impl MotionPermission {
    /// Map a permission state string (`"granted"`, `"denied"`, ...) as
    /// reported by the platform
    pub fn from_state(state: Option<&str>) -> Self {
        match state {
            Some("granted") => MotionPermission::Granted,
            _ => MotionPermission::Denied,
        }
    }

    /// Whether tilt input can be expected to arrive
    pub fn sensors_available(&self) -> bool {
        !matches!(self, MotionPermission::Denied)
    }
}

/// Synchronous screen rotation query (0, 90, 180, 270 or unknown)
pub trait ScreenAngle {
    fn angle(&self) -> Option<u16>;
}

/// Keeps a recognizer subscribed until stopped or dropped
pub struct RecognizerHandle {
    source: Rc<dyn OrientationSource>,
    subscription: Cell<Option<SubscriptionId>>,
    active: Rc<Cell<bool>>,
}

impl RecognizerHandle {
    pub(crate) fn new(
        source: Rc<dyn OrientationSource>,
        subscription: SubscriptionId,
        active: Rc<Cell<bool>>,
    ) -> Self {
        Self {
            source,
            subscription: Cell::new(Some(subscription)),
            active,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Unsubscribe from the source. Safe to call more than once; no events
    /// are delivered after the first call returns.
    pub fn stop(&self) {
        self.active.set(false);
        if let Some(id) = self.subscription.take() {
            self.source.unsubscribe(id);
            log::debug!("Tilt recognizer stopped");
        }
    }
}

impl Drop for RecognizerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
