//! Deterministic in-memory platform
//!
//! Time only moves when `ManualTicker::advance_ms` is called and samples
//! only arrive when pushed, so whole rounds can be replayed exactly.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::{Ticker, TimerHandle, WakeLockGuard, WakeLockProvider};
use crate::error::WakeLockError;
use crate::feedback::{Feedback, Haptic, SoundEffect};
use crate::gesture::{OrientationSource, RawOrientation, SampleListener, ScreenAngle, SubscriptionId};

type SharedCallback = Rc<RefCell<Box<dyn FnMut()>>>;

struct Timer {
    interval_ms: u32,
    next_due_ms: u64,
    callback: SharedCallback,
}

#[derive(Default)]
struct TickerState {
    now_ms: u64,
    next_id: u64,
    timers: BTreeMap<u64, Timer>,
}

/// Ticker driven by explicit time advancement
#[derive(Clone, Default)]
pub struct ManualTicker {
    state: Rc<RefCell<TickerState>>,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.state.borrow().now_ms
    }

    pub fn active_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn advance_seconds(&self, seconds: u32) {
        self.advance_ms(u64::from(seconds) * 1000);
    }

    /// Move time forward, firing every due callback in deadline order.
    ///
    /// Callbacks may schedule or cancel timers; a cancelled timer never
    /// fires again, even later in the same advance.
    pub fn advance_ms(&self, ms: u64) {
        let target = self.state.borrow().now_ms + ms;
        loop {
            let due = {
                let mut state = self.state.borrow_mut();
                let next = state
                    .timers
                    .iter()
                    .filter(|(_, t)| t.next_due_ms <= target)
                    .min_by_key(|(id, t)| (t.next_due_ms, **id))
                    .map(|(id, _)| *id);
                next.and_then(|id| {
                    let timer = state.timers.get_mut(&id)?;
                    let due_ms = timer.next_due_ms;
                    timer.next_due_ms += u64::from(timer.interval_ms.max(1));
                    let callback = timer.callback.clone();
                    state.now_ms = due_ms;
                    Some(callback)
                })
            };
            let Some(callback) = due else { break };
            (&mut **callback.borrow_mut())();
        }
        self.state.borrow_mut().now_ms = target;
    }
}

impl Ticker for ManualTicker {
    fn every(&self, interval_ms: u32, callback: Box<dyn FnMut()>) -> TimerHandle {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = state.next_id;
            state.next_id += 1;
            let next_due_ms = state.now_ms + u64::from(interval_ms.max(1));
            state.timers.insert(
                id,
                Timer {
                    interval_ms,
                    next_due_ms,
                    callback: Rc::new(RefCell::new(callback)),
                },
            );
            id
        };
        let weak: Weak<RefCell<TickerState>> = Rc::downgrade(&self.state);
        TimerHandle::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().timers.remove(&id);
            }
        })
    }
}

/// Orientation source fed by hand
#[derive(Default)]
pub struct MemoryOrientation {
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, Rc<RefCell<SampleListener>>>>,
}

impl MemoryOrientation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver one reading to every current listener
    pub fn push(&self, raw: RawOrientation) {
        let snapshot: Vec<(u64, Rc<RefCell<SampleListener>>)> = self
            .listeners
            .borrow()
            .iter()
            .map(|(id, l)| (*id, l.clone()))
            .collect();
        for (id, listener) in snapshot {
            // Skip listeners removed by an earlier listener in this delivery
            if !self.listeners.borrow().contains_key(&id) {
                continue;
            }
            (&mut **listener.borrow_mut())(raw);
        }
    }

    pub fn push_angles(&self, beta: f64, gamma: f64) {
        self.push(RawOrientation::new(beta, gamma));
    }

    /// Push `count` identical readings
    pub fn hold(&self, beta: f64, gamma: f64, count: usize) {
        for _ in 0..count {
            self.push_angles(beta, gamma);
        }
    }
}

impl OrientationSource for MemoryOrientation {
    fn subscribe(&self, listener: SampleListener) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(listener)));
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().remove(&id.0);
    }
}

/// Screen rotation that only changes when told to
#[derive(Debug, Default)]
pub struct FixedScreen {
    angle: Cell<Option<u16>>,
}

impl FixedScreen {
    pub fn new(angle: Option<u16>) -> Self {
        Self {
            angle: Cell::new(angle),
        }
    }

    pub fn portrait() -> Self {
        Self::new(Some(0))
    }

    pub fn landscape() -> Self {
        Self::new(Some(90))
    }

    pub fn set(&self, angle: Option<u16>) {
        self.angle.set(angle);
    }
}

impl ScreenAngle for FixedScreen {
    fn angle(&self) -> Option<u16> {
        self.angle.get()
    }
}

#[derive(Debug, Default)]
struct WakeLockCounters {
    acquired: Cell<u32>,
    released: Cell<u32>,
}

/// Wake lock that just counts
#[derive(Debug, Clone)]
pub struct MemoryWakeLock {
    supported: bool,
    counters: Rc<WakeLockCounters>,
}

impl Default for MemoryWakeLock {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryWakeLock {
    pub fn new() -> Self {
        Self {
            supported: true,
            counters: Rc::default(),
        }
    }

    /// A provider whose every request fails
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new()
        }
    }

    pub fn acquired(&self) -> u32 {
        self.counters.acquired.get()
    }

    pub fn released(&self) -> u32 {
        self.counters.released.get()
    }

    pub fn is_held(&self) -> bool {
        self.acquired() > self.released()
    }
}

struct MemoryWakeLockGuard {
    counters: Rc<WakeLockCounters>,
    held: bool,
}

impl WakeLockGuard for MemoryWakeLockGuard {
    fn release(&mut self) {
        if std::mem::take(&mut self.held) {
            self.counters.released.set(self.counters.released.get() + 1);
        }
    }
}

impl WakeLockProvider for MemoryWakeLock {
    fn acquire(&self) -> Result<Box<dyn WakeLockGuard>, WakeLockError> {
        if !self.supported {
            return Err(WakeLockError::Unsupported);
        }
        self.counters.acquired.set(self.counters.acquired.get() + 1);
        Ok(Box::new(MemoryWakeLockGuard {
            counters: self.counters.clone(),
            held: true,
        }))
    }
}

/// Everything a recording feedback sink was asked to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    Sound(SoundEffect),
    Haptic(Haptic),
}

/// Feedback sink that remembers what it played
#[derive(Debug, Default)]
pub struct RecordingFeedback {
    muted: bool,
    events: RefCell<Vec<FeedbackEvent>>,
}

impl RecordingFeedback {
    pub fn new(muted: bool) -> Self {
        Self {
            muted,
            events: RefCell::default(),
        }
    }

    pub fn events(&self) -> Vec<FeedbackEvent> {
        self.events.borrow().clone()
    }

    pub fn sounds(&self) -> Vec<SoundEffect> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                FeedbackEvent::Sound(s) => Some(*s),
                FeedbackEvent::Haptic(_) => None,
            })
            .collect()
    }

    pub fn haptics(&self) -> Vec<Haptic> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                FeedbackEvent::Haptic(h) => Some(*h),
                FeedbackEvent::Sound(_) => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl Feedback for RecordingFeedback {
    fn sound(&self, effect: SoundEffect) {
        if !self.muted {
            self.events.borrow_mut().push(FeedbackEvent::Sound(effect));
        }
    }

    fn haptic(&self, haptic: Haptic) {
        self.events.borrow_mut().push(FeedbackEvent::Haptic(haptic));
    }
}
