//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Repeating one-second timers
//! - Orientation sensor and screen rotation
//! - Screen wake lock
//! - Sound and vibration output
//!
//! `memory` is deterministic and drives the native build and the tests;
//! `web` talks to the browser.

pub mod memory;
#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::error::WakeLockError;

/// Schedules repeating callbacks
pub trait Ticker {
    /// Call `callback` every `interval_ms` until the handle is cancelled
    fn every(&self, interval_ms: u32, callback: Box<dyn FnMut()>) -> TimerHandle;
}

/// Cancels its timer once, on `cancel()` or drop
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }

    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Keeps the screen from sleeping during play
pub trait WakeLockProvider {
    fn acquire(&self) -> Result<Box<dyn WakeLockGuard>, WakeLockError>;
}

/// A held wake lock
pub trait WakeLockGuard {
    /// Release the lock and any listeners it owns; idempotent
    fn release(&mut self);
}
