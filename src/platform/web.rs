//! Browser collaborators
//!
//! DeviceOrientation events, screen rotation, `setInterval`, the Screen Wake
//! Lock API and `navigator.vibrate`.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::Future;
use std::rc::Rc;

use js_sys::{Array, Function, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{DeviceOrientationEvent, Document, VisibilityState};

use super::{Ticker, TimerHandle, WakeLockGuard, WakeLockProvider};
use crate::audio::AudioManager;
use crate::error::WakeLockError;
use crate::feedback::{Feedback, Haptic, SoundEffect};
use crate::gesture::{MotionPermission, OrientationSource, RawOrientation, SampleListener, ScreenAngle, SubscriptionId};

/// Drop a closure on a later turn of the event loop; JS may still be inside it
fn drop_later<T: 'static>(value: T) {
    spawn_local(async move { drop(value) });
}

fn describe(err: &JsValue) -> String {
    err.dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

type OrientationClosure = Closure<dyn FnMut(DeviceOrientationEvent)>;

/// `deviceorientation` events on the window
#[derive(Default)]
pub struct WebOrientation {
    next_id: Cell<u64>,
    listeners: RefCell<BTreeMap<u64, OrientationClosure>>,
}

impl WebOrientation {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrientationSource for WebOrientation {
    fn subscribe(&self, mut listener: SampleListener) -> SubscriptionId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let closure = Closure::<dyn FnMut(_)>::new(move |event: DeviceOrientationEvent| {
            listener(RawOrientation {
                beta: event.beta(),
                gamma: event.gamma(),
            });
        });
        if let Some(window) = web_sys::window() {
            let _ = window.add_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
        }
        self.listeners.borrow_mut().insert(id, closure);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        let Some(closure) = self.listeners.borrow_mut().remove(&id.0) else {
            return;
        };
        if let Some(window) = web_sys::window() {
            let _ = window.remove_event_listener_with_callback(
                "deviceorientation",
                closure.as_ref().unchecked_ref(),
            );
        }
        drop_later(closure);
    }
}

/// Call `requestPermission()` on the first sensor event class that has it
fn motion_permission_promise() -> Option<Result<Promise, JsValue>> {
    let window = web_sys::window()?;
    ["DeviceOrientationEvent", "DeviceMotionEvent"]
        .iter()
        .find_map(|class| {
            let ctor = Reflect::get(&window, &JsValue::from_str(class)).ok()?;
            let request = Reflect::get(&ctor, &JsValue::from_str("requestPermission"))
                .ok()?
                .dyn_into::<Function>()
                .ok()?;
            Some((ctor, request))
        })
        .map(|(ctor, request)| request.call0(&ctor).and_then(|p| p.dyn_into::<Promise>()))
}

/// Ask for motion-sensor access (iOS 13+).
///
/// The request is made immediately, so call this from inside a click or tap
/// handler; only the answer is awaited.
pub fn request_motion_permission() -> impl Future<Output = MotionPermission> {
    let pending = motion_permission_promise();
    async move {
        match pending {
            None => MotionPermission::NotRequired,
            Some(Err(e)) => {
                log::warn!("Motion permission request failed: {}", describe(&e));
                MotionPermission::Denied
            }
            Some(Ok(promise)) => match JsFuture::from(promise).await {
                Ok(state) => MotionPermission::from_state(state.as_string().as_deref()),
                Err(e) => {
                    log::warn!("Motion permission request failed: {}", describe(&e));
                    MotionPermission::Denied
                }
            },
        }
    }
}

/// `screen.orientation.angle`
#[derive(Debug, Clone, Copy, Default)]
pub struct WebScreen;

impl ScreenAngle for WebScreen {
    fn angle(&self) -> Option<u16> {
        web_sys::window()?.screen().ok()?.orientation().angle().ok()
    }
}

/// `setInterval` based ticker
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalTicker;

impl Ticker for IntervalTicker {
    fn every(&self, interval_ms: u32, mut callback: Box<dyn FnMut()>) -> TimerHandle {
        let closure = Closure::<dyn FnMut()>::new(move || callback());
        let Some(window) = web_sys::window() else {
            log::warn!("No window; timer never fires");
            return TimerHandle::new(move || drop(closure));
        };
        let id = match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            interval_ms as i32,
        ) {
            Ok(id) => id,
            Err(e) => {
                log::warn!("setInterval failed: {}", describe(&e));
                return TimerHandle::new(move || drop(closure));
            }
        };
        TimerHandle::new(move || {
            window.clear_interval_with_handle(id);
            drop_later(closure);
        })
    }
}

fn wake_lock_api() -> Option<JsValue> {
    let navigator = web_sys::window()?.navigator();
    let api = Reflect::get(&navigator, &JsValue::from_str("wakeLock")).ok()?;
    (!api.is_undefined() && !api.is_null()).then_some(api)
}

fn release_sentinel(sentinel: &JsValue) {
    let release = Reflect::get(sentinel, &JsValue::from_str("release"))
        .and_then(|f| f.dyn_into::<Function>());
    if let Ok(release) = release {
        let _ = release.call0(sentinel);
    }
}

#[derive(Default)]
struct LockState {
    sentinel: Option<JsValue>,
    released: bool,
}

/// Ask for a screen lock; the sentinel lands in `state` when the promise resolves
fn request_screen_lock(state: &Rc<RefCell<LockState>>) -> Result<(), WakeLockError> {
    let api = wake_lock_api().ok_or(WakeLockError::Unsupported)?;
    let request = Reflect::get(&api, &JsValue::from_str("request"))
        .and_then(|f| f.dyn_into::<Function>())
        .map_err(|_| WakeLockError::Unsupported)?;
    let promise: Promise = request
        .call1(&api, &JsValue::from_str("screen"))
        .map_err(|e| WakeLockError::Rejected(describe(&e)))?
        .dyn_into()
        .map_err(|_| WakeLockError::Rejected("request did not return a promise".into()))?;

    let state = state.clone();
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(sentinel) => {
                let mut state = state.borrow_mut();
                if state.released {
                    release_sentinel(&sentinel);
                } else if let Some(previous) = state.sentinel.replace(sentinel) {
                    release_sentinel(&previous);
                }
            }
            Err(e) => log::warn!("{}", WakeLockError::Rejected(describe(&e))),
        }
    });
    Ok(())
}

/// Screen Wake Lock API, re-acquired whenever the page becomes visible again
#[derive(Debug, Clone, Copy, Default)]
pub struct WebWakeLock;

struct WebWakeLockGuard {
    state: Rc<RefCell<LockState>>,
    document: Option<Document>,
    on_visible: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

impl WakeLockProvider for WebWakeLock {
    fn acquire(&self) -> Result<Box<dyn WakeLockGuard>, WakeLockError> {
        let state = Rc::new(RefCell::new(LockState::default()));
        request_screen_lock(&state)?;

        let document = web_sys::window().and_then(|w| w.document());
        let on_visible = document.as_ref().map(|document| {
            let state = state.clone();
            let doc = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if state.borrow().released || doc.visibility_state() != VisibilityState::Visible {
                    return;
                }
                match request_screen_lock(&state) {
                    Ok(()) => log::info!("Re-requesting wake lock (page visible)"),
                    Err(e) => log::warn!("Wake lock re-acquire failed: {e}"),
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure
        });

        Ok(Box::new(WebWakeLockGuard {
            state,
            document,
            on_visible,
        }))
    }
}

impl WakeLockGuard for WebWakeLockGuard {
    fn release(&mut self) {
        let sentinel = {
            let mut state = self.state.borrow_mut();
            if state.released {
                return;
            }
            state.released = true;
            state.sentinel.take()
        };
        if let (Some(document), Some(closure)) = (&self.document, self.on_visible.take()) {
            let _ = document.remove_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            drop_later(closure);
        }
        if let Some(sentinel) = sentinel {
            release_sentinel(&sentinel);
        }
    }
}

/// Vibrate with an on/off pattern; silently nothing where unsupported
pub fn vibrate(pattern_ms: &[u32]) {
    let Some(window) = web_sys::window() else { return };
    let navigator = window.navigator();
    let supported = Reflect::has(&navigator, &JsValue::from_str("vibrate")).unwrap_or(false);
    if !supported {
        return;
    }
    match pattern_ms {
        [single] => {
            navigator.vibrate_with_duration(*single);
        }
        pattern => {
            let array: Array = pattern.iter().map(|ms| JsValue::from(*ms)).collect();
            navigator.vibrate_with_pattern(&array);
        }
    }
}

/// WebAudio cues plus vibration
pub struct WebFeedback {
    audio: Rc<RefCell<AudioManager>>,
}

impl WebFeedback {
    pub fn new(audio: Rc<RefCell<AudioManager>>) -> Self {
        Self { audio }
    }
}

impl Feedback for WebFeedback {
    fn sound(&self, effect: SoundEffect) {
        self.audio.borrow().play(effect);
    }

    fn haptic(&self, haptic: Haptic) {
        vibrate(haptic.pattern_ms());
    }
}
