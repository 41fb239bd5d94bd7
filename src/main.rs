//! Tilt Words entry point
//!
//! Wires the browser page to a round session on wasm, and plays a scripted
//! round against the in-memory platform on native.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Document, KeyboardEvent, MouseEvent};

    use tilt_words::audio::AudioManager;
    use tilt_words::consts::MIN_DURATION_SEC;
    use tilt_words::gesture::ScreenAngle;
    use tilt_words::input::Button;
    use tilt_words::platform::web::{
        IntervalTicker, WebFeedback, WebOrientation, WebScreen, WebWakeLock, request_motion_permission,
    };
    use tilt_words::round::{RoundSnapshot, Services};
    use tilt_words::{
        DeckId, GestureConfig, RoundConfig, RoundPhase, RoundResult, RoundSession, ScoreBook, Settings,
        format_clock, is_landscape,
    };

    /// Everything that outlives a single round
    struct App {
        settings: Settings,
        scores: ScoreBook,
        audio: Rc<RefCell<AudioManager>>,
        session: Option<Rc<RoundSession>>,
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    /// Show one of the top-level screens
    fn show_screen(name: &str) {
        for screen in ["home", "game", "results"] {
            set_visible(&format!("{screen}-screen"), screen == name);
        }
    }

    fn render_settings(settings: &Settings) {
        set_text("deck-btn", settings.deck.display_name());
        set_text("duration-btn", &format_clock(settings.duration_sec));
        set_text("mute-btn", if settings.muted { "Sound: off" } else { "Sound: on" });
    }

    /// Rotated screen, or a window wider than it is tall
    fn page_is_landscape() -> bool {
        if is_landscape(WebScreen.angle()) {
            return true;
        }
        let Some(window) = web_sys::window() else { return false };
        let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        dim(window.inner_width()) > dim(window.inner_height())
    }

    fn render_snapshot(snapshot: &RoundSnapshot) {
        let counting = matches!(snapshot.phase, RoundPhase::Countdown(_));
        set_visible("countdown", counting);
        set_visible("word", !counting);
        set_visible("rotate-hint", snapshot.shows_rotate_hint(page_is_landscape()));

        if let Some(n) = snapshot.countdown {
            set_text("countdown", &n.to_string());
        }
        set_text("word", &snapshot.current_word);
        set_text("score", &snapshot.score.to_string());
        set_text("timer", &snapshot.clock_label);
        if let Some(el) = document().and_then(|d| d.get_element_by_id("timer")) {
            let _ = el.set_attribute("class", if snapshot.urgent { "urgent" } else { "" });
        }
    }

    fn render_result(result: &RoundResult, rank: Option<usize>) {
        set_text("final-score", &result.score().to_string());
        set_text("result-correct", &result.correct.join(", "));
        set_text("result-passed", &result.passed.join(", "));
        let accuracy = result
            .accuracy_percent()
            .map(|p| format!("{p}%"))
            .unwrap_or_else(|| "-".to_string());
        set_text("accuracy", &accuracy);
        let rank_text = rank.map(|r| format!("New best #{r}!")).unwrap_or_default();
        set_text("best-rank", &rank_text);
    }

    fn render_scores(scores: &ScoreBook) {
        let label = |score: Option<u32>| score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        set_text("best-score", &label(scores.top_score()));
        set_text("last-score", &label(scores.last_score()));
    }

    /// Start/play-again click. Audio and the sensor prompt need the user gesture,
    /// so both are kicked off here before anything is awaited.
    fn request_round(app: &Rc<RefCell<App>>) {
        app.borrow().audio.borrow().resume();
        let permission = request_motion_permission();
        let app = app.clone();
        spawn_local(async move {
            let permission = permission.await;
            if permission.sensors_available() {
                log::info!("Motion sensors: {permission:?}");
            } else {
                log::warn!("Motion permission denied; use the buttons or arrow keys");
            }
            start_round(&app);
        });
    }

    fn start_round(app: &Rc<RefCell<App>>) {
        let (config, audio) = {
            let a = app.borrow();
            let words = a.settings.deck.shuffled_words(&mut rand::rng());
            (
                RoundConfig::new(a.settings.duration_sec, words, a.settings.deck),
                a.audio.clone(),
            )
        };
        let config = match config {
            Ok(config) => config,
            Err(e) => {
                log::error!("Cannot start round: {e}");
                return;
            }
        };

        let services = Services {
            ticker: Rc::new(IntervalTicker),
            orientation: Rc::new(WebOrientation::new()),
            screen: Rc::new(WebScreen),
            wake_lock: Rc::new(WebWakeLock),
            feedback: Rc::new(WebFeedback::new(audio)),
        };
        let session = Rc::new(RoundSession::new(config, GestureConfig::default(), services));
        session.on_update(render_snapshot);
        let weak = Rc::downgrade(app);
        session.on_result(move |result| {
            if let Some(app) = weak.upgrade() {
                finish_round(&app, result);
            }
        });

        // Replacing the old session tears down anything it still held
        app.borrow_mut().session = Some(session.clone());
        show_screen("game");
        session.begin();
        log::info!("Round started");
    }

    fn finish_round(app: &Rc<RefCell<App>>, result: RoundResult) {
        let rank = {
            let mut a = app.borrow_mut();
            let rank = a.scores.record(&result, js_sys::Date::now());
            a.scores.save();
            render_scores(&a.scores);
            rank
        };
        log::info!(
            "Round over: {} correct, {} passed",
            result.correct.len(),
            result.passed.len()
        );
        render_result(&result, rank);
        show_screen("results");
    }

    fn current_session(app: &Rc<RefCell<App>>) -> Option<Rc<RoundSession>> {
        app.borrow().session.clone()
    }

    fn on_click(id: &str, mut handler: impl FnMut() + 'static) {
        let Some(el) = document().and_then(|d| d.get_element_by_id(id)) else {
            log::warn!("Missing #{id}");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler());
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_menu(app: &Rc<RefCell<App>>) {
        for id in ["start-btn", "play-again-btn"] {
            let app = app.clone();
            on_click(id, move || request_round(&app));
        }

        {
            let app = app.clone();
            on_click("home-btn", move || {
                app.borrow_mut().session = None;
                show_screen("home");
            });
        }

        {
            let app = app.clone();
            on_click("deck-btn", move || {
                let mut a = app.borrow_mut();
                let next = match a.settings.deck {
                    DeckId::Animals => DeckId::Actions,
                    DeckId::Actions => DeckId::Animals,
                };
                a.settings.deck = next;
                a.settings.save();
                render_settings(&a.settings);
            });
        }

        {
            let app = app.clone();
            on_click("duration-btn", move || {
                let mut a = app.borrow_mut();
                let current = a.settings.duration_sec;
                let next = Settings::duration_options()
                    .find(|d| *d > current)
                    .unwrap_or(MIN_DURATION_SEC);
                if let Err(e) = a.settings.set_duration(next) {
                    log::warn!("{e}");
                }
                a.settings.save();
                render_settings(&a.settings);
            });
        }

        {
            let app = app.clone();
            on_click("mute-btn", move || {
                let mut a = app.borrow_mut();
                let muted = a.settings.toggle_muted();
                a.audio.borrow_mut().set_muted(muted);
                a.settings.save();
                render_settings(&a.settings);
            });
        }
    }

    fn setup_round_input(app: &Rc<RefCell<App>>) {
        for button in [Button::Correct, Button::Pass] {
            let app = app.clone();
            on_click(button.element_id(), move || {
                if let Some(session) = current_session(&app) {
                    session.press_button(button);
                }
            });
        }

        let Some(document) = document() else { return };
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            if let Some(session) = current_session(&app) {
                if session.press_key(&event.key()) {
                    event.prevent_default();
                }
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }
        log::info!("Tilt Words starting...");

        let settings = Settings::load();
        let scores = ScoreBook::load();
        let audio = Rc::new(RefCell::new(AudioManager::new(settings.muted)));
        render_settings(&settings);
        render_scores(&scores);

        let app = Rc::new(RefCell::new(App {
            settings,
            scores,
            audio,
            session: None,
        }));

        setup_menu(&app);
        setup_round_input(&app);
        set_visible("loading", false);
        show_screen("home");

        log::info!("Tilt Words ready");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tilt Words (native) starting...");
    log::info!("Native mode plays a scripted round - run with `trunk serve` for the web version");

    demo::play_scripted_round();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::rc::Rc;

    use tilt_words::platform::memory::{FixedScreen, ManualTicker, MemoryOrientation, MemoryWakeLock, RecordingFeedback};
    use tilt_words::round::Services;
    use tilt_words::{GestureConfig, RoundConfig, RoundSession, ScoreBook, Settings};

    /// Resting pitch of a phone held to the forehead
    const REST_BETA: f64 = 80.0;

    pub fn play_scripted_round() {
        let settings = Settings::load();
        let seed = 2024;
        let words = settings.deck.shuffled_with_seed(seed);
        let config = match RoundConfig::new(settings.duration_sec, words, settings.deck) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Bad round config: {e}");
                return;
            }
        };

        let ticker = ManualTicker::new();
        let sensor = Rc::new(MemoryOrientation::new());
        let feedback = Rc::new(RecordingFeedback::new(settings.muted));
        let services = Services {
            ticker: Rc::new(ticker.clone()),
            orientation: sensor.clone(),
            screen: Rc::new(FixedScreen::portrait()),
            wake_lock: Rc::new(MemoryWakeLock::new()),
            feedback: feedback.clone(),
        };

        let session = RoundSession::new(config, GestureConfig::default(), services);
        let outcome = Rc::new(RefCell::new(None));
        let sink = outcome.clone();
        session.on_result(move |result| *sink.borrow_mut() = Some(result));
        session.on_update(|snap| log::debug!("{:?} {} [{}]", snap.phase, snap.current_word, snap.clock_label));

        session.begin();
        ticker.advance_seconds(3);
        sensor.hold(REST_BETA, 0.0, 10);

        // Every few seconds the player nods forward (correct) or back (pass)
        let mut second = 0;
        while session.is_listening() {
            second += 1;
            let tilt = if second % 7 == 0 { 40.0 } else { -40.0 };
            if second % 3 == 0 {
                sensor.hold(REST_BETA + tilt, 0.0, 3);
                sensor.hold(REST_BETA, 0.0, 3);
            }
            ticker.advance_seconds(1);
        }

        let Some(result) = outcome.borrow_mut().take() else {
            log::error!("Round ended without a result");
            return;
        };

        let mut scores = ScoreBook::load();
        let rank = scores.record(&result, ticker.now_ms() as f64);
        scores.save();

        println!("\nDeck: {} ({}s)", result.deck.display_name(), result.duration_sec);
        println!("Correct ({}): {}", result.correct.len(), result.correct.join(", "));
        println!("Passed ({}): {}", result.passed.len(), result.passed.join(", "));
        if let Some(accuracy) = result.accuracy_percent() {
            println!("Accuracy: {accuracy}%");
        }
        if let Some(rank) = rank {
            println!("Best-score rank: #{rank}");
        }
        println!("Cues played: {}", feedback.events().len());
    }
}
