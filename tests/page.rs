use tilt_words::input::Button;

const PAGE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/index.html"));

/// Ids the browser binary looks up
const WIRED_IDS: &[&str] = &[
    "loading",
    "home-screen",
    "game-screen",
    "results-screen",
    "deck-btn",
    "duration-btn",
    "mute-btn",
    "start-btn",
    "best-score",
    "last-score",
    "countdown",
    "word",
    "score",
    "timer",
    "rotate-hint",
    "final-score",
    "result-correct",
    "result-passed",
    "accuracy",
    "best-rank",
    "play-again-btn",
    "home-btn",
];

fn has_id(id: &str) -> bool {
    PAGE.contains(&format!("id=\"{id}\""))
}

#[test]
fn page_carries_every_wired_id() {
    let missing: Vec<_> = WIRED_IDS.iter().filter(|id| !has_id(id)).collect();
    assert!(missing.is_empty(), "missing ids: {missing:?}");
}

#[test]
fn page_carries_answer_buttons() {
    for button in [Button::Correct, Button::Pass] {
        assert!(has_id(button.element_id()), "{}", button.element_id());
    }
}

#[test]
fn page_loads_the_binary_through_trunk() {
    assert!(PAGE.contains(r#"data-trunk rel="rust" data-bin="tilt-words""#));
    assert!(PAGE.contains(".hidden"));
    assert!(PAGE.contains(".urgent"));
}
