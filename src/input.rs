//! Fallback input: keyboard and on-screen buttons
//!
//! These are already discrete events, so each press maps to exactly one
//! action with no debouncing.

use crate::round::Action;

/// On-screen answer buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Correct,
    Pass,
}

impl Button {
    pub fn action(&self) -> Action {
        match self {
            Button::Correct => Action::MarkCorrect,
            Button::Pass => Action::MarkPass,
        }
    }

    /// DOM id of the button in the game page
    pub fn element_id(&self) -> &'static str {
        match self {
            Button::Correct => "correct-btn",
            Button::Pass => "pass-btn",
        }
    }
}

/// Maps raw UI input onto round actions
#[derive(Debug, Clone, Copy, Default)]
pub struct InputAdapter;

impl InputAdapter {
    /// Action for a `KeyboardEvent.key` value
    pub fn action_for_key(key: &str) -> Option<Action> {
        match key {
            "ArrowUp" => Some(Action::MarkCorrect),
            "ArrowDown" => Some(Action::MarkPass),
            _ => None,
        }
    }

    pub fn action_for_button(button: Button) -> Action {
        button.action()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrow_keys() {
        assert_eq!(InputAdapter::action_for_key("ArrowUp"), Some(Action::MarkCorrect));
        assert_eq!(InputAdapter::action_for_key("ArrowDown"), Some(Action::MarkPass));
        assert_eq!(InputAdapter::action_for_key("ArrowLeft"), None);
        assert_eq!(InputAdapter::action_for_key(" "), None);
    }

    #[test]
    fn buttons() {
        assert_eq!(InputAdapter::action_for_button(Button::Correct), Action::MarkCorrect);
        assert_eq!(InputAdapter::action_for_button(Button::Pass), Action::MarkPass);
    }
}
