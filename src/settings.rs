//! Player preferences
//!
//! Persisted separately from scores in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_DURATION_SEC, DURATION_STEP_SEC, MAX_DURATION_SEC, MIN_DURATION_SEC};
use crate::deck::DeckId;
use crate::error::{ConfigError, validate_duration};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Round length in seconds
    pub duration_sec: u32,
    /// Deck for the next round
    pub deck: DeckId,
    /// Silence sound cues (haptics still play)
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_sec: DEFAULT_DURATION_SEC,
            deck: DeckId::default(),
            muted: false,
        }
    }
}

impl Settings {
    /// Every selectable round length
    pub fn duration_options() -> impl Iterator<Item = u32> {
        (MIN_DURATION_SEC..=MAX_DURATION_SEC).step_by(DURATION_STEP_SEC as usize)
    }

    pub fn set_duration(&mut self, duration_sec: u32) -> Result<(), ConfigError> {
        self.duration_sec = validate_duration(duration_sec)?;
        Ok(())
    }

    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Replace anything a stored blob got wrong with its default
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn sanitized(mut self) -> Self {
        if validate_duration(self.duration_sec).is_err() {
            log::warn!("Stored duration {}s is invalid, using default", self.duration_sec);
            self.duration_sec = DEFAULT_DURATION_SEC;
        }
        self
    }

    /// LocalStorage key
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    const STORAGE_KEY: &'static str = "tilt_words_settings";

    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn from_json(json: &str) -> Option<Self> {
        serde_json::from_str::<Self>(json).ok().map(Self::sanitized)
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
                log::warn!("Stored settings unreadable, using defaults");
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.duration_sec, 60);
        assert_eq!(s.deck, DeckId::Animals);
        assert!(!s.muted);
    }

    #[test]
    fn duration_options_step_by_fifteen() {
        let options: Vec<u32> = Settings::duration_options().collect();
        assert_eq!(options, vec![45, 60, 75, 90, 105, 120, 135, 150, 165, 180]);
    }

    #[test]
    fn set_duration_validates() {
        let mut s = Settings::default();
        assert!(s.set_duration(90).is_ok());
        assert_eq!(s.duration_sec, 90);
        assert!(s.set_duration(50).is_err());
        assert!(s.set_duration(30).is_err());
        assert_eq!(s.duration_sec, 90);
    }

    #[test]
    fn stored_json_is_sanitized() {
        let s = Settings::from_json(r#"{"duration_sec":999,"deck":"actions","muted":true}"#).unwrap();
        assert_eq!(s.duration_sec, 60);
        assert_eq!(s.deck, DeckId::Actions);
        assert!(s.muted);

        let partial = Settings::from_json(r#"{"muted":true}"#).unwrap();
        assert_eq!(partial.duration_sec, 60);
        assert!(partial.muted);

        assert!(Settings::from_json("not json").is_none());
    }
}
