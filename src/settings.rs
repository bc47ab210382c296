//! Game settings and configuration
//!
//! `Settings` are user preferences persisted in LocalStorage. `GameConfig` is
//! the resolved, validated configuration handed to the orchestrator.

use serde::{Deserialize, Serialize};

use crate::difficulty::{DifficultyProfile, DifficultyTable};
use crate::error::ConfigError;
use crate::sim::layout;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected difficulty profile name
    pub difficulty: String,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Narrative feed ===
    /// Ask the Overseer for narrative/modifiers while playing
    pub narrative_feed: bool,
    /// Endpoint path; empty means use the offline narrator
    pub feed_endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: "medium".into(),

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            narrative_feed: true,
            feed_endpoint: "/api/generate-narrative".into(),
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "orb_escape_settings";

    /// Parse stored settings; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::InvalidSettings)
    }

    /// Effective sound effect gain (0 when muted, or unfocused with `mute_on_blur`)
    pub fn effective_volume(&self, focused: bool) -> f32 {
        if self.muted || (self.mute_on_blur && !focused) {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Whether the offline narrator should stand in for the endpoint
    pub fn offline_feed(&self) -> bool {
        self.feed_endpoint.trim().is_empty()
    }

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("{}", e),
                }
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
        log::debug!("No settings store ({}), using defaults", Self::STORAGE_KEY);
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

/// Everything the orchestrator needs at construction
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub profile: DifficultyProfile,
    /// Last stage; clearing it is a victory
    pub max_level: u32,
    /// Seed for every random draw in a run
    pub seed: u64,
}

impl GameConfig {
    /// Resolve a difficulty by name. Unknown names are an error.
    pub fn new(table: &DifficultyTable, difficulty: &str, seed: u64) -> Result<Self, ConfigError> {
        let profile = table.get(difficulty)?.clone();
        Ok(Self {
            profile,
            max_level: layout::stage_count(),
            seed,
        })
    }

    pub fn from_settings(
        table: &DifficultyTable,
        settings: &Settings,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        Self::new(table, &settings.difficulty, seed)
    }

    /// Shorter runs; clamped to the available stages
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level.clamp(1, layout::stage_count());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let settings = Settings::from_json(r#"{"difficulty":"hard","muted":true}"#).unwrap();
        assert_eq!(settings.difficulty, "hard");
        assert!(settings.muted);
        assert_eq!(settings.master_volume, 0.8);
        assert_eq!(settings.effective_volume(true), 0.0);
    }

    #[test]
    fn test_mute_on_blur() {
        let settings = Settings::default();
        assert!((settings.effective_volume(true) - 0.8).abs() < 1e-6);
        assert_eq!(settings.effective_volume(false), 0.0);

        let settings = Settings {
            mute_on_blur: false,
            ..Settings::default()
        };
        assert!((settings.effective_volume(false) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_offline_feed_when_endpoint_blank() {
        assert!(!Settings::default().offline_feed());
        let settings = Settings::from_json(r#"{"feed_endpoint":"  "}"#).unwrap();
        assert!(settings.offline_feed());
    }

    #[test]
    fn test_bad_json_is_config_error() {
        assert!(matches!(
            Settings::from_json("not json"),
            Err(ConfigError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_config_from_settings() {
        let table = DifficultyTable::builtin();
        let config = GameConfig::from_settings(&table, &Settings::default(), 7).unwrap();
        assert_eq!(config.profile.name, "medium");
        assert_eq!(config.max_level, 3);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_unknown_difficulty_fails_construction() {
        let table = DifficultyTable::builtin();
        let settings = Settings {
            difficulty: "impossible".into(),
            ..Settings::default()
        };
        assert!(matches!(
            GameConfig::from_settings(&table, &settings, 0),
            Err(ConfigError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn test_max_level_is_clamped() {
        let table = DifficultyTable::builtin();
        let config = GameConfig::new(&table, "beginner", 0).unwrap();
        assert_eq!(config.clone().with_max_level(0).max_level, 1);
        assert_eq!(config.with_max_level(10).max_level, 3);
    }
}
