//! Difficulty profiles
//!
//! A profile is selected once per run and never mutated. All scaling helpers
//! are pure functions of `(base, profile)`.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Named bundle of scaling factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Lookup key ("beginner", "medium", ...)
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    /// Multiplier for level time limits
    pub time_multiplier: f32,
    /// Multiplier for drone pursuit speed
    pub drone_speed_multiplier: f32,
    /// Added to the base drone count (may be negative)
    pub drone_count_modifier: i32,
    /// Base interval between narrative feed requests
    pub ai_interference_interval_ms: f32,
    /// Scales disappearing-platform countdowns
    pub platform_disappear_speed: f32,
    /// Chance that each candidate power-up slot is filled (>= 1.0 always fills)
    pub power_up_spawn_rate: f32,
    /// Starting lives
    pub lives_count: u32,
    /// Theme color for the HUD and drones
    pub color: String,
    /// Adds one guaranteed power-up per level from level 2 on
    #[serde(default)]
    pub bonus_power_up: bool,
}

impl DifficultyProfile {
    pub fn beginner() -> Self {
        Self {
            name: "beginner".into(),
            display_name: "BEGINNER".into(),
            description: "Perfect for new test subjects".into(),
            time_multiplier: 1.5,
            drone_speed_multiplier: 0.7,
            drone_count_modifier: -1,
            ai_interference_interval_ms: 25000.0,
            platform_disappear_speed: 0.5,
            power_up_spawn_rate: 1.2,
            lives_count: 5,
            color: "#00ff00".into(),
            bonus_power_up: true,
        }
    }

    pub fn medium() -> Self {
        Self {
            name: "medium".into(),
            display_name: "MEDIUM".into(),
            description: "Standard containment protocols".into(),
            time_multiplier: 1.0,
            drone_speed_multiplier: 1.0,
            drone_count_modifier: 0,
            ai_interference_interval_ms: 15000.0,
            platform_disappear_speed: 1.0,
            power_up_spawn_rate: 1.0,
            lives_count: 3,
            color: "#ffff00".into(),
            bonus_power_up: false,
        }
    }

    pub fn hard() -> Self {
        Self {
            name: "hard".into(),
            display_name: "HARD".into(),
            description: "Maximum security protocols".into(),
            time_multiplier: 0.75,
            drone_speed_multiplier: 1.4,
            drone_count_modifier: 1,
            ai_interference_interval_ms: 10000.0,
            platform_disappear_speed: 1.5,
            power_up_spawn_rate: 0.8,
            lives_count: 2,
            color: "#ff0000".into(),
            bonus_power_up: false,
        }
    }

    pub fn grants_bonus_power_up(&self) -> bool {
        self.bonus_power_up
    }
}

/// Lookup table of all selectable profiles
#[derive(Debug, Clone)]
pub struct DifficultyTable {
    profiles: Vec<DifficultyProfile>,
}

impl Default for DifficultyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DifficultyTable {
    /// The three stock profiles
    pub fn builtin() -> Self {
        Self {
            profiles: vec![
                DifficultyProfile::beginner(),
                DifficultyProfile::medium(),
                DifficultyProfile::hard(),
            ],
        }
    }

    /// Load a custom table from a JSON array of profiles
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let profiles: Vec<DifficultyProfile> =
            serde_json::from_str(json).map_err(ConfigError::InvalidTable)?;
        if profiles.is_empty() {
            return Err(ConfigError::EmptyTable);
        }
        Ok(Self { profiles })
    }

    /// Look up a profile by name (case-insensitive). Never falls back to a default.
    pub fn get(&self, name: &str) -> Result<&DifficultyProfile, ConfigError> {
        let key = name.trim().to_lowercase();
        self.profiles
            .iter()
            .find(|p| p.name.to_lowercase() == key)
            .ok_or_else(|| ConfigError::UnknownDifficulty(name.to_string()))
    }

    pub fn all(&self) -> &[DifficultyProfile] {
        &self.profiles
    }
}

/// `floor(base * time_multiplier)`
pub fn scaled_time_limit(base_ms: f32, profile: &DifficultyProfile) -> f32 {
    (base_ms * profile.time_multiplier).floor()
}

/// `max(1, base + drone_count_modifier)`, saturating at `u32::MAX`
pub fn scaled_drone_count(base: u32, profile: &DifficultyProfile) -> u32 {
    let count = base as i64 + profile.drone_count_modifier as i64;
    count.clamp(1, u32::MAX as i64) as u32
}

/// `base * drone_speed_multiplier`
pub fn scaled_drone_speed(base: f32, profile: &DifficultyProfile) -> f32 {
    base * profile.drone_speed_multiplier
}

/// Countdown for a level (1-based): the base budget shrinks by a fixed step
/// per level down to a floor, then gets scaled by the profile.
pub fn level_time_limit(level: u32, profile: &DifficultyProfile) -> f32 {
    let steps = level.saturating_sub(1) as f32;
    let base = (LEVEL_TIME_BASE_MS - steps * LEVEL_TIME_STEP_MS).max(LEVEL_TIME_MIN_MS);
    scaled_time_limit(base, profile)
}

/// Interval between narrative requests at a given escalation tier (1-based)
pub fn feed_interval(profile: &DifficultyProfile, tier: u32) -> f32 {
    let steps = tier.saturating_sub(1) as f32;
    (profile.ai_interference_interval_ms - steps * FEED_TIER_STEP_MS).max(FEED_MIN_INTERVAL_MS)
}
