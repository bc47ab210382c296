//! Orb Escape - a browser platformer run by a hostile lab Overseer
//!
//! Core modules:
//! - `sim`: Simulation core (player physics, level systems, orchestrator)
//! - `difficulty`: Named difficulty profiles and scaling helpers
//! - `feed`: Narrative/modifier feed scheduling and fallbacks
//! - `platform`: Browser/native platform abstraction (input, time)
//! - `settings`: Persisted preferences and the game configuration object
//! - `snapshot`: Read-only per-frame view for an external renderer

pub mod difficulty;
pub mod error;
pub mod feed;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod snapshot;

pub use difficulty::{DifficultyProfile, DifficultyTable};
pub use error::{ConfigError, TransportError};
pub use settings::{GameConfig, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation step in milliseconds (physics is tuned per 60 Hz step)
    pub const SIM_DT_MS: f32 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World dimensions
    pub const WORLD_WIDTH: f32 = 800.0;
    pub const WORLD_HEIGHT: f32 = 600.0;
    /// Falling below this y costs a life
    pub const FALL_DEATH_Y: f32 = 600.0;

    /// Player spawn point (every level, every respawn)
    pub const SPAWN_X: f32 = 100.0;
    pub const SPAWN_Y: f32 = 400.0;

    /// Player body
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_SPEED: f32 = 5.0;
    pub const JUMP_POWER: f32 = 15.0;
    pub const DEFAULT_GRAVITY: f32 = 0.8;
    pub const LOW_GRAVITY: f32 = 0.3;
    /// Horizontal velocity retained per step
    pub const FRICTION: f32 = 0.8;
    pub const HIGH_JUMP_MULTIPLIER: f32 = 1.6;
    pub const SPEED_BOOST_MULTIPLIER: f32 = 1.5;
    pub const DOUBLE_TAP_WINDOW_MS: f64 = 300.0;

    /// Timers (ms)
    pub const INVULNERABILITY_MS: f32 = 3000.0;
    pub const SPEED_BOOST_MS: f32 = 8000.0;
    pub const SHIELD_MS: f32 = 15000.0;
    pub const LEVEL_TRANSITION_MS: f32 = 3000.0;
    pub const TIME_WARNING_MS: f32 = 15000.0;

    /// Per-level time budget: max(MIN, BASE - (level - 1) * STEP), before scaling
    pub const LEVEL_TIME_BASE_MS: f32 = 75000.0;
    pub const LEVEL_TIME_STEP_MS: f32 = 15000.0;
    pub const LEVEL_TIME_MIN_MS: f32 = 45000.0;

    /// Pickups
    pub const ORB_RADIUS: f32 = 10.0;
    pub const POWER_UP_SIZE: f32 = 16.0;
    /// Extra reach added to pickup radii (half the player size)
    pub const PICKUP_REACH: f32 = 16.0;

    /// Drones
    pub const DRONE_SIZE: f32 = 20.0;
    pub const DRONE_ATTACK_COOLDOWN_MS: f32 = 1500.0;
    /// Cooldown pinned on every drone while a level transition runs
    pub const DRONE_IDLE_COOLDOWN_MS: f32 = 2000.0;
    pub const DRONE_EDGE_MARGIN: f32 = 10.0;
    pub const DRONE_BOUNCE_DAMPING: f32 = 0.8;
    pub const DRONE_IDLE_DECAY: f32 = 0.9;
    /// Drones stop re-aiming once this close to their target
    pub const DRONE_LOCK_DISTANCE: f32 = 5.0;

    /// Narrative feed interval bounds (ms)
    pub const FEED_MIN_INTERVAL_MS: f32 = 10000.0;
    pub const FEED_TIER_STEP_MS: f32 = 3000.0;
}
