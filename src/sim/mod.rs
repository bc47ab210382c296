//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio or network dependencies (effects go through `EffectsSink`)

pub mod collision;
pub mod layout;
pub mod level;
pub mod modifier;
pub mod player;
pub mod powerups;
pub mod state;
pub mod tick;

pub use collision::{aabb_overlap, lands_on, within_reach};
pub use level::Level;
pub use modifier::{ActiveModifier, Modifier};
pub use player::{JumpKind, Player};
pub use powerups::PowerUpManager;
pub use state::{
    Drone, EffectsSink, EventLog, GameEvent, GamePhase, Orb, Platform, PowerUp, PowerUpKind, Rect,
};
pub use tick::{Game, TickInput};
