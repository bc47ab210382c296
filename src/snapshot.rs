//! Read-only render snapshot
//!
//! Copied out of the game once per frame so the renderer (canvas drawing in
//! JS, or a log line natively) never touches simulation state.

use serde::Serialize;

use crate::sim::modifier::ActiveModifier;
use crate::sim::state::{EffectsSink, GamePhase, PowerUpKind};
use crate::sim::tick::Game;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbView {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub collected: bool,
    pub glow: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroneView {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    /// Renderer dims drones that cannot attack yet
    pub cooldown_ms: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerUpView {
    pub x: f32,
    pub y: f32,
    pub kind: PowerUpKind,
    pub size: f32,
    pub glow: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub on_ground: bool,
    pub invulnerable: bool,
    pub shield: bool,
    pub speed_boost: bool,
    pub high_jump_charges: u32,
}

/// Everything the HUD shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudView {
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub max_level: u32,
    pub time_remaining_ms: f32,
    pub transition_ms: f32,
    pub phase: GamePhase,
    pub paused: bool,
    pub modifier: ActiveModifier,
    pub modifier_banner: Option<&'static str>,
    pub drone_count: usize,
    pub drone_speed: f32,
    pub active_power_ups: Vec<String>,
    pub difficulty: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSnapshot {
    pub platforms: Vec<PlatformView>,
    /// Every orb of the level; collected ones are drawn as empty sockets
    pub orbs: Vec<OrbView>,
    pub drones: Vec<DroneView>,
    /// Uncollected power-ups only
    pub power_ups: Vec<PowerUpView>,
    pub player: PlayerView,
    pub hud: HudView,
}

impl RenderSnapshot {
    pub fn capture<S: EffectsSink>(game: &Game<S>) -> Self {
        let level = game.level();
        let player = game.player();
        let profile = game.profile();

        let platforms = level
            .platforms
            .iter()
            .map(|p| PlatformView {
                x: p.rect.x,
                y: p.rect.y,
                width: p.rect.width,
                height: p.rect.height,
                visible: p.visible,
            })
            .collect();

        let orbs = level
            .orbs
            .iter()
            .map(|o| OrbView {
                x: o.pos.x,
                y: o.pos.y,
                radius: o.radius,
                collected: o.collected,
                glow: o.glow_phase.sin(),
            })
            .collect();

        let drones = level
            .drones
            .iter()
            .map(|d| DroneView {
                x: d.pos.x,
                y: d.pos.y,
                size: d.size,
                cooldown_ms: d.attack_cooldown.max(0.0),
            })
            .collect();

        let power_ups = level
            .power_ups
            .remaining()
            .map(|p| PowerUpView {
                x: p.pos.x,
                y: p.pos.y,
                kind: p.kind,
                size: p.size,
                glow: p.glow_phase.sin(),
            })
            .collect();

        Self {
            platforms,
            orbs,
            drones,
            power_ups,
            player: PlayerView {
                x: player.pos.x,
                y: player.pos.y,
                width: player.size.x,
                height: player.size.y,
                on_ground: player.on_ground,
                invulnerable: player.is_invulnerable(),
                shield: player.shield_active(),
                speed_boost: player.speed_boost_active(),
                high_jump_charges: player.high_jump_charges,
            },
            hud: HudView {
                score: game.score(),
                lives: game.lives(),
                level: game.level_index(),
                max_level: game.max_level(),
                time_remaining_ms: game.time_remaining_ms().max(0.0),
                transition_ms: game.transition_remaining_ms(),
                phase: game.phase(),
                paused: game.is_paused(),
                modifier: game.active_modifier(),
                modifier_banner: game.active_modifier().banner(),
                drone_count: level.drone_count(),
                drone_speed: level.drone_speed(),
                active_power_ups: player.active_power_ups(),
                difficulty: profile.display_name.clone(),
                color: profile.color.clone(),
            },
        }
    }

    /// Whole seconds left on the clock, rounded up (HUD display)
    pub fn seconds_remaining(&self) -> u32 {
        (self.hud.time_remaining_ms / 1000.0).ceil() as u32
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
