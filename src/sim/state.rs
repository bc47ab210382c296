//! Entity records and core simulation types
//!
//! Plain state with per-step mutable fields. Behaviour that spans several
//! entities lives in `level` and `tick`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Axis-aligned rectangle (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// A static platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub visible: bool,
    /// Countdown until the next visibility flip (disappearing mode only)
    #[serde(default)]
    pub disappear_timer: Option<f32>,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            rect: Rect::new(x, y, width, height),
            visible: true,
            disappear_timer: None,
        }
    }
}

/// A collectible orb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orb {
    pub pos: Vec2,
    pub radius: f32,
    /// Once true, never reverts
    pub collected: bool,
    /// Animation accumulator (not gameplay-relevant)
    #[serde(skip)]
    pub glow_phase: f32,
}

impl Orb {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            radius: ORB_RADIUS,
            collected: false,
            glow_phase: 0.0,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    HighJump,
    SpeedBoost,
    Shield,
}

impl PowerUpKind {
    pub fn label(&self) -> &'static str {
        match self {
            PowerUpKind::HighJump => "HIGH JUMP",
            PowerUpKind::SpeedBoost => "SPEED BOOST",
            PowerUpKind::Shield => "SHIELD",
        }
    }
}

/// A power-up pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub pos: Vec2,
    pub kind: PowerUpKind,
    pub size: f32,
    /// Once true, never reverts
    pub collected: bool,
    #[serde(skip)]
    pub glow_phase: f32,
}

impl PowerUp {
    pub fn new(x: f32, y: f32, kind: PowerUpKind) -> Self {
        Self {
            pos: Vec2::new(x, y),
            kind,
            size: POWER_UP_SIZE,
            collected: false,
            glow_phase: 0.0,
        }
    }
}

/// A pursuing security drone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drone {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    /// Top-left position the drone is steering toward
    pub target: Vec2,
    /// Per-drone speed multiplier, grows with spawn order
    pub aggression: f32,
    /// Difficulty- and level-adjusted speed
    pub base_speed: f32,
    /// Contact damage is only dealt while this is <= 0
    pub attack_cooldown: f32,
}

impl Drone {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }

    /// Nominal pursuit speed
    pub fn pursuit_speed(&self) -> f32 {
        self.base_speed * self.aggression
    }

    /// One pursuit step toward the center of `player`
    pub fn pursue(&mut self, player: &Rect, dt: f32) {
        if self.attack_cooldown > 0.0 {
            self.attack_cooldown -= dt;
        }

        let half = Vec2::splat(self.size / 2.0);
        self.target = player.center() - half;

        let delta = self.target - self.pos;
        let distance = delta.length();
        // Velocity is assigned, not accumulated. Skipping near-zero distances
        // also keeps the normalisation away from a division by zero.
        if distance > DRONE_LOCK_DISTANCE {
            self.vel = delta / distance * self.pursuit_speed();
        }

        self.pos += self.vel;

        let max_x = WORLD_WIDTH - DRONE_EDGE_MARGIN - self.size;
        let max_y = WORLD_HEIGHT - DRONE_EDGE_MARGIN - self.size;
        if self.pos.x <= DRONE_EDGE_MARGIN || self.pos.x >= max_x {
            self.vel.x *= -DRONE_BOUNCE_DAMPING;
            self.pos.x = self.pos.x.clamp(DRONE_EDGE_MARGIN, max_x);
        }
        if self.pos.y <= DRONE_EDGE_MARGIN || self.pos.y >= max_y {
            self.vel.y *= -DRONE_BOUNCE_DAMPING;
            self.pos.y = self.pos.y.clamp(DRONE_EDGE_MARGIN, max_y);
        }

        let max_speed = self.pursuit_speed() * 1.5;
        let speed = self.vel.length();
        if speed > max_speed && speed > 0.0 {
            self.vel = self.vel / speed * max_speed;
        }
    }

    /// Drift to a halt with attacks suppressed (level transitions)
    pub fn idle(&mut self) {
        self.vel *= DRONE_IDLE_DECAY;
        self.attack_cooldown = DRONE_IDLE_COOLDOWN_MS;
    }
}

/// Orchestrator phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Level cleared, transition timer running
    LevelTransition,
    /// Out of lives; waits for restart
    GameOver,
    /// Final level cleared; waits for restart
    Victory,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::GameOver | GamePhase::Victory)
    }
}

/// Discrete notifications for audio/UI (fire-and-forget)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Jump,
    HighJump,
    OrbCollect { count: u32 },
    PowerUp { kind: PowerUpKind },
    DroneHit,
    DroneSpawn { count: u32 },
    LevelComplete { level: u32 },
    GameOver,
    Victory,
    TimeWarning,
}

/// Receives effects emitted by the orchestrator (sound, narrative text)
pub trait EffectsSink {
    fn event(&mut self, event: GameEvent);
    fn narrative(&mut self, text: &str);
}

/// Sink that records everything (tests, headless runs, per-frame drain on web)
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
    pub narratives: Vec<String>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far
    pub fn drain(&mut self) -> (Vec<GameEvent>, Vec<String>) {
        (
            std::mem::take(&mut self.events),
            std::mem::take(&mut self.narratives),
        )
    }
}

impl EffectsSink for EventLog {
    fn event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn narrative(&mut self, text: &str) {
        self.narratives.push(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drone_at(x: f32, y: f32) -> Drone {
        Drone {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size: DRONE_SIZE,
            target: Vec2::ZERO,
            aggression: 1.0,
            base_speed: 2.0,
            attack_cooldown: 0.0,
        }
    }

    #[test]
    fn test_drone_moves_at_pursuit_speed() {
        let mut drone = drone_at(400.0, 100.0);
        let player = Rect::new(400.0, 400.0, PLAYER_SIZE, PLAYER_SIZE);
        drone.pursue(&player, 16.0);
        assert!((drone.vel.length() - 2.0).abs() < 1e-4);
        assert!(drone.vel.y > 0.0);
        assert!(drone.pos.y > 100.0);
    }

    #[test]
    fn test_drone_on_target_does_not_divide_by_zero() {
        let player = Rect::new(390.0, 290.0, PLAYER_SIZE, PLAYER_SIZE);
        let center = player.center() - Vec2::splat(DRONE_SIZE / 2.0);
        let mut drone = drone_at(center.x, center.y);
        drone.pursue(&player, 16.0);
        assert!(drone.pos.is_finite());
        assert!(drone.vel.is_finite());
        assert_eq!(drone.vel, Vec2::ZERO);
    }

    #[test]
    fn test_drone_bounces_off_left_edge() {
        let mut drone = drone_at(11.0, 300.0);
        drone.vel = Vec2::new(-3.0, 0.0);
        // Target within lock distance, so the incoming velocity is kept
        let player = Rect::new(7.0, 294.0, PLAYER_SIZE, PLAYER_SIZE);
        drone.pursue(&player, 16.0);
        assert_eq!(drone.pos.x, DRONE_EDGE_MARGIN);
        assert!(drone.vel.x > 0.0);
    }

    #[test]
    fn test_drone_idle_decays_and_suppresses_attacks() {
        let mut drone = drone_at(100.0, 100.0);
        drone.vel = Vec2::new(10.0, 0.0);
        drone.idle();
        assert!((drone.vel.x - 9.0).abs() < 1e-5);
        assert_eq!(drone.attack_cooldown, DRONE_IDLE_COOLDOWN_MS);
    }

    #[test]
    fn test_event_log_drain() {
        let mut log = EventLog::new();
        log.event(GameEvent::Jump);
        log.narrative("hello");
        let (events, texts) = log.drain();
        assert_eq!(events, vec![GameEvent::Jump]);
        assert_eq!(texts, vec!["hello".to_string()]);
        assert!(log.events.is_empty());
    }
}
