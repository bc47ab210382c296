//! The player body
//!
//! Velocities are in pixels per simulation step; timers are in milliseconds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::lands_on;
use super::state::{Platform, PowerUpKind, Rect};
use crate::consts::*;

/// Which jump actually fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpKind {
    Normal,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub jump_power: f32,
    /// Overridden by the low-gravity modifier
    pub gravity: f32,
    pub on_ground: bool,
    pub lives: u32,
    pub invulnerable_ms: f32,
    pub high_jump_charges: u32,
    pub speed_boost_ms: f32,
    pub shield_ms: f32,
    /// Monotonic timestamp of the last jump that left the ground
    pub last_jump_at: Option<f64>,
}

impl Player {
    pub fn new(lives: u32) -> Self {
        Self {
            pos: Vec2::new(SPAWN_X, SPAWN_Y),
            vel: Vec2::ZERO,
            size: Vec2::splat(PLAYER_SIZE),
            speed: PLAYER_SPEED,
            jump_power: JUMP_POWER,
            gravity: DEFAULT_GRAVITY,
            on_ground: false,
            lives,
            invulnerable_ms: 0.0,
            high_jump_charges: 0,
            speed_boost_ms: 0.0,
            shield_ms: 0.0,
            last_jump_at: None,
        }
    }

    /// Full reset for a new run
    pub fn reset(&mut self, lives: u32) {
        *self = Self::new(lives);
    }

    /// Back to the spawn point at rest (level change, respawn)
    pub fn reset_position(&mut self) {
        self.pos = Vec2::new(SPAWN_X, SPAWN_Y);
        self.vel = Vec2::ZERO;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn is_dead(&self) -> bool {
        self.lives == 0
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    pub fn speed_boost_active(&self) -> bool {
        self.speed_boost_ms > 0.0
    }

    pub fn shield_active(&self) -> bool {
        self.shield_ms > 0.0
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.gravity = gravity;
    }

    fn run_speed(&self) -> f32 {
        if self.speed_boost_active() {
            self.speed * SPEED_BOOST_MULTIPLIER
        } else {
            self.speed
        }
    }

    /// Overwrites horizontal velocity; the last call in a step wins
    pub fn move_left(&mut self) {
        self.vel.x = -self.run_speed();
    }

    pub fn move_right(&mut self) {
        self.vel.x = self.run_speed();
    }

    /// Jump from the ground. A second jump within the double-tap window
    /// spends a high-jump charge for the amplified version.
    pub fn jump(&mut self, now_ms: f64) -> Option<JumpKind> {
        if !self.on_ground {
            return None;
        }

        let double_tap = self
            .last_jump_at
            .is_some_and(|last| now_ms - last < DOUBLE_TAP_WINDOW_MS);

        self.on_ground = false;
        self.last_jump_at = Some(now_ms);

        if double_tap && self.high_jump_charges > 0 {
            self.high_jump_charges -= 1;
            self.vel.y = -self.jump_power * HIGH_JUMP_MULTIPLIER;
            Some(JumpKind::High)
        } else {
            self.vel.y = -self.jump_power;
            Some(JumpKind::Normal)
        }
    }

    /// Dedicated high jump, independent of the double-tap timer
    pub fn high_jump(&mut self) -> bool {
        if !self.on_ground || self.high_jump_charges == 0 {
            return false;
        }
        self.high_jump_charges -= 1;
        self.vel.y = -self.jump_power * HIGH_JUMP_MULTIPLIER;
        self.on_ground = false;
        true
    }

    /// Returns true iff a life was actually lost
    pub fn take_damage(&mut self) -> bool {
        if self.is_invulnerable() || self.shield_active() {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        self.invulnerable_ms = INVULNERABILITY_MS;
        self.reset_position();
        true
    }

    /// Timed effects refresh rather than stack; charges stack without cap
    pub fn activate_power_up(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::HighJump => self.high_jump_charges += 1,
            PowerUpKind::SpeedBoost => self.speed_boost_ms = SPEED_BOOST_MS,
            PowerUpKind::Shield => self.shield_ms = SHIELD_MS,
        }
    }

    /// HUD labels for the active effects
    pub fn active_power_ups(&self) -> Vec<String> {
        let mut active = Vec::new();
        if self.high_jump_charges > 0 {
            active.push(format!("HIGH JUMP x{}", self.high_jump_charges));
        }
        if self.speed_boost_active() {
            active.push("SPEED BOOST".to_string());
        }
        if self.shield_active() {
            active.push("SHIELD".to_string());
        }
        active
    }

    /// Advance one step. Returns true if the player fell out of the world and
    /// lost a life.
    pub fn update(&mut self, dt: f32, platforms: &[Platform]) -> bool {
        self.invulnerable_ms = (self.invulnerable_ms - dt).max(0.0);
        self.speed_boost_ms = (self.speed_boost_ms - dt).max(0.0);
        self.shield_ms = (self.shield_ms - dt).max(0.0);

        let prev_bottom = self.pos.y + self.size.y;

        self.vel.y += self.gravity;
        self.pos += self.vel;
        self.vel.x *= FRICTION;

        self.on_ground = false;
        // Hidden platforms still hold; visibility only affects drawing
        for platform in platforms {
            if lands_on(&self.bounds(), prev_bottom, self.vel.y, &platform.rect) {
                self.pos.y = platform.rect.y - self.size.y;
                self.vel.y = 0.0;
                self.on_ground = true;
            }
        }

        self.pos.x = self.pos.x.clamp(0.0, WORLD_WIDTH - self.size.x);

        if self.pos.y > FALL_DEATH_Y {
            if self.take_damage() {
                return true;
            }
            // Protected falls still come back to the spawn point
            self.reset_position();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grounded_player() -> Player {
        let mut player = Player::new(3);
        player.on_ground = true;
        player
    }

    #[test]
    fn test_double_tap_spends_charge() {
        let mut player = grounded_player();
        player.high_jump_charges = 2;

        assert_eq!(player.jump(1000.0), Some(JumpKind::Normal));
        assert_eq!(player.vel.y, -JUMP_POWER);

        // Landed again just in time for the second tap
        player.on_ground = true;
        assert_eq!(player.jump(1200.0), Some(JumpKind::High));
        assert_eq!(player.vel.y, -JUMP_POWER * HIGH_JUMP_MULTIPLIER);
        assert_eq!(player.high_jump_charges, 1);
    }

    #[test]
    fn test_double_tap_without_charges_is_plain_jump() {
        let mut player = grounded_player();
        player.jump(1000.0);
        player.on_ground = true;
        assert_eq!(player.jump(1200.0), Some(JumpKind::Normal));
        assert_eq!(player.vel.y, -JUMP_POWER);
        assert_eq!(player.high_jump_charges, 0);
    }

    #[test]
    fn test_slow_second_tap_is_plain_jump() {
        let mut player = grounded_player();
        player.high_jump_charges = 1;
        player.jump(1000.0);
        player.on_ground = true;
        assert_eq!(player.jump(1300.0), Some(JumpKind::Normal));
        assert_eq!(player.high_jump_charges, 1);
    }

    #[test]
    fn test_airborne_jump_is_ignored() {
        let mut player = Player::new(3);
        assert_eq!(player.jump(0.0), None);
        assert!(!player.high_jump());
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_high_jump_needs_charge() {
        let mut player = grounded_player();
        assert!(!player.high_jump());
        player.activate_power_up(PowerUpKind::HighJump);
        assert!(player.high_jump());
        assert_eq!(player.vel.y, -JUMP_POWER * HIGH_JUMP_MULTIPLIER);
        assert_eq!(player.high_jump_charges, 0);
        assert!(!player.on_ground);
    }

    #[test]
    fn test_take_damage_respawns() {
        let mut player = Player::new(3);
        player.pos = Vec2::new(500.0, 100.0);
        player.vel = Vec2::new(4.0, -3.0);

        assert!(player.take_damage());
        assert_eq!(player.lives, 2);
        assert_eq!(player.pos, Vec2::new(SPAWN_X, SPAWN_Y));
        assert_eq!(player.vel, Vec2::ZERO);
        assert!(player.is_invulnerable());

        // Invulnerable: no effect
        assert!(!player.take_damage());
        assert_eq!(player.lives, 2);
    }

    #[test]
    fn test_shield_blocks_damage() {
        let mut player = Player::new(3);
        player.activate_power_up(PowerUpKind::Shield);
        assert!(!player.take_damage());
        assert_eq!(player.lives, 3);
    }

    #[test]
    fn test_timers_expire() {
        let mut player = Player::new(3);
        player.activate_power_up(PowerUpKind::SpeedBoost);
        player.take_damage();
        player.update(SPEED_BOOST_MS, &[]);
        assert!(!player.speed_boost_active());
        assert!(!player.is_invulnerable());
        assert_eq!(player.speed_boost_ms, 0.0);
    }

    #[test]
    fn test_timed_power_ups_refresh_instead_of_stacking() {
        let mut player = Player::new(3);
        player.activate_power_up(PowerUpKind::SpeedBoost);
        player.activate_power_up(PowerUpKind::Shield);
        player.update(3000.0, &[]);
        assert_eq!(player.speed_boost_ms, SPEED_BOOST_MS - 3000.0);
        assert_eq!(player.shield_ms, SHIELD_MS - 3000.0);

        player.activate_power_up(PowerUpKind::SpeedBoost);
        player.activate_power_up(PowerUpKind::Shield);
        assert_eq!(player.speed_boost_ms, SPEED_BOOST_MS);
        assert_eq!(player.shield_ms, SHIELD_MS);

        // Collected twice in a row: still one full duration
        player.activate_power_up(PowerUpKind::SpeedBoost);
        player.activate_power_up(PowerUpKind::Shield);
        assert_eq!(player.speed_boost_ms, SPEED_BOOST_MS);
        assert_eq!(player.shield_ms, SHIELD_MS);
    }

    #[test]
    fn test_speed_boost_and_last_direction_wins() {
        let mut player = Player::new(3);
        player.move_left();
        player.move_right();
        assert_eq!(player.vel.x, PLAYER_SPEED);
        player.activate_power_up(PowerUpKind::SpeedBoost);
        player.move_left();
        assert_eq!(player.vel.x, -PLAYER_SPEED * SPEED_BOOST_MULTIPLIER);
    }

    #[test]
    fn test_lands_on_platform() {
        let platforms = vec![Platform::new(0.0, 440.0, 800.0, 20.0)];
        let mut player = Player::new(3);
        for _ in 0..30 {
            player.update(16.0, &platforms);
        }
        assert!(player.on_ground);
        assert_eq!(player.pos.y, 440.0 - PLAYER_SIZE);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_hidden_platform_still_holds() {
        let mut platform = Platform::new(0.0, 440.0, 800.0, 20.0);
        platform.visible = false;
        let mut player = Player::new(3);
        for _ in 0..30 {
            player.update(16.0, std::slice::from_ref(&platform));
        }
        assert!(player.on_ground);
        assert_eq!(player.pos.y, 440.0 - PLAYER_SIZE);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_no_snap_from_below() {
        let platforms = vec![Platform::new(0.0, 380.0, 800.0, 20.0)];
        let mut player = Player::new(3);
        player.pos.y = 390.0; // Head inside the platform
        player.vel.y = 1.0;
        player.update(16.0, &platforms);
        assert!(!player.on_ground);
        assert!(player.pos.y > 390.0);
    }

    #[test]
    fn test_horizontal_clamp_and_friction() {
        let mut player = Player::new(3);
        player.pos.x = 2.0;
        player.vel.x = -10.0;
        player.update(16.0, &[]);
        assert_eq!(player.pos.x, 0.0);
        assert!((player.vel.x + 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_falling_out_costs_a_life() {
        let mut player = Player::new(3);
        player.pos.y = FALL_DEATH_Y - 1.0;
        player.vel.y = 5.0;
        assert!(player.update(16.0, &[]));
        assert_eq!(player.lives, 2);
        assert_eq!(player.pos, Vec2::new(SPAWN_X, SPAWN_Y));

        // Protected fall: no life lost, still respawned
        player.pos.y = FALL_DEATH_Y - 1.0;
        player.vel.y = 5.0;
        assert!(!player.update(16.0, &[]));
        assert_eq!(player.lives, 2);
        assert_eq!(player.pos.y, SPAWN_Y);
    }

    #[test]
    fn test_active_power_up_labels() {
        let mut player = Player::new(3);
        player.activate_power_up(PowerUpKind::HighJump);
        player.activate_power_up(PowerUpKind::HighJump);
        player.activate_power_up(PowerUpKind::Shield);
        assert_eq!(player.active_power_ups(), vec!["HIGH JUMP x2", "SHIELD"]);
    }
}
