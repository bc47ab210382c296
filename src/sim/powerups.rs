//! Power-up spawning and collection

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::within_reach;
use super::layout;
use super::state::{PowerUp, PowerUpKind, Rect};
use crate::consts::*;
use crate::difficulty::DifficultyProfile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PowerUpManager {
    pub items: Vec<PowerUp>,
}

impl PowerUpManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pickups for a level. Each candidate slot is kept with
    /// probability `power_up_spawn_rate` (rates >= 1.0 keep every slot).
    pub fn spawn(&mut self, level: u32, profile: &DifficultyProfile, rng: &mut impl Rng) {
        let rate = profile.power_up_spawn_rate.clamp(0.0, 1.0);
        self.items = layout::stage(level)
            .power_up_slots()
            .filter(|_| rng.random::<f32>() < rate)
            .collect();

        if profile.grants_bonus_power_up() && level >= 2 {
            let x = 50.0 + rng.random::<f32>() * 700.0;
            let y = 100.0 + rng.random::<f32>() * 200.0;
            let kind = if rng.random::<f32>() < 0.5 {
                PowerUpKind::Shield
            } else {
                PowerUpKind::SpeedBoost
            };
            self.items.push(PowerUp::new(x, y, kind));
        }

        log::debug!(
            "Level {} power-ups: {} ({})",
            level,
            self.items.len(),
            profile.name
        );
    }

    /// Advance glow animation
    pub fn update(&mut self, dt: f32) {
        for item in self.items.iter_mut().filter(|p| !p.collected) {
            item.glow_phase += dt * 0.008;
        }
    }

    /// Mark every pickup in reach as collected and return the new ones
    pub fn check_collection(&mut self, player: &Rect) -> Vec<PowerUp> {
        let mut collected = Vec::new();
        for item in self.items.iter_mut().filter(|p| !p.collected) {
            if within_reach(player, item.pos, item.size + PICKUP_REACH) {
                item.collected = true;
                collected.push(item.clone());
            }
        }
        collected
    }

    pub fn remaining(&self) -> impl Iterator<Item = &PowerUp> {
        self.items.iter().filter(|p| !p.collected)
    }
}
