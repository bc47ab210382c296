//! Static stage layouts
//!
//! Geometry is a pure function of the stage number. The first platform of
//! every stage is ground and is never scheduled to disappear.

use super::state::PowerUpKind::{HighJump, Shield, SpeedBoost};
use super::state::{Orb, Platform, PowerUp, PowerUpKind};

/// Platform height shared by every stage
const PH: f32 = 20.0;

/// One stage: platforms `(x, y, width)`, orbs `(x, y)` and candidate
/// power-up slots `(x, y, kind)`
pub struct StageLayout {
    pub platforms: &'static [(f32, f32, f32)],
    pub orbs: &'static [(f32, f32)],
    pub power_ups: &'static [(f32, f32, PowerUpKind)],
}

/// Basic platforming
const STAGE_1: StageLayout = StageLayout {
    platforms: &[
        (0.0, 580.0, 800.0),
        (200.0, 500.0, 150.0),
        (400.0, 420.0, 150.0),
        (100.0, 340.0, 150.0),
        (550.0, 340.0, 150.0),
        (300.0, 260.0, 200.0),
        (50.0, 180.0, 150.0),
        (600.0, 180.0, 150.0),
        (350.0, 100.0, 100.0),
    ],
    orbs: &[
        (275.0, 470.0),
        (475.0, 390.0),
        (175.0, 310.0),
        (625.0, 310.0),
        (400.0, 230.0),
        (125.0, 150.0),
        (675.0, 150.0),
        (400.0, 70.0),
    ],
    power_ups: &[(400.0, 200.0, HighJump), (125.0, 120.0, SpeedBoost)],
};

/// Gaps in the ground, higher platforms
const STAGE_2: StageLayout = StageLayout {
    platforms: &[
        (0.0, 580.0, 150.0),
        (200.0, 580.0, 150.0),
        (450.0, 580.0, 150.0),
        (650.0, 580.0, 150.0),
        (100.0, 480.0, 100.0),
        (300.0, 450.0, 80.0),
        (500.0, 480.0, 100.0),
        (150.0, 380.0, 80.0),
        (400.0, 350.0, 80.0),
        (600.0, 380.0, 80.0),
        (50.0, 280.0, 100.0),
        (250.0, 250.0, 100.0),
        (450.0, 250.0, 100.0),
        (650.0, 280.0, 100.0),
        (350.0, 150.0, 100.0),
        (200.0, 80.0, 80.0),
        (520.0, 80.0, 80.0),
    ],
    orbs: &[
        (150.0, 450.0),
        (340.0, 420.0),
        (550.0, 450.0),
        (190.0, 350.0),
        (440.0, 320.0),
        (640.0, 350.0),
        (100.0, 250.0),
        (300.0, 220.0),
        (500.0, 220.0),
        (700.0, 250.0),
        (400.0, 120.0),
        (240.0, 50.0),
        (560.0, 50.0),
    ],
    power_ups: &[
        (300.0, 220.0, HighJump),
        (500.0, 220.0, SpeedBoost),
        (400.0, 90.0, Shield),
    ],
};

/// Narrow ledges up to a final platform at the ceiling
const STAGE_3: StageLayout = StageLayout {
    platforms: &[
        (0.0, 580.0, 100.0),
        (150.0, 580.0, 80.0),
        (280.0, 580.0, 80.0),
        (420.0, 580.0, 80.0),
        (550.0, 580.0, 80.0),
        (680.0, 580.0, 120.0),
        (50.0, 500.0, 60.0),
        (200.0, 480.0, 60.0),
        (350.0, 460.0, 60.0),
        (500.0, 480.0, 60.0),
        (650.0, 500.0, 60.0),
        (100.0, 400.0, 50.0),
        (250.0, 380.0, 50.0),
        (400.0, 360.0, 50.0),
        (550.0, 380.0, 50.0),
        (700.0, 400.0, 50.0),
        (150.0, 300.0, 60.0),
        (350.0, 280.0, 60.0),
        (550.0, 300.0, 60.0),
        (100.0, 200.0, 80.0),
        (300.0, 180.0, 80.0),
        (500.0, 200.0, 80.0),
        (200.0, 100.0, 100.0),
        (400.0, 80.0, 100.0),
        (300.0, 20.0, 200.0),
    ],
    orbs: &[
        (80.0, 470.0),
        (230.0, 450.0),
        (380.0, 430.0),
        (530.0, 450.0),
        (680.0, 470.0),
        (130.0, 370.0),
        (280.0, 350.0),
        (430.0, 330.0),
        (580.0, 350.0),
        (730.0, 370.0),
        (180.0, 270.0),
        (380.0, 250.0),
        (580.0, 270.0),
        (140.0, 170.0),
        (340.0, 150.0),
        (540.0, 170.0),
        (250.0, 70.0),
        (450.0, 50.0),
        (400.0, -10.0),
    ],
    power_ups: &[
        (180.0, 240.0, HighJump),
        (380.0, 220.0, SpeedBoost),
        (580.0, 240.0, Shield),
        (250.0, 40.0, HighJump),
    ],
};

/// All stages in play order
pub static STAGES: [StageLayout; 3] = [STAGE_1, STAGE_2, STAGE_3];

/// Number of playable stages
pub fn stage_count() -> u32 {
    STAGES.len() as u32
}

/// Layout for a 1-based stage number, clamped into the table
pub fn stage(level: u32) -> &'static StageLayout {
    let idx = (level.max(1) as usize - 1).min(STAGES.len() - 1);
    &STAGES[idx]
}

impl StageLayout {
    pub fn build_platforms(&self) -> Vec<Platform> {
        self.platforms
            .iter()
            .map(|&(x, y, w)| Platform::new(x, y, w, PH))
            .collect()
    }

    pub fn build_orbs(&self) -> Vec<Orb> {
        self.orbs.iter().map(|&(x, y)| Orb::new(x, y)).collect()
    }

    pub fn power_up_slots(&self) -> impl Iterator<Item = PowerUp> + '_ {
        self.power_ups
            .iter()
            .map(|&(x, y, kind)| PowerUp::new(x, y, kind))
    }
}
