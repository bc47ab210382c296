//! Fixed timestep game loop
//!
//! `Game` owns one run: player, active level, narrative feed, score,
//! countdown and the phase state machine. It is advanced one fixed step at a
//! time by `tick`; feed responses are applied at the start of a step, never
//! in the middle of one.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::level::Level;
use super::modifier::{ActiveModifier, Modifier};
use super::player::{JumpKind, Player};
use super::state::{EffectsSink, GameEvent, GamePhase};
use crate::consts::*;
use crate::difficulty::{DifficultyProfile, level_time_limit};
use crate::feed::ModifierFeed;
use crate::settings::GameConfig;
use crate::snapshot::RenderSnapshot;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held
    pub move_left: bool,
    pub move_right: bool,
    /// Edge-triggered (one step per press)
    pub jump: bool,
    pub high_jump: bool,
    pub pause: bool,
    pub restart: bool,
    /// Monotonic clock reading for double-tap detection
    pub now_ms: f64,
}

pub struct Game<S: EffectsSink> {
    config: GameConfig,
    player: Player,
    level: Level,
    feed: ModifierFeed,
    rng: Pcg32,
    sink: S,
    score: u32,
    level_index: u32,
    time_remaining_ms: f32,
    time_warning_sent: bool,
    phase: GamePhase,
    transition_ms: f32,
    active_modifier: ActiveModifier,
    paused: bool,
    running: bool,
}

impl<S: EffectsSink> Game<S> {
    pub fn new(config: GameConfig, sink: S) -> Self {
        let mut rng = Pcg32::seed_from_u64(config.seed);
        let level = Level::new(1, &config.profile, &mut rng);
        let feed = ModifierFeed::new(&config.profile, config.seed.wrapping_add(1));

        log::info!(
            "New run: {} difficulty, {} levels, seed {}",
            config.profile.display_name,
            config.max_level,
            config.seed
        );

        Self {
            player: Player::new(config.profile.lives_count),
            time_remaining_ms: level_time_limit(1, &config.profile),
            level,
            feed,
            rng,
            sink,
            score: 0,
            level_index: 1,
            time_warning_sent: false,
            phase: GamePhase::Playing,
            transition_ms: 0.0,
            active_modifier: ActiveModifier::None,
            paused: false,
            running: false,
            config,
        }
    }

    /// Begin ticking and start the narrative feed
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        if !self.phase.is_terminal() {
            self.feed.start();
        }
        log::info!("Game started");
    }

    /// Stop ticking; no state changes after this until `start`
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.feed.stop();
        log::info!("Game stopped");
    }

    /// Advance the game by one fixed step of `dt` milliseconds
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        if !self.running {
            return;
        }

        if self.phase.is_terminal() {
            if input.restart || input.jump {
                self.restart();
            }
            return;
        }

        if input.pause {
            self.paused = !self.paused;
            log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
        }
        if self.paused {
            return;
        }

        // Feed responses land between steps
        for response in self.feed.drain() {
            self.sink.narrative(&response.narrative);
            self.apply_modifier(&response.modifier);
        }

        self.handle_input(input);

        let transitioning = self.phase == GamePhase::LevelTransition;
        if !transitioning {
            self.update_countdown(dt);
        }

        if self.player.update(dt, &self.level.platforms) {
            log::debug!("Fell out of the world, {} lives left", self.player.lives);
        }
        let bounds = self.player.bounds();
        self.level.update(dt, Some(&bounds), transitioning, &mut self.rng);

        if !transitioning
            && !self.player.is_dead()
            && self.level.check_drone_collision(&bounds)
            && self.player.take_damage()
        {
            self.sink.event(GameEvent::DroneHit);
            self.sink.narrative("DRONE CONTACT! Subject Delta damaged!");
        }

        if !transitioning && self.player.is_dead() {
            self.game_over();
            return;
        }

        let collected = self.level.check_orb_collection(&self.player.bounds());
        if collected > 0 {
            self.score += collected;
            self.sink.event(GameEvent::OrbCollect { count: collected });
        }

        for power_up in self.level.check_power_up_collection(&self.player.bounds()) {
            self.player.activate_power_up(power_up.kind);
            self.sink.event(GameEvent::PowerUp {
                kind: power_up.kind,
            });
            self.sink
                .narrative(&format!("POWER-UP ACQUIRED: {}!", power_up.kind.label()));
        }

        if !transitioning && self.level.all_orbs_collected() {
            self.begin_transition();
        }

        if self.phase == GamePhase::LevelTransition {
            self.transition_ms -= dt;
            if self.transition_ms <= 0.0 {
                self.finish_transition();
            }
        }

        self.feed.advance(dt);
    }

    fn handle_input(&mut self, input: &TickInput) {
        if input.move_left {
            self.player.move_left();
        }
        if input.move_right {
            self.player.move_right();
        }

        if input.jump {
            match self.player.jump(input.now_ms) {
                Some(JumpKind::Normal) => self.sink.event(GameEvent::Jump),
                Some(JumpKind::High) => self.sink.event(GameEvent::HighJump),
                None => {}
            }
        }
        if input.high_jump && self.player.high_jump() {
            self.sink.event(GameEvent::HighJump);
        }
    }

    fn update_countdown(&mut self, dt: f32) {
        self.time_remaining_ms -= dt;

        if self.time_remaining_ms <= TIME_WARNING_MS && !self.time_warning_sent {
            self.time_warning_sent = true;
            self.sink.event(GameEvent::TimeWarning);
            self.sink
                .narrative("WARNING: TIME RUNNING OUT! ESCAPE IMMEDIATELY!");
        }

        if self.time_remaining_ms <= 0.0 {
            self.sink
                .narrative("TIME EXPIRED! Subject Delta failed to escape in time!");
            if self.player.take_damage() {
                log::debug!("Timed out on level {}", self.level_index);
            }
            self.reset_level_timer();
        }
    }

    fn reset_level_timer(&mut self) {
        self.time_remaining_ms = level_time_limit(self.level_index, &self.config.profile);
        self.time_warning_sent = false;
    }

    /// Parse untrusted modifier text and make it the only active rule.
    /// Every apply starts from a full reset, so applying the same modifier
    /// twice leaves the same state as applying it once.
    pub fn apply_modifier(&mut self, text: &str) -> Modifier {
        let modifier = Modifier::parse(text);
        self.clear_modifier();

        match modifier {
            Modifier::LowGravity => self.player.set_gravity(LOW_GRAVITY),
            Modifier::DisappearingPlatforms => {
                self.level.start_disappearing_platforms(&mut self.rng)
            }
            Modifier::SpawningDrones => {
                self.level.spawn_drones();
                let count = self.level.drone_count() as u32;
                self.sink.event(GameEvent::DroneSpawn { count });
                self.sink.narrative(&format!(
                    "WARNING: {} security drones deployed at speed level {}!",
                    count, self.level_index
                ));
            }
            Modifier::Normal | Modifier::Unknown => {}
        }

        self.active_modifier = modifier.active();
        log::info!("Modifier applied: {:?}", modifier);
        modifier
    }

    fn clear_modifier(&mut self) {
        self.player.set_gravity(DEFAULT_GRAVITY);
        self.level.reset_platforms();
        self.active_modifier = ActiveModifier::None;
    }

    fn begin_transition(&mut self) {
        self.phase = GamePhase::LevelTransition;
        self.transition_ms = LEVEL_TRANSITION_MS;
        self.sink.event(GameEvent::LevelComplete {
            level: self.level_index,
        });

        if self.level_index >= self.config.max_level {
            self.sink.narrative(
                "CRITICAL ALERT: FINAL CONTAINMENT LEVEL BREACHED! SUBJECT DELTA APPROACHING TOTAL ESCAPE!",
            );
        } else {
            self.sink.narrative(&format!(
                "LEVEL {} BREACHED! ESCALATING TO LEVEL {} PROTOCOLS!",
                self.level_index,
                self.level_index + 1
            ));
        }

        self.feed.stop();
        log::info!("Level {} cleared", self.level_index);
    }

    fn finish_transition(&mut self) {
        // Lives lost during the transition still end the run
        if self.player.is_dead() {
            self.game_over();
            return;
        }
        if self.level_index >= self.config.max_level {
            self.victory();
            return;
        }

        self.level_index += 1;
        self.level = Level::new(self.level_index, &self.config.profile, &mut self.rng);
        self.player.set_gravity(DEFAULT_GRAVITY);
        self.player.reset_position();
        self.active_modifier = ActiveModifier::None;
        self.reset_level_timer();
        self.phase = GamePhase::Playing;

        self.feed.set_tier(self.level_index, &self.config.profile);
        self.feed.start();
        self.sink.narrative(&format!(
            "LEVEL {} INITIALIZED. ENHANCED SECURITY PROTOCOLS ACTIVE.",
            self.level_index
        ));
        log::info!(
            "Level {} started ({:.0}ms on the clock)",
            self.level_index,
            self.time_remaining_ms
        );
    }

    fn game_over(&mut self) {
        self.phase = GamePhase::GameOver;
        self.feed.stop();
        self.sink.event(GameEvent::GameOver);
        self.sink
            .narrative("SUBJECT DELTA TERMINATED. EXPERIMENT CONCLUDED.");
        log::info!("Game over on level {} with score {}", self.level_index, self.score);
    }

    fn victory(&mut self) {
        self.phase = GamePhase::Victory;
        self.feed.stop();
        self.sink.event(GameEvent::Victory);
        self.sink.narrative(
            "IMPOSSIBLE! SUBJECT DELTA HAS ACHIEVED TOTAL FACILITY BREACH! THE AI OVERSEER SYSTEM IS COMPROMISED!",
        );
        log::info!("Victory with score {}", self.score);
    }

    /// Back to level 1 with the configured profile's lives
    pub fn restart(&mut self) {
        self.player.reset(self.config.profile.lives_count);
        self.score = 0;
        self.level_index = 1;
        self.level = Level::new(1, &self.config.profile, &mut self.rng);
        self.active_modifier = ActiveModifier::None;
        self.reset_level_timer();
        self.phase = GamePhase::Playing;
        self.transition_ms = 0.0;
        self.paused = false;

        self.feed.stop();
        self.feed.set_tier(1, &self.config.profile);
        self.feed.start();
        self.sink
            .narrative("SUBJECT DELTA REINITIALIZED. RESUMING EXPERIMENT.");
        log::info!("Run restarted");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.player.lives
    }

    pub fn level_index(&self) -> u32 {
        self.level_index
    }

    pub fn max_level(&self) -> u32 {
        self.config.max_level
    }

    pub fn time_remaining_ms(&self) -> f32 {
        self.time_remaining_ms
    }

    /// Time left in the level transition (0 outside of one)
    pub fn transition_remaining_ms(&self) -> f32 {
        if self.phase == GamePhase::LevelTransition {
            self.transition_ms.max(0.0)
        } else {
            0.0
        }
    }

    pub fn active_modifier(&self) -> ActiveModifier {
        self.active_modifier
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.config.profile
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Transport side of the feed: take requests, deliver results
    pub fn feed_mut(&mut self) -> &mut ModifierFeed {
        &mut self.feed
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        RenderSnapshot::capture(self)
    }
}
