//! Time sources
//!
//! The double-tap window is measured on a monotonic clock, independent of how
//! many simulation steps ran in between.

use crate::consts::*;

/// Milliseconds on a monotonic clock (`performance.now()` in the browser)
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Milliseconds since the first call on this process
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

/// Longest frame gap fed into the accumulator (tab switches, breakpoints)
const MAX_FRAME_MS: f32 = 100.0;

/// Fixed-timestep accumulator
#[derive(Debug, Clone)]
pub struct FixedStep {
    accumulator: f32,
    step_ms: f32,
    max_substeps: u32,
    last_time: Option<f64>,
}

impl Default for FixedStep {
    fn default() -> Self {
        Self::new(SIM_DT_MS, MAX_SUBSTEPS)
    }
}

impl FixedStep {
    pub fn new(step_ms: f32, max_substeps: u32) -> Self {
        Self {
            accumulator: 0.0,
            step_ms,
            max_substeps,
            last_time: None,
        }
    }

    pub fn step_ms(&self) -> f32 {
        self.step_ms
    }

    /// Feed a frame timestamp; returns how many fixed steps to run
    pub fn frame(&mut self, time_ms: f64) -> u32 {
        let elapsed = match self.last_time {
            Some(last) => (time_ms - last) as f32,
            None => self.step_ms,
        };
        self.last_time = Some(time_ms);
        self.advance(elapsed)
    }

    /// Add elapsed time; returns how many fixed steps are due (capped)
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        self.accumulator += elapsed_ms.clamp(0.0, MAX_FRAME_MS);

        let mut substeps = 0;
        while self.accumulator >= self.step_ms && substeps < self.max_substeps {
            self.accumulator -= self.step_ms;
            substeps += 1;
        }
        substeps
    }

    /// Drop accumulated time (after a pause or a hidden tab)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time = None;
    }
}
