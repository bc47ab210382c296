//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (key mapping, edge-triggered actions)
//! - Time (monotonic clock, fixed-step accumulator)
//!
//! Storage lives with `Settings`.

pub mod input;
pub mod time;

pub use input::{Action, InputState, map_key};
pub use time::{FixedStep, now_ms};
