//! Collision tests
//!
//! Everything in the level is either a box (platforms, drones, the player)
//! or a point with a pickup radius (orbs, power-ups).

use glam::Vec2;

use super::state::Rect;

/// Strict AABB overlap (touching edges do not count)
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
}

/// True if the center of `bounds` is strictly within `reach` of `point`
#[inline]
pub fn within_reach(bounds: &Rect, point: Vec2, reach: f32) -> bool {
    bounds.center().distance(point) < reach
}

/// Landing test for a body that moved from `prev_bottom` to `body` this step.
///
/// Requires overlap, downward motion, and a bottom edge that was at or above
/// the platform surface before the step. Side and underside contacts never land.
pub fn lands_on(body: &Rect, prev_bottom: f32, vel_y: f32, platform: &Rect) -> bool {
    vel_y > 0.0 && prev_bottom <= platform.y && aabb_overlap(body, platform)
}
