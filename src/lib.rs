//! Alchemy Raid - combat core of the vertical rail shooter mini-game
//!
//! Core modules:
//! - `sim`: Deterministic combat simulation (waves, formations, enemies, projectiles, collisions, rewards)
//! - `tuning`: Data-driven game balance
//! - `game`: Frame driver (fixed substeps, reward callback, event draining)
//! - `web`: wasm-bindgen facade for the browser host (wasm32 only)

pub mod game;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use game::Game;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest real frame the driver will simulate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Playfield dimensions (screen space, origin top-left, +y down)
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Player hitbox line. Collision always uses this Y, never the bobbing sprite Y.
    pub const PLAYER_COLLISION_OFFSET: f32 = 70.0;
    pub const PLAYER_COLLISION_Y: f32 = SCREEN_HEIGHT - PLAYER_COLLISION_OFFSET;
    /// Where the renderer draws the player before bobbing is added
    pub const PLAYER_RENDER_Y: f32 = SCREEN_HEIGHT - 80.0;
    pub const PLAYER_BOB_AMPLITUDE: f32 = 5.0;
    pub const PLAYER_BOB_SPEED: f32 = 3.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Horizontal speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 320.0;
    /// Keep the ship this far from either screen edge
    pub const PLAYER_EDGE_MARGIN: f32 = 24.0;

    /// Default formation anchor (top-center of the playfield)
    pub const FORMATION_CENTER_X: f32 = SCREEN_WIDTH / 2.0;
    pub const FORMATION_CENTER_Y: f32 = 150.0;

    /// Enemies start this far above the top edge and ease into place
    pub const ENEMY_ENTRY_HEIGHT: f32 = 60.0;
    pub const ENEMY_ENTRY_DURATION: f32 = 0.8;
}

/// Unit direction for an angle in degrees.
///
/// Screen space: 0° points right, 90° points down the screen.
#[inline]
pub fn angle_to_dir(angle_degrees: f32) -> Vec2 {
    let rad = angle_degrees.to_radians();
    Vec2::new(rad.cos(), rad.sin())
}

/// Angle in degrees of a direction vector (inverse of [`angle_to_dir`])
#[inline]
pub fn dir_to_angle(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x).to_degrees()
}

/// Normalize `v`, or return `fallback` when `v` is (nearly) zero-length
#[inline]
pub fn dir_or(v: Vec2, fallback: Vec2) -> Vec2 {
    if v.length_squared() < 1e-6 {
        fallback
    } else {
        v.normalize()
    }
}

/// Angle normalized to [-180, 180)
#[inline]
pub fn normalize_degrees(mut angle: f32) -> f32 {
    while angle >= 180.0 {
        angle -= 360.0;
    }
    while angle < -180.0 {
        angle += 360.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_to_dir_down_screen() {
        let d = angle_to_dir(90.0);
        assert!(d.x.abs() < 1e-5);
        assert!((d.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_dir_or_zero_length() {
        let fallback = Vec2::new(0.0, 1.0);
        assert_eq!(dir_or(Vec2::ZERO, fallback), fallback);
        let d = dir_or(Vec2::new(3.0, 4.0), fallback);
        assert!((d.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(270.0) - (-90.0)).abs() < 1e-4);
        assert!((normalize_degrees(-190.0) - 170.0).abs() < 1e-4);
        assert!((dir_to_angle(angle_to_dir(45.0)) - 45.0).abs() < 1e-3);
    }
}
