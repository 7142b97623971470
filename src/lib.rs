//! Brickfall - Breakout ball physics and collision-resolution core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (ball state, deflection, arbitration)
//! - `settings`: Data-driven tuning, loadable from JSON
//! - `error`: Contract violations and configuration errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SimError};
pub use settings::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 0.25;

    /// Paddle defaults
    pub const PADDLE_Y: f32 = -8.0;
    pub const PADDLE_HALF_WIDTH: f32 = 1.0;
    pub const PADDLE_HALF_HEIGHT: f32 = 0.2;
    /// Paddle horizontal speed (units/s)
    pub const PADDLE_SPEED: f32 = 14.0;

    /// Brick grid defaults
    pub const BRICK_HALF_WIDTH: f32 = 0.75;
    pub const BRICK_HALF_HEIGHT: f32 = 0.25;
    pub const BRICK_GAP: f32 = 0.1;
    pub const BRICK_TOP_ROW_Y: f32 = 7.5;

    /// Coins are collected inside this radius of the paddle box
    pub const COIN_RADIUS: f32 = 0.2;

    /// Level-complete ball slowdown duration (seconds)
    pub const SLOWDOWN_SECS: f32 = 1.5;
}

/// Below this squared length a vector is treated as zero
pub const EPSILON_SQ: f32 = 1e-8;

/// Unit "up" in simulation space (y grows upward)
pub const UP: Vec2 = Vec2::Y;

/// Normalize `v`, substituting `fallback` for zero-length or non-finite input
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    if v.is_finite() && v.length_squared() > EPSILON_SQ {
        v.normalize()
    } else {
        fallback
    }
}

/// Sign of `x` treating zero as positive
#[inline]
pub fn sign_or_positive(x: f32) -> f32 {
    if x < 0.0 { -1.0 } else { 1.0 }
}

/// Unsigned angle between two vectors, in degrees
#[inline]
pub fn angle_between_deg(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b).atan2(a.dot(b)).abs().to_degrees()
}
