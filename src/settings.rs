//! Simulation tuning
//!
//! Every numeric knob of the ball/brick/reward core lives here. Tuning is
//! plain data: serialisable, loadable from a JSON file, validated once.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Ball speed, correction and paddle-response parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallSettings {
    /// Nominal speed (units/s)
    pub speed: f32,
    /// Hard speed ceiling
    pub max_speed: f32,
    /// Velocity is never allowed below `speed * min_speed_ratio`
    pub min_speed_ratio: f32,
    /// Working ceiling as a fraction of `max_speed` (margin against tunneling)
    pub safe_speed_ratio: f32,
    /// Velocity is re-derived when its heading drifts more than this (degrees)
    pub angle_tolerance: f32,
    /// ...or when its magnitude drifts more than this (units/s)
    pub speed_tolerance: f32,
    /// Probe hit above `speed * overspeed_ratio` forces nominal speed
    pub overspeed_ratio: f32,
    /// Look-ahead distance of the obstacle probe
    pub probe_distance: f32,
    /// Minimum elevation above horizontal after a paddle hit (degrees)
    pub min_angle: f32,
    /// Paddle deflection range (degrees from vertical, full paddle width)
    pub max_angle: f32,
    /// Uniform jitter added to paddle deflection (± degrees)
    pub random_angle_range: f32,
    /// Respawn position after the ball is lost
    pub spawn_origin: Vec2,
}

impl Default for BallSettings {
    fn default() -> Self {
        Self {
            speed: 10.0,
            max_speed: 20.0,
            min_speed_ratio: 0.5,
            safe_speed_ratio: 0.9,
            angle_tolerance: 5.0,
            speed_tolerance: 0.5,
            overspeed_ratio: 1.2,
            probe_distance: 1.0,
            min_angle: 15.0,
            max_angle: 75.0,
            random_angle_range: 15.0,
            spawn_origin: Vec2::new(0.0, -6.0),
        }
    }
}

impl BallSettings {
    /// Working speed ceiling used by step correction
    pub fn safe_max_speed(&self) -> f32 {
        self.max_speed * self.safe_speed_ratio
    }

    /// Speed floor used by step correction
    pub fn min_speed(&self) -> f32 {
        self.speed * self.min_speed_ratio
    }
}

/// Playfield walls and the inset used for corrective clamping
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayfieldSettings {
    /// Walls sit at x = ±half_width
    pub half_width: f32,
    /// Ceiling y
    pub top: f32,
    /// Kill line: a ball below this is lost
    pub bottom: f32,
    /// Distance from each wall to the inset playfield edge
    pub inset: f32,
}

impl Default for PlayfieldSettings {
    fn default() -> Self {
        Self {
            half_width: 9.0,
            top: 10.0,
            bottom: -10.0,
            inset: 0.8,
        }
    }
}

impl PlayfieldSettings {
    /// Left edge of the inset playfield
    #[inline]
    pub fn inset_min_x(&self) -> f32 {
        -self.half_width + self.inset
    }

    /// Right edge of the inset playfield
    #[inline]
    pub fn inset_max_x(&self) -> f32 {
        self.half_width - self.inset
    }

    /// Ceiling of the inset playfield
    #[inline]
    pub fn inset_max_y(&self) -> f32 {
        self.top - self.inset
    }
}

/// Brick hit arbitration timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrickSettings {
    /// Minimum simulation time between accepted hits (seconds)
    pub hit_cooldown: f32,
    /// Ticks between lock and removal
    pub removal_delay_ticks: u32,
}

impl Default for BrickSettings {
    fn default() -> Self {
        Self {
            hit_cooldown: 0.1,
            removal_delay_ticks: 2,
        }
    }
}

/// Coin drop parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardSettings {
    /// Probability that a removed brick drops anything
    pub drop_chance: f64,
    pub min_count: u32,
    pub max_count: u32,
    /// Upward impulse applied to every coin
    pub spawn_force: f32,
    pub horizontal_spread: f32,
    pub vertical_spread: f32,
    pub spawn_offset: Vec2,
    /// Seconds before a coin is reclaimed
    pub lifetime: f32,
    /// Coins below this y are reclaimed
    pub destroy_below_y: f32,
    /// Minimum fall speed once a coin is descending
    pub fall_speed: f32,
    pub gravity: f32,
}

impl Default for RewardSettings {
    fn default() -> Self {
        Self {
            drop_chance: 0.7,
            min_count: 1,
            max_count: 3,
            spawn_force: 2.0,
            horizontal_spread: 1.5,
            vertical_spread: 0.5,
            spawn_offset: Vec2::ZERO,
            lifetime: 10.0,
            destroy_below_y: -15.0,
            fall_speed: 3.0,
            gravity: 9.81,
        }
    }
}

/// Complete tuning for one simulation run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub ball: BallSettings,
    pub playfield: PlayfieldSettings,
    pub bricks: BrickSettings,
    pub rewards: RewardSettings,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Write tuning to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Tuning saved");
        Ok(())
    }

    /// Check that all values are usable together
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ball = &self.ball;
        if !(ball.speed > 0.0) {
            return Err(invalid("ball.speed", "must be positive"));
        }
        if ball.speed > ball.max_speed {
            return Err(invalid("ball.max_speed", "must be at least ball.speed"));
        }
        if !(ball.min_speed_ratio > 0.0 && ball.min_speed_ratio <= 1.0) {
            return Err(invalid("ball.min_speed_ratio", "must be in (0, 1]"));
        }
        if !(ball.safe_speed_ratio > 0.0 && ball.safe_speed_ratio <= 1.0) {
            return Err(invalid("ball.safe_speed_ratio", "must be in (0, 1]"));
        }
        if ball.safe_max_speed() < ball.min_speed() {
            return Err(invalid(
                "ball.safe_speed_ratio",
                format!(
                    "safe ceiling {} is below speed floor {}",
                    ball.safe_max_speed(),
                    ball.min_speed()
                ),
            ));
        }
        if !(0.0..90.0).contains(&ball.min_angle) {
            return Err(invalid("ball.min_angle", "must be in [0, 90)"));
        }
        if !(ball.max_angle > 0.0 && ball.max_angle <= 180.0) {
            return Err(invalid("ball.max_angle", "must be in (0, 180]"));
        }
        if ball.random_angle_range < 0.0 {
            return Err(invalid("ball.random_angle_range", "must not be negative"));
        }
        if ball.probe_distance < 0.0 {
            return Err(invalid("ball.probe_distance", "must not be negative"));
        }

        let field = &self.playfield;
        if !(field.inset >= 0.0 && field.inset < field.half_width) {
            return Err(invalid("playfield.inset", "must be in [0, half_width)"));
        }
        if field.bottom >= field.top {
            return Err(invalid("playfield.bottom", "must be below playfield.top"));
        }

        if self.bricks.hit_cooldown < 0.0 {
            return Err(invalid("bricks.hit_cooldown", "must not be negative"));
        }

        let rewards = &self.rewards;
        if !(0.0..=1.0).contains(&rewards.drop_chance) {
            return Err(invalid("rewards.drop_chance", "must be in [0, 1]"));
        }
        if rewards.min_count == 0 || rewards.min_count > rewards.max_count {
            return Err(invalid(
                "rewards.min_count",
                "must satisfy 1 <= min_count <= max_count",
            ));
        }
        if rewards.horizontal_spread < 0.0 || rewards.vertical_spread < 0.0 {
            return Err(invalid("rewards.horizontal_spread", "spreads must not be negative"));
        }
        if rewards.lifetime <= 0.0 {
            return Err(invalid("rewards.lifetime", "must be positive"));
        }
        Ok(())
    }
}
