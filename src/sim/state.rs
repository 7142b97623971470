//! Game state and core simulation types
//!
//! Everything the fixed-step loop mutates lives here: the ball (intended
//! motion plus its engine body), the paddle, the bricks and the injected
//! collaborators.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::body::{KinematicBody, MovingBody};
use super::brick::Brick;
use super::progress::{LevelProgress, ProgressTracker};
use super::reward::{CoinSpawner, RewardSpawner};
use crate::consts::*;
use crate::error::ConfigError;
use crate::settings::{PlayfieldSettings, Tuning};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Every brick is gone; the ball is coasting to a stop
    LevelComplete,
}

/// Things the host may want to react to (audio, UI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    BrickLocked { id: u32 },
    BrickRemoved { id: u32 },
    BallLost,
    LevelComplete,
    CoinsSpawned { count: u32 },
    CoinCollected { id: u32 },
}

/// The player's paddle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paddle {
    pub pos: Vec2,
    pub half_width: f32,
    pub half_height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            pos: Vec2::new(0.0, PADDLE_Y),
            half_width: PADDLE_HALF_WIDTH,
            half_height: PADDLE_HALF_HEIGHT,
        }
    }
}

impl Paddle {
    /// Get the paddle as a box for collision detection
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::new(self.half_width, self.half_height))
    }

    /// Slide toward `target_x` no faster than `max_speed`, staying between the walls
    pub fn move_toward(&mut self, target_x: f32, dt: f32, max_speed: f32, field: &PlayfieldSettings) {
        let max_delta = max_speed * dt;
        let delta = (target_x - self.pos.x).clamp(-max_delta, max_delta);
        let limit = (field.half_width - self.half_width).max(0.0);
        self.pos.x = (self.pos.x + delta).clamp(-limit, limit);
    }
}

/// Brick grid description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    pub rows: u32,
    pub cols: u32,
}

impl Default for LevelLayout {
    fn default() -> Self {
        Self { rows: 5, cols: 8 }
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::new(self.seed, self.stream)
    }
}

/// Ball velocity ramp-down after the level is complete
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slowdown {
    pub start_vel: Vec2,
    pub elapsed: f32,
}

/// Complete game state
#[derive(Debug)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Simulation time in seconds
    pub time: f32,
    /// Current phase
    pub phase: GamePhase,
    pub paddle: Paddle,
    /// Intended ball motion
    pub ball: MovingBody,
    /// Engine-side ball body
    pub body: KinematicBody,
    /// Bricks still present (sorted by id)
    pub bricks: Vec<Brick>,
    pub layout: LevelLayout,
    /// Injected collaborators; `None` skips the notification
    pub progress: Option<Box<dyn ProgressTracker>>,
    pub rewards: Option<Box<dyn RewardSpawner>>,
    /// The progress tracker has been told the brick count
    pub(crate) level_started: bool,
    /// Events raised since the host last drained them
    pub events: Vec<GameEvent>,
    pub slowdown: Option<Slowdown>,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and the default
    /// collaborators (`LevelProgress`, `CoinSpawner`); no bricks until a
    /// level is generated
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, ConfigError> {
        let rewards = CoinSpawner::new(tuning.rewards.clone(), seed.wrapping_add(1));
        Self::with_collaborators(
            seed,
            tuning,
            Some(Box::new(LevelProgress::default())),
            Some(Box::new(rewards)),
        )
    }

    /// Create a game state with host-provided collaborators
    pub fn with_collaborators(
        seed: u64,
        tuning: Tuning,
        progress: Option<Box<dyn ProgressTracker>>,
        rewards: Option<Box<dyn RewardSpawner>>,
    ) -> Result<Self, ConfigError> {
        tuning.validate()?;

        let rng_state = RngState::new(seed);
        let ball = MovingBody::new(&tuning.ball);
        let mut body = KinematicBody::new(tuning.ball.spawn_origin, BALL_RADIUS);
        body.vel = ball.velocity();

        Ok(Self {
            seed,
            tuning,
            time_ticks: 0,
            time: 0.0,
            phase: GamePhase::Playing,
            paddle: Paddle::default(),
            ball,
            body,
            bricks: Vec::new(),
            layout: LevelLayout::default(),
            progress,
            rewards,
            level_started: false,
            events: Vec::new(),
            slowdown: None,
            rng: rng_state.to_rng(),
            next_id: 1,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a brick at `center` with default size, returning its id.
    ///
    /// Bricks present when the first tick runs (or when `start_level` is
    /// called) are counted by the progress tracker; later additions are not.
    pub fn add_brick(&mut self, center: Vec2) -> u32 {
        let id = self.next_entity_id();
        let bounds = Aabb::new(center, Vec2::new(BRICK_HALF_WIDTH, BRICK_HALF_HEIGHT));
        self.bricks.push(Brick::new(id, bounds));
        id
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_started && self.progress.as_ref().is_some_and(|p| p.is_complete())
    }
}
