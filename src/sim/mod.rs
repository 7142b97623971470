//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod aabb;
pub mod body;
pub mod brick;
pub mod collision;
pub mod deflect;
pub mod guard;
pub mod progress;
pub mod reward;
pub mod sdf;
pub mod state;
pub mod tick;

pub use aabb::Aabb;
pub use body::{Correction, KinematicBody, MovingBody, NoProbe, PhysicsBody, RayProbe};
pub use brick::{Brick, BrickState, Collaborators, process_removals};
pub use collision::{BoundaryKind, CollisionEvent, ContactResult, SurfaceCategory};
pub use guard::GuardReport;
pub use progress::{LevelProgress, ProgressTracker};
pub use reward::{Coin, CoinFate, CoinSpawner, RewardSpawner};
pub use state::{GameEvent, GamePhase, GameState, LevelLayout, Paddle};
pub use tick::{
    FieldProbe, TickInput, destroy_brick, generate_level, handle_collision, restart_level,
    start_level, tick,
};
