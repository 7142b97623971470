//! Bricks and hit arbitration
//!
//! A brick accepts exactly one hit. The first accepted collision locks it
//! (`Alive -> Locked`) before anything else happens, so duplicate
//! notifications for the same physical contact, whether from a contact and
//! a trigger or from adjacent ticks, fall through as no-ops. Removal is
//! deferred a fixed number of ticks and then fires the collaborators once.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::progress::ProgressTracker;
use super::reward::RewardSpawner;
use crate::{UP, normalize_or};

/// Brick lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickState {
    Alive,
    /// Hit accepted; removed when the countdown reaches zero
    Locked { ticks_left: u32 },
    Removed,
}

/// A destructible brick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brick {
    pub id: u32,
    pub bounds: Aabb,
    pub state: BrickState,
    /// Simulation time (seconds) of the accepted hit
    pub last_hit_time: Option<f32>,
}

impl Brick {
    pub fn new(id: u32, bounds: Aabb) -> Self {
        Self {
            id,
            bounds,
            state: BrickState::Alive,
            last_hit_time: None,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.state == BrickState::Alive
    }

    /// Still physically present (alive or waiting for removal)
    #[inline]
    pub fn is_solid(&self) -> bool {
        !matches!(self.state, BrickState::Removed)
    }

    fn within_cooldown(&self, now: f32, cooldown: f32) -> bool {
        self.last_hit_time.is_some_and(|t| now - t <= cooldown)
    }

    /// Try to accept a hit at simulation time `now`.
    ///
    /// Returns the normal to forward to the ball: the contact normal if one
    /// was given (near-zero normals become "up"), otherwise "up". Returns
    /// `None` if the brick is already locked or the hit falls inside the
    /// cooldown window.
    pub fn arbitrate(
        &mut self,
        now: f32,
        contact_normal: Option<Vec2>,
        cooldown: f32,
        removal_delay_ticks: u32,
    ) -> Option<Vec2> {
        if !self.is_alive() || self.within_cooldown(now, cooldown) {
            return None;
        }

        self.state = BrickState::Locked {
            ticks_left: removal_delay_ticks,
        };
        self.last_hit_time = Some(now);

        let normal = contact_normal.map_or(UP, |n| normalize_or(n, UP));
        log::debug!("Brick {} locked at t={:.3}s, normal {:?}", self.id, now, normal);
        Some(normal)
    }

    /// Advance the removal countdown; true exactly once, on the tick the
    /// brick transitions to `Removed`
    pub fn advance_removal(&mut self) -> bool {
        match self.state {
            BrickState::Locked { ticks_left } if ticks_left <= 1 => {
                self.state = BrickState::Removed;
                true
            }
            BrickState::Locked { ticks_left } => {
                self.state = BrickState::Locked {
                    ticks_left: ticks_left - 1,
                };
                false
            }
            _ => false,
        }
    }
}

/// Optional collaborators notified on removal; absent ones are skipped
#[derive(Default)]
pub struct Collaborators<'a> {
    pub progress: Option<&'a mut dyn ProgressTracker>,
    pub rewards: Option<&'a mut dyn RewardSpawner>,
}

/// Advance every pending removal, notifying collaborators once per brick.
/// Removed bricks are dropped from `bricks`; their ids are returned.
pub fn process_removals(bricks: &mut Vec<Brick>, collab: &mut Collaborators<'_>) -> Vec<u32> {
    let mut removed = Vec::new();

    for brick in bricks.iter_mut() {
        if !brick.advance_removal() {
            continue;
        }
        log::info!("Brick {} removed", brick.id);

        if let Some(rewards) = collab.rewards.as_deref_mut() {
            rewards.request_reward_spawn(brick.bounds.center);
        }
        if let Some(progress) = collab.progress.as_deref_mut() {
            progress.on_obstacle_removed();
        }
        removed.push(brick.id);
    }

    bricks.retain(|b| b.is_solid());
    removed
}
