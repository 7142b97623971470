//! Coin rewards dropped by removed bricks
//!
//! The spawner is fire-and-forget from the brick's point of view: it rolls
//! its own drop chance and count with a seeded RNG. Coins fall under
//! gravity and are reclaimed by a per-tick age/height check or collected by
//! the paddle.

use std::fmt::Debug;

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::consts::COIN_RADIUS;
use crate::settings::RewardSettings;

/// Receives a reward request when a brick is removed.
///
/// Only the request is required; hosts that simulate their own rewards can
/// leave the bookkeeping hooks at their no-op defaults.
pub trait RewardSpawner: Debug {
    fn request_reward_spawn(&mut self, position: Vec2);

    /// Number of rewards spawned since the last call
    fn take_spawned(&mut self) -> u32 {
        0
    }

    /// Advance live rewards by `dt`; returns the ones that left play
    fn update(&mut self, _dt: f32, _paddle: Option<&Aabb>) -> Vec<(u32, CoinFate)> {
        Vec::new()
    }

    /// Drop every live reward (level restart)
    fn clear(&mut self) {}
}

/// A falling coin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Seconds since spawn
    pub age: f32,
}

/// Why a coin left play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinFate {
    Collected,
    Expired,
    FellOut,
}

/// Default reward spawner
#[derive(Debug, Clone)]
pub struct CoinSpawner {
    settings: RewardSettings,
    rng: Pcg32,
    coins: Vec<Coin>,
    next_id: u32,
    /// Coins spawned since the last drain
    spawned: u32,
}

impl CoinSpawner {
    /// Out-of-range settings are clamped so sampling can never fail
    pub fn new(settings: RewardSettings, seed: u64) -> Self {
        Self {
            settings: sanitize(settings),
            rng: Pcg32::seed_from_u64(seed),
            coins: Vec::new(),
            next_id: 1,
            spawned: 0,
        }
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    fn spawn_single(&mut self, base: Vec2) {
        let s = &self.settings;
        let spread = Vec2::new(
            self.rng.random_range(-s.horizontal_spread..=s.horizontal_spread),
            self.rng.random_range(-s.vertical_spread..=s.vertical_spread),
        );
        let half_spread = s.horizontal_spread * 0.5;
        let impulse = Vec2::new(
            self.rng.random_range(-half_spread..=half_spread),
            s.spawn_force,
        );

        let coin = Coin {
            id: self.next_id,
            pos: base + s.spawn_offset + spread,
            vel: impulse,
            age: 0.0,
        };
        self.next_id += 1;
        log::debug!("Spawned coin {} at {:?} with impulse {:?}", coin.id, coin.pos, impulse);
        self.coins.push(coin);
    }
}

impl RewardSpawner for CoinSpawner {
    fn request_reward_spawn(&mut self, position: Vec2) {
        if !self.rng.random_bool(self.settings.drop_chance) {
            log::debug!("No coins dropped this time (chance roll failed)");
            return;
        }

        let count = self
            .rng
            .random_range(self.settings.min_count..=self.settings.max_count);
        log::debug!("Spawning {} coins at {:?}", count, position);
        for _ in 0..count {
            self.spawn_single(position);
        }
        self.spawned += count;
    }

    fn take_spawned(&mut self) -> u32 {
        std::mem::take(&mut self.spawned)
    }

    /// Age, move and reclaim coins
    fn update(&mut self, dt: f32, paddle: Option<&Aabb>) -> Vec<(u32, CoinFate)> {
        let s = &self.settings;
        let mut gone = Vec::new();

        for coin in &mut self.coins {
            coin.age += dt;
            coin.vel.y -= s.gravity * dt;
            // Once descending, never drift down slower than half the fall speed
            if coin.vel.y < 0.0 && coin.vel.y > -s.fall_speed * 0.5 {
                coin.vel.y = -s.fall_speed;
            }
            coin.pos += coin.vel * dt;

            let fate = if paddle.is_some_and(|p| p.overlaps_circle(coin.pos, COIN_RADIUS)) {
                Some(CoinFate::Collected)
            } else if coin.age > s.lifetime {
                Some(CoinFate::Expired)
            } else if coin.pos.y < s.destroy_below_y {
                Some(CoinFate::FellOut)
            } else {
                None
            };
            if let Some(fate) = fate {
                gone.push((coin.id, fate));
            }
        }

        if !gone.is_empty() {
            self.coins.retain(|c| !gone.iter().any(|(id, _)| *id == c.id));
        }
        gone
    }

    fn clear(&mut self) {
        self.coins.clear();
    }
}

fn sanitize(mut s: RewardSettings) -> RewardSettings {
    if !(0.0..=1.0).contains(&s.drop_chance) {
        log::warn!("Reward drop chance {} out of range - clamping", s.drop_chance);
        s.drop_chance = if s.drop_chance.is_nan() { 0.0 } else { s.drop_chance.clamp(0.0, 1.0) };
    }
    if s.max_count < s.min_count {
        log::warn!("Reward count range {}..={} is empty - using the minimum", s.min_count, s.max_count);
        s.max_count = s.min_count;
    }
    s.horizontal_spread = finite_abs(s.horizontal_spread);
    s.vertical_spread = finite_abs(s.vertical_spread);
    s
}

fn finite_abs(v: f32) -> f32 {
    if v.is_finite() { v.abs() } else { 0.0 }
}
