//! Level progress tracking
//!
//! Counts brick removals against the number of bricks present at level load
//! and flips to complete exactly once.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

/// Receives one notification per removed brick and reports completion.
///
/// Hosts may inject their own tracker into `GameState`; only removal and
/// completion are required, the lifecycle hooks default to no-ops.
pub trait ProgressTracker: Debug {
    fn on_obstacle_removed(&mut self);

    /// True once every counted brick has been removed
    fn is_complete(&self) -> bool;

    /// A level with `total` bricks starts (or restarts)
    fn on_level_loaded(&mut self, _total: u32) {}

    fn on_paused(&mut self, _paused: bool) {}
}

/// Default tracker: remaining-brick counter with an active/complete latch
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelProgress {
    total: u32,
    remaining: u32,
    active: bool,
    complete: bool,
}

impl LevelProgress {
    pub fn new(total: u32) -> Self {
        if total == 0 {
            log::warn!("Level loaded with no bricks - make sure the layout is not empty");
        } else {
            log::info!("Level initialized - total bricks: {}", total);
        }
        Self {
            total,
            remaining: total,
            active: true,
            complete: false,
        }
    }

    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Bricks counted as removed so far
    #[inline]
    pub fn removed(&self) -> u32 {
        self.total - self.remaining
    }

    /// Accepting removals (not paused, not complete)
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active && !self.complete
    }

    pub fn pause(&mut self) {
        self.active = false;
    }

    pub fn resume(&mut self) {
        if !self.complete {
            self.active = true;
        }
    }

    /// Start over with a new brick count
    pub fn reset(&mut self, total: u32) {
        *self = Self::new(total);
    }
}

impl ProgressTracker for LevelProgress {
    fn on_obstacle_removed(&mut self) {
        if !self.is_active() {
            log::debug!("Brick removal ignored - level inactive or already complete");
            return;
        }

        self.remaining = self.remaining.saturating_sub(1);
        log::info!("Brick destroyed! Remaining: {}/{}", self.remaining, self.total);

        if self.remaining == 0 {
            self.complete = true;
            self.active = false;
            log::info!("All bricks destroyed - level complete");
        }
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn on_level_loaded(&mut self, total: u32) {
        self.reset(total);
    }

    fn on_paused(&mut self, paused: bool) {
        if paused {
            self.pause();
        } else {
            self.resume();
        }
    }
}
