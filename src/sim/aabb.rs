//! Axis-aligned box geometry for the paddle and bricks
//!
//! A box is stored as a center plus half extents, which is what both the
//! paddle deflection (center, half width) and the contact generator want.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub half_extents: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    #[inline]
    pub fn half_width(&self) -> f32 {
        self.half_extents.x
    }

    /// Closest point on or inside the box to `point`
    #[inline]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min(), self.max())
    }

    /// Check overlap with a circle
    pub fn overlaps_circle(&self, center: Vec2, radius: f32) -> bool {
        (center - self.closest_point(center)).length_squared() <= radius * radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec2::ZERO, Vec2::new(1.0, 0.5))
    }

    #[test]
    fn test_overlaps_circle() {
        let b = unit_box();
        assert!(b.overlaps_circle(Vec2::new(0.0, 0.7), 0.25));
        assert!(!b.overlaps_circle(Vec2::new(0.0, 0.8), 0.25));
        // Corner case: diagonal distance matters
        assert!(!b.overlaps_circle(Vec2::new(1.2, 0.7), 0.25));
    }
}
