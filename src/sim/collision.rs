//! Collision classification and contact generation
//!
//! Two halves live here. The classifier turns engine-side tag metadata into a
//! `SurfaceCategory` so the ball knows which deflection rule applies. The
//! contact generator is the stand-in physics engine: circle-vs-box and
//! circle-vs-wall tests producing `CollisionEvent`s with contact point,
//! normal (pointing from the surface toward the ball) and penetration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::settings::PlayfieldSettings;
use crate::{UP, normalize_or};

/// Which playfield wall was touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    Left,
    Right,
    /// Kill line under the paddle
    Bottom,
    /// Any other static wall (the ceiling)
    Generic,
}

impl BoundaryKind {
    /// Normal pointing back into the playfield, if the wall has a fixed one
    pub fn reflect_normal(&self) -> Option<Vec2> {
        match self {
            BoundaryKind::Left => Some(Vec2::X),
            BoundaryKind::Right => Some(-Vec2::X),
            BoundaryKind::Bottom => Some(Vec2::Y),
            BoundaryKind::Generic => None,
        }
    }
}

/// Category of the surface the ball collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceCategory {
    Paddle,
    Brick,
    Boundary(BoundaryKind),
    Other,
}

impl SurfaceCategory {
    /// Classify engine tag metadata
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Player" | "Paddle" => SurfaceCategory::Paddle,
            "Brick" => SurfaceCategory::Brick,
            "LeftBoundary" | "LeftWall" => SurfaceCategory::Boundary(BoundaryKind::Left),
            "RightBoundary" | "RightWall" => SurfaceCategory::Boundary(BoundaryKind::Right),
            // The misspelt tag ships in existing scenes
            "BottomBoundary" | "BottomBoundry" => SurfaceCategory::Boundary(BoundaryKind::Bottom),
            "Boundary" | "Wall" | "TopBoundary" => SurfaceCategory::Boundary(BoundaryKind::Generic),
            _ => SurfaceCategory::Other,
        }
    }
}

/// One collision notification from the physics engine
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub other: SurfaceCategory,
    /// Entity id of the other collider (bricks need it for arbitration)
    pub other_id: Option<u32>,
    pub contact_point: Vec2,
    /// Unit normal from the surface toward the ball
    pub contact_normal: Vec2,
    /// Extent of the other collider (required for the paddle)
    pub other_bounds: Option<Aabb>,
}

impl CollisionEvent {
    pub fn new(other: SurfaceCategory, contact_point: Vec2, contact_normal: Vec2) -> Self {
        Self {
            other,
            other_id: None,
            contact_point,
            contact_normal,
            other_bounds: None,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.other_id = Some(id);
        self
    }

    pub fn with_bounds(mut self, bounds: Aabb) -> Self {
        self.other_bounds = Some(bounds);
        self
    }

    /// Proximity-trigger event: no contact normal, derive one from centers
    pub fn from_trigger(other: SurfaceCategory, ball_pos: Vec2, other_bounds: Aabb) -> Self {
        let normal = normalize_or(ball_pos - other_bounds.center, UP);
        Self::new(other, other_bounds.closest_point(ball_pos), normal).with_bounds(other_bounds)
    }

    /// Normal safe to use: near-zero or non-finite normals become "up"
    pub fn normal(&self) -> Vec2 {
        normalize_or(self.contact_normal, UP)
    }
}

/// Result of a contact test
#[derive(Debug, Clone)]
pub struct ContactResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the surface (if hit)
    pub point: Vec2,
    /// Surface normal at contact (pointing toward ball center)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl ContactResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a ball and a box
pub fn ball_box_collision(ball_pos: Vec2, ball_radius: f32, bounds: &Aabb) -> ContactResult {
    let closest = bounds.closest_point(ball_pos);
    let offset = ball_pos - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > ball_radius * ball_radius {
        return ContactResult::miss();
    }

    if dist_sq > crate::EPSILON_SQ {
        let dist = dist_sq.sqrt();
        return ContactResult {
            hit: true,
            point: closest,
            normal: offset / dist,
            penetration: ball_radius - dist,
        };
    }

    // Ball center is inside the box (tunneling case) - push out of the nearest face
    let local = ball_pos - bounds.center;
    let gap_x = bounds.half_extents.x - local.x.abs();
    let gap_y = bounds.half_extents.y - local.y.abs();

    if gap_x < gap_y {
        let sign = crate::sign_or_positive(local.x);
        ContactResult {
            hit: true,
            point: Vec2::new(bounds.center.x + sign * bounds.half_extents.x, ball_pos.y),
            normal: Vec2::new(sign, 0.0),
            penetration: gap_x + ball_radius,
        }
    } else {
        let sign = crate::sign_or_positive(local.y);
        ContactResult {
            hit: true,
            point: Vec2::new(ball_pos.x, bounds.center.y + sign * bounds.half_extents.y),
            normal: Vec2::new(0.0, sign),
            penetration: gap_y + ball_radius,
        }
    }
}

/// Check collisions with the walls; at most one per axis
pub fn ball_wall_collisions(
    ball_pos: Vec2,
    ball_radius: f32,
    field: &PlayfieldSettings,
) -> Vec<(BoundaryKind, ContactResult)> {
    let mut hits = Vec::new();

    if ball_pos.x - ball_radius < -field.half_width {
        hits.push((
            BoundaryKind::Left,
            ContactResult {
                hit: true,
                point: Vec2::new(-field.half_width, ball_pos.y),
                normal: Vec2::X,
                penetration: -field.half_width - (ball_pos.x - ball_radius),
            },
        ));
    } else if ball_pos.x + ball_radius > field.half_width {
        hits.push((
            BoundaryKind::Right,
            ContactResult {
                hit: true,
                point: Vec2::new(field.half_width, ball_pos.y),
                normal: -Vec2::X,
                penetration: ball_pos.x + ball_radius - field.half_width,
            },
        ));
    }

    if ball_pos.y + ball_radius > field.top {
        hits.push((
            BoundaryKind::Generic,
            ContactResult {
                hit: true,
                point: Vec2::new(ball_pos.x, field.top),
                normal: -Vec2::Y,
                penetration: ball_pos.y + ball_radius - field.top,
            },
        ));
    } else if ball_pos.y - ball_radius < field.bottom {
        hits.push((
            BoundaryKind::Bottom,
            ContactResult {
                hit: true,
                point: Vec2::new(ball_pos.x, field.bottom),
                normal: Vec2::Y,
                penetration: field.bottom - (ball_pos.y - ball_radius),
            },
        ));
    }

    hits
}
