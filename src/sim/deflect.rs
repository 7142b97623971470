//! Deflection rules
//!
//! Pure functions mapping an incoming direction plus contact geometry to an
//! outgoing unit direction. Angles are in degrees measured from vertical.
//! Every output is a finite unit vector.

use glam::Vec2;

use crate::{UP, normalize_or, sign_or_positive};

/// Surface bounces never leave the ball flatter than this
pub const MIN_SURFACE_VERTICAL: f32 = 0.1;
/// Boundary bounces never leave the ball flatter than this
pub const MIN_BOUNDARY_VERTICAL: f32 = 0.3;

/// Standard reflection: d' = d - 2(d·n)n
#[inline]
pub fn reflect(direction: Vec2, normal: Vec2) -> Vec2 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Return a unit vector whose vertical magnitude is at least `min_vertical`.
///
/// Signs of both components are preserved; a zero vertical component is
/// pushed upward.
pub fn with_min_vertical(direction: Vec2, min_vertical: f32) -> Vec2 {
    let d = normalize_or(direction, UP);
    if d.y.abs() >= min_vertical {
        return d;
    }
    let y = min_vertical * sign_or_positive(d.y);
    let x = (1.0 - y * y).max(0.0).sqrt() * sign_or_positive(d.x);
    Vec2::new(x, y)
}

/// Paddle deflection angle for a contact, before jitter.
///
/// `t = (contact.x - center.x) / (2 * half_width)` clamped to [-0.5, 0.5];
/// the full range of `t` spans `±max_angle`, so a contact halfway to the
/// edge deflects by `max_angle / 2` and the edge itself by `max_angle`.
pub fn paddle_angle(contact_x: f32, paddle_center_x: f32, paddle_half_width: f32, max_angle: f32) -> f32 {
    if paddle_half_width <= 0.0 {
        return 0.0;
    }
    let t = ((contact_x - paddle_center_x) / (2.0 * paddle_half_width)).clamp(-0.5, 0.5);
    2.0 * t * max_angle
}

/// Unit direction at `angle` degrees from vertical, always pointing upward
pub fn upward_from_angle(angle: f32) -> Vec2 {
    let rad = angle.to_radians();
    let mut d = normalize_or(Vec2::new(rad.sin(), rad.cos()), UP);
    if d.y < 0.0 {
        d.y = -d.y;
    }
    d
}

/// New direction after the ball hits the paddle
pub fn deflect_on_paddle(
    contact_point: Vec2,
    paddle_center: Vec2,
    paddle_half_width: f32,
    max_angle: f32,
) -> Vec2 {
    upward_from_angle(paddle_angle(
        contact_point.x,
        paddle_center.x,
        paddle_half_width,
        max_angle,
    ))
}

/// Mirror reflection off a surface, then forbid near-horizontal results
pub fn deflect_on_surface(direction: Vec2, normal: Vec2) -> Vec2 {
    let n = normalize_or(normal, UP);
    let d = normalize_or(direction, UP);
    with_min_vertical(reflect(d, n), MIN_SURFACE_VERTICAL)
}

/// Direction after a boundary bounce: pointing away from the wall along
/// every axis the wall normal constrains, never flatter than
/// [`MIN_BOUNDARY_VERTICAL`]
pub fn deflect_on_boundary(direction: Vec2, normal: Vec2) -> Vec2 {
    let n = normalize_or(normal, UP);
    let mut d = normalize_or(direction, UP);

    if n.x != 0.0 && d.x * n.x < 0.0 {
        d.x = -d.x;
    }
    if n.y != 0.0 && d.y * n.y < 0.0 {
        d.y = -d.y;
    }

    with_min_vertical(d, MIN_BOUNDARY_VERTICAL)
}
