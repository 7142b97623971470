//! SDF helpers for the obstacle look-ahead probe
//!
//! The probe sphere-traces along the ball direction against the union of
//! every solid in the field, which stays cheap for a few dozen boxes.

use glam::Vec2;

use super::aabb::Aabb;

/// Signed distance to an axis-aligned box
#[inline]
pub fn sd_box(p: Vec2, bounds: &Aabb) -> f32 {
    let d = (p - bounds.center).abs() - bounds.half_extents;
    d.max(Vec2::ZERO).length() + d.x.max(d.y).min(0.0)
}

/// Sphere-trace from `origin` along `dir` until a surface is within
/// `radius` or `max_distance` is exhausted. Returns the travelled distance.
pub fn raymarch<F>(
    origin: Vec2,
    dir: Vec2,
    max_distance: f32,
    radius: f32,
    max_steps: usize,
    sdf: F,
) -> Option<f32>
where
    F: Fn(Vec2) -> f32,
{
    if max_distance <= 0.0 || dir.length_squared() < crate::EPSILON_SQ {
        return None;
    }
    let dir = dir.normalize();

    let mut t = 0.0;
    for _ in 0..max_steps {
        let p = origin + dir * t;
        let d = sdf(p);

        if d < radius {
            return Some(t);
        }

        // Step by distance to surface, never less than a sliver
        t += (d - radius).max(0.01);
        if t > max_distance {
            break;
        }
    }

    None
}
