//! Anti-tunneling guard
//!
//! Three stacked checks run every tick after contacts are resolved:
//! 1. hard clamp of the position into the inset playfield,
//! 2. edge check: a body sitting on the inset edge and still heading out
//!    gets its direction renormalised and mirrored,
//! 3. one-step look-ahead: if `pos + vel * dt` would leave the inset
//!    playfield, the boundary bounce fires now.
//!
//! After `apply` the body's x lies inside `[inset_min_x, inset_max_x]`.

use glam::Vec2;

use super::body::{MovingBody, PhysicsBody};
use super::collision::BoundaryKind;
use crate::settings::PlayfieldSettings;
use crate::{UP, normalize_or};

/// Distance from an inset edge that counts as "on the edge"
const EDGE_SKIN: f32 = 1e-3;

/// Which safeguards fired this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuardReport {
    pub clamped: bool,
    pub edge_corrected: bool,
    pub predicted: Option<BoundaryKind>,
}

impl GuardReport {
    pub fn any(&self) -> bool {
        self.clamped || self.edge_corrected || self.predicted.is_some()
    }
}

/// Run all three safeguards
pub fn apply<B: PhysicsBody>(
    ball: &mut MovingBody,
    body: &mut B,
    field: &PlayfieldSettings,
    dt: f32,
) -> GuardReport {
    let mut report = GuardReport {
        clamped: clamp_to_inset(ball, body, field),
        ..Default::default()
    };
    report.edge_corrected = correct_edge_contact(ball, body, field);
    report.predicted = predict_escape(ball, body, field, dt);

    if report.any() {
        log::debug!(
            "Guard fired at {:?}: clamp={} edge={} predicted={:?}",
            body.position(),
            report.clamped,
            report.edge_corrected,
            report.predicted
        );
    }
    report
}

/// Safeguard 1: clamp overshoot; mirror the axis the body was escaping along
pub fn clamp_to_inset<B: PhysicsBody>(
    ball: &mut MovingBody,
    body: &mut B,
    field: &PlayfieldSettings,
) -> bool {
    let pos = body.position();
    let vel = body.velocity();
    let mut clamped = pos;
    let mut dir = ball.direction();

    if pos.x < field.inset_min_x() {
        clamped.x = field.inset_min_x();
        if vel.x < 0.0 {
            dir.x = dir.x.abs();
        }
    } else if pos.x > field.inset_max_x() {
        clamped.x = field.inset_max_x();
        if vel.x > 0.0 {
            dir.x = -dir.x.abs();
        }
    }
    if pos.y > field.inset_max_y() {
        clamped.y = field.inset_max_y();
        if vel.y > 0.0 {
            dir.y = -dir.y.abs();
        }
    }

    if clamped == pos {
        return false;
    }

    body.set_position(clamped);
    reapply(ball, body, dir);
    true
}

/// Safeguard 2: body resting on an inset edge but still heading outward
pub fn correct_edge_contact<B: PhysicsBody>(
    ball: &mut MovingBody,
    body: &mut B,
    field: &PlayfieldSettings,
) -> bool {
    let pos = body.position();
    let mut dir = ball.direction();
    let mut touched = false;

    if pos.x <= field.inset_min_x() + EDGE_SKIN && dir.x < 0.0 {
        dir.x = -dir.x;
        touched = true;
    } else if pos.x >= field.inset_max_x() - EDGE_SKIN && dir.x > 0.0 {
        dir.x = -dir.x;
        touched = true;
    }
    if pos.y >= field.inset_max_y() - EDGE_SKIN && dir.y > 0.0 {
        dir.y = -dir.y;
        touched = true;
    }

    if touched {
        reapply(ball, body, dir);
    }
    touched
}

/// Safeguard 3: bounce now if the next step would cross an inset edge the
/// body has not crossed yet
pub fn predict_escape<B: PhysicsBody>(
    ball: &mut MovingBody,
    body: &mut B,
    field: &PlayfieldSettings,
    dt: f32,
) -> Option<BoundaryKind> {
    let pos = body.position();
    let predicted = pos + body.velocity() * dt;

    let crossing = if predicted.x < field.inset_min_x() && pos.x >= field.inset_min_x() {
        Some((BoundaryKind::Left, Vec2::X))
    } else if predicted.x > field.inset_max_x() && pos.x <= field.inset_max_x() {
        Some((BoundaryKind::Right, -Vec2::X))
    } else if predicted.y > field.inset_max_y() && pos.y <= field.inset_max_y() {
        Some((BoundaryKind::Generic, -Vec2::Y))
    } else {
        None
    };

    let (kind, normal) = crossing?;
    ball.bounce_off_boundary(body, kind, normal, field);
    Some(kind)
}

fn reapply<B: PhysicsBody>(ball: &mut MovingBody, body: &mut B, dir: Vec2) {
    // Mirrored unit vectors stay unit; renormalise anyway so drift never accumulates
    let dir = normalize_or(dir, UP);
    if ball.set_direction(dir).is_ok() {
        body.set_velocity(ball.velocity());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::body::KinematicBody;
    use crate::consts::SIM_DT;
    use proptest::prelude::*;

    fn setup() -> (MovingBody, KinematicBody, PlayfieldSettings) {
        let tuning = Tuning::default();
        (
            MovingBody::new(&tuning.ball),
            KinematicBody::new(Vec2::ZERO, 0.25),
            tuning.playfield,
        )
    }

    #[test]
    fn test_inside_body_untouched() {
        let (mut ball, mut body, field) = setup();
        ball.set_direction(Vec2::new(0.6, 0.8)).unwrap();
        body.vel = ball.velocity();
        let report = apply(&mut ball, &mut body, &field, SIM_DT);
        assert!(!report.any());
        assert_eq!(body.pos, Vec2::ZERO);
    }

    #[test]
    fn test_overshoot_is_clamped_and_mirrored() {
        let (mut ball, mut body, field) = setup();
        ball.set_direction(Vec2::new(0.8, 0.6)).unwrap();
        body.pos = Vec2::new(8.7, 0.0);
        body.vel = ball.velocity();

        assert!(clamp_to_inset(&mut ball, &mut body, &field));
        assert_eq!(body.pos.x, field.inset_max_x());
        assert!(ball.direction().x < 0.0);
        assert!(body.vel.x < 0.0);
    }

    #[test]
    fn test_edge_contact_turns_body_around() {
        let (mut ball, mut body, field) = setup();
        ball.set_direction(Vec2::new(-0.8, 0.6)).unwrap();
        body.pos = Vec2::new(field.inset_min_x(), 1.0);
        assert!(correct_edge_contact(&mut ball, &mut body, &field));
        assert!(ball.direction().x > 0.0);
    }

    #[test]
    fn test_predicted_escape_bounces_early() {
        let (mut ball, mut body, field) = setup();
        ball.set_direction(Vec2::new(0.99, 0.14)).unwrap();
        body.pos = Vec2::new(8.15, 0.0);
        body.vel = ball.velocity();

        let kind = predict_escape(&mut ball, &mut body, &field, SIM_DT);
        assert_eq!(kind, Some(BoundaryKind::Right));
        assert!(ball.direction().x < 0.0);
        assert!(ball.direction().y >= 0.3 - 1e-6);
    }

    proptest! {
        #[test]
        fn prop_x_stays_in_inset(
            x in -12.0f32..12.0, y in -5.0f32..12.0,
            dx in -1.0f32..1.0, dy in -1.0f32..1.0,
            speed in 0.0f32..30.0,
        ) {
            let (mut ball, mut body, field) = setup();
            if ball.set_direction(Vec2::new(dx, dy)).is_err() {
                return Ok(());
            }
            body.pos = Vec2::new(x, y);
            body.vel = ball.direction() * speed;
            apply(&mut ball, &mut body, &field, SIM_DT);
            prop_assert!(body.pos.x >= field.inset_min_x() - 1e-5);
            prop_assert!(body.pos.x <= field.inset_max_x() + 1e-5);
            prop_assert!((ball.direction().length() - 1.0).abs() < 1e-4);
        }
    }
}
