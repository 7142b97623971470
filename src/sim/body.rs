//! Moving-body state and per-tick step correction
//!
//! The ball is meant to travel at constant speed along `direction` between
//! collisions. The host physics engine integrates it and may drift it
//! (friction, numerical error), so every tick the measured velocity is
//! pulled back onto `direction * speed`, clamped into the legal speed band,
//! and checked against a short look-ahead probe.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use super::collision::{BoundaryKind, SurfaceCategory};
use super::deflect;
use crate::error::SimError;
use crate::settings::{BallSettings, PlayfieldSettings};
use crate::{UP, angle_between_deg, normalize_or};

/// Read/write access to the engine-side rigid body
pub trait PhysicsBody {
    fn position(&self) -> Vec2;
    fn set_position(&mut self, pos: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, vel: Vec2);
}

/// Short ray-cast query against the engine's colliders
pub trait RayProbe {
    /// Category of the first collider within `max_distance` along `dir`
    fn probe(&self, origin: Vec2, dir: Vec2, max_distance: f32) -> Option<SurfaceCategory>;
}

/// Probe that never sees anything
pub struct NoProbe;

impl RayProbe for NoProbe {
    fn probe(&self, _origin: Vec2, _dir: Vec2, _max_distance: f32) -> Option<SurfaceCategory> {
        None
    }
}

/// Simple kinematic body: the built-in stand-in for an engine rigid body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl KinematicBody {
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
        }
    }

    /// Explicit Euler step
    pub fn integrate(&mut self, dt: f32) {
        self.pos += self.vel * dt;
    }
}

impl PhysicsBody for KinematicBody {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn set_position(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    fn velocity(&self) -> Vec2 {
        self.vel
    }

    fn set_velocity(&mut self, vel: Vec2) {
        self.vel = vel;
    }
}

/// What step correction did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Correction {
    /// Velocity re-derived from direction * speed
    pub rederived: bool,
    /// Magnitude clamped to the safe ceiling
    pub capped: bool,
    /// Magnitude raised to the floor
    pub floored: bool,
    /// Probe saw an obstacle while overspeeding
    pub probe_braked: bool,
}

/// The ball's intended motion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovingBody {
    direction: Vec2,
    pub speed: f32,
    pub max_speed: f32,
    pub min_speed_ratio: f32,
}

impl MovingBody {
    pub fn new(settings: &BallSettings) -> Self {
        Self {
            direction: UP,
            speed: settings.speed,
            max_speed: settings.max_speed,
            min_speed_ratio: settings.min_speed_ratio,
        }
    }

    #[inline]
    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    /// Replace the direction; zero or non-finite input is a contract violation
    pub fn set_direction(&mut self, direction: Vec2) -> Result<(), SimError> {
        if !direction.is_finite() || direction.length_squared() < crate::EPSILON_SQ {
            return Err(SimError::CorruptDirection {
                x: direction.x,
                y: direction.y,
            });
        }
        self.direction = direction.normalize();
        Ok(())
    }

    /// Nominal velocity
    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.direction * self.speed
    }

    fn check_direction(&self) -> Result<(), SimError> {
        let d = self.direction;
        if d.is_finite() && (d.length() - 1.0).abs() < 1e-3 {
            Ok(())
        } else {
            Err(SimError::CorruptDirection { x: d.x, y: d.y })
        }
    }

    /// Re-assert velocity toward `direction * speed`, clamp it into
    /// `[min_speed_ratio * speed, safe max]` and brake before an imminent
    /// obstacle when overspeeding.
    pub fn correct_velocity<B: PhysicsBody, P: RayProbe + ?Sized>(
        &mut self,
        body: &mut B,
        probe: &P,
        settings: &BallSettings,
    ) -> Result<Correction, SimError> {
        self.check_direction()?;

        let mut report = Correction::default();
        let target = self.velocity();
        let mut vel = body.velocity();

        let drifted_heading = vel.length_squared() < crate::EPSILON_SQ
            || angle_between_deg(vel, self.direction) > settings.angle_tolerance;
        let drifted_speed = (vel.length() - self.speed).abs() > settings.speed_tolerance;
        if drifted_heading || drifted_speed {
            vel = target;
            report.rederived = true;
        }

        let ceiling = settings.safe_max_speed().min(self.max_speed);
        let floor = self.speed * self.min_speed_ratio;
        let magnitude = vel.length();
        if magnitude > ceiling {
            vel = vel / magnitude * ceiling;
            report.capped = true;
        } else if magnitude < floor {
            vel = normalize_or(vel, self.direction) * floor;
            report.floored = true;
        }

        if vel.length() > self.speed * settings.overspeed_ratio
            && probe
                .probe(body.position(), self.direction, settings.probe_distance)
                .is_some()
        {
            vel = target;
            report.probe_braked = true;
        }

        body.set_velocity(vel);
        Ok(report)
    }

    /// Bounce off an obstacle or generic surface using its contact normal.
    ///
    /// `normal` points from the surface toward the ball. When the ball is
    /// already moving away from the surface (a second contact in the same
    /// step) the direction is kept, so stacked contacts cannot cancel.
    pub fn notify_hit_and_bounce<B: PhysicsBody>(&mut self, body: &mut B, normal: Vec2) {
        let n = normalize_or(normal, UP);
        if self.direction.dot(n) < 0.0 {
            self.direction = deflect::deflect_on_surface(self.direction, n);
        }
        body.set_velocity(self.velocity());
    }

    /// Paddle response: offset-mapped angle plus jitter, clamped so the
    /// trajectory is never shallower than `min_angle` above horizontal
    pub fn bounce_off_paddle<B: PhysicsBody, R: Rng>(
        &mut self,
        body: &mut B,
        contact_point: Vec2,
        paddle: &Aabb,
        settings: &BallSettings,
        rng: &mut R,
    ) {
        let mut angle = deflect::paddle_angle(
            contact_point.x,
            paddle.center.x,
            paddle.half_width(),
            settings.max_angle,
        );
        if settings.random_angle_range > 0.0 {
            angle += rng.random_range(-settings.random_angle_range..=settings.random_angle_range);
        }
        let steepest_tilt = 90.0 - settings.min_angle;
        angle = angle.clamp(-steepest_tilt, steepest_tilt);

        self.direction = deflect::upward_from_angle(angle);
        body.set_velocity(self.velocity());
    }

    /// Wall bounce: stop, point away from the wall, teleport just inside the
    /// inset playfield, then relaunch at nominal speed
    pub fn bounce_off_boundary<B: PhysicsBody>(
        &mut self,
        body: &mut B,
        boundary: BoundaryKind,
        normal: Vec2,
        field: &PlayfieldSettings,
    ) {
        body.set_velocity(Vec2::ZERO);

        let normal = boundary.reflect_normal().unwrap_or_else(|| normalize_or(normal, UP));
        self.direction = deflect::deflect_on_boundary(self.direction, normal);

        let skin = (field.inset * 0.25).min(0.1);
        let mut pos = body.position();
        match boundary {
            BoundaryKind::Left => pos.x = field.inset_min_x() + skin,
            BoundaryKind::Right => pos.x = field.inset_max_x() - skin,
            BoundaryKind::Generic | BoundaryKind::Bottom => {
                pos.x = pos.x.clamp(field.inset_min_x(), field.inset_max_x());
                pos.y = pos.y.min(field.inset_max_y());
            }
        }
        body.set_position(pos);
        body.set_velocity(self.velocity());
    }

    /// Lost ball: back to the origin heading straight up
    pub fn respawn<B: PhysicsBody>(&mut self, body: &mut B, origin: Vec2) {
        self.direction = UP;
        body.set_position(origin);
        body.set_velocity(self.velocity());
    }
}
