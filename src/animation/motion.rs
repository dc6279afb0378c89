//! Per-mode update routines.
//!
//! A [`Motion`] is one runnable mode together with the parameters it copied at
//! start and whatever per-run state it keeps. The animator calls
//! [`Motion::advance`] once per tick; every formula is a function of accumulated
//! elapsed time (or of `dt` for rate-limited relational moves), never of the tick
//! count, so results do not depend on frame rate.

use glam::{EulerRot, Mat3, Quat, Vec3};
use hecs::Entity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::Transform;

use super::mode::{AnimationMode, IndependentMode, RelationalMode, RelationalRequest};
use super::params::AnimationParameters;
use super::snapshot::TransformSnapshot;
use super::target::TargetLookup;

/// Length of the snap transition in seconds.
pub const SNAP_TRANSITION_SECS: f32 = 0.5;

/// Distance at which a path waypoint counts as reached.
pub const ARRIVAL_EPSILON: f32 = 1e-3;

/// Time view handed to a routine for one tick.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Clock {
    /// Run time including this tick.
    pub elapsed: f32,
    /// Length of this tick.
    pub dt: f32,
}

/// What a routine wants after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Step {
    Continue,
    /// Run is over. `restore` selects between snapshot restore and keeping the
    /// pose the routine left behind.
    Finished { restore: bool },
}

/// Active routine of a run.
#[derive(Clone, Debug)]
pub(crate) enum Motion {
    Hover(Hover),
    Wobble(Wobble),
    Spin(Spin),
    Shake(Shake),
    Bounce(Bounce),
    Scale(Pulse),
    Orbit(Orbit),
    LookAt(LookAt),
    Follow(Follow),
    MoveAlongPath(PathMove),
    SnapToObject(Snap),
}

impl Motion {
    /// Build the routine for an independent mode. `None` has no routine.
    pub fn independent(mode: IndependentMode, params: &AnimationParameters) -> Option<Self> {
        let motion = match mode {
            IndependentMode::None => return None,
            IndependentMode::Hover => Motion::Hover(Hover {
                speed: params.hover_speed,
                distance: params.hover_distance,
            }),
            IndependentMode::Wobble => Motion::Wobble(Wobble {
                speed: params.wobble_speed,
                angle: params.wobble_angle,
                two_axis: params.wobble_two_axis,
            }),
            IndependentMode::Spin => Motion::Spin(Spin {
                speed: params.spin_speed,
            }),
            IndependentMode::Shake => Motion::Shake(Shake {
                duration: params.shake_duration,
                magnitude: params.shake_magnitude,
                rotation_angle: params.shake_rotation_angle,
                rng: StdRng::seed_from_u64(params.shake_seed.unwrap_or_else(rand::random)),
            }),
            IndependentMode::Bounce => Motion::Bounce(Bounce {
                speed: params.bounce_speed,
                height: params.bounce_height,
                squash: params.squash_stretch_ratio,
            }),
            IndependentMode::Scale => Motion::Scale(Pulse {
                speed: params.scale_speed,
                ratio: params.scale_ratio,
            }),
        };
        Some(motion)
    }

    /// Build the routine for a relational request, starting from `current`.
    pub fn relational(
        request: &RelationalRequest,
        params: &AnimationParameters,
        current: &Transform,
    ) -> Self {
        match request {
            RelationalRequest::Orbit { target } => Motion::Orbit(Orbit {
                target: *target,
                radius: params.orbit_radius,
                speed: params.orbit_speed,
                duration: params.orbit_duration,
            }),
            RelationalRequest::LookAt { target } => Motion::LookAt(LookAt {
                target: *target,
                speed: params.look_at_speed,
                duration: params.look_at_duration,
            }),
            RelationalRequest::Follow { target } => Motion::Follow(Follow {
                target: *target,
                speed: params.follow_speed,
                stop_distance: params.follow_stop_distance,
                duration: params.follow_duration,
            }),
            RelationalRequest::MoveAlongPath { waypoints } => Motion::MoveAlongPath(PathMove {
                waypoints: waypoints.clone(),
                cursor: 0,
                speed: params.path_move_speed,
                duration: params.path_move_duration,
            }),
            RelationalRequest::SnapToObject { target } => Motion::SnapToObject(Snap {
                target: *target,
                rotate: params.snap_rotation,
                start_position: current.position,
                start_rotation: current.rotation,
            }),
        }
    }

    pub fn mode(&self) -> AnimationMode {
        use AnimationMode::{Independent, Relational};
        match self {
            Motion::Hover(_) => Independent(IndependentMode::Hover),
            Motion::Wobble(_) => Independent(IndependentMode::Wobble),
            Motion::Spin(_) => Independent(IndependentMode::Spin),
            Motion::Shake(_) => Independent(IndependentMode::Shake),
            Motion::Bounce(_) => Independent(IndependentMode::Bounce),
            Motion::Scale(_) => Independent(IndependentMode::Scale),
            Motion::Orbit(_) => Relational(RelationalMode::Orbit),
            Motion::LookAt(_) => Relational(RelationalMode::LookAt),
            Motion::Follow(_) => Relational(RelationalMode::Follow),
            Motion::MoveAlongPath(_) => Relational(RelationalMode::MoveAlongPath),
            Motion::SnapToObject(_) => Relational(RelationalMode::SnapToObject),
        }
    }

    /// Time after which the run settles and the snapshot is restored.
    ///
    /// `None` for runs that go on until stopped and for the snap, which ends on
    /// its own and keeps its final pose.
    pub fn budget(&self) -> Option<f32> {
        let bounded = |d: f32| (d > 0.0).then_some(d);
        match self {
            Motion::Shake(s) => Some(s.duration),
            Motion::Orbit(o) => bounded(o.duration),
            Motion::LookAt(l) => bounded(l.duration),
            Motion::Follow(f) => bounded(f.duration),
            Motion::MoveAlongPath(p) => bounded(p.duration),
            _ => None,
        }
    }

    /// Push every entity this routine reads into `out`.
    pub fn collect_referenced(&self, out: &mut Vec<Entity>) {
        match self {
            Motion::Orbit(o) => out.push(o.target),
            Motion::LookAt(l) => out.push(l.target),
            Motion::Follow(f) => out.push(f.target),
            Motion::SnapToObject(s) => out.push(s.target),
            Motion::MoveAlongPath(p) => out.extend_from_slice(&p.waypoints),
            _ => {}
        }
    }

    /// Index of the waypoint a path run is heading to.
    pub fn waypoint_cursor(&self) -> Option<usize> {
        match self {
            Motion::MoveAlongPath(p) => Some(p.cursor),
            _ => None,
        }
    }

    /// Compute this tick's pose.
    pub fn advance<L: TargetLookup + ?Sized>(
        &mut self,
        clock: Clock,
        origin: &TransformSnapshot,
        transform: &mut Transform,
        lookup: &L,
    ) -> Step {
        match self {
            Motion::Hover(m) => m.advance(clock, origin, transform),
            Motion::Wobble(m) => m.advance(clock, origin, transform),
            Motion::Spin(m) => m.advance(clock, origin, transform),
            Motion::Shake(m) => m.advance(clock, origin, transform),
            Motion::Bounce(m) => m.advance(clock, origin, transform),
            Motion::Scale(m) => m.advance(clock, origin, transform),
            Motion::Orbit(m) => m.advance(clock, transform, lookup),
            Motion::LookAt(m) => m.advance(clock, transform, lookup),
            Motion::Follow(m) => m.advance(clock, transform, lookup),
            Motion::MoveAlongPath(m) => m.advance(clock, transform, lookup),
            Motion::SnapToObject(m) => m.advance(clock, transform, lookup),
        }
    }
}

// ---------------------------------------------------------------------------
// Independent routines
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub(crate) struct Hover {
    speed: f32,
    distance: f32,
}

impl Hover {
    fn advance(&mut self, clock: Clock, origin: &TransformSnapshot, transform: &mut Transform) -> Step {
        let offset = (clock.elapsed * self.speed).sin() * self.distance;
        transform.position = origin.position + Vec3::Y * offset;
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Wobble {
    speed: f32,
    angle: f32,
    two_axis: bool,
}

impl Wobble {
    fn advance(&mut self, clock: Clock, origin: &TransformSnapshot, transform: &mut Transform) -> Step {
        let phase = clock.elapsed * self.speed;
        let amplitude = self.angle.to_radians();
        let tilt = if self.two_axis {
            Quat::from_euler(EulerRot::XYZ, phase.cos() * amplitude, 0.0, phase.sin() * amplitude)
        } else {
            Quat::from_rotation_z(phase.sin() * amplitude)
        };
        transform.rotation = origin.rotation * tilt;
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Spin {
    speed: f32,
}

impl Spin {
    fn advance(&mut self, clock: Clock, origin: &TransformSnapshot, transform: &mut Transform) -> Step {
        let degrees = (clock.elapsed * self.speed).rem_euclid(360.0);
        transform.rotation = origin.rotation * Quat::from_rotation_y(degrees.to_radians());
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Shake {
    duration: f32,
    magnitude: f32,
    rotation_angle: f32,
    rng: StdRng,
}

impl Shake {
    fn advance(&mut self, clock: Clock, origin: &TransformSnapshot, transform: &mut Transform) -> Step {
        // Expiry is handled by the animator through `budget`.
        let decay = (1.0 - clock.elapsed / self.duration).clamp(0.0, 1.0);

        let jitter = Vec3::new(
            self.rng.random_range(-1.0f32..=1.0),
            self.rng.random_range(-1.0f32..=1.0),
            self.rng.random_range(-1.0f32..=1.0),
        );
        transform.position = origin.position + jitter * (self.magnitude * decay);

        if self.rotation_angle > 0.0 {
            let max = (self.rotation_angle * decay).to_radians();
            let tilt = Quat::from_euler(
                EulerRot::XYZ,
                self.rng.random_range(-1.0f32..=1.0) * max,
                self.rng.random_range(-1.0f32..=1.0) * max,
                self.rng.random_range(-1.0f32..=1.0) * max,
            );
            transform.rotation = origin.rotation * tilt;
        }
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Bounce {
    speed: f32,
    height: f32,
    squash: f32,
}

impl Bounce {
    fn advance(&mut self, clock: Clock, origin: &TransformSnapshot, transform: &mut Transform) -> Step {
        let lift = (clock.elapsed * self.speed).sin().abs();
        transform.position = origin.position + Vec3::Y * (lift * self.height);

        // Squashed on contact (lift = 0), stretched at the apex (lift = 1).
        let f = self.squash * (2.0 * lift - 1.0);
        transform.scale = origin.scale * Vec3::new(1.0 - f, 1.0 + f, 1.0 - f);
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Pulse {
    speed: f32,
    ratio: f32,
}

impl Pulse {
    fn advance(&mut self, clock: Clock, origin: &TransformSnapshot, transform: &mut Transform) -> Step {
        let factor = 1.0 + (clock.elapsed * self.speed).sin() * self.ratio;
        transform.scale = origin.scale * factor;
        Step::Continue
    }
}

// ---------------------------------------------------------------------------
// Relational routines
// ---------------------------------------------------------------------------

const TARGET_LOST: Step = Step::Finished { restore: true };

#[derive(Clone, Debug)]
pub(crate) struct Orbit {
    target: Entity,
    radius: f32,
    speed: f32,
    duration: f32,
}

impl Orbit {
    fn advance<L: TargetLookup + ?Sized>(&mut self, clock: Clock, transform: &mut Transform, lookup: &L) -> Step {
        let Some(center) = lookup.transform_of(self.target) else {
            return TARGET_LOST;
        };
        let angle = (clock.elapsed * self.speed).rem_euclid(360.0).to_radians();
        let offset = Quat::from_rotation_y(angle) * (Vec3::X * self.radius);
        transform.position = center.position + offset;
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct LookAt {
    target: Entity,
    speed: f32,
    duration: f32,
}

impl LookAt {
    fn advance<L: TargetLookup + ?Sized>(&mut self, clock: Clock, transform: &mut Transform, lookup: &L) -> Step {
        let Some(target) = lookup.transform_of(self.target) else {
            return TARGET_LOST;
        };
        if let Some(goal) = look_rotation(target.position - transform.position, Vec3::Y) {
            let max_step = (self.speed * clock.dt).to_radians();
            transform.rotation = rotate_towards(transform.rotation, goal, max_step);
        }
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Follow {
    target: Entity,
    speed: f32,
    stop_distance: f32,
    duration: f32,
}

impl Follow {
    fn advance<L: TargetLookup + ?Sized>(&mut self, clock: Clock, transform: &mut Transform, lookup: &L) -> Step {
        let Some(target) = lookup.transform_of(self.target) else {
            return TARGET_LOST;
        };
        let to_target = target.position - transform.position;
        let distance = to_target.length();
        let stop_distance = self.stop_distance.max(0.0);
        if distance > stop_distance && distance > f32::EPSILON {
            let step = (self.speed * clock.dt).min(distance - stop_distance);
            transform.position += to_target / distance * step;
        }
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct PathMove {
    waypoints: Vec<Entity>,
    cursor: usize,
    speed: f32,
    duration: f32,
}

impl PathMove {
    fn advance<L: TargetLookup + ?Sized>(&mut self, clock: Clock, transform: &mut Transform, lookup: &L) -> Step {
        let mut points = Vec::with_capacity(self.waypoints.len());
        for &waypoint in &self.waypoints {
            match lookup.transform_of(waypoint) {
                Some(t) => points.push(t.position),
                None => return TARGET_LOST,
            }
        }
        if points.is_empty() {
            return TARGET_LOST;
        }

        let mut budget = self.speed * clock.dt;
        // At most one lap per tick, even if waypoints coincide.
        for _ in 0..=points.len() {
            let goal = points[self.cursor];
            let to_goal = goal - transform.position;
            let distance = to_goal.length();

            if distance <= ARRIVAL_EPSILON || distance <= budget {
                transform.position = goal;
                budget -= distance;
                self.cursor = (self.cursor + 1) % points.len();
                if budget <= 0.0 {
                    break;
                }
            } else {
                transform.position += to_goal / distance * budget;
                break;
            }
        }
        Step::Continue
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Snap {
    target: Entity,
    rotate: bool,
    start_position: Vec3,
    start_rotation: Quat,
}

impl Snap {
    fn advance<L: TargetLookup + ?Sized>(&mut self, clock: Clock, transform: &mut Transform, lookup: &L) -> Step {
        // Losing the target leaves the entity wherever the transition got to.
        let Some(target) = lookup.transform_of(self.target) else {
            return Step::Finished { restore: false };
        };

        if clock.elapsed >= SNAP_TRANSITION_SECS {
            transform.position = target.position;
            if self.rotate {
                transform.rotation = target.rotation;
            }
            return Step::Finished { restore: false };
        }

        let t = clock.elapsed / SNAP_TRANSITION_SECS;
        transform.position = self.start_position.lerp(target.position, t);
        if self.rotate {
            transform.rotation = self.start_rotation.slerp(target.rotation, t);
        }
        Step::Continue
    }
}

// ---------------------------------------------------------------------------
// Rotation helpers
// ---------------------------------------------------------------------------

/// Rotation whose +Z axis points along `forward`, keeping +Y as close to `up` as
/// possible. `None` when `forward` is zero or parallel to `up`.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Option<Quat> {
    let forward = forward.try_normalize()?;
    let right = up.cross(forward).try_normalize()?;
    let up = forward.cross(right);
    Some(Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize())
}

/// Turn `from` toward `to` by at most `max_angle` radians.
pub fn rotate_towards(from: Quat, to: Quat, max_angle: f32) -> Quat {
    let angle = from.angle_between(to);
    if angle <= max_angle || angle <= f32::EPSILON {
        to
    } else {
        from.slerp(to, max_angle / angle)
    }
}
