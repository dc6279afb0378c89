//! Per-entity animation state machine
//!
//! An [`Animator`] runs at most one motion at a time against its entity's
//! [`Transform`]. Every lifecycle call that ends a run (stop, mode switch,
//! replacement, disable) writes the captured [`TransformSnapshot`] back before
//! anything else touches the transform, so "stopped" always means "at the
//! original pose". Snap runs are the one exception: they finish on the target
//! and adopt that pose as the new baseline.

use glam::{Quat, Vec3};
use hecs::Entity;

use crate::scene::Transform;

use super::mode::{
    AnimationFamily, AnimationMode, IndependentMode, RelationalMode, RelationalRequest,
};
use super::motion::{Clock, Motion, Step};
use super::params::AnimationParameters;
use super::snapshot::TransformSnapshot;
use super::target::TargetLookup;

/// Observable lifecycle state of an animator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorState {
    /// Nothing running; the transform is left alone.
    Idle,
    /// A motion is active and will be advanced on the next tick.
    Running(AnimationMode),
    /// A bounded run just completed. Becomes `Idle` on the next tick or
    /// lifecycle call.
    Settled(AnimationMode),
}

/// Result of one [`Animator::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No run was active.
    Idle,
    /// The run advanced and keeps going.
    Continue,
    /// The run ended during this tick.
    Completed,
}

/// The single active run of an animator.
#[derive(Clone, Debug)]
pub struct RunState {
    elapsed: f32,
    motion: Motion,
}

impl RunState {
    fn new(motion: Motion) -> Self {
        Self { elapsed: 0.0, motion }
    }

    pub fn mode(&self) -> AnimationMode {
        self.motion.mode()
    }

    pub fn family(&self) -> AnimationFamily {
        self.motion.mode().family()
    }

    /// Seconds the run has been advanced for.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }
}

/// Procedural animator component.
#[derive(Clone, Debug)]
pub struct Animator {
    independent_mode: IndependentMode,
    relational: Option<RelationalRequest>,
    family: Option<AnimationFamily>,
    parameters: AnimationParameters,
    snapshot: Option<TransformSnapshot>,
    run: Option<RunState>,
    state: AnimatorState,
    enabled: bool,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new()
    }
}

impl Animator {
    /// Create an idle animator with no mode selected and no baseline.
    pub fn new() -> Self {
        Self {
            independent_mode: IndependentMode::None,
            relational: None,
            family: None,
            parameters: AnimationParameters::default(),
            snapshot: None,
            run: None,
            state: AnimatorState::Idle,
            enabled: true,
        }
    }

    /// Create an animator whose baseline is the given transform.
    pub fn with_baseline(transform: &Transform) -> Self {
        let mut animator = Self::new();
        animator.capture_baseline(transform);
        animator
    }

    // -- Baseline --------------------------------------------------------

    /// Override the original pose used for restoration.
    pub fn set_original_transform(&mut self, position: Vec3, rotation: Quat, scale: Vec3) {
        self.snapshot = Some(TransformSnapshot::new(position, rotation, scale));
    }

    /// Take the given transform as the original pose.
    pub fn capture_baseline(&mut self, transform: &Transform) {
        self.snapshot = Some(TransformSnapshot::capture(transform));
    }

    fn ensure_snapshot(&mut self, transform: &Transform) {
        if self.snapshot.is_none() {
            self.snapshot = Some(TransformSnapshot::capture(transform));
        }
    }

    // -- Lifecycle -------------------------------------------------------

    /// Select an independent mode.
    ///
    /// Selecting the current mode is a no-op. Otherwise the active run (of either
    /// family) is stopped, the pose restored and, when `live`, the new mode
    /// started right away. Returns whether a run was started.
    pub fn set_mode(
        &mut self,
        mode: IndependentMode,
        transform: &mut Transform,
        params: &AnimationParameters,
        live: bool,
    ) -> bool {
        if mode == self.independent_mode && self.family != Some(AnimationFamily::Relational) {
            return false;
        }

        self.stop(transform);
        self.independent_mode = mode;
        self.relational = None;
        self.family = (mode != IndependentMode::None).then_some(AnimationFamily::Independent);
        self.parameters = *params;

        live && self.start(transform, params)
    }

    /// Start the selected independent mode.
    ///
    /// Does nothing when no independent mode is selected or the animator is
    /// disabled. Any active run is stopped first.
    pub fn start(&mut self, transform: &mut Transform, params: &AnimationParameters) -> bool {
        if !self.enabled {
            log::debug!("Animator disabled, not starting {}", self.independent_mode);
            return false;
        }
        let Some(motion) = Motion::independent(self.independent_mode, params) else {
            return false;
        };

        self.stop(transform);
        self.ensure_snapshot(transform);
        self.relational = None;
        self.family = Some(AnimationFamily::Independent);
        self.parameters = *params;
        self.launch(motion);
        true
    }

    /// Orbit around `target`.
    pub fn start_orbit(
        &mut self,
        transform: &mut Transform,
        target: Option<Entity>,
        params: &AnimationParameters,
    ) -> bool {
        match target {
            Some(target) => self.start_relational(transform, RelationalRequest::Orbit { target }, params),
            None => self.refuse(transform, RelationalMode::Orbit, "no target"),
        }
    }

    /// Turn to face `target`.
    pub fn start_look_at(
        &mut self,
        transform: &mut Transform,
        target: Option<Entity>,
        params: &AnimationParameters,
    ) -> bool {
        match target {
            Some(target) => self.start_relational(transform, RelationalRequest::LookAt { target }, params),
            None => self.refuse(transform, RelationalMode::LookAt, "no target"),
        }
    }

    /// Chase `target` until within the stop distance.
    pub fn start_follow(
        &mut self,
        transform: &mut Transform,
        target: Option<Entity>,
        params: &AnimationParameters,
    ) -> bool {
        match target {
            Some(target) => self.start_relational(transform, RelationalRequest::Follow { target }, params),
            None => self.refuse(transform, RelationalMode::Follow, "no target"),
        }
    }

    /// Travel a looping waypoint path. Needs at least two waypoints.
    pub fn start_move_along_path(
        &mut self,
        transform: &mut Transform,
        waypoints: &[Entity],
        params: &AnimationParameters,
    ) -> bool {
        let request = RelationalRequest::MoveAlongPath {
            waypoints: waypoints.to_vec(),
        };
        self.start_relational(transform, request, params)
    }

    /// Glide onto `target`'s pose and stay there.
    pub fn start_snap_to_object(
        &mut self,
        transform: &mut Transform,
        target: Option<Entity>,
        params: &AnimationParameters,
    ) -> bool {
        match target {
            Some(target) => {
                self.start_relational(transform, RelationalRequest::SnapToObject { target }, params)
            }
            None => self.refuse(transform, RelationalMode::SnapToObject, "no target"),
        }
    }

    /// Start any relational run.
    ///
    /// A request without enough waypoints stops the active run and clears the
    /// mode selection. A disabled animator ignores the call.
    pub fn start_relational(
        &mut self,
        transform: &mut Transform,
        request: RelationalRequest,
        params: &AnimationParameters,
    ) -> bool {
        if !request.is_valid() {
            return self.refuse(transform, request.mode(), "not enough waypoints");
        }
        if !self.enabled {
            log::debug!("Animator disabled, not starting {}", request.mode());
            return false;
        }

        self.stop(transform);
        self.ensure_snapshot(transform);
        let motion = Motion::relational(&request, params, transform);
        self.independent_mode = IndependentMode::None;
        self.relational = Some(request);
        self.family = Some(AnimationFamily::Relational);
        self.parameters = *params;
        self.launch(motion);
        true
    }

    /// Record a relational request without starting it.
    ///
    /// Any active run is stopped. The request is what a later re-enable will
    /// start. Invalid requests are refused like in [`Animator::start_relational`].
    pub fn select_relational(
        &mut self,
        transform: &mut Transform,
        request: RelationalRequest,
        params: &AnimationParameters,
    ) -> bool {
        if !request.is_valid() {
            return self.refuse(transform, request.mode(), "not enough waypoints");
        }
        self.stop(transform);
        self.independent_mode = IndependentMode::None;
        self.relational = Some(request);
        self.family = Some(AnimationFamily::Relational);
        self.parameters = *params;
        true
    }

    /// Failed precondition: stop, restore and fall back to no mode.
    fn refuse(&mut self, transform: &mut Transform, mode: RelationalMode, reason: &str) -> bool {
        log::debug!("Refusing to start {}: {}", mode, reason);
        self.stop(transform);
        self.independent_mode = IndependentMode::None;
        self.relational = None;
        self.family = None;
        false
    }

    fn launch(&mut self, motion: Motion) {
        let run = RunState::new(motion);
        log::debug!("Animator starting {}", run.mode());
        self.state = AnimatorState::Running(run.mode());
        self.run = Some(run);
    }

    /// Cancel the active run and restore the original pose.
    ///
    /// Restores even when nothing is running; calling it repeatedly leaves the
    /// same transform.
    pub fn stop(&mut self, transform: &mut Transform) {
        if let Some(run) = self.run.take() {
            log::debug!("Animator stopping {} after {:.3}s", run.mode(), run.elapsed);
        }
        if let Some(snapshot) = &self.snapshot {
            snapshot.restore(transform);
        }
        self.state = AnimatorState::Idle;
    }

    /// Enable or disable the animator.
    ///
    /// Disabling stops (restoring the pose) and forgets the baseline. Re-enabling
    /// restarts the selected mode, if any, from a freshly captured baseline.
    /// Returns whether a run was started.
    pub fn set_enabled(&mut self, enabled: bool, transform: &mut Transform) -> bool {
        if enabled == self.enabled {
            return false;
        }

        if !enabled {
            self.stop(transform);
            self.snapshot = None;
            self.enabled = false;
            return false;
        }

        self.enabled = true;
        let params = self.parameters;
        match (self.family, self.relational.clone()) {
            (Some(AnimationFamily::Relational), Some(request)) => {
                self.start_relational(transform, request, &params)
            }
            (Some(AnimationFamily::Independent), _) => self.start(transform, &params),
            _ => false,
        }
    }

    // -- Per-frame -------------------------------------------------------

    /// Advance the active run by `dt` seconds.
    ///
    /// Bounded runs are checked against their time budget before their routine
    /// runs; once it is spent the pose is restored and the tick reports
    /// `Completed`. Negative deltas count as zero.
    pub fn tick<L: TargetLookup + ?Sized>(
        &mut self,
        dt: f32,
        transform: &mut Transform,
        lookup: &L,
    ) -> TickOutcome {
        if let AnimatorState::Settled(_) = self.state {
            self.state = AnimatorState::Idle;
        }
        if !self.enabled {
            return TickOutcome::Idle;
        }
        let Some(origin) = self.snapshot else {
            return TickOutcome::Idle;
        };
        let Some(run) = self.run.as_mut() else {
            return TickOutcome::Idle;
        };

        run.elapsed += dt.max(0.0);
        let step = match run.motion.budget() {
            Some(budget) if run.elapsed >= budget => Step::Finished { restore: true },
            _ => {
                let clock = Clock { elapsed: run.elapsed, dt: dt.max(0.0) };
                run.motion.advance(clock, &origin, transform, lookup)
            }
        };

        match step {
            Step::Continue => TickOutcome::Continue,
            Step::Finished { restore } => {
                self.settle(transform, restore);
                TickOutcome::Completed
            }
        }
    }

    fn settle(&mut self, transform: &mut Transform, restore: bool) {
        let Some(run) = self.run.take() else {
            return;
        };
        if restore {
            if let Some(snapshot) = &self.snapshot {
                snapshot.restore(transform);
            }
        } else {
            // The reached pose is the intended end state.
            self.snapshot = Some(TransformSnapshot::capture(transform));
        }
        log::debug!("Animator settled {} after {:.3}s", run.mode(), run.elapsed);
        self.state = AnimatorState::Settled(run.mode());
    }

    // -- Accessors -------------------------------------------------------

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The active run, if any.
    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    /// Seconds the active run has been advanced for (0 when idle).
    pub fn elapsed(&self) -> f32 {
        self.run.as_ref().map_or(0.0, |r| r.elapsed)
    }

    pub fn independent_mode(&self) -> IndependentMode {
        self.independent_mode
    }

    pub fn relational_mode(&self) -> RelationalMode {
        self.relational
            .as_ref()
            .map_or(RelationalMode::None, RelationalRequest::mode)
    }

    pub fn family(&self) -> Option<AnimationFamily> {
        self.family
    }

    /// Reference entity of the selected relational run.
    pub fn relational_target(&self) -> Option<Entity> {
        self.relational.as_ref().and_then(RelationalRequest::target)
    }

    /// Waypoints of the selected path run.
    pub fn path(&self) -> &[Entity] {
        self.relational
            .as_ref()
            .map_or(&[], RelationalRequest::waypoints)
    }

    /// Waypoint index an active path run is heading to.
    pub fn waypoint_cursor(&self) -> Option<usize> {
        self.run.as_ref().and_then(|r| r.motion.waypoint_cursor())
    }

    pub fn snapshot(&self) -> Option<&TransformSnapshot> {
        self.snapshot.as_ref()
    }

    /// Parameters copied at the most recent start.
    pub fn parameters(&self) -> &AnimationParameters {
        &self.parameters
    }

    /// Entities the active run reads this frame.
    pub fn collect_referenced(&self, out: &mut Vec<Entity>) {
        if let Some(run) = &self.run {
            run.motion.collect_referenced(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type Poses = HashMap<Entity, Transform>;

    fn start_pose() -> Transform {
        Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_x(0.3),
            Vec3::new(1.0, 1.5, 2.0),
        )
    }

    fn run_for(animator: &mut Animator, t: &mut Transform, lookup: &impl TargetLookup, ticks: usize, dt: f32) {
        for _ in 0..ticks {
            animator.tick(dt, t, lookup);
        }
    }

    #[test]
    fn test_new_animator_is_idle() {
        let animator = Animator::new();
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(animator.independent_mode(), IndependentMode::None);
        assert_eq!(animator.relational_mode(), RelationalMode::None);
        assert!(animator.family().is_none());
        assert!(animator.snapshot().is_none());
        assert!(animator.path().is_empty());
    }

    #[test]
    fn test_start_with_none_mode_is_noop() {
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(!animator.start(&mut t, &AnimationParameters::default()));
        assert!(!animator.is_running());
        assert_eq!(t, start_pose());
    }

    #[test]
    fn test_hover_periodicity() {
        let params = AnimationParameters {
            hover_speed: 1.0,
            hover_distance: 0.1,
            ..Default::default()
        };
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(animator.set_mode(IndependentMode::Hover, &mut t, &params, true));

        let dt = 1.0 / 60.0;
        let mut elapsed = 0.0f32;
        // Two full periods plus change.
        for _ in 0..(60.0 * 13.0) as usize {
            assert_eq!(animator.tick(dt, &mut t, &Poses::new()), TickOutcome::Continue);
            elapsed += dt;
            let expected = 0.1 * elapsed.sin();
            assert!((t.position.y - start_pose().position.y - expected).abs() < 1e-4);
        }
        assert!(elapsed > 4.0 * std::f32::consts::PI);
    }

    #[test]
    fn test_stop_restores_bit_for_bit() {
        let params = AnimationParameters::default();
        let lookup = Poses::new();
        for mode in IndependentMode::ALL.into_iter().skip(1) {
            let mut animator = Animator::new();
            let mut t = start_pose();
            assert!(animator.set_mode(mode, &mut t, &params, true));
            run_for(&mut animator, &mut t, &lookup, 7, 0.033);
            animator.stop(&mut t);
            assert_eq!(t, start_pose(), "mode {mode} did not restore");
        }
    }

    #[test]
    fn test_stop_twice_is_idempotent() {
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Bounce, &mut t, &AnimationParameters::default(), true);
        run_for(&mut animator, &mut t, &Poses::new(), 10, 0.05);
        animator.stop(&mut t);
        let first = t;
        animator.stop(&mut t);
        assert_eq!(t, first);
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[test]
    fn test_set_same_mode_is_noop() {
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Spin, &mut t, &params, true);
        run_for(&mut animator, &mut t, &Poses::new(), 5, 0.1);
        let elapsed = animator.elapsed();
        let pose = t;

        assert!(!animator.set_mode(IndependentMode::Spin, &mut t, &params, true));
        assert_eq!(animator.elapsed(), elapsed);
        assert_eq!(t, pose);
    }

    #[test]
    fn test_set_mode_not_live_only_selects() {
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(!animator.set_mode(IndependentMode::Wobble, &mut t, &params, false));
        assert_eq!(animator.independent_mode(), IndependentMode::Wobble);
        assert!(!animator.is_running());
        assert!(animator.start(&mut t, &params));
        assert_eq!(
            animator.state(),
            AnimatorState::Running(AnimationMode::Independent(IndependentMode::Wobble))
        );
    }

    #[test]
    fn test_mode_switch_restores_then_runs_new_mode() {
        let params = AnimationParameters::default();
        let lookup = Poses::new();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Hover, &mut t, &params, true);
        run_for(&mut animator, &mut t, &lookup, 10, 0.05);
        assert_ne!(t.position, start_pose().position);

        animator.set_mode(IndependentMode::Spin, &mut t, &params, true);
        assert_eq!(t, start_pose());
        assert_eq!(animator.elapsed(), 0.0);

        run_for(&mut animator, &mut t, &lookup, 10, 0.05);
        // Spin only rotates: no hover offset may leak through.
        assert_eq!(t.position, start_pose().position);
        assert_ne!(t.rotation, start_pose().rotation);
    }

    #[test]
    fn test_shake_settles_on_snapshot() {
        let params = AnimationParameters {
            shake_duration: 0.5,
            shake_magnitude: 0.3,
            shake_rotation_angle: 4.0,
            shake_seed: Some(3),
            ..Default::default()
        };
        let lookup = Poses::new();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Shake, &mut t, &params, true);

        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(animator.tick(0.125, &mut t, &lookup));
        }
        assert_eq!(outcomes.last(), Some(&TickOutcome::Completed));
        assert_eq!(t, start_pose());
        assert_eq!(
            animator.state(),
            AnimatorState::Settled(AnimationMode::Independent(IndependentMode::Shake))
        );

        for _ in 0..10 {
            assert_eq!(animator.tick(0.125, &mut t, &lookup), TickOutcome::Idle);
            assert_eq!(t, start_pose());
        }
        assert_eq!(animator.state(), AnimatorState::Idle);
    }

    #[test]
    fn test_null_target_refused() {
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(!animator.start_orbit(&mut t, None, &params));
        assert!(!animator.start_look_at(&mut t, None, &params));
        assert!(!animator.start_follow(&mut t, None, &params));
        assert!(!animator.start_snap_to_object(&mut t, None, &params));
        assert_eq!(animator.relational_mode(), RelationalMode::None);
        assert!(!animator.is_running());
        assert_eq!(t, start_pose());
    }

    #[test]
    fn test_short_path_refused() {
        let mut world = hecs::World::new();
        let a = world.spawn((Transform::identity(),));
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(!animator.start_move_along_path(&mut t, &[a], &AnimationParameters::default()));
        assert!(!animator.start_move_along_path(&mut t, &[], &AnimationParameters::default()));
        assert_eq!(animator.relational_mode(), RelationalMode::None);
        assert_eq!(t, start_pose());
    }

    #[test]
    fn test_path_visits_waypoints_in_order_then_restores() {
        let mut world = hecs::World::new();
        let a_pos = Vec3::ZERO;
        let a = world.spawn((Transform::from_position(a_pos),));
        let b = world.spawn((Transform::from_position(Vec3::new(2.0, 0.0, 0.0)),));
        let c = world.spawn((Transform::from_position(Vec3::new(2.0, 0.0, 2.0)),));

        let params = AnimationParameters {
            path_move_speed: 1.0,
            path_move_duration: 8.0,
            ..Default::default()
        };
        let baseline = Transform::from_position(a_pos);
        let mut t = baseline;
        let mut animator = Animator::new();
        assert!(animator.start_move_along_path(&mut t, &[a, b, c], &params));
        assert_eq!(animator.path(), &[a, b, c]);

        let mut visited = Vec::new();
        let mut last = animator.waypoint_cursor();
        let mut completed = false;
        for _ in 0..((8.0 / 0.05) as usize + 5) {
            if animator.tick(0.05, &mut t, &world) == TickOutcome::Completed {
                completed = true;
                break;
            }
            let cursor = animator.waypoint_cursor();
            if cursor != last {
                visited.push(cursor.unwrap());
                last = cursor;
            }
        }
        // Loop length is 2 + 2 + sqrt(8) ~ 6.83, so 8 seconds wraps past A.
        assert!(visited.starts_with(&[1, 2, 0, 1]), "visited {visited:?}");
        for pair in visited.windows(2) {
            assert_eq!(pair[1], (pair[0] + 1) % 3);
        }
        assert!(completed);
        assert_eq!(t, baseline);
    }

    #[test]
    fn test_target_lost_mid_run_restores() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(5.0, 0.0, 0.0)),));
        let params = AnimationParameters {
            orbit_duration: 0.0,
            ..Default::default()
        };
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(animator.start_orbit(&mut t, Some(anchor), &params));
        run_for(&mut animator, &mut t, &world, 5, 0.1);
        assert_ne!(t, start_pose());

        world.despawn(anchor).unwrap();
        assert_eq!(animator.tick(0.1, &mut t, &world), TickOutcome::Completed);
        assert_eq!(t, start_pose());
        assert!(!animator.is_running());
    }

    #[test]
    fn test_indefinite_orbit_keeps_running() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::identity(),));
        let params = AnimationParameters {
            orbit_duration: -1.0,
            ..Default::default()
        };
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.start_orbit(&mut t, Some(anchor), &params);
        for _ in 0..1000 {
            assert_eq!(animator.tick(0.1, &mut t, &world), TickOutcome::Continue);
        }
    }

    #[test]
    fn test_bounded_follow_restores() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(20.0, 0.0, 0.0)),));
        let params = AnimationParameters {
            follow_duration: 1.0,
            follow_speed: 2.0,
            ..Default::default()
        };
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.start_follow(&mut t, Some(anchor), &params);
        assert_eq!(animator.relational_target(), Some(anchor));

        let outcomes: Vec<_> = (0..4).map(|_| animator.tick(0.25, &mut t, &world)).collect();
        assert_eq!(outcomes[..3], [TickOutcome::Continue; 3]);
        assert_eq!(outcomes[3], TickOutcome::Completed);
        assert_eq!(t, start_pose());
    }

    #[test]
    fn test_snap_keeps_target_pose() {
        let mut world = hecs::World::new();
        let goal = Transform::new(Vec3::new(3.0, 1.0, 0.0), Quat::from_rotation_y(0.5), Vec3::ONE);
        let anchor = world.spawn((goal,));
        let params = AnimationParameters {
            snap_rotation: true,
            ..Default::default()
        };
        let mut animator = Animator::new();
        let mut t = start_pose();
        assert!(animator.start_snap_to_object(&mut t, Some(anchor), &params));

        run_for(&mut animator, &mut t, &world, 10, 0.1);
        assert!(!animator.is_running());
        assert_eq!(t.position, goal.position);
        assert_eq!(t.rotation, goal.rotation);
        assert_eq!(t.scale, start_pose().scale);

        // Stopping afterwards keeps the snapped pose.
        animator.stop(&mut t);
        assert_eq!(t.position, goal.position);
    }

    #[test]
    fn test_restart_while_running_replaces_run() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(4.0, 0.0, 0.0)),));
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();

        animator.set_mode(IndependentMode::Hover, &mut t, &params, true);
        run_for(&mut animator, &mut t, &world, 5, 0.1);

        assert!(animator.start_orbit(&mut t, Some(anchor), &params));
        // The hover run was stopped and the pose restored before orbit began.
        assert_eq!(t, start_pose());
        assert_eq!(animator.family(), Some(AnimationFamily::Relational));
        assert_eq!(animator.relational_mode(), RelationalMode::Orbit);
        assert_eq!(animator.elapsed(), 0.0);

        animator.tick(0.1, &mut t, &world);
        assert_eq!(
            animator.state(),
            AnimatorState::Running(AnimationMode::Relational(RelationalMode::Orbit))
        );
    }

    #[test]
    fn test_set_mode_cancels_relational_run() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(4.0, 0.0, 0.0)),));
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.start_follow(&mut t, Some(anchor), &params);
        run_for(&mut animator, &mut t, &world, 5, 0.1);

        animator.set_mode(IndependentMode::None, &mut t, &params, true);
        assert_eq!(t, start_pose());
        assert!(!animator.is_running());
        assert_eq!(animator.relational_mode(), RelationalMode::None);
    }

    #[test]
    fn test_selected_relational_resumes_on_enable() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(4.0, 0.0, 0.0)),));
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();

        assert!(animator.select_relational(&mut t, RelationalRequest::Follow { target: anchor }, &params));
        assert_eq!(animator.relational_mode(), RelationalMode::Follow);
        assert!(!animator.is_running());

        assert!(animator.start_follow(&mut t, Some(anchor), &params));
        animator.set_enabled(false, &mut t);
        assert!(animator.set_enabled(true, &mut t));
        assert_eq!(
            animator.state(),
            AnimatorState::Running(AnimationMode::Relational(RelationalMode::Follow))
        );
    }

    #[test]
    fn test_baseline_override() {
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let intended = Transform::from_position(Vec3::new(0.0, 10.0, 0.0));
        animator.set_original_transform(intended.position, intended.rotation, intended.scale);

        let mut t = start_pose();
        animator.set_mode(IndependentMode::Spin, &mut t, &params, true);
        // Switching mode restored onto the supplied baseline.
        assert_eq!(t, intended);
        run_for(&mut animator, &mut t, &Poses::new(), 3, 0.1);
        animator.stop(&mut t);
        assert_eq!(t, intended);
    }

    #[test]
    fn test_disable_restores_and_reenable_recaptures() {
        let params = AnimationParameters::default();
        let lookup = Poses::new();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Hover, &mut t, &params, true);
        run_for(&mut animator, &mut t, &lookup, 5, 0.1);

        assert!(!animator.set_enabled(false, &mut t));
        assert_eq!(t, start_pose());
        assert!(!animator.is_running());
        assert!(animator.snapshot().is_none());
        assert_eq!(animator.tick(0.1, &mut t, &lookup), TickOutcome::Idle);

        // Moved while disabled: the new spot becomes the baseline.
        t.position = Vec3::new(7.0, 7.0, 7.0);
        assert!(animator.set_enabled(true, &mut t));
        assert_eq!(animator.snapshot().unwrap().position, Vec3::new(7.0, 7.0, 7.0));
        run_for(&mut animator, &mut t, &lookup, 5, 0.1);
        animator.stop(&mut t);
        assert_eq!(t.position, Vec3::new(7.0, 7.0, 7.0));
    }

    #[test]
    fn test_disabled_animator_refuses_start() {
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_enabled(false, &mut t);
        assert!(!animator.set_mode(IndependentMode::Spin, &mut t, &params, true));
        assert_eq!(animator.independent_mode(), IndependentMode::Spin);
        assert!(!animator.is_running());

        // Spin is still selected, so enabling starts it.
        assert!(animator.set_enabled(true, &mut t));
        assert_eq!(
            animator.state(),
            AnimatorState::Running(AnimationMode::Independent(IndependentMode::Spin))
        );
    }

    #[test]
    fn test_reenable_starts_selected_mode() {
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Spin, &mut t, &params, false);
        assert!(!animator.is_running());

        animator.set_enabled(false, &mut t);
        assert!(animator.set_enabled(true, &mut t));
        assert!(animator.is_running());
        assert_eq!(animator.snapshot().unwrap().position, start_pose().position);
    }

    #[test]
    fn test_reenable_restarts_settled_shake() {
        let params = AnimationParameters {
            shake_duration: 0.5,
            shake_seed: Some(11),
            ..Default::default()
        };
        let lookup = Poses::new();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Shake, &mut t, &params, true);
        run_for(&mut animator, &mut t, &lookup, 4, 0.125);
        assert!(!animator.is_running());

        animator.set_enabled(false, &mut t);
        assert!(animator.set_enabled(true, &mut t));
        assert_eq!(
            animator.state(),
            AnimatorState::Running(AnimationMode::Independent(IndependentMode::Shake))
        );
    }

    #[test]
    fn test_reenable_without_mode_stays_idle() {
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_enabled(false, &mut t);
        assert!(!animator.set_enabled(true, &mut t));
        assert!(!animator.is_running());
    }

    #[test]
    fn test_refused_start_stops_running_mode() {
        let mut world = hecs::World::new();
        let a = world.spawn((Transform::identity(),));
        let params = AnimationParameters::default();
        let lookup = Poses::new();

        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Hover, &mut t, &params, true);
        run_for(&mut animator, &mut t, &lookup, 10, 0.1);
        assert_ne!(t, start_pose());

        assert!(!animator.start_orbit(&mut t, None, &params));
        assert_eq!(t, start_pose());
        assert!(!animator.is_running());
        assert_eq!(animator.independent_mode(), IndependentMode::None);
        assert_eq!(animator.relational_mode(), RelationalMode::None);
        assert!(animator.family().is_none());

        animator.set_mode(IndependentMode::Hover, &mut t, &params, true);
        run_for(&mut animator, &mut t, &lookup, 10, 0.1);
        assert!(!animator.start_move_along_path(&mut t, &[a], &params));
        assert_eq!(t, start_pose());
        assert_eq!(animator.state(), AnimatorState::Idle);
        assert_eq!(animator.independent_mode(), IndependentMode::None);
        assert_eq!(animator.relational_mode(), RelationalMode::None);
        assert!(animator.path().is_empty());
    }

    #[test]
    fn test_refused_start_cancels_relational_run() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(4.0, 0.0, 0.0)),));
        let params = AnimationParameters::default();
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.start_follow(&mut t, Some(anchor), &params);
        run_for(&mut animator, &mut t, &world, 5, 0.1);

        assert!(!animator.start_snap_to_object(&mut t, None, &params));
        assert_eq!(t, start_pose());
        assert_eq!(animator.relational_target(), None);
        assert_eq!(animator.relational_mode(), RelationalMode::None);
    }

    #[test]
    fn test_running_params_ignore_later_edits() {
        let params = AnimationParameters {
            hover_speed: 1.0,
            hover_distance: 1.0,
            ..Default::default()
        };
        let lookup = Poses::new();
        let base_y = start_pose().position.y;
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Hover, &mut t, &params, true);
        run_for(&mut animator, &mut t, &lookup, 10, 0.1);

        // Same mode with edited settings does not restart the run.
        let edited = AnimationParameters {
            hover_distance: 100.0,
            ..params
        };
        assert!(!animator.set_mode(IndependentMode::Hover, &mut t, &edited, true));
        run_for(&mut animator, &mut t, &lookup, 1, 0.1);
        let elapsed = animator.elapsed();
        assert!((t.position.y - base_y - elapsed.sin()).abs() < 1e-4);
        assert_eq!(animator.parameters().hover_distance, 1.0);

        // An explicit restart picks the edits up.
        assert!(animator.start(&mut t, &edited));
        run_for(&mut animator, &mut t, &lookup, 1, 0.1);
        assert!((t.position.y - base_y - 100.0 * 0.1f32.sin()).abs() < 1e-3);
        assert_eq!(animator.parameters().hover_distance, 100.0);
    }

    #[test]
    fn test_bounded_orbit_and_look_at_restore_bit_for_bit() {
        let mut world = hecs::World::new();
        let anchor = world.spawn((Transform::from_position(Vec3::new(10.0, 2.0, 3.0)),));
        let params = AnimationParameters {
            orbit_duration: 1.0,
            look_at_duration: 1.0,
            ..Default::default()
        };
        let requests = [
            RelationalRequest::Orbit { target: anchor },
            RelationalRequest::LookAt { target: anchor },
        ];
        for request in requests {
            let mode = request.mode();
            let mut animator = Animator::new();
            let mut t = start_pose();
            assert!(animator.start_relational(&mut t, request, &params));

            let outcomes: Vec<_> = (0..4).map(|_| animator.tick(0.25, &mut t, &world)).collect();
            assert_eq!(outcomes[..3], [TickOutcome::Continue; 3], "{mode}");
            assert_eq!(outcomes[3], TickOutcome::Completed, "{mode}");
            assert_eq!(t, start_pose(), "{mode} did not restore");
            assert_eq!(animator.tick(0.25, &mut t, &world), TickOutcome::Idle);
            assert_eq!(t, start_pose());
        }
    }

    #[test]
    fn test_negative_delta_counts_as_zero() {
        let mut animator = Animator::new();
        let mut t = start_pose();
        animator.set_mode(IndependentMode::Spin, &mut t, &AnimationParameters::default(), true);
        animator.tick(-1.0, &mut t, &Poses::new());
        assert_eq!(animator.elapsed(), 0.0);
    }
}
