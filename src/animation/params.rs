//! Animation parameters supplied at start time.
//!
//! One flat value object covers every mode; each routine copies the fields it
//! needs when a run starts, so editing settings afterwards never changes a run in
//! flight. Angles are degrees, speeds are per second, durations are seconds.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Tunable knobs for all animation modes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationParameters {
    // -- Independent ------------------------------------------------------

    /// Hover oscillation rate (radians of phase per second).
    pub hover_speed: f32,
    /// Peak vertical hover offset.
    pub hover_distance: f32,
    /// Wobble oscillation rate (radians of phase per second).
    pub wobble_speed: f32,
    /// Peak wobble tilt in degrees.
    pub wobble_angle: f32,
    /// Wobble around X and Z instead of Z only.
    pub wobble_two_axis: bool,
    /// Spin rate around Y in degrees per second.
    pub spin_speed: f32,
    /// Shake length in seconds; the pose is restored when it runs out.
    pub shake_duration: f32,
    /// Peak shake offset per axis (decays linearly to zero).
    pub shake_magnitude: f32,
    /// Peak random tilt during a shake in degrees. 0 = position only.
    pub shake_rotation_angle: f32,
    /// Fixed RNG seed for reproducible shakes.
    pub shake_seed: Option<u64>,
    /// Bounce rate (radians of phase per second).
    pub bounce_speed: f32,
    /// Bounce apex height.
    pub bounce_height: f32,
    /// Squash/stretch amount applied over the bounce phase, in `[0, 1)`.
    pub squash_stretch_ratio: f32,
    /// Pulse rate for the scale mode (radians of phase per second).
    pub scale_speed: f32,
    /// Relative pulse amplitude for the scale mode.
    pub scale_ratio: f32,

    // -- Relational -------------------------------------------------------

    pub orbit_radius: f32,
    /// Degrees per second around the target.
    pub orbit_speed: f32,
    /// <= 0 runs until stopped.
    pub orbit_duration: f32,
    /// Maximum turn rate in degrees per second.
    pub look_at_speed: f32,
    /// <= 0 runs until stopped.
    pub look_at_duration: f32,
    pub follow_speed: f32,
    pub follow_stop_distance: f32,
    /// <= 0 runs until stopped.
    pub follow_duration: f32,
    pub path_move_speed: f32,
    /// <= 0 runs until stopped.
    pub path_move_duration: f32,
    /// Also match the target's rotation when snapping.
    pub snap_rotation: bool,
}

impl Default for AnimationParameters {
    fn default() -> Self {
        Self {
            hover_speed: 1.0,
            hover_distance: 0.1,
            wobble_speed: 2.0,
            wobble_angle: 5.0,
            wobble_two_axis: false,
            spin_speed: 90.0,
            shake_duration: 0.5,
            shake_magnitude: 0.1,
            shake_rotation_angle: 0.0,
            shake_seed: None,
            bounce_speed: 1.0,
            bounce_height: 0.5,
            squash_stretch_ratio: 0.1,
            scale_speed: 1.0,
            scale_ratio: 0.1,

            orbit_radius: 2.0,
            orbit_speed: 45.0,
            orbit_duration: 5.0,
            look_at_speed: 90.0,
            look_at_duration: 3.0,
            follow_speed: 1.0,
            follow_stop_distance: 0.5,
            follow_duration: 5.0,
            path_move_speed: 1.0,
            path_move_duration: 10.0,
            snap_rotation: false,
        }
    }
}

impl AnimationParameters {
    /// Check that every value is usable.
    ///
    /// Durations may be zero or negative (the "run until stopped" convention for
    /// relational modes); magnitudes and distances may not.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("hover_speed", self.hover_speed),
            ("hover_distance", self.hover_distance),
            ("wobble_speed", self.wobble_speed),
            ("wobble_angle", self.wobble_angle),
            ("spin_speed", self.spin_speed),
            ("shake_duration", self.shake_duration),
            ("shake_magnitude", self.shake_magnitude),
            ("shake_rotation_angle", self.shake_rotation_angle),
            ("bounce_speed", self.bounce_speed),
            ("bounce_height", self.bounce_height),
            ("squash_stretch_ratio", self.squash_stretch_ratio),
            ("scale_speed", self.scale_speed),
            ("scale_ratio", self.scale_ratio),
            ("orbit_radius", self.orbit_radius),
            ("orbit_speed", self.orbit_speed),
            ("orbit_duration", self.orbit_duration),
            ("look_at_speed", self.look_at_speed),
            ("look_at_duration", self.look_at_duration),
            ("follow_speed", self.follow_speed),
            ("follow_stop_distance", self.follow_stop_distance),
            ("follow_duration", self.follow_duration),
            ("path_move_speed", self.path_move_speed),
            ("path_move_duration", self.path_move_duration),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(invalid(name, format!("{value} is not finite")));
            }
        }

        let non_negative = [
            ("hover_distance", self.hover_distance),
            ("shake_magnitude", self.shake_magnitude),
            ("shake_rotation_angle", self.shake_rotation_angle),
            ("bounce_height", self.bounce_height),
            ("orbit_radius", self.orbit_radius),
            ("look_at_speed", self.look_at_speed),
            ("follow_speed", self.follow_speed),
            ("follow_stop_distance", self.follow_stop_distance),
            ("path_move_speed", self.path_move_speed),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(invalid(name, format!("{value} must not be negative")));
            }
        }

        if !(0.0..1.0).contains(&self.squash_stretch_ratio) {
            return Err(invalid(
                "squash_stretch_ratio",
                format!("{} must be in [0, 1)", self.squash_stretch_ratio),
            ));
        }

        Ok(())
    }
}

fn invalid(name: &'static str, reason: String) -> Error {
    Error::InvalidParameter { name, reason }
}
