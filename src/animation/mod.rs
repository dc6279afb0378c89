//! Procedural transform animation

pub mod snapshot;
pub mod mode;
pub mod params;
pub mod preset;
pub mod target;
pub mod motion;
pub mod animator;
pub mod system;

pub use snapshot::TransformSnapshot;
pub use mode::{AnimationFamily, AnimationMode, IndependentMode, RelationalMode, RelationalRequest};
pub use params::AnimationParameters;
pub use preset::AnimationPreset;
pub use target::TargetLookup;
pub use motion::{look_rotation, rotate_towards, ARRIVAL_EPSILON, SNAP_TRANSITION_SECS};
pub use animator::{Animator, AnimatorState, RunState, TickOutcome};
pub use system::{AnimationSystem, TickReport};
