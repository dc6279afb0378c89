//! Animation mode selection and relational run requests

use std::fmt;
use std::str::FromStr;

use hecs::Entity;
use serde::{Deserialize, Serialize};

use crate::core::Error;

/// Self-contained motions driven only by time and parameters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndependentMode {
    #[default]
    None,
    Hover,
    Wobble,
    Spin,
    Shake,
    Bounce,
    Scale,
}

impl IndependentMode {
    pub const ALL: [IndependentMode; 7] = [
        IndependentMode::None,
        IndependentMode::Hover,
        IndependentMode::Wobble,
        IndependentMode::Spin,
        IndependentMode::Shake,
        IndependentMode::Bounce,
        IndependentMode::Scale,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IndependentMode::None => "none",
            IndependentMode::Hover => "hover",
            IndependentMode::Wobble => "wobble",
            IndependentMode::Spin => "spin",
            IndependentMode::Shake => "shake",
            IndependentMode::Bounce => "bounce",
            IndependentMode::Scale => "scale",
        }
    }
}

impl fmt::Display for IndependentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IndependentMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        IndependentMode::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

/// Motions defined relative to another entity or a waypoint path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationalMode {
    #[default]
    None,
    Orbit,
    LookAt,
    Follow,
    MoveAlongPath,
    SnapToObject,
}

impl RelationalMode {
    pub const ALL: [RelationalMode; 6] = [
        RelationalMode::None,
        RelationalMode::Orbit,
        RelationalMode::LookAt,
        RelationalMode::Follow,
        RelationalMode::MoveAlongPath,
        RelationalMode::SnapToObject,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RelationalMode::None => "none",
            RelationalMode::Orbit => "orbit",
            RelationalMode::LookAt => "look-at",
            RelationalMode::Follow => "follow",
            RelationalMode::MoveAlongPath => "move-along-path",
            RelationalMode::SnapToObject => "snap-to-object",
        }
    }
}

impl fmt::Display for RelationalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationalMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        match lower.as_str() {
            "path" => return Ok(RelationalMode::MoveAlongPath),
            "snap" => return Ok(RelationalMode::SnapToObject),
            _ => {}
        }
        RelationalMode::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| Error::UnknownMode(s.to_string()))
    }
}

/// Which family of modes an animator last selected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnimationFamily {
    Independent,
    Relational,
}

/// A mode from either family, for reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationMode {
    Independent(IndependentMode),
    Relational(RelationalMode),
}

impl AnimationMode {
    pub fn family(self) -> AnimationFamily {
        match self {
            AnimationMode::Independent(_) => AnimationFamily::Independent,
            AnimationMode::Relational(_) => AnimationFamily::Relational,
        }
    }
}

impl fmt::Display for AnimationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnimationMode::Independent(m) => write!(f, "{m}"),
            AnimationMode::Relational(m) => write!(f, "{m}"),
        }
    }
}

impl FromStr for AnimationMode {
    type Err = Error;

    /// Independent names win; `none` parses as the independent `None`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<IndependentMode>()
            .map(AnimationMode::Independent)
            .or_else(|_| s.parse::<RelationalMode>().map(AnimationMode::Relational))
    }
}

/// A relational run: the mode together with what it is relative to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RelationalRequest {
    Orbit { target: Entity },
    LookAt { target: Entity },
    Follow { target: Entity },
    MoveAlongPath { waypoints: Vec<Entity> },
    SnapToObject { target: Entity },
}

impl RelationalRequest {
    /// Minimum number of waypoints for a path run.
    pub const MIN_WAYPOINTS: usize = 2;

    pub fn mode(&self) -> RelationalMode {
        match self {
            RelationalRequest::Orbit { .. } => RelationalMode::Orbit,
            RelationalRequest::LookAt { .. } => RelationalMode::LookAt,
            RelationalRequest::Follow { .. } => RelationalMode::Follow,
            RelationalRequest::MoveAlongPath { .. } => RelationalMode::MoveAlongPath,
            RelationalRequest::SnapToObject { .. } => RelationalMode::SnapToObject,
        }
    }

    /// The single reference entity, for every mode but path movement.
    pub fn target(&self) -> Option<Entity> {
        match self {
            RelationalRequest::Orbit { target }
            | RelationalRequest::LookAt { target }
            | RelationalRequest::Follow { target }
            | RelationalRequest::SnapToObject { target } => Some(*target),
            RelationalRequest::MoveAlongPath { .. } => None,
        }
    }

    /// Waypoints of a path run; empty for single-target modes.
    pub fn waypoints(&self) -> &[Entity] {
        match self {
            RelationalRequest::MoveAlongPath { waypoints } => waypoints,
            _ => &[],
        }
    }

    /// Whether the request satisfies its start precondition.
    pub fn is_valid(&self) -> bool {
        match self {
            RelationalRequest::MoveAlongPath { waypoints } => waypoints.len() >= Self::MIN_WAYPOINTS,
            _ => true,
        }
    }

    /// Every entity this request reads from.
    pub fn referenced(&self) -> impl Iterator<Item = Entity> + '_ {
        self.target().into_iter().chain(self.waypoints().iter().copied())
    }
}
