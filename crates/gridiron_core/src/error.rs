//! Error taxonomy for the engine.
//!
//! - [`ConfigurationError`]: a table the engine needs is missing or malformed.
//!   Surfaces at startup from [`crate::config::EngineConfig::validate`].
//! - [`InvalidSituationError`]: the caller handed in an impossible
//!   situational context. Rejected before any resolution work happens.
//! - [`DriveError`] / [`ClockError`]: protocol misuse of the state machines.
//! - [`DegenerateMatchupWarning`] is not an error. It is recorded on the play
//!   result when a fallback had to be used.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::drive::DriveEndReason;
use crate::engine::penalty::PenaltyKind;
use crate::models::play_call::{OffensiveFormation, PlayArchetype};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("no yardage table entry for archetype {archetype:?}")]
    MissingArchetype { archetype: PlayArchetype },

    #[error("no yardage table entry for {archetype:?} from {formation:?}")]
    MissingYardageEntry {
        archetype: PlayArchetype,
        formation: OffensiveFormation,
    },

    #[error("penalty type {0:?} is not configured")]
    UnknownPenalty(PenaltyKind),

    #[error("penalty type {0:?} is configured more than once")]
    DuplicatePenalty(PenaltyKind),

    #[error("penalty type {0:?} has no eligible position groups")]
    PenaltyWithoutEligibleGroups(PenaltyKind),

    #[error("rate {field} must be within 0.0-1.0, got {value}")]
    InvalidRate { field: String, value: f32 },

    #[error("modifier curve {name} is invalid: {reason}")]
    InvalidCurve { name: String, reason: String },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("failed to parse configuration: {0}")]
    Parse(String),

    #[error("failed to read configuration file {path}: {reason}")]
    Io { path: String, reason: String },
}

impl ConfigurationError {
    pub(crate) fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigurationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn check_rate(field: &str, value: f32) -> std::result::Result<(), Self> {
        if (0.0..=1.0).contains(&value) {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidRate {
                field: field.to_string(),
                value,
            })
        }
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        ConfigurationError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigurationError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigurationError::Parse(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSituationError {
    #[error("down {0} is outside 1-4")]
    DownOutOfRange(u8),

    #[error("field position {0} is outside 0-100")]
    FieldPositionOutOfRange(i32),

    #[error("yards to go must be positive, got {0}")]
    NonPositiveDistance(i32),

    #[error("yards to go {yards_to_go} runs past the goal line ({distance_to_goal} yards away)")]
    DistanceBeyondGoal {
        yards_to_go: i32,
        distance_to_goal: i32,
    },

    #[error("quarter {0} is not a valid period")]
    InvalidQuarter(u8),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriveError {
    #[error("drive already ended ({0:?})")]
    AlreadyEnded(DriveEndReason),

    #[error("drive has not ended yet")]
    StillInProgress,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("quarter {quarter} ended; resolve the boundary before the next snap")]
    BoundaryPending { quarter: u8 },

    #[error("no period boundary is pending")]
    NoBoundaryPending,

    #[error("continuation requested across a {0:?} boundary")]
    IllegalContinuation(BoundaryKind),

    #[error("game is over")]
    GameOver,
}

/// Top-level error returned by pipeline and game entry points.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    InvalidSituation(#[from] InvalidSituationError),

    #[error(transparent)]
    Drive(#[from] DriveError),

    #[error(transparent)]
    Clock(#[from] ClockError),

    #[error("failed to serialize game log: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Period boundary kinds raised by the game clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// End of quarter 1 or 3
    EndOfQuarter,
    Halftime,
    EndOfRegulation,
    EndOfOvertime,
}

impl BoundaryKind {
    pub fn is_intra_half(&self) -> bool {
        matches!(self, BoundaryKind::EndOfQuarter)
    }
}

/// What kind of matchup could not be formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateMatchup {
    NoBlockers,
    NoDefenders,
    MissingBallCarrier,
    MissingPasser,
    MissingReceiver,
    MissingKicker,
    NoEligibleOffender,
}

/// Recorded when a required pairing has no eligible player.
///
/// Fallbacks: no blockers ⇒ every defender unblocked; no defenders ⇒ perfect
/// grade; missing skill player ⇒ neutral ratings; no eligible offender ⇒
/// penalty charged to the team only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateMatchupWarning {
    pub kind: DegenerateMatchup,
    pub detail: String,
}

impl DegenerateMatchupWarning {
    pub fn new(kind: DegenerateMatchup, detail: impl Into<String>) -> Self {
        let warning = Self {
            kind,
            detail: detail.into(),
        };
        tracing::warn!(kind = ?warning.kind, detail = %warning.detail, "degenerate matchup");
        warning
    }
}
