//! Penalty vocabulary and the enforced penalty record.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::models::player::PlayerId;
use crate::models::play_result::OutcomeKind;
use crate::models::situation::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyKind {
    FalseStart,
    DelayOfGame,
    OffensiveHolding,
    IllegalFormation,
    OffensivePassInterference,
    IntentionalGrounding,
    DefensiveOffside,
    Encroachment,
    DefensiveHolding,
    DefensivePassInterference,
    RoughingThePasser,
    UnnecessaryRoughness,
    FaceMask,
    IllegalContact,
}

/// Which unit committed the foul.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PenaltySide {
    Offense,
    Defense,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PenaltyTiming {
    /// Dead-ball foul before the snap; the play never happens
    PreSnap,
    LiveBall,
}

/// Which scrimmage plays a penalty can occur on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayFilter {
    AnyScrimmage,
    PassOnly,
    RunOnly,
}

impl PlayFilter {
    pub fn allows(&self, is_pass: bool) -> bool {
        match self {
            PlayFilter::AnyScrimmage => true,
            PlayFilter::PassOnly => is_pass,
            PlayFilter::RunOnly => !is_pass,
        }
    }
}

/// A penalty after enforcement has been decided. Immutable from then on.
///
/// `yards_assessed` is signed from the offense's perspective: offensive
/// fouls are negative, defensive fouls positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PenaltyInstance {
    pub penalty_type: PenaltyKind,
    pub penalized_side: PenaltySide,
    pub penalized_team: TeamSide,
    /// `None` when no eligible player could be charged
    pub penalized_player: Option<PlayerId>,
    pub yards_assessed: i32,
    pub automatic_first_down: bool,
    pub automatic_loss_of_down: bool,
    pub negates_play: bool,
    pub timing: PenaltyTiming,
    pub penalty_accepted: bool,
    /// Net yardage of the play once the accept/decline choice is applied
    pub final_play_result: i32,
}

impl PenaltyInstance {
    pub fn is_pre_snap(&self) -> bool {
        self.timing == PenaltyTiming::PreSnap
    }
}

/// What happened on the field, as seen by enforcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OnFieldResult {
    pub outcome: OutcomeKind,
    pub yards: i32,
    /// Air yards at the catch or target point, for spot fouls
    pub air_yards: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_play_filter() {
        assert!(PlayFilter::AnyScrimmage.allows(false));
        assert!(PlayFilter::PassOnly.allows(true));
        assert!(!PlayFilter::PassOnly.allows(false));
        assert!(!PlayFilter::RunOnly.allows(true));
    }

    #[test]
    fn test_penalty_kind_serializes_snake_case() {
        let json = serde_json::to_string(&PenaltyKind::DefensivePassInterference).unwrap();
        assert_eq!(json, r#""defensive_pass_interference""#);
    }
}
