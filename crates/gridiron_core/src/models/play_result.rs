//! The immutable record produced once per snap.

use serde::{Deserialize, Serialize};

use super::play_call::PlayKind;
use super::player::PlayerId;
use super::situation::TeamSide;
use super::stat_line::PlayerStatDelta;
use crate::engine::penalty::PenaltyInstance;
use crate::error::DegenerateMatchupWarning;

pub const TOUCHDOWN_POINTS: u8 = 6;
pub const FIELD_GOAL_POINTS: u8 = 3;
pub const SAFETY_POINTS: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Gain,
    NoGain,
    Loss,
    Incomplete,
    Sack,
    Touchdown,
    Safety,
    TurnoverInterception,
    TurnoverFumble,
    FieldGoalGood,
    FieldGoalMissed,
    Punt,
    /// An accepted penalty replaced the on-field result
    PenaltyEnforced,
}

impl OutcomeKind {
    pub fn is_turnover(&self) -> bool {
        matches!(
            self,
            OutcomeKind::TurnoverInterception | OutcomeKind::TurnoverFumble
        )
    }

    pub fn is_score(&self) -> bool {
        matches!(
            self,
            OutcomeKind::Touchdown | OutcomeKind::Safety | OutcomeKind::FieldGoalGood
        )
    }

    /// Plays after which possession changes hands.
    pub fn changes_possession(&self) -> bool {
        self.is_turnover()
            || matches!(
                self,
                OutcomeKind::Punt
                    | OutcomeKind::FieldGoalMissed
                    | OutcomeKind::FieldGoalGood
                    | OutcomeKind::Touchdown
                    | OutcomeKind::Safety
            )
    }

    /// Yardage-only classification for a play that stayed on the field.
    pub fn from_yards(yards: i32) -> Self {
        match yards {
            y if y > 0 => OutcomeKind::Gain,
            0 => OutcomeKind::NoGain,
            _ => OutcomeKind::Loss,
        }
    }
}

/// Kick and return details for special teams snaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialTeamsDetail {
    pub kick_distance: i32,
    pub return_yards: i32,
    pub touchback: bool,
    /// Where the other team takes over, measured from its own goal line
    pub receiving_field_position: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayResult {
    pub kind: PlayKind,
    /// Net yardage after penalty enforcement
    pub yards_gained: i32,
    pub outcome_kind: OutcomeKind,
    /// What happened on the field before any penalty was applied
    pub on_field_outcome: OutcomeKind,
    pub on_field_yards: i32,
    pub penalty: Option<PenaltyInstance>,
    pub points_scored: u8,
    pub scoring_team: Option<TeamSide>,
    pub out_of_bounds: bool,
    pub ball_carrier: Option<PlayerId>,
    pub blocking_grade: Option<f32>,
    pub special_teams: Option<SpecialTeamsDetail>,
    pub stat_deltas: Vec<PlayerStatDelta>,
    pub warnings: Vec<DegenerateMatchupWarning>,
}

impl PlayResult {
    /// A result with no penalty, points, or stats; used by special teams and
    /// administrative plays before the details are filled in.
    pub fn basic(kind: PlayKind, outcome_kind: OutcomeKind, yards: i32) -> Self {
        Self {
            kind,
            yards_gained: yards,
            outcome_kind,
            on_field_outcome: outcome_kind,
            on_field_yards: yards,
            penalty: None,
            points_scored: 0,
            scoring_team: None,
            out_of_bounds: false,
            ball_carrier: None,
            blocking_grade: None,
            special_teams: None,
            stat_deltas: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn accepted_penalty(&self) -> Option<&PenaltyInstance> {
        self.penalty.as_ref().filter(|p| p.penalty_accepted)
    }

    pub fn with_points(mut self, points: u8, team: TeamSide) -> Self {
        self.points_scored = points;
        self.scoring_team = Some(team);
        self
    }
}
