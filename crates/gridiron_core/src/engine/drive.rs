//! Down, distance and field position for one possession.
//!
//! ```text
//! PreSnap ──apply──▶ InProgress ──apply──▶ InProgress ... ──▶ Ended(reason)
//!    │                                                          ▲
//!    └───────────────────── expire_clock ───────────────────────┘
//! ```
//!
//! The down never reaches 5: a failed fourth down ends the drive with
//! [`DriveEndReason::TurnoverOnDowns`].

use serde::{Deserialize, Serialize};

use crate::error::DriveError;
use crate::models::play_result::{OutcomeKind, PlayResult};
use crate::models::situation::{first_down_distance, SituationalContext, TeamSide, FIELD_LENGTH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveEndReason {
    Touchdown,
    FieldGoal,
    MissedFieldGoal,
    Safety,
    TurnoverInterception,
    TurnoverFumble,
    TurnoverOnDowns,
    Punt,
    TimeExpiration,
}

impl DriveEndReason {
    pub fn is_score(&self) -> bool {
        matches!(
            self,
            DriveEndReason::Touchdown | DriveEndReason::FieldGoal | DriveEndReason::Safety
        )
    }
}

/// Down, distance and line of scrimmage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveSpot {
    pub down: u8,
    pub yards_to_go: i32,
    pub field_position: i32,
}

impl DriveSpot {
    pub fn first_down(field_position: i32) -> Self {
        Self {
            down: 1,
            yards_to_go: first_down_distance(field_position),
            field_position,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveState {
    PreSnap,
    InProgress {
        down: u8,
        yards_to_go: i32,
        field_position: i32,
    },
    Ended(DriveEndReason),
}

/// Snapshot taken when a drive ends; fed to the continuation manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveEndState {
    pub possessing_team: TeamSide,
    /// Where the ball was when the drive ended, from the offense's goal line
    pub field_position: i32,
    pub down: u8,
    pub yards_to_go: i32,
    pub quarter: u8,
    pub end_reason: DriveEndReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveSummary {
    pub team: TeamSide,
    pub start_quarter: u8,
    pub start_field_position: i32,
    pub plays: u32,
    pub net_yards: i32,
    pub elapsed_seconds: u32,
    pub result: Option<DriveEndReason>,
}

/// What one applied play did to the drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveTransition {
    Continue { spot: DriveSpot, first_down: bool },
    Ended(DriveEndReason),
}

#[derive(Debug, Clone)]
pub struct DriveStateMachine {
    team: TeamSide,
    state: DriveState,
    /// Spot before the next snap, or where the drive ended
    spot: DriveSpot,
    summary: DriveSummary,
}

impl DriveStateMachine {
    /// Fresh possession: first down at `field_position`.
    pub fn new(team: TeamSide, field_position: i32, quarter: u8) -> Self {
        let field_position = field_position.clamp(1, FIELD_LENGTH - 1);
        Self {
            team,
            state: DriveState::PreSnap,
            spot: DriveSpot::first_down(field_position),
            summary: DriveSummary {
                team,
                start_quarter: quarter,
                start_field_position: field_position,
                plays: 0,
                net_yards: 0,
                elapsed_seconds: 0,
                result: None,
            },
        }
    }

    /// Continue a drive across a quarter break with the exact state.
    pub fn resume(team: TeamSide, spot: DriveSpot, quarter: u8) -> Self {
        let mut drive = Self::new(team, spot.field_position, quarter);
        drive.spot = spot;
        drive.state = DriveState::InProgress {
            down: spot.down,
            yards_to_go: spot.yards_to_go,
            field_position: spot.field_position,
        };
        drive
    }

    pub fn team(&self) -> TeamSide {
        self.team
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn spot(&self) -> DriveSpot {
        self.spot
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.state, DriveState::Ended(_))
    }

    pub fn summary(&self) -> &DriveSummary {
        &self.summary
    }

    pub fn record_elapsed(&mut self, seconds: u32) {
        self.summary.elapsed_seconds += seconds;
    }

    /// Context for the next snap.
    pub fn situation(
        &self,
        quarter: u8,
        clock_seconds_remaining: u32,
        score_differential: i32,
    ) -> Result<SituationalContext, DriveError> {
        if let DriveState::Ended(reason) = self.state {
            return Err(DriveError::AlreadyEnded(reason));
        }
        Ok(SituationalContext {
            down: self.spot.down,
            yards_to_go: self.spot.yards_to_go,
            field_position: self.spot.field_position,
            quarter,
            clock_seconds_remaining,
            score_differential,
            possessing_team: self.team,
        })
    }

    fn end(&mut self, reason: DriveEndReason, field_position: i32) -> DriveTransition {
        self.spot.field_position = field_position;
        self.state = DriveState::Ended(reason);
        self.summary.result = Some(reason);
        tracing::info!(
            team = ?self.team,
            ?reason,
            plays = self.summary.plays,
            net_yards = self.summary.net_yards,
            "drive ended"
        );
        DriveTransition::Ended(reason)
    }

    fn advance(&mut self, spot: DriveSpot, first_down: bool) -> DriveTransition {
        self.spot = spot;
        self.state = DriveState::InProgress {
            down: spot.down,
            yards_to_go: spot.yards_to_go,
            field_position: spot.field_position,
        };
        DriveTransition::Continue { spot, first_down }
    }

    /// Fourth-down failure ends the drive; otherwise the next down.
    fn next_down(&mut self, yards_to_go: i32, field_position: i32) -> DriveTransition {
        if self.spot.down >= 4 {
            return self.end(DriveEndReason::TurnoverOnDowns, field_position);
        }
        let spot = DriveSpot {
            down: self.spot.down + 1,
            yards_to_go,
            field_position,
        };
        self.advance(spot, false)
    }

    pub fn apply(&mut self, result: &PlayResult) -> Result<DriveTransition, DriveError> {
        if let DriveState::Ended(reason) = self.state {
            return Err(DriveError::AlreadyEnded(reason));
        }
        let DriveSpot {
            down,
            yards_to_go,
            field_position,
        } = self.spot;
        let yards = result.yards_gained;
        let spot_after = field_position + yards;
        self.summary.plays += 1;
        self.summary.net_yards += yards;

        let transition = match result.outcome_kind {
            OutcomeKind::Touchdown => self.end(DriveEndReason::Touchdown, FIELD_LENGTH),
            OutcomeKind::Safety => self.end(DriveEndReason::Safety, 0),
            OutcomeKind::TurnoverInterception => {
                self.end(DriveEndReason::TurnoverInterception, spot_after)
            }
            OutcomeKind::TurnoverFumble => self.end(DriveEndReason::TurnoverFumble, spot_after),
            OutcomeKind::Punt => self.end(DriveEndReason::Punt, field_position),
            OutcomeKind::FieldGoalGood => self.end(DriveEndReason::FieldGoal, field_position),
            OutcomeKind::FieldGoalMissed => {
                self.end(DriveEndReason::MissedFieldGoal, field_position)
            }
            OutcomeKind::PenaltyEnforced => {
                let spot_after = spot_after.clamp(1, FIELD_LENGTH - 1);
                let (first_down, loss_of_down) = result
                    .accepted_penalty()
                    .map(|p| (p.automatic_first_down, p.automatic_loss_of_down))
                    .unwrap_or((false, false));
                if first_down || yards >= yards_to_go {
                    self.advance(DriveSpot::first_down(spot_after), true)
                } else if loss_of_down {
                    self.next_down(yards_to_go - yards, spot_after)
                } else {
                    // Replay the down
                    self.advance(
                        DriveSpot {
                            down,
                            yards_to_go: yards_to_go - yards,
                            field_position: spot_after,
                        },
                        false,
                    )
                }
            }
            OutcomeKind::Gain
            | OutcomeKind::NoGain
            | OutcomeKind::Loss
            | OutcomeKind::Incomplete
            | OutcomeKind::Sack => {
                let spot_after = spot_after.clamp(1, FIELD_LENGTH - 1);
                if yards >= yards_to_go {
                    self.advance(DriveSpot::first_down(spot_after), true)
                } else {
                    self.next_down(yards_to_go - yards, spot_after)
                }
            }
        };
        tracing::debug!(?transition, "drive advanced");
        Ok(transition)
    }

    /// End the drive because the period ran out, keeping the exact spot.
    pub fn expire_clock(&mut self) -> Result<DriveEndReason, DriveError> {
        if let DriveState::Ended(reason) = self.state {
            return Err(DriveError::AlreadyEnded(reason));
        }
        let field_position = self.spot.field_position;
        self.end(DriveEndReason::TimeExpiration, field_position);
        Ok(DriveEndReason::TimeExpiration)
    }

    pub fn end_state(&self, quarter: u8) -> Result<DriveEndState, DriveError> {
        match self.state {
            DriveState::Ended(end_reason) => Ok(DriveEndState {
                possessing_team: self.team,
                field_position: self.spot.field_position,
                down: self.spot.down,
                yards_to_go: self.spot.yards_to_go,
                quarter,
                end_reason,
            }),
            _ => Err(DriveError::StillInProgress),
        }
    }
}
