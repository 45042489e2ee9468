//! Carries a drive across an intra-half quarter break.
//!
//! | Captured reason | Quarter | Decision |
//! |---|---|---|
//! | `TimeExpiration` | 1 or 3 | continue with the exact down, distance, spot, team |
//! | anything else | any | defaults: 1st & 10 at the 25, no team |
//!
//! A capture is consumed once. Asking again without a new capture yields the
//! defaults.

use serde::{Deserialize, Serialize};

use crate::models::situation::{TeamSide, FIRST_DOWN_DISTANCE};

use super::drive::{DriveEndReason, DriveEndState, DriveSpot};

pub const DEFAULT_FIELD_POSITION: i32 = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationDecision {
    pub should_continue: bool,
    pub possessing_team: Option<TeamSide>,
    pub down: u8,
    pub yards_to_go: i32,
    pub field_position: i32,
}

impl ContinuationDecision {
    pub fn fresh() -> Self {
        Self {
            should_continue: false,
            possessing_team: None,
            down: 1,
            yards_to_go: FIRST_DOWN_DISTANCE,
            field_position: DEFAULT_FIELD_POSITION,
        }
    }

    pub fn spot(&self) -> DriveSpot {
        DriveSpot {
            down: self.down,
            yards_to_go: self.yards_to_go,
            field_position: self.field_position,
        }
    }
}

impl Default for ContinuationDecision {
    fn default() -> Self {
        Self::fresh()
    }
}

/// Holds the latest drive-end snapshot until the next quarter starts.
#[derive(Debug, Clone, Default)]
pub struct QuarterContinuationManager {
    pending: Option<DriveEndState>,
}

impl QuarterContinuationManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a snapshot, replacing any earlier one.
    pub fn capture_drive_end(&mut self, state: DriveEndState) {
        self.pending = Some(state);
    }

    pub fn has_capture(&self) -> bool {
        self.pending.is_some()
    }

    /// Consume the capture and decide how the next quarter starts.
    pub fn get_next_drive_state(&mut self) -> ContinuationDecision {
        let Some(state) = self.pending.take() else {
            return ContinuationDecision::fresh();
        };
        let continues = state.end_reason == DriveEndReason::TimeExpiration
            && matches!(state.quarter, 1 | 3);
        tracing::info!(
            quarter = state.quarter,
            reason = ?state.end_reason,
            continues,
            "quarter continuation"
        );
        if !continues {
            return ContinuationDecision::fresh();
        }
        ContinuationDecision {
            should_continue: true,
            possessing_team: Some(state.possessing_team),
            down: state.down,
            yards_to_go: state.yards_to_go,
            field_position: state.field_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end_state(quarter: u8, reason: DriveEndReason) -> DriveEndState {
        DriveEndState {
            possessing_team: TeamSide::Away,
            field_position: 63,
            down: 3,
            yards_to_go: 4,
            quarter,
            end_reason: reason,
        }
    }

    #[test]
    fn test_first_quarter_expiration_continues_exactly() {
        let mut manager = QuarterContinuationManager::new();
        manager.capture_drive_end(end_state(1, DriveEndReason::TimeExpiration));
        let decision = manager.get_next_drive_state();
        assert_eq!(
            decision,
            ContinuationDecision {
                should_continue: true,
                possessing_team: Some(TeamSide::Away),
                down: 3,
                yards_to_go: 4,
                field_position: 63,
            }
        );
    }

    #[test]
    fn test_second_quarter_expiration_resets() {
        let mut manager = QuarterContinuationManager::new();
        manager.capture_drive_end(end_state(2, DriveEndReason::TimeExpiration));
        assert_eq!(manager.get_next_drive_state(), ContinuationDecision::fresh());
    }

    #[test]
    fn test_second_request_without_capture_does_not_continue() {
        let mut manager = QuarterContinuationManager::new();
        manager.capture_drive_end(end_state(3, DriveEndReason::TimeExpiration));
        assert!(manager.get_next_drive_state().should_continue);
        let second = manager.get_next_drive_state();
        assert!(!second.should_continue);
        assert_eq!(second.possessing_team, None);
        assert_eq!((second.down, second.yards_to_go, second.field_position), (1, 10, 25));
    }

    #[test]
    fn test_capture_overwrites() {
        let mut manager = QuarterContinuationManager::new();
        manager.capture_drive_end(end_state(1, DriveEndReason::TimeExpiration));
        manager.capture_drive_end(end_state(1, DriveEndReason::Punt));
        assert!(!manager.get_next_drive_state().should_continue);
    }

    #[test]
    fn test_only_time_expiration_in_odd_quarters_continues() {
        let reasons = [
            DriveEndReason::Touchdown,
            DriveEndReason::FieldGoal,
            DriveEndReason::MissedFieldGoal,
            DriveEndReason::Safety,
            DriveEndReason::TurnoverInterception,
            DriveEndReason::TurnoverFumble,
            DriveEndReason::TurnoverOnDowns,
            DriveEndReason::Punt,
            DriveEndReason::TimeExpiration,
        ];
        let mut manager = QuarterContinuationManager::new();
        for quarter in 1..=5 {
            for reason in reasons {
                manager.capture_drive_end(end_state(quarter, reason));
                let expected = reason == DriveEndReason::TimeExpiration && (quarter == 1 || quarter == 3);
                assert_eq!(manager.get_next_drive_state().should_continue, expected);
            }
        }
    }
}
