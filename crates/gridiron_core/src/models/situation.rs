//! Situational context snapshot handed to every resolver.

use serde::{Deserialize, Serialize};

use crate::error::InvalidSituationError;

/// Length of the field, own goal line (0) to opponent goal line (100).
pub const FIELD_LENGTH: i32 = 100;
/// Standard distance for a fresh set of downs.
pub const FIRST_DOWN_DISTANCE: i32 = 10;
/// Last regulation quarter; anything above is overtime.
pub const REGULATION_QUARTERS: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn opponent(&self) -> Self {
        match self {
            TeamSide::Home => TeamSide::Away,
            TeamSide::Away => TeamSide::Home,
        }
    }

    pub fn is_home(&self) -> bool {
        matches!(self, TeamSide::Home)
    }
}

/// Down, distance, field position, period, clock and score for the next snap.
///
/// `field_position` is measured from the possessing team's own goal line,
/// so the offense always attacks toward 100. Read-only during resolution;
/// only the drive state machine and the game clock produce new snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SituationalContext {
    pub down: u8,
    pub yards_to_go: i32,
    pub field_position: i32,
    pub quarter: u8,
    pub clock_seconds_remaining: u32,
    /// Possessing team's score minus the opponent's
    pub score_differential: i32,
    pub possessing_team: TeamSide,
}

impl SituationalContext {
    /// 1st and 10 (or goal) at `field_position`, start of the first quarter.
    pub fn first_and_ten(possessing_team: TeamSide, field_position: i32) -> Self {
        Self {
            down: 1,
            yards_to_go: first_down_distance(field_position),
            field_position,
            quarter: 1,
            clock_seconds_remaining: 900,
            score_differential: 0,
            possessing_team,
        }
    }

    pub fn with_down(mut self, down: u8, yards_to_go: i32) -> Self {
        self.down = down;
        self.yards_to_go = yards_to_go;
        self
    }

    pub fn with_clock(mut self, quarter: u8, seconds_remaining: u32) -> Self {
        self.quarter = quarter;
        self.clock_seconds_remaining = seconds_remaining;
        self
    }

    pub fn with_score_differential(mut self, differential: i32) -> Self {
        self.score_differential = differential;
        self
    }

    /// Reject impossible contexts before any resolution work.
    pub fn validate(&self) -> Result<(), InvalidSituationError> {
        if !(1..=4).contains(&self.down) {
            return Err(InvalidSituationError::DownOutOfRange(self.down));
        }
        if !(0..=FIELD_LENGTH).contains(&self.field_position) {
            return Err(InvalidSituationError::FieldPositionOutOfRange(
                self.field_position,
            ));
        }
        if self.yards_to_go <= 0 {
            return Err(InvalidSituationError::NonPositiveDistance(self.yards_to_go));
        }
        if self.yards_to_go > self.distance_to_goal() {
            return Err(InvalidSituationError::DistanceBeyondGoal {
                yards_to_go: self.yards_to_go,
                distance_to_goal: self.distance_to_goal(),
            });
        }
        if self.quarter == 0 {
            return Err(InvalidSituationError::InvalidQuarter(self.quarter));
        }
        Ok(())
    }

    pub fn distance_to_goal(&self) -> i32 {
        FIELD_LENGTH - self.field_position
    }

    pub fn is_goal_to_go(&self) -> bool {
        self.yards_to_go >= self.distance_to_goal()
    }

    pub fn is_red_zone(&self, threshold: i32) -> bool {
        self.distance_to_goal() <= threshold
    }

    pub fn is_short_yardage(&self) -> bool {
        self.yards_to_go <= 2
    }

    /// Long-yardage downs where the defense expects a pass.
    pub fn is_obvious_pass(&self) -> bool {
        is_obvious_pass_down(self.down, self.yards_to_go)
    }

    pub fn is_overtime(&self) -> bool {
        self.quarter > REGULATION_QUARTERS
    }

    /// Final two minutes of either half.
    pub fn is_late_in_half(&self) -> bool {
        (self.quarter == 2 || self.quarter == 4) && self.clock_seconds_remaining <= 120
    }
}

/// Long-yardage downs where the defense expects a pass.
pub fn is_obvious_pass_down(down: u8, yards_to_go: i32) -> bool {
    match down {
        2 => yards_to_go >= 10,
        3 => yards_to_go >= 7,
        4 => yards_to_go >= 5,
        _ => false,
    }
}

/// Distance for a fresh set of downs: ten yards, or goal when closer.
pub fn first_down_distance(field_position: i32) -> i32 {
    FIRST_DOWN_DISTANCE.min(FIELD_LENGTH - field_position).max(1)
}
