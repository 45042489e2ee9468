//! Shared helpers for engine tests.
//!
//! ```rust
//! #[cfg(test)]
//! use crate::engine::test_fixtures::*;
//! ```

use crate::models::play_call::{
    Coverage, DefensiveCall, DefensiveFormation, OffensiveFormation, PlayArchetype, PlayCall,
    RunDirection,
};
use crate::models::player::{PositionGroup, Roster};
use crate::models::roster_builder::RosterBuilder;
use crate::models::situation::TeamSide;

// =============================================================================
// Rosters
// =============================================================================

/// Two full, evenly rated depth charts: (home, away).
pub fn matchup() -> (Roster, Roster) {
    (
        RosterBuilder::new(TeamSide::Home).name("Harbor").build(),
        RosterBuilder::new(TeamSide::Away).name("Summit").build(),
    )
}

/// Home team rated `home`, away team rated `away` across the board.
pub fn rated_matchup(home: u8, away: u8) -> (Roster, Roster) {
    (
        RosterBuilder::new(TeamSide::Home).name("Harbor").overall(home).build(),
        RosterBuilder::new(TeamSide::Away).name("Summit").overall(away).build(),
    )
}

/// Home line dominates, away line is overmatched.
pub fn trench_mismatch() -> (Roster, Roster) {
    (
        RosterBuilder::new(TeamSide::Home)
            .group_overall(PositionGroup::OffensiveLine, 92)
            .group_overall(PositionGroup::DefensiveLine, 92)
            .build(),
        RosterBuilder::new(TeamSide::Away)
            .group_overall(PositionGroup::OffensiveLine, 45)
            .group_overall(PositionGroup::DefensiveLine, 45)
            .build(),
    )
}

// =============================================================================
// Calls
// =============================================================================

pub fn run_call() -> PlayCall {
    PlayCall::scrimmage(
        OffensiveFormation::Singleback,
        PlayArchetype::InsideZone,
        RunDirection::Middle,
        DefensiveCall::default(),
    )
}

pub fn pass_call() -> PlayCall {
    PlayCall::scrimmage(
        OffensiveFormation::Shotgun,
        PlayArchetype::MediumPass,
        RunDirection::Middle,
        DefensiveCall {
            formation: DefensiveFormation::Nickel,
            coverage: Coverage::Cover2,
            blitz: false,
        },
    )
}
