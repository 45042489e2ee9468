//! Data model shared by every resolver: players, calls, situations, results.

pub mod play_call;
pub mod play_result;
pub mod player;
pub mod roster_builder;
pub mod situation;
pub mod stat_line;

pub use play_call::{
    Coverage, DefensiveCall, DefensiveFormation, OffensiveCall, OffensiveFormation, PlayArchetype,
    PlayCall, PlayKind, RunDirection, ScrimmageCall,
};
pub use play_result::{
    OutcomeKind, PlayResult, SpecialTeamsDetail, FIELD_GOAL_POINTS, SAFETY_POINTS,
    TOUCHDOWN_POINTS,
};
pub use player::{
    composites, Attribute, Player, PlayerId, PlayerRating, Position, PositionGroup, RatingLookup,
    Roster, NEUTRAL_RATING,
};
pub use roster_builder::{PlayerBuilder, RosterBuilder};
pub use situation::{
    first_down_distance, is_obvious_pass_down, SituationalContext, TeamSide, FIELD_LENGTH,
    FIRST_DOWN_DISTANCE, REGULATION_QUARTERS,
};
pub use stat_line::{BoxScore, PlayerStatDelta, StatLine};
