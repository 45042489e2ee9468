//! Yardage, caps and the accept/decline choice for a called penalty.

use crate::config::PenaltyDefinition;
use crate::models::play_result::OutcomeKind;
use crate::models::player::PlayerId;
use crate::models::situation::{SituationalContext, TeamSide, FIELD_LENGTH};

use super::types::{OnFieldResult, PenaltyInstance, PenaltySide, PenaltyTiming};

// Rough offense-side value of a snap, used only to compare options.
const FIRST_DOWN_VALUE: i32 = 10;
const LOST_DOWN_VALUE: i32 = 4;
const TOUCHDOWN_VALUE: i32 = 1000;
const TURNOVER_VALUE: i32 = -1000;
const SAFETY_VALUE: i32 = -500;

/// Penalty distance before the half-distance cap.
pub fn base_yards(definition: &PenaltyDefinition, on_field: &OnFieldResult) -> i32 {
    if definition.spot_foul {
        on_field
            .air_yards
            .map(|air| air.max(1))
            .unwrap_or(definition.yards)
    } else {
        definition.yards
    }
}

/// Half the distance to the penalized team's goal line caps every penalty.
pub fn half_distance_cap(yards: i32, side: PenaltySide, field_position: i32) -> i32 {
    let distance = match side {
        PenaltySide::Offense => field_position,
        PenaltySide::Defense => FIELD_LENGTH - field_position,
    };
    let half = distance / 2;
    if yards > half {
        half
    } else {
        yards
    }
}

/// Signed yards from the offense's perspective.
pub fn signed_yards(definition: &PenaltyDefinition, situation: &SituationalContext, on_field: &OnFieldResult) -> i32 {
    let capped = half_distance_cap(
        base_yards(definition, on_field),
        definition.penalized,
        situation.field_position,
    );
    match definition.penalized {
        PenaltySide::Offense => -capped,
        PenaltySide::Defense => capped,
    }
}

fn on_field_value(situation: &SituationalContext, on_field: &OnFieldResult) -> i32 {
    match on_field.outcome {
        OutcomeKind::Touchdown => TOUCHDOWN_VALUE,
        OutcomeKind::TurnoverFumble | OutcomeKind::TurnoverInterception => TURNOVER_VALUE,
        OutcomeKind::Safety => SAFETY_VALUE,
        _ if on_field.yards >= situation.yards_to_go => on_field.yards + FIRST_DOWN_VALUE,
        _ => on_field.yards - LOST_DOWN_VALUE,
    }
}

fn accepted_value(definition: &PenaltyDefinition, situation: &SituationalContext, yards: i32) -> i32 {
    let mut value = yards;
    if definition.automatic_first_down || yards >= situation.yards_to_go {
        value += FIRST_DOWN_VALUE;
    }
    if definition.loss_of_down {
        value -= LOST_DOWN_VALUE;
    }
    value
}

/// Decide enforcement for a called penalty.
///
/// Pre-snap and play-negating fouls always stand alone. For the rest the
/// option worth more to the offense is taken, whichever side fouled.
pub fn enforce(
    definition: &PenaltyDefinition,
    penalized_team: TeamSide,
    penalized_player: Option<PlayerId>,
    situation: &SituationalContext,
    on_field: &OnFieldResult,
) -> PenaltyInstance {
    let yards_assessed = signed_yards(definition, situation, on_field);
    let standalone = definition.negates_play || definition.timing == PenaltyTiming::PreSnap;

    let penalty_accepted = if standalone {
        true
    } else {
        let accept = accepted_value(definition, situation, yards_assessed);
        let decline = on_field_value(situation, on_field);
        accept > decline
    };
    let final_play_result = if penalty_accepted {
        yards_assessed
    } else {
        on_field.yards
    };

    tracing::debug!(
        penalty = ?definition.kind,
        yards = yards_assessed,
        accepted = penalty_accepted,
        final_play_result,
        "penalty enforced"
    );

    PenaltyInstance {
        penalty_type: definition.kind,
        penalized_side: definition.penalized,
        penalized_team,
        penalized_player,
        yards_assessed,
        automatic_first_down: definition.automatic_first_down,
        automatic_loss_of_down: definition.loss_of_down,
        negates_play: standalone,
        timing: definition.timing,
        penalty_accepted,
        final_play_result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfig;
    use crate::engine::penalty::PenaltyKind;

    fn on_field(outcome: OutcomeKind, yards: i32) -> OnFieldResult {
        OnFieldResult {
            outcome,
            yards,
            air_yards: None,
        }
    }

    #[test]
    fn test_negating_holding_replaces_long_gain() {
        let config = PenaltyConfig::default();
        let holding = config.definition(PenaltyKind::OffensiveHolding).unwrap();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 50);
        let instance = enforce(
            holding,
            TeamSide::Home,
            Some(PlayerId(1006)),
            &situation,
            &on_field(OutcomeKind::Gain, 35),
        );
        assert!(instance.negates_play);
        assert!(instance.penalty_accepted);
        assert_eq!(instance.yards_assessed, -10);
        assert_eq!(instance.final_play_result, -10);
    }

    #[test]
    fn test_half_distance_cap() {
        assert_eq!(half_distance_cap(10, PenaltySide::Offense, 8), 4);
        assert_eq!(half_distance_cap(15, PenaltySide::Defense, 90), 5);
        assert_eq!(half_distance_cap(5, PenaltySide::Defense, 40), 5);
    }

    #[test]
    fn test_offense_declines_when_play_is_better() {
        let config = PenaltyConfig::default();
        let offside = config.definition(PenaltyKind::DefensiveOffside).unwrap();
        let situation = SituationalContext::first_and_ten(TeamSide::Away, 30);

        let big_gain = enforce(offside, TeamSide::Home, None, &situation, &on_field(OutcomeKind::Gain, 22));
        assert!(!big_gain.penalty_accepted);
        assert_eq!(big_gain.final_play_result, 22);

        let stuffed = enforce(offside, TeamSide::Home, None, &situation, &on_field(OutcomeKind::Loss, -2));
        assert!(stuffed.penalty_accepted);
        assert_eq!(stuffed.final_play_result, 5);

        let picked = enforce(
            offside,
            TeamSide::Home,
            None,
            &situation,
            &on_field(OutcomeKind::TurnoverInterception, 12),
        );
        assert!(picked.penalty_accepted);
    }

    #[test]
    fn test_live_ball_offensive_foul_keeps_better_play() {
        let config = PenaltyConfig::default();
        let mut opi = config.definition(PenaltyKind::OffensivePassInterference).unwrap().clone();
        opi.negates_play = false;
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 50);

        let short_gain = enforce(&opi, TeamSide::Home, None, &situation, &on_field(OutcomeKind::Gain, 3));
        assert!(!short_gain.penalty_accepted);
        assert_eq!(short_gain.final_play_result, 3);
        assert_eq!(short_gain.yards_assessed, -10);

        let big_loss = enforce(&opi, TeamSide::Home, None, &situation, &on_field(OutcomeKind::Loss, -14));
        assert!(big_loss.penalty_accepted);
        assert_eq!(big_loss.final_play_result, -10);
    }

    #[test]
    fn test_touchdown_beats_defensive_penalty() {
        let config = PenaltyConfig::default();
        let face_mask = config.definition(PenaltyKind::FaceMask).unwrap();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 75);
        let instance = enforce(face_mask, TeamSide::Away, None, &situation, &on_field(OutcomeKind::Touchdown, 25));
        assert!(!instance.penalty_accepted);
        assert_eq!(instance.final_play_result, 25);
    }

    #[test]
    fn test_spot_foul_uses_air_yards() {
        let config = PenaltyConfig::default();
        let dpi = config.definition(PenaltyKind::DefensivePassInterference).unwrap();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 30);
        let result = OnFieldResult {
            outcome: OutcomeKind::Incomplete,
            yards: 0,
            air_yards: Some(28),
        };
        let instance = enforce(dpi, TeamSide::Away, None, &situation, &result);
        assert_eq!(instance.yards_assessed, 28);
        assert!(instance.automatic_first_down);
        assert!(instance.penalty_accepted);

        let no_target = on_field(OutcomeKind::Incomplete, 0);
        assert_eq!(base_yards(dpi, &no_target), 15);
    }

    #[test]
    fn test_enforcement_is_deterministic() {
        let config = PenaltyConfig::default();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 45).with_down(3, 4);
        for def in &config.definitions {
            let result = on_field(OutcomeKind::Gain, 3);
            let a = enforce(def, TeamSide::Home, None, &situation, &result);
            let b = enforce(def, TeamSide::Home, None, &situation, &result);
            assert_eq!(a, b);
        }
    }
}
