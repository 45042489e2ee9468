//! One snap from call to [`PlayResult`].
//!
//! ## Scrimmage flow
//! 1. Validate the situation (nothing is mutated on failure)
//! 2. Put personnel on the field from both depth charts
//! 3. [`BlockingResolver`]: pairings, unblocked defenders, grade
//! 4. [`PlayOutcomeResolver`]: outcome kind and yards
//! 5. Stat attribution
//! 6. [`PenaltyEngine`]: at most one flag, already enforced
//! 7. Finalize: an accepted penalty replaces the play and its stats
//!
//! Punts and field goals go to [`SpecialTeamsResolver`]; kneels and spikes
//! are administrative and never draw flags.

use rand::Rng;

use crate::config::EngineConfig;
use crate::error::{DegenerateMatchup, DegenerateMatchupWarning, Result};
use crate::models::play_call::{OffensiveCall, PlayCall, PlayKind, ScrimmageCall};
use crate::models::play_result::{OutcomeKind, PlayResult, SAFETY_POINTS, TOUCHDOWN_POINTS};
use crate::models::player::{PlayerId, Position, Roster};
use crate::models::situation::SituationalContext;

use super::blocking::{BlockingContext, BlockingOutcome, BlockingResolver};
use super::outcome::{classify_yardage, OutcomeRequest, PlayOutcomeResolver};
use super::penalty::{OnFieldResult, PenaltyEngine, PlayContext};
use super::personnel::{
    carrier_profile, passer_profile, receiver_profile, DefensivePersonnel, OffensivePersonnel,
};
use super::special_teams::SpecialTeamsResolver;
use super::stats::{penalty_delta, scrimmage_deltas, DeltaSet, ScrimmageParticipants};

pub struct PlayResolutionPipeline<'a> {
    config: &'a EngineConfig,
}

impl<'a> PlayResolutionPipeline<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self { config }
    }

    /// Resolve one snap. `offense` is the possessing team's roster.
    pub fn resolve(
        &self,
        offense: &Roster,
        defense: &Roster,
        situation: &SituationalContext,
        call: &PlayCall,
        rng: &mut impl Rng,
    ) -> Result<PlayResult> {
        situation.validate()?;
        let special_teams = SpecialTeamsResolver::new(&self.config.special_teams);
        let result = match call.offense {
            OffensiveCall::Scrimmage(scrimmage) => {
                self.resolve_scrimmage(offense, defense, situation, call, &scrimmage, rng)?
            }
            OffensiveCall::Punt => special_teams.punt(offense, defense, situation, rng),
            OffensiveCall::FieldGoal => special_teams.field_goal(offense, situation, rng),
            OffensiveCall::Kneel => self.kneel(offense, situation),
            OffensiveCall::Spike => Self::spike(offense, situation),
        };
        tracing::debug!(
            team = ?situation.possessing_team,
            down = situation.down,
            distance = situation.yards_to_go,
            field_position = situation.field_position,
            kind = ?result.kind,
            outcome = ?result.outcome_kind,
            yards = result.yards_gained,
            penalty = ?result.penalty.as_ref().map(|p| p.penalty_type),
            "play resolved"
        );
        Ok(result)
    }

    fn kneel(&self, offense: &Roster, situation: &SituationalContext) -> PlayResult {
        let (kind, yards) = classify_yardage(situation.field_position, self.config.outcome.kneel_yards);
        let quarterback = offense.starter(Position::QB).map(|p| p.id);
        let mut set = DeltaSet::new();
        set.credit(quarterback, offense.side, |l| {
            l.rush_attempts += 1;
            l.rushing_yards += yards;
        });
        let mut result = PlayResult::basic(PlayKind::Kneel, kind, yards);
        result.ball_carrier = quarterback;
        result.stat_deltas = set.into_vec();
        award_points(result, situation)
    }

    fn spike(offense: &Roster, situation: &SituationalContext) -> PlayResult {
        let quarterback = offense.starter(Position::QB).map(|p| p.id);
        let mut set = DeltaSet::new();
        set.credit(quarterback, situation.possessing_team, |l| l.pass_attempts += 1);
        let mut result = PlayResult::basic(PlayKind::Spike, OutcomeKind::Incomplete, 0);
        result.ball_carrier = quarterback;
        result.stat_deltas = set.into_vec();
        result
    }

    fn resolve_scrimmage(
        &self,
        offense: &Roster,
        defense: &Roster,
        situation: &SituationalContext,
        call: &PlayCall,
        scrimmage: &ScrimmageCall,
        rng: &mut impl Rng,
    ) -> Result<PlayResult> {
        let config = self.config;
        let is_pass = scrimmage.archetype.is_pass();
        let mut warnings = Vec::new();

        let offense_on_field = OffensivePersonnel::select(offense, scrimmage, &mut warnings);
        let defense_on_field = DefensivePersonnel::select(defense, &call.defense);

        let blocking = BlockingResolver::new(&config.blocking).resolve(
            &offense_on_field.blocking_participants(is_pass),
            &defense_on_field.blocking_participants(is_pass),
            &BlockingContext::from_situation(scrimmage, &call.defense, situation),
            rng,
        );
        warnings.extend(blocking.warnings.iter().cloned());

        let target = if is_pass {
            let target = offense_on_field.pick_target(scrimmage.archetype, rng);
            if target.is_none() {
                warnings.push(DegenerateMatchupWarning::new(
                    DegenerateMatchup::MissingReceiver,
                    format!("{} has no eligible receiver", offense.name),
                ));
            }
            target
        } else {
            None
        };

        let request = OutcomeRequest {
            situation,
            call: scrimmage,
            coverage: call.defense.coverage,
            blocking: &blocking,
            carrier: carrier_profile(offense_on_field.carrier),
            passer: passer_profile(offense_on_field.passer),
            receiver: receiver_profile(target),
            defense: defense_on_field.profile(),
        };
        let resolved = PlayOutcomeResolver::new(&config.outcome, &config.yardage).resolve(&request, rng)?;

        let tackler = match resolved.kind {
            OutcomeKind::Incomplete | OutcomeKind::TurnoverInterception | OutcomeKind::Touchdown => None,
            _ if resolved.sack || resolved.out_of_bounds => None,
            _ => defense_on_field.pick_tackler(is_pass, rng).map(|p| p.id),
        };
        let interceptor = if resolved.kind == OutcomeKind::TurnoverInterception {
            defense_on_field.pick_interceptor(rng).map(|p| p.id)
        } else {
            None
        };
        let participants = ScrimmageParticipants {
            offense: situation.possessing_team,
            passer: offense_on_field.passer.map(|p| p.id),
            ball_carrier: if is_pass {
                target.map(|p| p.id)
            } else {
                offense_on_field.carrier.map(|p| p.id)
            },
            tackler,
            sacker: if resolved.sack {
                sacker(&blocking, &defense_on_field)
            } else {
                None
            },
            interceptor,
        };
        let stat_deltas = scrimmage_deltas(&participants, &resolved);

        let context = PlayContext::new(
            *situation,
            *call,
            OnFieldResult {
                outcome: resolved.kind,
                yards: resolved.yards,
                air_yards: resolved.air_yards,
            },
        )
        .with_personnel(offense_on_field.ids(), defense_on_field.ids());
        let decision = PenaltyEngine::new(&config.penalties).evaluate(offense, defense, &context, rng);
        warnings.extend(decision.warnings);

        let mut result = PlayResult::basic(call.kind(), resolved.kind, resolved.yards);
        result.out_of_bounds = resolved.out_of_bounds;
        result.ball_carrier = resolved.ball_carrier;
        result.blocking_grade = Some(blocking.grade);
        result.stat_deltas = stat_deltas;
        result.warnings = warnings;
        result.penalty = decision.instance;
        Ok(finalize(result, situation))
    }
}

/// The first unblocked rusher, else the winner of a lost block, else any rusher.
fn sacker(blocking: &BlockingOutcome, defense: &DefensivePersonnel<'_>) -> Option<PlayerId> {
    blocking
        .unblocked
        .iter()
        .find_map(|d| d.player)
        .or_else(|| {
            blocking
                .pairings
                .iter()
                .filter(|p| !p.success)
                .find_map(|p| p.defender)
        })
        .or_else(|| defense.rushers().first().map(|p| p.id))
}

/// Apply an accepted penalty over the on-field result, then award points.
fn finalize(mut result: PlayResult, situation: &SituationalContext) -> PlayResult {
    if let Some(penalty) = result.accepted_penalty().cloned() {
        result.outcome_kind = OutcomeKind::PenaltyEnforced;
        result.yards_gained = penalty.final_play_result;
        result.out_of_bounds = false;
        result.stat_deltas = penalty_delta(&penalty).into_iter().collect();
        return result;
    }
    award_points(result, situation)
}

fn award_points(result: PlayResult, situation: &SituationalContext) -> PlayResult {
    let offense = situation.possessing_team;
    match result.outcome_kind {
        OutcomeKind::Touchdown => result.with_points(TOUCHDOWN_POINTS, offense),
        OutcomeKind::Safety => result.with_points(SAFETY_POINTS, offense.opponent()),
        _ => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PenaltyConfig;
    use crate::engine::penalty::PenaltyKind;
    use crate::engine::rng::seeded_rng;
    use crate::engine::test_fixtures::{matchup, pass_call, run_call};
    use crate::error::{EngineError, InvalidSituationError};
    use crate::models::play_call::{DefensiveCall, OffensiveFormation, PlayArchetype, RunDirection};
    use crate::models::situation::{TeamSide, FIELD_LENGTH};

    fn only_holding() -> EngineConfig {
        let mut penalties = PenaltyConfig::default();
        for def in &mut penalties.definitions {
            def.base_rate = if def.kind == PenaltyKind::OffensiveHolding {
                1.0
            } else {
                0.0
            };
        }
        penalties.max_total_rate = 1.0;
        penalties.home_team_discount = 1.0;
        penalties.discipline_multiplier_min = 1.0;
        EngineConfig {
            penalties,
            ..EngineConfig::penalty_free()
        }
    }

    #[test]
    fn test_invalid_situation_is_rejected() {
        let config = EngineConfig::default();
        let pipeline = PlayResolutionPipeline::new(&config);
        let (home, away) = matchup();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 40).with_down(5, 3);
        let err = pipeline
            .resolve(&home, &away, &situation, &run_call(), &mut seeded_rng(1))
            .unwrap_err();
        assert_eq!(err, EngineError::InvalidSituation(InvalidSituationError::DownOutOfRange(5)));
    }

    #[test]
    fn test_negating_penalty_replaces_play() {
        let config = only_holding();
        let pipeline = PlayResolutionPipeline::new(&config);
        let (home, away) = matchup();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 50);
        for seed in 0..50 {
            let result = pipeline
                .resolve(&home, &away, &situation, &run_call(), &mut seeded_rng(seed))
                .unwrap();
            let penalty = result.penalty.clone().unwrap();
            assert_eq!(result.outcome_kind, OutcomeKind::PenaltyEnforced);
            assert_eq!(result.yards_gained, -10);
            assert_eq!(result.yards_gained, penalty.yards_assessed);
            assert_eq!(result.points_scored, 0);
            assert!(result.stat_deltas.iter().all(|d| d.line.penalties == 1));
        }
    }

    #[test]
    fn test_field_position_stays_on_field() {
        let config = EngineConfig::default();
        let pipeline = PlayResolutionPipeline::new(&config);
        let (home, away) = matchup();
        let mut rng = seeded_rng(11);
        for fp in [1, 5, 30, 50, 80, 95, 99] {
            let situation = SituationalContext::first_and_ten(TeamSide::Away, fp);
            for call in [run_call(), pass_call()] {
                for _ in 0..100 {
                    let result = pipeline.resolve(&away, &home, &situation, &call, &mut rng).unwrap();
                    let after = fp + result.yards_gained;
                    assert!((0..=FIELD_LENGTH).contains(&after), "fp {fp} yards {}", result.yards_gained);
                    if result.outcome_kind == OutcomeKind::Touchdown {
                        assert_eq!(after, FIELD_LENGTH);
                        assert_eq!(result.points_scored, 6);
                        assert_eq!(result.scoring_team, Some(TeamSide::Away));
                    }
                    if result.outcome_kind == OutcomeKind::Safety {
                        assert_eq!(after, 0);
                        assert_eq!(result.scoring_team, Some(TeamSide::Home));
                    }
                }
            }
        }
    }

    #[test]
    fn test_same_seed_same_result() {
        let config = EngineConfig::default();
        let pipeline = PlayResolutionPipeline::new(&config);
        let (home, away) = matchup();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 35).with_down(3, 6);
        for seed in 0..30 {
            let a = pipeline
                .resolve(&home, &away, &situation, &pass_call(), &mut seeded_rng(seed))
                .unwrap();
            let b = pipeline
                .resolve(&home, &away, &situation, &pass_call(), &mut seeded_rng(seed))
                .unwrap();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_kneel_and_spike() {
        let config = EngineConfig::default();
        let pipeline = PlayResolutionPipeline::new(&config);
        let (home, away) = matchup();
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 40);
        let kneel = PlayCall::new(OffensiveCall::Kneel, DefensiveCall::default());
        let result = pipeline
            .resolve(&home, &away, &situation, &kneel, &mut seeded_rng(1))
            .unwrap();
        assert_eq!(result.kind, PlayKind::Kneel);
        assert_eq!(result.yards_gained, config.outcome.kneel_yards);
        assert!(result.penalty.is_none());

        let spike = PlayCall::new(OffensiveCall::Spike, DefensiveCall::default());
        let result = pipeline
            .resolve(&home, &away, &situation, &spike, &mut seeded_rng(1))
            .unwrap();
        assert_eq!(result.outcome_kind, OutcomeKind::Incomplete);
        assert_eq!(result.yards_gained, 0);
    }

    #[test]
    fn test_goal_line_run_scores_touchdown_at_goal() {
        let config = EngineConfig::penalty_free();
        let pipeline = PlayResolutionPipeline::new(&config);
        let (home, away) = matchup();
        let call = PlayCall::scrimmage(
            OffensiveFormation::Goalline,
            PlayArchetype::PowerRun,
            RunDirection::Middle,
            DefensiveCall::default(),
        );
        let situation = SituationalContext::first_and_ten(TeamSide::Home, 99);
        let touchdowns = (0..200)
            .filter_map(|seed| {
                pipeline
                    .resolve(&home, &away, &situation, &call, &mut seeded_rng(seed))
                    .ok()
            })
            .filter(|r| r.outcome_kind == OutcomeKind::Touchdown)
            .inspect(|r| assert_eq!(r.yards_gained, 1))
            .count();
        assert!(touchdowns > 0);
    }
}
