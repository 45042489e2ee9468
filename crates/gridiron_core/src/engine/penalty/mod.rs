//! Penalty detection and enforcement.
//!
//! ## Flow
//! 1. [`occurrence::candidate_rates`]: adjusted rate per applicable penalty
//! 2. [`occurrence::draw_penalty`]: at most one penalty per snap
//! 3. [`occurrence::pick_offender`]: weighted pick among eligible players
//! 4. [`enforcement::enforce`]: half-distance cap, negation, accept/decline
//!
//! Only scrimmage plays draw penalties.

pub mod enforcement;
pub mod occurrence;
pub mod types;

pub use occurrence::OnFieldPersonnel;
pub use types::{
    OnFieldResult, PenaltyInstance, PenaltyKind, PenaltySide, PenaltyTiming, PlayFilter,
};

use rand::Rng;

use crate::config::PenaltyConfig;
use crate::error::{ConfigurationError, DegenerateMatchup, DegenerateMatchupWarning};
use crate::models::play_call::{PlayCall, PlayKind};
use crate::models::player::{PlayerId, Roster};
use crate::models::situation::SituationalContext;

/// Snap information the penalty engine needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayContext {
    pub situation: SituationalContext,
    pub call: PlayCall,
    /// Pre-penalty result
    pub on_field: OnFieldResult,
    /// Offensive players on the field; empty = whole roster
    pub offense_personnel: Vec<PlayerId>,
    pub defense_personnel: Vec<PlayerId>,
}

impl PlayContext {
    pub fn new(situation: SituationalContext, call: PlayCall, on_field: OnFieldResult) -> Self {
        Self {
            situation,
            call,
            on_field,
            offense_personnel: Vec::new(),
            defense_personnel: Vec::new(),
        }
    }

    pub fn with_personnel(mut self, offense: Vec<PlayerId>, defense: Vec<PlayerId>) -> Self {
        self.offense_personnel = offense;
        self.defense_personnel = defense;
        self
    }

    fn personnel(&self) -> OnFieldPersonnel<'_> {
        OnFieldPersonnel {
            offense: &self.offense_personnel,
            defense: &self.defense_personnel,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PenaltyDecision {
    pub instance: Option<PenaltyInstance>,
    pub warnings: Vec<DegenerateMatchupWarning>,
}

pub struct PenaltyEngine<'a> {
    config: &'a PenaltyConfig,
}

impl<'a> PenaltyEngine<'a> {
    pub fn new(config: &'a PenaltyConfig) -> Self {
        Self { config }
    }

    /// Draw and enforce at most one penalty for the snap.
    pub fn evaluate(
        &self,
        offense: &Roster,
        defense: &Roster,
        ctx: &PlayContext,
        rng: &mut impl Rng,
    ) -> PenaltyDecision {
        let kind = ctx.call.kind();
        if !kind.is_scrimmage() {
            return PenaltyDecision::default();
        }
        let is_pass = kind == PlayKind::Pass;

        let candidates = occurrence::candidate_rates(
            self.config,
            offense,
            defense,
            ctx.personnel(),
            &ctx.situation,
            is_pass,
        );
        let Some(definition) = occurrence::draw_penalty(&candidates, rng) else {
            return PenaltyDecision::default();
        };

        let (roster, personnel, team) = match definition.penalized {
            PenaltySide::Offense => (
                offense,
                ctx.offense_personnel.as_slice(),
                ctx.situation.possessing_team,
            ),
            PenaltySide::Defense => (
                defense,
                ctx.defense_personnel.as_slice(),
                ctx.situation.possessing_team.opponent(),
            ),
        };
        let offender = occurrence::pick_offender(definition, roster, personnel, rng);
        let mut warnings = Vec::new();
        if offender.is_none() {
            warnings.push(DegenerateMatchupWarning::new(
                DegenerateMatchup::NoEligibleOffender,
                format!("{:?}: charged to {:?} without a player", definition.kind, team),
            ));
        }

        let instance =
            enforcement::enforce(definition, team, offender, &ctx.situation, &ctx.on_field);
        PenaltyDecision {
            instance: Some(instance),
            warnings,
        }
    }

    /// Enforce a specific penalty regardless of rates.
    pub fn enforce(
        &self,
        kind: PenaltyKind,
        offender: Option<PlayerId>,
        ctx: &PlayContext,
    ) -> Result<PenaltyInstance, ConfigurationError> {
        let definition = self.config.definition(kind)?;
        let team = match definition.penalized {
            PenaltySide::Offense => ctx.situation.possessing_team,
            PenaltySide::Defense => ctx.situation.possessing_team.opponent(),
        };
        Ok(enforcement::enforce(
            definition,
            team,
            offender,
            &ctx.situation,
            &ctx.on_field,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::seeded_rng;
    use crate::models::play_call::{
        DefensiveCall, OffensiveCall, OffensiveFormation, PlayArchetype, RunDirection,
    };
    use crate::models::play_result::OutcomeKind;
    use crate::models::roster_builder::RosterBuilder;
    use crate::models::situation::TeamSide;

    fn run_context(fp: i32) -> PlayContext {
        PlayContext::new(
            SituationalContext::first_and_ten(TeamSide::Home, fp),
            PlayCall::scrimmage(
                OffensiveFormation::Singleback,
                PlayArchetype::InsideZone,
                RunDirection::Middle,
                DefensiveCall::default(),
            ),
            OnFieldResult {
                outcome: OutcomeKind::Gain,
                yards: 35,
                air_yards: None,
            },
        )
    }

    #[test]
    fn test_enforce_holding_on_long_run() {
        let config = PenaltyConfig::default();
        let engine = PenaltyEngine::new(&config);
        let instance = engine
            .enforce(PenaltyKind::OffensiveHolding, None, &run_context(50))
            .unwrap();
        assert_eq!(instance.final_play_result, -10);
        assert_eq!(instance.penalized_team, TeamSide::Home);
    }

    #[test]
    fn test_unconfigured_penalty_is_error() {
        let config = PenaltyConfig::disabled();
        let engine = PenaltyEngine::new(&config);
        assert_eq!(
            engine.enforce(PenaltyKind::FaceMask, None, &run_context(50)),
            Err(ConfigurationError::UnknownPenalty(PenaltyKind::FaceMask))
        );
    }

    #[test]
    fn test_no_penalties_on_kicks_and_kneels() {
        let config = PenaltyConfig::default().scaled(50.0);
        let engine = PenaltyEngine::new(&config);
        let home = RosterBuilder::new(TeamSide::Home).build();
        let away = RosterBuilder::new(TeamSide::Away).build();
        for offense in [
            OffensiveCall::Punt,
            OffensiveCall::FieldGoal,
            OffensiveCall::Kneel,
            OffensiveCall::Spike,
        ] {
            let mut ctx = run_context(40);
            ctx.call = PlayCall::new(offense, DefensiveCall::default());
            for seed in 0..50 {
                let mut rng = seeded_rng(seed);
                assert!(engine.evaluate(&home, &away, &ctx, &mut rng).instance.is_none());
            }
        }
    }

    #[test]
    fn test_evaluate_is_reproducible_per_seed() {
        let config = PenaltyConfig::default().scaled(5.0);
        let engine = PenaltyEngine::new(&config);
        let home = RosterBuilder::new(TeamSide::Home).build();
        let away = RosterBuilder::new(TeamSide::Away).build();
        let ctx = run_context(40);
        let mut flagged = 0;
        for seed in 0..200 {
            let a = engine.evaluate(&home, &away, &ctx, &mut seeded_rng(seed));
            let b = engine.evaluate(&home, &away, &ctx, &mut seeded_rng(seed));
            assert_eq!(a, b);
            if let Some(instance) = a.instance {
                flagged += 1;
                if instance.negates_play {
                    assert_eq!(instance.final_play_result, instance.yards_assessed);
                }
            }
        }
        assert!(flagged > 0);
    }

    #[test]
    fn test_offender_missing_records_warning() {
        let config = PenaltyConfig::default().scaled(50.0);
        let engine = PenaltyEngine::new(&config);
        let home = RosterBuilder::new(TeamSide::Home).build();
        let away = RosterBuilder::new(TeamSide::Away).build();
        // Personnel ids that match nobody on either roster
        let ctx = run_context(40).with_personnel(vec![PlayerId(1)], vec![PlayerId(2)]);
        let decision = (0..100)
            .map(|seed| engine.evaluate(&home, &away, &ctx, &mut seeded_rng(seed)))
            .find(|d| d.instance.is_some())
            .unwrap();
        assert!(decision.instance.unwrap().penalized_player.is_none());
        assert_eq!(decision.warnings[0].kind, DegenerateMatchup::NoEligibleOffender);
    }
}
