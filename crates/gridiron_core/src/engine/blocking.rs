//! Blocking matchups: assign blockers to defenders and resolve each pairing.
//!
//! ## Assignment
//! - **Runs:** one blocker per defender in front order. Surplus blockers
//!   double-team, point-of-attack defenders first. Surplus defenders go
//!   unblocked.
//! - **Pass protection:** blockers take rushers in order. Surplus blockers
//!   double the strongest rushers. Surplus rushers go unblocked.
//!
//! ## Resolution
//! Each pairing is a Bernoulli draw with
//! `clamp(logistic(margin / scale), floor, ceiling)` where `margin` is the
//! blocker's composite minus the defender's plus situational modifiers.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BlockingConfig;
use crate::error::{DegenerateMatchup, DegenerateMatchupWarning};
use crate::models::play_call::{
    DefensiveCall, DefensiveFormation, OffensiveFormation, PlayArchetype, RunDirection,
    ScrimmageCall,
};
use crate::models::player::{PlayerId, Position, MAX_RATING};
use crate::models::situation::{is_obvious_pass_down, SituationalContext};

use super::rng::chance;

// ============================================================================
// Inputs
// ============================================================================

/// One side of a blocking matchup, reduced to a single composite rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchupParticipant {
    pub player: Option<PlayerId>,
    pub position: Position,
    pub rating: f32,
}

impl MatchupParticipant {
    pub fn new(player: PlayerId, position: Position, rating: f32) -> Self {
        Self {
            player: Some(player),
            position,
            rating,
        }
    }
}

/// Everything about the snap the blocking resolver cares about.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockingContext {
    pub archetype: PlayArchetype,
    pub direction: RunDirection,
    pub formation: OffensiveFormation,
    pub defensive_formation: DefensiveFormation,
    pub blitz: bool,
    pub down: u8,
    pub yards_to_go: i32,
    pub field_position: i32,
}

impl BlockingContext {
    pub fn from_situation(
        call: &ScrimmageCall,
        defense: &DefensiveCall,
        situation: &SituationalContext,
    ) -> Self {
        Self {
            archetype: call.archetype,
            direction: call.direction,
            formation: call.formation,
            defensive_formation: defense.formation,
            blitz: defense.blitz,
            down: situation.down,
            yards_to_go: situation.yards_to_go,
            field_position: situation.field_position,
        }
    }

    pub fn is_pass(&self) -> bool {
        self.archetype.is_pass()
    }
}

// ============================================================================
// Outputs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingPairing {
    pub blocker: Option<PlayerId>,
    /// Extra blockers helping on a double team
    pub assists: Vec<PlayerId>,
    pub defender: Option<PlayerId>,
    pub blocker_rating: f32,
    pub defender_rating: f32,
    pub win_probability: f32,
    pub success: bool,
    /// Weight of this pairing in the overall grade
    pub impact_factor: f32,
    pub double_team: bool,
    pub point_of_attack: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockingOutcome {
    pub pairings: Vec<BlockingPairing>,
    pub unblocked: Vec<MatchupParticipant>,
    /// 0.0 = line collapsed, 1.0 = every block held
    pub grade: f32,
    pub warnings: Vec<DegenerateMatchupWarning>,
}

impl BlockingOutcome {
    pub fn unblocked_defenders(&self) -> &[MatchupParticipant] {
        &self.unblocked
    }

    pub fn success_rate(&self) -> f32 {
        if self.pairings.is_empty() {
            return 0.0;
        }
        self.pairings.iter().filter(|p| p.success).count() as f32 / self.pairings.len() as f32
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub struct BlockingResolver<'a> {
    config: &'a BlockingConfig,
}

impl<'a> BlockingResolver<'a> {
    pub fn new(config: &'a BlockingConfig) -> Self {
        Self { config }
    }

    /// Bounded logistic win probability for a blocker `margin` rating points up.
    pub fn win_probability(&self, margin: f32) -> f32 {
        let x = margin / self.config.logistic_scale;
        let p = 1.0 / (1.0 + (-x).exp());
        p.clamp(self.config.win_floor, self.config.win_ceiling)
    }

    pub fn resolve(
        &self,
        blockers: &[MatchupParticipant],
        defenders: &[MatchupParticipant],
        ctx: &BlockingContext,
        rng: &mut impl Rng,
    ) -> BlockingOutcome {
        if defenders.is_empty() {
            return BlockingOutcome {
                pairings: Vec::new(),
                unblocked: Vec::new(),
                grade: 1.0,
                warnings: vec![DegenerateMatchupWarning::new(
                    DegenerateMatchup::NoDefenders,
                    format!("{:?}: no defenders in the box", ctx.archetype),
                )],
            };
        }
        if blockers.is_empty() {
            return BlockingOutcome {
                pairings: Vec::new(),
                unblocked: defenders.to_vec(),
                grade: 0.0,
                warnings: vec![DegenerateMatchupWarning::new(
                    DegenerateMatchup::NoBlockers,
                    format!("{:?}: no blockers available", ctx.archetype),
                )],
            };
        }

        let engaged = blockers.len().min(defenders.len());
        let assists = self.assign_surplus(&blockers[engaged..], &defenders[..engaged], ctx);
        let modifier = self.situational_modifier(ctx);

        let mut pairings = Vec::with_capacity(engaged);
        for (idx, (blocker, defender)) in blockers.iter().zip(defenders).enumerate() {
            let helpers = &assists[idx];
            let point_of_attack = self.is_point_of_attack(idx, defenders.len(), ctx);
            let margin = blocker.rating - defender.rating
                + modifier
                + self.config.double_team_bonus * helpers.len() as f32;
            let win_probability = self.win_probability(margin);
            let success = chance(rng, win_probability);

            let weight = if point_of_attack {
                self.config.point_of_attack_weight
            } else {
                1.0
            };
            let impact_factor = (0.25 + 0.75 * (margin.abs() / MAX_RATING as f32).min(1.0)) * weight;

            pairings.push(BlockingPairing {
                blocker: blocker.player,
                assists: helpers.iter().filter_map(|h| h.player).collect(),
                defender: defender.player,
                blocker_rating: blocker.rating,
                defender_rating: defender.rating,
                win_probability,
                success,
                impact_factor,
                double_team: !helpers.is_empty(),
                point_of_attack,
            });
        }

        let unblocked = defenders[engaged..].to_vec();
        let grade = self.grade(&pairings, unblocked.len());

        tracing::debug!(
            archetype = ?ctx.archetype,
            pairings = pairings.len(),
            unblocked = unblocked.len(),
            grade,
            "blocking resolved"
        );

        BlockingOutcome {
            pairings,
            unblocked,
            grade,
            warnings: Vec::new(),
        }
    }

    /// Margin shift applied to every pairing on this snap.
    fn situational_modifier(&self, ctx: &BlockingContext) -> f32 {
        if ctx.is_pass() {
            let mut rush = 0.0;
            if is_obvious_pass_down(ctx.down, ctx.yards_to_go) {
                rush += self.config.obvious_pass_rush_bonus;
            }
            if ctx.blitz {
                rush += self.config.blitz_rush_bonus;
            }
            -rush
        } else {
            self.config
                .short_yardage_run_bonus
                .lookup(ctx.yards_to_go as f32)
        }
    }

    fn is_point_of_attack(&self, idx: usize, front: usize, ctx: &BlockingContext) -> bool {
        if ctx.is_pass() {
            return false;
        }
        let lateral = if front <= 1 {
            0.5
        } else {
            idx as f32 / (front - 1) as f32
        };
        (lateral - ctx.direction.anchor()).abs() <= self.config.point_of_attack_window
    }

    /// Hand surplus blockers to engaged defenders. Returns helpers per engaged slot.
    fn assign_surplus<'p>(
        &self,
        surplus: &'p [MatchupParticipant],
        engaged: &[MatchupParticipant],
        ctx: &BlockingContext,
    ) -> Vec<Vec<&'p MatchupParticipant>> {
        let mut helpers: Vec<Vec<&MatchupParticipant>> = vec![Vec::new(); engaged.len()];
        if surplus.is_empty() || engaged.is_empty() {
            return helpers;
        }

        let mut order: Vec<usize> = (0..engaged.len()).collect();
        if ctx.is_pass() {
            // Strongest rusher first
            order.sort_by(|a, b| engaged[*b].rating.total_cmp(&engaged[*a].rating));
        } else {
            order.sort_by_key(|idx| !self.is_point_of_attack(*idx, engaged.len(), ctx));
        }

        for (n, helper) in surplus.iter().enumerate() {
            helpers[order[n % order.len()]].push(helper);
        }
        helpers
    }

    fn grade(&self, pairings: &[BlockingPairing], unblocked: usize) -> f32 {
        let total: f32 = pairings.iter().map(|p| p.impact_factor).sum();
        let won: f32 = pairings
            .iter()
            .filter(|p| p.success)
            .map(|p| p.impact_factor)
            .sum();
        let base = if total > 0.0 { won / total } else { 0.0 };
        (base - unblocked as f32 * self.config.unblocked_grade_penalty).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::seeded_rng;

    fn line(ids: std::ops::Range<u32>, position: Position, rating: f32) -> Vec<MatchupParticipant> {
        ids.map(|id| MatchupParticipant::new(PlayerId(id), position, rating))
            .collect()
    }

    fn run_ctx() -> BlockingContext {
        BlockingContext {
            archetype: PlayArchetype::PowerRun,
            direction: RunDirection::Middle,
            formation: OffensiveFormation::IFormation,
            defensive_formation: DefensiveFormation::Base43,
            blitz: false,
            down: 1,
            yards_to_go: 10,
            field_position: 35,
        }
    }

    fn pass_ctx() -> BlockingContext {
        BlockingContext {
            archetype: PlayArchetype::MediumPass,
            formation: OffensiveFormation::Shotgun,
            ..run_ctx()
        }
    }

    fn success_rate_over_seeds(blocker: f32, defender: f32) -> f32 {
        pairing_success_rate(5, 5, blocker, defender)
    }

    fn pairing_success_rate(blocker_count: u32, defender_count: u32, blocker: f32, defender: f32) -> f32 {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let blockers = line(1..1 + blocker_count, Position::C, blocker);
        let defenders = line(50..50 + defender_count, Position::DT, defender);
        let mut wins = 0usize;
        let mut total = 0usize;
        for seed in 0..1000 {
            let mut rng = seeded_rng(seed);
            let outcome = resolver.resolve(&blockers, &defenders, &run_ctx(), &mut rng);
            wins += outcome.pairings.iter().filter(|p| p.success).count();
            total += outcome.pairings.len();
        }
        wins as f32 / total as f32
    }

    #[test]
    fn test_dominant_line_wins_most_blocks() {
        assert!(success_rate_over_seeds(95.0, 40.0) >= 0.80);
    }

    #[test]
    fn test_overmatched_line_loses_most_blocks() {
        assert!(success_rate_over_seeds(40.0, 95.0) <= 0.20);
    }

    #[test]
    fn test_five_on_three_power_run() {
        assert!(pairing_success_rate(5, 3, 95.0, 40.0) >= 0.80);
        assert!(pairing_success_rate(5, 3, 40.0, 95.0) <= 0.20);
    }

    #[test]
    fn test_win_probability_is_bounded() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        assert_eq!(resolver.win_probability(500.0), cfg.win_ceiling);
        assert_eq!(resolver.win_probability(-500.0), cfg.win_floor);
        assert!((resolver.win_probability(0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_surplus_defenders_are_unblocked() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let blockers = line(1..6, Position::LG, 70.0);
        let defenders = line(50..57, Position::MLB, 70.0);
        let mut rng = seeded_rng(11);
        let outcome = resolver.resolve(&blockers, &defenders, &run_ctx(), &mut rng);
        assert_eq!(outcome.pairings.len(), 5);
        assert_eq!(outcome.unblocked_defenders().len(), 2);
        assert_eq!(outcome.unblocked_defenders()[0].player, Some(PlayerId(55)));
    }

    #[test]
    fn test_surplus_blockers_double_point_of_attack_on_runs() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let blockers = line(1..8, Position::RG, 70.0);
        let defenders = line(50..55, Position::DT, 70.0);
        let ctx = BlockingContext {
            direction: RunDirection::Left,
            ..run_ctx()
        };
        let mut rng = seeded_rng(5);
        let outcome = resolver.resolve(&blockers, &defenders, &ctx, &mut rng);
        let doubled: Vec<_> = outcome
            .pairings
            .iter()
            .filter(|p| p.double_team)
            .collect();
        assert_eq!(doubled.len(), 2);
        assert!(doubled.iter().all(|p| p.point_of_attack));
        assert!(outcome.unblocked.is_empty());
    }

    #[test]
    fn test_pass_protection_doubles_strongest_rusher() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let blockers = line(1..7, Position::LT, 70.0);
        let mut rushers = line(50..54, Position::DE, 60.0);
        rushers[2].rating = 92.0;
        let mut rng = seeded_rng(8);
        let outcome = resolver.resolve(&blockers[..5], &rushers, &pass_ctx(), &mut rng);
        let doubled: Vec<_> = outcome.pairings.iter().filter(|p| p.double_team).collect();
        assert_eq!(doubled.len(), 1);
        assert_eq!(doubled[0].defender, Some(PlayerId(52)));
        assert!(outcome.pairings.iter().all(|p| !p.point_of_attack));
    }

    #[test]
    fn test_blitz_on_obvious_pass_down_helps_rush() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let calm = resolver.situational_modifier(&pass_ctx());
        let loud = resolver.situational_modifier(&BlockingContext {
            down: 3,
            yards_to_go: 9,
            blitz: true,
            ..pass_ctx()
        });
        assert_eq!(calm, 0.0);
        assert!(loud < -9.0);
    }

    #[test]
    fn test_short_yardage_favors_run_blocking() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let short = resolver.situational_modifier(&BlockingContext {
            down: 3,
            yards_to_go: 1,
            ..run_ctx()
        });
        assert!(short > 0.0);
        assert_eq!(resolver.situational_modifier(&run_ctx()), 0.0);
    }

    #[test]
    fn test_no_blockers_fallback() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let defenders = line(50..54, Position::DE, 70.0);
        let mut rng = seeded_rng(1);
        let outcome = resolver.resolve(&[], &defenders, &run_ctx(), &mut rng);
        assert_eq!(outcome.grade, 0.0);
        assert_eq!(outcome.unblocked.len(), 4);
        assert_eq!(outcome.warnings[0].kind, DegenerateMatchup::NoBlockers);
    }

    #[test]
    fn test_no_defenders_fallback() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let blockers = line(1..6, Position::C, 70.0);
        let mut rng = seeded_rng(1);
        let outcome = resolver.resolve(&blockers, &[], &run_ctx(), &mut rng);
        assert_eq!(outcome.grade, 1.0);
        assert!(outcome.unblocked.is_empty());
        assert_eq!(outcome.warnings[0].kind, DegenerateMatchup::NoDefenders);
    }

    #[test]
    fn test_grade_is_bounded() {
        let cfg = BlockingConfig::default();
        let resolver = BlockingResolver::new(&cfg);
        let blockers = line(1..4, Position::C, 30.0);
        let defenders = line(50..58, Position::DE, 95.0);
        for seed in 0..50 {
            let mut rng = seeded_rng(seed);
            let outcome = resolver.resolve(&blockers, &defenders, &run_ctx(), &mut rng);
            assert!((0.0..=1.0).contains(&outcome.grade));
        }
    }
}
