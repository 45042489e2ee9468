//! Turns a blocking result and the skill-player matchup into yards and an
//! outcome kind.
//!
//! Runs and passes share the same tail: clamp to the distribution and to
//! the field, then classify against both goal lines.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{OutcomeConfig, YardageDistribution, YardageTables};
use crate::error::ConfigurationError;
use crate::models::play_call::{Coverage, PlayArchetype, RunDirection, ScrimmageCall};
use crate::models::play_result::OutcomeKind;
use crate::models::player::{PlayerId, NEUTRAL_RATING};
use crate::models::situation::{SituationalContext, FIELD_LENGTH};

use super::blocking::BlockingOutcome;
use super::rng::{chance, sample_exp, sample_normal};

// ============================================================================
// Matchup profiles
// ============================================================================

/// Composite ratings for whoever carries the ball on a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarrierProfile {
    pub player: Option<PlayerId>,
    pub elusiveness: f32,
    pub speed: f32,
    pub ball_security: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PasserProfile {
    pub player: Option<PlayerId>,
    pub passing: f32,
    pub awareness: f32,
    pub ball_security: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiverProfile {
    pub player: Option<PlayerId>,
    pub hands: f32,
    pub separation: f32,
    pub speed: f32,
    pub ball_security: f32,
}

/// Averages over the defenders who matter once the ball is past the line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseProfile {
    pub tackling: f32,
    pub coverage: f32,
    pub pursuit: f32,
}

impl CarrierProfile {
    /// Neutral ratings, no player attached.
    pub fn neutral() -> Self {
        let n = NEUTRAL_RATING as f32;
        Self {
            player: None,
            elusiveness: n,
            speed: n,
            ball_security: n,
        }
    }
}

impl PasserProfile {
    pub fn neutral() -> Self {
        let n = NEUTRAL_RATING as f32;
        Self {
            player: None,
            passing: n,
            awareness: n,
            ball_security: n,
        }
    }
}

impl ReceiverProfile {
    pub fn neutral() -> Self {
        let n = NEUTRAL_RATING as f32;
        Self {
            player: None,
            hands: n,
            separation: n,
            speed: n,
            ball_security: n,
        }
    }
}

impl DefenseProfile {
    pub fn neutral() -> Self {
        let n = NEUTRAL_RATING as f32;
        Self {
            tackling: n,
            coverage: n,
            pursuit: n,
        }
    }
}

/// Everything the resolver reads for one scrimmage snap.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeRequest<'a> {
    pub situation: &'a SituationalContext,
    pub call: &'a ScrimmageCall,
    pub coverage: Coverage,
    pub blocking: &'a BlockingOutcome,
    pub carrier: CarrierProfile,
    pub passer: PasserProfile,
    pub receiver: ReceiverProfile,
    pub defense: DefenseProfile,
}

// ============================================================================
// Result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedOutcome {
    pub kind: OutcomeKind,
    /// Yards from the line of scrimmage; for turnovers, the spot of the change
    pub yards: i32,
    pub out_of_bounds: bool,
    pub ball_carrier: Option<PlayerId>,
    pub pass_attempted: bool,
    pub completed: bool,
    /// Intended air yards, when a pass was thrown
    pub air_yards: Option<i32>,
    pub sack: bool,
    pub big_play: bool,
    pub fumble: bool,
}

impl ResolvedOutcome {
    fn new(kind: OutcomeKind, yards: i32) -> Self {
        Self {
            kind,
            yards,
            out_of_bounds: false,
            ball_carrier: None,
            pass_attempted: false,
            completed: false,
            air_yards: None,
            sack: false,
            big_play: false,
            fumble: false,
        }
    }
}

/// Classify yardage against both goal lines.
///
/// Reaching the opponent's goal line is a touchdown with yards clamped to
/// exactly the distance to goal. Ending at or behind the offense's own goal
/// line is a safety with yards clamped to `-field_position`.
pub fn classify_yardage(field_position: i32, yards: i32) -> (OutcomeKind, i32) {
    let to_goal = FIELD_LENGTH - field_position;
    if yards >= to_goal {
        (OutcomeKind::Touchdown, to_goal)
    } else if field_position + yards <= 0 {
        (OutcomeKind::Safety, -field_position)
    } else {
        (OutcomeKind::from_yards(yards), yards)
    }
}

// ============================================================================
// Resolver
// ============================================================================

pub struct PlayOutcomeResolver<'a> {
    config: &'a OutcomeConfig,
    yardage: &'a YardageTables,
}

impl<'a> PlayOutcomeResolver<'a> {
    pub fn new(config: &'a OutcomeConfig, yardage: &'a YardageTables) -> Self {
        Self { config, yardage }
    }

    pub fn resolve(
        &self,
        request: &OutcomeRequest<'_>,
        rng: &mut impl Rng,
    ) -> Result<ResolvedOutcome, ConfigurationError> {
        let dist = self
            .yardage
            .lookup(request.call.archetype, request.call.formation)?;
        let resolved = if request.call.archetype.is_run() {
            self.resolve_run(request, dist, rng)
        } else {
            self.resolve_pass(request, dist, rng)
        };
        tracing::debug!(
            archetype = ?request.call.archetype,
            kind = ?resolved.kind,
            yards = resolved.yards,
            "outcome resolved"
        );
        Ok(resolved)
    }

    /// Rating edge → bounded multiplier around 1.0.
    fn attribute_multiplier(&self, edge: f32) -> f32 {
        (1.0 + edge / self.config.attribute_scale).clamp(
            self.config.attribute_multiplier_min,
            self.config.attribute_multiplier_max,
        )
    }

    fn blocking_multiplier(&self, grade: f32) -> f32 {
        let c = self.config;
        c.blocking_multiplier_floor
            + (c.blocking_multiplier_ceiling - c.blocking_multiplier_floor) * grade.clamp(0.0, 1.0)
    }

    fn fumble_chance(&self, ball_security: f32) -> f32 {
        self.config.fumble_base * self.config.ball_security_curve.lookup(ball_security)
    }

    fn resolve_run(
        &self,
        request: &OutcomeRequest<'_>,
        dist: &YardageDistribution,
        rng: &mut impl Rng,
    ) -> ResolvedOutcome {
        let c = self.config;
        let situation = request.situation;
        let carrier = request.carrier;
        let defense = request.defense;
        let fp = situation.field_position;
        let to_goal = FIELD_LENGTH - fp;
        let unblocked = request.blocking.unblocked.len() as i32;

        let mut raw = sample_normal(rng, dist.mean, dist.std_dev);
        let block = self.blocking_multiplier(request.blocking.grade);
        if raw >= 0.0 {
            raw *= block
                * self.attribute_multiplier(carrier.elusiveness - defense.tackling)
                * c.down_pressure.lookup(situation.down as f32)
                * c.unblocked_gain_factor.powi(unblocked);
            if situation.is_red_zone(c.red_zone_threshold) {
                raw *= c.red_zone_compression;
            }
        } else {
            raw *= 2.0 - block;
        }

        let stuffed = unblocked > 0 && chance(rng, unblocked as f32 * c.unblocked_stuff_chance);
        let mut big_play = false;
        if stuffed {
            raw = -(rng.gen_range(0..=c.stuff_loss_max.max(0)) as f32);
        } else {
            let breakaway =
                dist.big_play_chance * self.attribute_multiplier(carrier.speed - defense.pursuit);
            if chance(rng, breakaway) {
                big_play = true;
                raw = raw.max(0.0) + sample_exp(rng, dist.big_play_mean);
            }
        }

        let yards = (raw.round() as i32).clamp(dist.min_yards, dist.max_yards);
        let mut resolved = if chance(rng, self.fumble_chance(carrier.ball_security)) {
            self.fumble_at(fp, yards, to_goal)
        } else {
            let (kind, yards) = classify_yardage(fp, yards);
            ResolvedOutcome::new(kind, yards)
        };
        resolved.ball_carrier = carrier.player;
        resolved.big_play = big_play;

        if matches!(resolved.kind, OutcomeKind::Gain | OutcomeKind::NoGain | OutcomeKind::Loss) {
            let rate = if request.call.direction != RunDirection::Middle
                || request.call.archetype == PlayArchetype::OutsideZone
            {
                c.out_of_bounds_outside_run
            } else {
                c.out_of_bounds_inside_run
            };
            resolved.out_of_bounds = chance(rng, rate);
        }
        resolved
    }

    /// A fumble never scores for the offense; a fumble behind the goal
    /// line is still a safety.
    fn fumble_at(&self, fp: i32, yards: i32, to_goal: i32) -> ResolvedOutcome {
        if fp + yards <= 0 {
            return ResolvedOutcome::new(OutcomeKind::Safety, -fp);
        }
        let mut resolved = ResolvedOutcome::new(OutcomeKind::TurnoverFumble, yards.min(to_goal - 1));
        resolved.fumble = true;
        resolved
    }

    fn resolve_pass(
        &self,
        request: &OutcomeRequest<'_>,
        dist: &YardageDistribution,
        rng: &mut impl Rng,
    ) -> ResolvedOutcome {
        let c = self.config;
        let situation = request.situation;
        let passer = request.passer;
        let receiver = request.receiver;
        let defense = request.defense;
        let fp = situation.field_position;
        let to_goal = FIELD_LENGTH - fp;
        let unblocked = request.blocking.unblocked.len() as f32;
        let grade = request.blocking.grade;

        // Sack branch
        let awareness = 2.0 - self.attribute_multiplier(passer.awareness - NEUTRAL_RATING as f32);
        let sack_chance = (c.sack_base
            + unblocked * c.sack_per_unblocked
            + (1.0 - grade) * c.sack_grade_weight)
            * dist.pressure_exposure
            * awareness;
        if chance(rng, sack_chance) {
            let loss = sample_normal(rng, c.sack_yards_mean, c.sack_yards_std_dev)
                .round()
                .clamp(1.0, 15.0) as i32;
            let sack_fumble =
                c.sack_fumble_chance * c.ball_security_curve.lookup(passer.ball_security);
            let mut resolved = if chance(rng, sack_fumble) {
                self.fumble_at(fp, -loss, to_goal)
            } else {
                match classify_yardage(fp, -loss) {
                    (OutcomeKind::Safety, yards) => ResolvedOutcome::new(OutcomeKind::Safety, yards),
                    (_, yards) => ResolvedOutcome::new(OutcomeKind::Sack, yards),
                }
            };
            resolved.sack = true;
            resolved.ball_carrier = passer.player;
            return resolved;
        }

        let pressure = (unblocked * 0.35 + (1.0 - grade) * 0.5).clamp(0.0, 1.0);
        let completion = (dist.completion_base
            + (passer.passing - defense.coverage) / c.completion_scale
            + (receiver.hands - NEUTRAL_RATING as f32) / c.completion_scale
            + 0.5 * (receiver.separation - defense.coverage) / c.completion_scale
            + c.coverage_delta(request.coverage, request.call.archetype)
            - pressure * c.pressure_completion_penalty)
            .clamp(c.completion_min, c.completion_max);

        // Caught between the offense's own goal line and the back of the end zone
        let deepest_behind = dist.min_yards.max(1 - fp).min(to_goal);
        let air = (sample_normal(rng, dist.mean, dist.std_dev).round() as i32)
            .clamp(deepest_behind, to_goal);

        let mut resolved = if !chance(rng, completion) {
            let pick = c.interception_on_incompletion
                * self.attribute_multiplier(defense.coverage - passer.passing)
                * (1.0 + pressure * 0.5);
            if chance(rng, pick) {
                ResolvedOutcome::new(OutcomeKind::TurnoverInterception, air)
            } else {
                ResolvedOutcome::new(OutcomeKind::Incomplete, 0)
            }
        } else {
            let mut yac = sample_exp(rng, dist.yac_mean)
                * self.attribute_multiplier(receiver.speed - defense.tackling);
            if situation.is_red_zone(c.red_zone_threshold) {
                yac *= c.red_zone_compression;
            }
            let breakaway =
                dist.big_play_chance * self.attribute_multiplier(receiver.speed - defense.pursuit);
            let big_play = chance(rng, breakaway);
            if big_play {
                yac += sample_exp(rng, dist.big_play_mean);
            }
            let yards = (air + yac.round() as i32).clamp(dist.min_yards, dist.max_yards);

            let mut caught = if chance(rng, self.fumble_chance(receiver.ball_security)) {
                self.fumble_at(fp, yards, to_goal)
            } else {
                let (kind, yards) = classify_yardage(fp, yards);
                ResolvedOutcome::new(kind, yards)
            };
            caught.completed = true;
            caught.big_play = big_play;
            caught.ball_carrier = receiver.player;
            if matches!(caught.kind, OutcomeKind::Gain | OutcomeKind::NoGain | OutcomeKind::Loss) {
                caught.out_of_bounds = chance(rng, c.out_of_bounds_completion);
            }
            caught
        };
        resolved.pass_attempted = true;
        resolved.air_yards = Some(air);
        resolved
    }
}
