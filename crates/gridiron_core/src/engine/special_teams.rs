//! Kickoffs, punts, field goals and tries after a touchdown.
//!
//! Kick distances and returns are sampled from [`SpecialTeamsConfig`] and
//! shifted by the kicker's ratings. Every receiving spot is bounded to the
//! field (1..=99); returns never score.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SpecialTeamsConfig;
use crate::error::{DegenerateMatchup, DegenerateMatchupWarning};
use crate::models::play_call::PlayKind;
use crate::models::play_result::{
    OutcomeKind, PlayResult, SpecialTeamsDetail, FIELD_GOAL_POINTS,
};
use crate::models::player::{Attribute, Player, PlayerId, Position, Roster, NEUTRAL_RATING};
use crate::models::situation::{SituationalContext, TeamSide, FIELD_LENGTH};
use crate::models::stat_line::PlayerStatDelta;

use super::rng::{chance, sample_normal};
use super::stats::DeltaSet;

/// Kickoffs start from the kicking team's 35.
pub const KICKOFF_SPOT: i32 = 35;
/// Kicks are spotted seven yards behind the line of scrimmage.
const HOLD_DEPTH: i32 = 7;

fn bounded_spot(spot: i32) -> i32 {
    spot.clamp(1, FIELD_LENGTH - 1)
}

/// Result of a kickoff or a free kick after a safety.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KickoffResult {
    pub kicking_team: TeamSide,
    pub detail: SpecialTeamsDetail,
    pub returner: Option<PlayerId>,
    pub stat_deltas: Vec<PlayerStatDelta>,
    pub warnings: Vec<DegenerateMatchupWarning>,
}

impl KickoffResult {
    /// Receiving team's starting spot.
    pub fn receiving_field_position(&self) -> i32 {
        self.detail
            .receiving_field_position
            .unwrap_or(FIELD_LENGTH - KICKOFF_SPOT)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TryKind {
    ExtraPoint,
    TwoPoint,
}

impl TryKind {
    pub fn points(&self) -> u8 {
        match self {
            TryKind::ExtraPoint => 1,
            TryKind::TwoPoint => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryResult {
    pub team: TeamSide,
    pub kind: TryKind,
    pub success: bool,
    pub points: u8,
    pub stat_deltas: Vec<PlayerStatDelta>,
}

pub struct SpecialTeamsResolver<'a> {
    config: &'a SpecialTeamsConfig,
}

impl<'a> SpecialTeamsResolver<'a> {
    pub fn new(config: &'a SpecialTeamsConfig) -> Self {
        Self { config }
    }

    fn specialist<'r>(
        roster: &'r Roster,
        position: Position,
        warnings: &mut Vec<DegenerateMatchupWarning>,
    ) -> Option<&'r Player> {
        let player = roster.starter(position);
        if player.is_none() {
            warnings.push(DegenerateMatchupWarning::new(
                DegenerateMatchup::MissingKicker,
                format!("{} has no {:?}", roster.name, position),
            ));
        }
        player
    }

    fn edge(player: Option<&Player>, attr: Attribute) -> f32 {
        player.map(|p| p.rating(attr)).unwrap_or(NEUTRAL_RATING) as f32 - NEUTRAL_RATING as f32
    }

    fn returner(roster: &Roster) -> Option<&Player> {
        // Second receiver or backup back; starters rarely return kicks
        roster
            .at(Position::WR)
            .nth(2)
            .or_else(|| roster.at(Position::RB).nth(1))
            .or_else(|| roster.first_of(&[Position::WR, Position::RB, Position::CB]))
    }

    /// Kickoff from the kicking team's 35.
    pub fn kickoff(&self, kicking: &Roster, receiving: &Roster, rng: &mut impl Rng) -> KickoffResult {
        let c = self.config;
        let mut warnings = Vec::new();
        let kicker = Self::specialist(kicking, Position::K, &mut warnings);
        let power = Self::edge(kicker, Attribute::KickPower);

        // Landing spot measured from the receiving goal line; negative = end zone
        let landing = -(sample_normal(rng, c.kickoff_landing_mean + power * 0.1, 4.0).round() as i32);
        let kick_distance = (FIELD_LENGTH - KICKOFF_SPOT) - landing;
        let touchback_chance = c.kickoff_touchback_chance + power * c.kickoff_power_factor;

        let mut set = DeltaSet::new();
        let returner = Self::returner(receiving);
        let detail = if landing <= 0 && chance(rng, touchback_chance) {
            SpecialTeamsDetail {
                kick_distance,
                return_yards: 0,
                touchback: true,
                receiving_field_position: Some(c.kickoff_touchback_spot),
            }
        } else {
            let sampled = sample_normal(rng, c.kickoff_return_mean, c.kickoff_return_std_dev)
                .round()
                .max(0.0) as i32;
            let spot = bounded_spot(landing + sampled);
            let return_yards = spot - landing;
            set.credit(returner.map(|p| p.id), receiving.side, |l| {
                l.kick_returns += 1;
                l.kick_return_yards += return_yards;
            });
            SpecialTeamsDetail {
                kick_distance,
                return_yards,
                touchback: false,
                receiving_field_position: Some(spot),
            }
        };

        tracing::debug!(
            kicking = ?kicking.side,
            distance = detail.kick_distance,
            touchback = detail.touchback,
            spot = ?detail.receiving_field_position,
            "kickoff"
        );
        KickoffResult {
            kicking_team: kicking.side,
            detail,
            returner: returner.filter(|_| !detail.touchback).map(|p| p.id),
            stat_deltas: set.into_vec(),
            warnings,
        }
    }

    /// Free kick by the scored-on team after a safety, punted from its own 20.
    pub fn safety_free_kick(&self, kicking: &Roster, receiving: &Roster, rng: &mut impl Rng) -> KickoffResult {
        let mut warnings = Vec::new();
        let punter = Self::specialist(kicking, Position::P, &mut warnings);
        let (detail, deltas) = self.punt_from(
            self.config.safety_free_kick_spot,
            punter,
            kicking.side,
            receiving,
            rng,
        );
        let returner = if detail.touchback {
            None
        } else {
            Self::returner(receiving).map(|p| p.id)
        };
        KickoffResult {
            kicking_team: kicking.side,
            detail,
            returner,
            stat_deltas: deltas,
            warnings,
        }
    }

    fn punt_from(
        &self,
        field_position: i32,
        punter: Option<&Player>,
        kicking: TeamSide,
        receiving: &Roster,
        rng: &mut impl Rng,
    ) -> (SpecialTeamsDetail, Vec<PlayerStatDelta>) {
        let c = self.config;
        let power = Self::edge(punter, Attribute::KickPower);
        let gross = sample_normal(rng, c.punt_gross_mean + power * c.punt_power_factor, c.punt_gross_std_dev)
            .round()
            .clamp(15.0, 75.0) as i32;
        let landing = field_position + gross;

        let mut set = DeltaSet::new();
        set.credit(punter.map(|p| p.id), kicking, |l| {
            l.punts += 1;
            l.punt_yards += gross;
        });

        let detail = if landing >= FIELD_LENGTH {
            SpecialTeamsDetail {
                kick_distance: gross,
                return_yards: 0,
                touchback: true,
                receiving_field_position: Some(c.punt_touchback_spot),
            }
        } else {
            let catch_spot = FIELD_LENGTH - landing;
            let sampled = sample_normal(rng, c.punt_return_mean, c.punt_return_std_dev)
                .round()
                .max(0.0) as i32;
            let spot = bounded_spot(catch_spot + sampled);
            let return_yards = spot - catch_spot;
            let returner = Self::returner(receiving).map(|p| p.id);
            set.credit(returner, receiving.side, |l| {
                l.kick_returns += 1;
                l.kick_return_yards += return_yards;
            });
            SpecialTeamsDetail {
                kick_distance: gross,
                return_yards,
                touchback: false,
                receiving_field_position: Some(spot),
            }
        };
        (detail, set.into_vec())
    }

    /// Punt from the line of scrimmage. `yards_gained` is the net change in
    /// field position from the kicking team's view.
    pub fn punt(
        &self,
        kicking: &Roster,
        receiving: &Roster,
        situation: &SituationalContext,
        rng: &mut impl Rng,
    ) -> PlayResult {
        let mut warnings = Vec::new();
        let punter = Self::specialist(kicking, Position::P, &mut warnings);
        let (detail, deltas) = self.punt_from(
            situation.field_position,
            punter,
            kicking.side,
            receiving,
            rng,
        );
        let receiving_spot = detail
            .receiving_field_position
            .unwrap_or(self.config.punt_touchback_spot);
        let net = (FIELD_LENGTH - receiving_spot) - situation.field_position;

        tracing::debug!(gross = detail.kick_distance, net, touchback = detail.touchback, "punt");
        let mut result = PlayResult::basic(PlayKind::Punt, OutcomeKind::Punt, net);
        result.ball_carrier = punter.map(|p| p.id);
        result.special_teams = Some(detail);
        result.stat_deltas = deltas;
        result.warnings = warnings;
        result
    }

    /// Kick distance for a field goal attempted from `field_position`.
    pub fn field_goal_distance(&self, field_position: i32) -> i32 {
        (FIELD_LENGTH - field_position) + self.config.field_goal_snap_distance
    }

    pub fn field_goal_probability(&self, distance: i32, kicker: Option<&Player>) -> f32 {
        let c = self.config;
        let accuracy = Self::edge(kicker, Attribute::KickAccuracy);
        (c.field_goal_make_curve.lookup(distance as f32) + accuracy * c.field_goal_accuracy_factor)
            .clamp(c.field_goal_make_min, c.field_goal_make_max)
    }

    /// Field goal attempt. A miss hands the ball over at the spot of the kick
    /// or `missed_field_goal_min_spot`, whichever is better for the defense.
    pub fn field_goal(
        &self,
        kicking: &Roster,
        situation: &SituationalContext,
        rng: &mut impl Rng,
    ) -> PlayResult {
        let c = self.config;
        let mut warnings = Vec::new();
        let kicker = Self::specialist(kicking, Position::K, &mut warnings);
        let distance = self.field_goal_distance(situation.field_position);
        let good = chance(rng, self.field_goal_probability(distance, kicker));

        let mut set = DeltaSet::new();
        set.credit(kicker.map(|p| p.id), kicking.side, |l| {
            l.field_goal_attempts += 1;
            if good {
                l.field_goals_made += 1;
            }
        });

        tracing::debug!(distance, good, "field goal");
        let mut result = if good {
            PlayResult::basic(PlayKind::FieldGoal, OutcomeKind::FieldGoalGood, 0)
                .with_points(FIELD_GOAL_POINTS, kicking.side)
        } else {
            PlayResult::basic(PlayKind::FieldGoal, OutcomeKind::FieldGoalMissed, 0)
        };
        let receiving_field_position = if good {
            None
        } else {
            let kick_spot = situation.field_position - HOLD_DEPTH;
            Some(bounded_spot(
                (FIELD_LENGTH - kick_spot).max(c.missed_field_goal_min_spot),
            ))
        };
        result.ball_carrier = kicker.map(|p| p.id);
        result.special_teams = Some(SpecialTeamsDetail {
            kick_distance: distance,
            return_yards: 0,
            touchback: false,
            receiving_field_position,
        });
        result.stat_deltas = set.into_vec();
        result.warnings = warnings;
        result
    }

    /// Extra point or two-point try after a touchdown.
    pub fn try_after_touchdown(&self, kind: TryKind, offense: &Roster, rng: &mut impl Rng) -> TryResult {
        let c = self.config;
        let mut set = DeltaSet::new();
        let success = match kind {
            TryKind::ExtraPoint => {
                let kicker = offense.starter(Position::K);
                let accuracy = Self::edge(kicker, Attribute::KickAccuracy);
                let success = chance(
                    rng,
                    (c.extra_point_success + accuracy * c.field_goal_accuracy_factor * 0.5)
                        .clamp(c.field_goal_make_min, c.field_goal_make_max),
                );
                set.credit(kicker.map(|p| p.id), offense.side, |l| {
                    l.extra_point_attempts += 1;
                    if success {
                        l.extra_points_made += 1;
                    }
                });
                success
            }
            TryKind::TwoPoint => {
                let success = chance(rng, c.two_point_success);
                if success {
                    let passer = offense.starter(Position::QB).map(|p| p.id);
                    set.credit(passer, offense.side, |l| l.two_point_conversions += 1);
                }
                success
            }
        };
        tracing::debug!(team = ?offense.side, ?kind, success, "try after touchdown");
        TryResult {
            team: offense.side,
            kind,
            success,
            points: if success { kind.points() } else { 0 },
            stat_deltas: set.into_vec(),
        }
    }
}
