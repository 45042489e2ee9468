//! Play selection for simulated games.
//!
//! [`PlayCaller`] is the seam between the game loop and whatever picks
//! plays. [`SituationalPlayCaller`] is the default: fourth-down and clock
//! management rules first, then a weighted run/pass mix by down and
//! distance.

use rand::Rng;

use crate::config::PlayCallingConfig;
use crate::models::play_call::{
    Coverage, DefensiveCall, DefensiveFormation, OffensiveCall, OffensiveFormation, PlayArchetype,
    PlayCall, RunDirection, ScrimmageCall,
};
use crate::models::player::Roster;
use crate::models::situation::{SituationalContext, REGULATION_QUARTERS};

use super::rng::{chance, weighted_pick};
use super::special_teams::TryKind;

/// Seconds left in the game when a trailing team starts taking risks.
const DESPERATION_SECONDS: u32 = 300;

pub trait PlayCaller {
    fn call_offense<R: Rng>(&self, situation: &SituationalContext, offense: &Roster, rng: &mut R) -> OffensiveCall;

    fn call_defense<R: Rng>(&self, situation: &SituationalContext, defense: &Roster, rng: &mut R) -> DefensiveCall;

    /// `score_differential` is the scoring team's margin before the try.
    fn choose_try(&self, quarter: u8, score_differential: i32) -> TryKind;

    fn call<R: Rng>(
        &self,
        situation: &SituationalContext,
        offense: &Roster,
        defense: &Roster,
        rng: &mut R,
    ) -> PlayCall {
        let offensive = self.call_offense(situation, offense, rng);
        let defensive = self.call_defense(situation, defense, rng);
        PlayCall::new(offensive, defensive)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SituationalPlayCaller {
    config: PlayCallingConfig,
}

impl SituationalPlayCaller {
    pub fn new(config: &PlayCallingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    fn is_desperate(situation: &SituationalContext) -> bool {
        situation.quarter >= REGULATION_QUARTERS
            && situation.score_differential < 0
            && situation.clock_seconds_remaining <= DESPERATION_SECONDS
    }

    fn in_field_goal_range(&self, situation: &SituationalContext) -> bool {
        situation.field_position >= self.config.field_goal_min_field_position
    }

    /// Clock management: kneel out a lead, kick or spike at the end of a half.
    fn clock_call(&self, situation: &SituationalContext) -> Option<OffensiveCall> {
        let c = &self.config;
        let secs = situation.clock_seconds_remaining;
        let final_quarter = situation.quarter >= REGULATION_QUARTERS;
        if final_quarter && situation.score_differential > 0 && secs <= c.kneel_seconds && situation.field_position > 2 {
            return Some(OffensiveCall::Kneel);
        }
        let end_of_half = situation.quarter == 2 || final_quarter;
        if !end_of_half || secs > c.spike_seconds {
            return None;
        }
        let kick_helps = situation.quarter == 2 || (-3..=0).contains(&situation.score_differential);
        if kick_helps && self.in_field_goal_range(situation) && secs <= c.spike_seconds / 2 {
            return Some(OffensiveCall::FieldGoal);
        }
        if situation.down == 1 && (situation.quarter == 2 || situation.score_differential <= 0) {
            return Some(OffensiveCall::Spike);
        }
        None
    }

    fn fourth_down_call(&self, situation: &SituationalContext) -> Option<OffensiveCall> {
        if situation.down != 4 {
            return None;
        }
        let c = &self.config;
        let desperate = Self::is_desperate(situation);
        if desperate && situation.score_differential >= -3 && self.in_field_goal_range(situation) {
            return Some(OffensiveCall::FieldGoal);
        }
        let go_for_it = desperate
            || (situation.yards_to_go <= c.go_for_it_max_distance
                && situation.field_position >= c.go_for_it_min_field_position);
        if go_for_it {
            None
        } else if self.in_field_goal_range(situation) {
            Some(OffensiveCall::FieldGoal)
        } else {
            Some(OffensiveCall::Punt)
        }
    }

    fn pass_rate(&self, situation: &SituationalContext) -> f32 {
        let c = &self.config;
        if Self::is_desperate(situation) {
            c.trailing_late_pass_rate
        } else if situation.is_obvious_pass() || situation.yards_to_go >= 8 {
            c.long_yardage_pass_rate
        } else if situation.is_short_yardage() {
            c.short_yardage_pass_rate
        } else {
            c.base_pass_rate
        }
    }

    fn run_call(situation: &SituationalContext, rng: &mut impl Rng) -> ScrimmageCall {
        if situation.is_short_yardage() {
            let formation = if situation.distance_to_goal() <= 3 {
                OffensiveFormation::Goalline
            } else {
                OffensiveFormation::IFormation
            };
            if situation.yards_to_go <= 1 && chance(rng, 0.3) {
                return ScrimmageCall::new(formation, PlayArchetype::QbSneak, RunDirection::Middle);
            }
            return ScrimmageCall::new(formation, PlayArchetype::PowerRun, pick_direction(rng));
        }

        const RUNS: [(OffensiveFormation, PlayArchetype, f32); 5] = [
            (OffensiveFormation::Singleback, PlayArchetype::InsideZone, 0.35),
            (OffensiveFormation::Pistol, PlayArchetype::OutsideZone, 0.25),
            (OffensiveFormation::IFormation, PlayArchetype::PowerRun, 0.2),
            (OffensiveFormation::Shotgun, PlayArchetype::Draw, 0.12),
            (OffensiveFormation::Singleback, PlayArchetype::OutsideZone, 0.08),
        ];
        let weights: Vec<f32> = RUNS.iter().map(|r| r.2).collect();
        let (formation, archetype, _) = RUNS[weighted_pick(rng, &weights).unwrap_or(0)];
        let direction = match archetype {
            PlayArchetype::OutsideZone => {
                if rng.gen_bool(0.5) {
                    RunDirection::Left
                } else {
                    RunDirection::Right
                }
            }
            PlayArchetype::Draw => RunDirection::Middle,
            _ => pick_direction(rng),
        };
        ScrimmageCall::new(formation, archetype, direction)
    }

    fn pass_call(situation: &SituationalContext, rng: &mut impl Rng) -> ScrimmageCall {
        let long = situation.yards_to_go >= 15;
        let weights: [f32; 6] = if long {
            [0.05, 0.05, 0.10, 0.35, 0.40, 0.05]
        } else if situation.is_red_zone(20) {
            [0.10, 0.25, 0.35, 0.15, 0.05, 0.10]
        } else {
            [0.08, 0.22, 0.28, 0.22, 0.12, 0.08]
        };
        const PASSES: [PlayArchetype; 6] = [
            PlayArchetype::Screen,
            PlayArchetype::QuickPass,
            PlayArchetype::ShortPass,
            PlayArchetype::MediumPass,
            PlayArchetype::DeepPass,
            PlayArchetype::PlayAction,
        ];
        let archetype = PASSES[weighted_pick(rng, &weights).unwrap_or(2)];
        let formation = match archetype {
            PlayArchetype::PlayAction => {
                if rng.gen_bool(0.5) {
                    OffensiveFormation::Singleback
                } else {
                    OffensiveFormation::IFormation
                }
            }
            PlayArchetype::Screen => OffensiveFormation::Shotgun,
            _ if long && chance(rng, 0.3) => OffensiveFormation::Empty,
            _ if chance(rng, 0.15) => OffensiveFormation::Singleback,
            _ => OffensiveFormation::Shotgun,
        };
        ScrimmageCall::new(formation, archetype, RunDirection::Middle)
    }
}

fn pick_direction(rng: &mut impl Rng) -> RunDirection {
    match rng.gen_range(0..3) {
        0 => RunDirection::Left,
        1 => RunDirection::Middle,
        _ => RunDirection::Right,
    }
}

impl PlayCaller for SituationalPlayCaller {
    fn call_offense<R: Rng>(&self, situation: &SituationalContext, _offense: &Roster, rng: &mut R) -> OffensiveCall {
        if let Some(call) = self.clock_call(situation) {
            return call;
        }
        if let Some(call) = self.fourth_down_call(situation) {
            return call;
        }
        let call = if chance(rng, self.pass_rate(situation)) {
            Self::pass_call(situation, rng)
        } else {
            Self::run_call(situation, rng)
        };
        OffensiveCall::Scrimmage(call)
    }

    fn call_defense<R: Rng>(&self, situation: &SituationalContext, _defense: &Roster, rng: &mut R) -> DefensiveCall {
        let ytg = situation.yards_to_go;
        let formation = if situation.is_short_yardage() && situation.distance_to_goal() <= 5 {
            DefensiveFormation::GoalLine
        } else if situation.is_short_yardage() {
            if rng.gen_bool(0.5) {
                DefensiveFormation::Base43
            } else {
                DefensiveFormation::Base34
            }
        } else if ytg >= 10 {
            DefensiveFormation::Dime
        } else if ytg >= 7 {
            DefensiveFormation::Nickel
        } else {
            match weighted_pick(rng, &[0.4, 0.25, 0.35]) {
                Some(0) => DefensiveFormation::Base43,
                Some(1) => DefensiveFormation::Base34,
                _ => DefensiveFormation::Nickel,
            }
        };

        const COVERAGES: [Coverage; 6] = [
            Coverage::Cover0,
            Coverage::Cover1,
            Coverage::Cover2,
            Coverage::Cover3,
            Coverage::Cover4,
            Coverage::Man,
        ];
        let weights: [f32; 6] = match formation {
            DefensiveFormation::GoalLine => [0.35, 0.35, 0.0, 0.0, 0.0, 0.30],
            DefensiveFormation::Dime => [0.0, 0.10, 0.25, 0.30, 0.30, 0.05],
            _ => [0.05, 0.20, 0.20, 0.30, 0.10, 0.15],
        };
        let coverage = COVERAGES[weighted_pick(rng, &weights).unwrap_or(3)];
        let blitz = coverage == Coverage::Cover0 || chance(rng, self.config.blitz_rate);
        DefensiveCall {
            formation,
            coverage,
            blitz,
        }
    }

    fn choose_try(&self, quarter: u8, score_differential: i32) -> TryKind {
        if quarter >= self.config.two_point_from_quarter
            && self.config.two_point_margins.contains(&-score_differential)
        {
            TryKind::TwoPoint
        } else {
            TryKind::ExtraPoint
        }
    }
}
