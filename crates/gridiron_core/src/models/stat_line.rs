//! Per-player stat counters and the running box score.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::situation::TeamSide;

/// Additive stat counters. A play produces deltas; the box score sums them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub pass_attempts: u32,
    pub completions: u32,
    pub passing_yards: i32,
    pub passing_touchdowns: u32,
    pub interceptions_thrown: u32,
    pub sacks_taken: u32,
    pub rush_attempts: u32,
    pub rushing_yards: i32,
    pub rushing_touchdowns: u32,
    pub fumbles_lost: u32,
    pub targets: u32,
    pub receptions: u32,
    pub receiving_yards: i32,
    pub receiving_touchdowns: u32,
    pub tackles: u32,
    pub tackles_for_loss: u32,
    pub sacks: u32,
    pub interceptions: u32,
    pub forced_fumbles: u32,
    pub safeties: u32,
    pub penalties: u32,
    pub penalty_yards: i32,
    pub field_goal_attempts: u32,
    pub field_goals_made: u32,
    pub extra_point_attempts: u32,
    pub extra_points_made: u32,
    pub two_point_conversions: u32,
    pub punts: u32,
    pub punt_yards: i32,
    pub kick_returns: u32,
    pub kick_return_yards: i32,
}

impl StatLine {
    pub fn merge(&mut self, other: &StatLine) {
        self.pass_attempts += other.pass_attempts;
        self.completions += other.completions;
        self.passing_yards += other.passing_yards;
        self.passing_touchdowns += other.passing_touchdowns;
        self.interceptions_thrown += other.interceptions_thrown;
        self.sacks_taken += other.sacks_taken;
        self.rush_attempts += other.rush_attempts;
        self.rushing_yards += other.rushing_yards;
        self.rushing_touchdowns += other.rushing_touchdowns;
        self.fumbles_lost += other.fumbles_lost;
        self.targets += other.targets;
        self.receptions += other.receptions;
        self.receiving_yards += other.receiving_yards;
        self.receiving_touchdowns += other.receiving_touchdowns;
        self.tackles += other.tackles;
        self.tackles_for_loss += other.tackles_for_loss;
        self.sacks += other.sacks;
        self.interceptions += other.interceptions;
        self.forced_fumbles += other.forced_fumbles;
        self.safeties += other.safeties;
        self.penalties += other.penalties;
        self.penalty_yards += other.penalty_yards;
        self.field_goal_attempts += other.field_goal_attempts;
        self.field_goals_made += other.field_goals_made;
        self.extra_point_attempts += other.extra_point_attempts;
        self.extra_points_made += other.extra_points_made;
        self.two_point_conversions += other.two_point_conversions;
        self.punts += other.punts;
        self.punt_yards += other.punt_yards;
        self.kick_returns += other.kick_returns;
        self.kick_return_yards += other.kick_return_yards;
    }

    pub fn is_empty(&self) -> bool {
        *self == StatLine::default()
    }
}

/// Stat change for one player on one play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatDelta {
    pub player: PlayerId,
    pub team: TeamSide,
    pub line: StatLine,
}

impl PlayerStatDelta {
    pub fn new(player: PlayerId, team: TeamSide) -> Self {
        Self {
            player,
            team,
            line: StatLine::default(),
        }
    }
}

/// Accumulates deltas for a whole game. Ordered by player id so the
/// serialized form is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub players: BTreeMap<PlayerId, (TeamSide, StatLine)>,
}

impl BoxScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, deltas: &[PlayerStatDelta]) {
        for delta in deltas {
            let entry = self
                .players
                .entry(delta.player)
                .or_insert((delta.team, StatLine::default()));
            entry.1.merge(&delta.line);
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&StatLine> {
        self.players.get(&id).map(|(_, line)| line)
    }

    pub fn team_totals(&self, team: TeamSide) -> StatLine {
        let mut total = StatLine::default();
        for (side, line) in self.players.values() {
            if *side == team {
                total.merge(line);
            }
        }
        total
    }
}
