//! Per-player stat deltas for a resolved snap.
//!
//! Attribution is pure: the pipeline picks the tackler, sacker and
//! interceptor up front and this module only turns a resolved outcome into
//! counters. Deltas are discarded when an accepted penalty replaces the play.

use crate::models::play_result::OutcomeKind;
use crate::models::player::PlayerId;
use crate::models::situation::TeamSide;
use crate::models::stat_line::{PlayerStatDelta, StatLine};

use super::outcome::ResolvedOutcome;
use super::penalty::PenaltyInstance;

/// Accumulates deltas, one entry per player.
#[derive(Debug, Clone, Default)]
pub struct DeltaSet {
    deltas: Vec<PlayerStatDelta>,
}

impl DeltaSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, player: PlayerId, team: TeamSide) -> &mut StatLine {
        let idx = match self.deltas.iter().position(|d| d.player == player) {
            Some(idx) => idx,
            None => {
                self.deltas.push(PlayerStatDelta::new(player, team));
                self.deltas.len() - 1
            }
        };
        &mut self.deltas[idx].line
    }

    /// Apply `f` only when the player is known.
    pub fn credit(&mut self, player: Option<PlayerId>, team: TeamSide, f: impl FnOnce(&mut StatLine)) {
        if let Some(player) = player {
            f(self.line(player, team));
        }
    }

    pub fn into_vec(self) -> Vec<PlayerStatDelta> {
        self.deltas.into_iter().filter(|d| !d.line.is_empty()).collect()
    }
}

/// Who did what on a scrimmage snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrimmageParticipants {
    pub offense: TeamSide,
    pub passer: Option<PlayerId>,
    /// Runner on a run, target on a pass
    pub ball_carrier: Option<PlayerId>,
    pub tackler: Option<PlayerId>,
    pub sacker: Option<PlayerId>,
    pub interceptor: Option<PlayerId>,
}

pub fn scrimmage_deltas(who: &ScrimmageParticipants, resolved: &ResolvedOutcome) -> Vec<PlayerStatDelta> {
    let offense = who.offense;
    let defense = offense.opponent();
    let mut set = DeltaSet::new();
    let touchdown = resolved.kind == OutcomeKind::Touchdown;
    let safety = resolved.kind == OutcomeKind::Safety;

    if resolved.sack {
        set.credit(who.passer, offense, |l| l.sacks_taken += 1);
        set.credit(who.sacker, defense, |l| {
            l.sacks += 1;
            l.tackles += 1;
            l.tackles_for_loss += 1;
            if resolved.fumble {
                l.forced_fumbles += 1;
            }
            if safety {
                l.safeties += 1;
            }
        });
        if resolved.fumble {
            set.credit(who.passer, offense, |l| l.fumbles_lost += 1);
        }
        return set.into_vec();
    }

    if resolved.pass_attempted {
        set.credit(who.passer, offense, |l| {
            l.pass_attempts += 1;
            if resolved.completed {
                l.completions += 1;
                l.passing_yards += resolved.yards;
                if touchdown {
                    l.passing_touchdowns += 1;
                }
            }
            if resolved.kind == OutcomeKind::TurnoverInterception {
                l.interceptions_thrown += 1;
            }
        });
        set.credit(who.ball_carrier, offense, |l| {
            l.targets += 1;
            if resolved.completed {
                l.receptions += 1;
                l.receiving_yards += resolved.yards;
                if touchdown {
                    l.receiving_touchdowns += 1;
                }
                if resolved.fumble {
                    l.fumbles_lost += 1;
                }
            }
        });
        if resolved.kind == OutcomeKind::TurnoverInterception {
            set.credit(who.interceptor, defense, |l| l.interceptions += 1);
        } else if resolved.completed {
            credit_tackle(&mut set, who, resolved, defense);
        }
        return set.into_vec();
    }

    set.credit(who.ball_carrier, offense, |l| {
        l.rush_attempts += 1;
        l.rushing_yards += resolved.yards;
        if touchdown {
            l.rushing_touchdowns += 1;
        }
        if resolved.fumble {
            l.fumbles_lost += 1;
        }
    });
    credit_tackle(&mut set, who, resolved, defense);
    set.into_vec()
}

fn credit_tackle(set: &mut DeltaSet, who: &ScrimmageParticipants, resolved: &ResolvedOutcome, defense: TeamSide) {
    if resolved.kind == OutcomeKind::Touchdown || resolved.out_of_bounds {
        return;
    }
    set.credit(who.tackler, defense, |l| {
        l.tackles += 1;
        if resolved.yards < 0 {
            l.tackles_for_loss += 1;
        }
        if resolved.fumble {
            l.forced_fumbles += 1;
        }
        if resolved.kind == OutcomeKind::Safety {
            l.safeties += 1;
        }
    });
}

/// Penalty count and yardage for the offender of an accepted penalty.
pub fn penalty_delta(instance: &PenaltyInstance) -> Option<PlayerStatDelta> {
    if !instance.penalty_accepted {
        return None;
    }
    let player = instance.penalized_player?;
    let mut delta = PlayerStatDelta::new(player, instance.penalized_team);
    delta.line.penalties = 1;
    delta.line.penalty_yards = instance.yards_assessed.abs();
    Some(delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(kind: OutcomeKind, yards: i32) -> ResolvedOutcome {
        ResolvedOutcome {
            kind,
            yards,
            out_of_bounds: false,
            ball_carrier: Some(PlayerId(1003)),
            pass_attempted: false,
            completed: false,
            air_yards: None,
            sack: false,
            big_play: false,
            fumble: false,
        }
    }

    fn participants() -> ScrimmageParticipants {
        ScrimmageParticipants {
            offense: TeamSide::Home,
            passer: Some(PlayerId(1001)),
            ball_carrier: Some(PlayerId(1003)),
            tackler: Some(PlayerId(2020)),
            sacker: Some(PlayerId(2015)),
            interceptor: Some(PlayerId(2025)),
        }
    }

    fn line_of(deltas: &[PlayerStatDelta], id: u32) -> StatLine {
        deltas
            .iter()
            .find(|d| d.player == PlayerId(id))
            .map(|d| d.line)
            .unwrap_or_default()
    }

    #[test]
    fn test_run_credits_carrier_and_tackler() {
        let deltas = scrimmage_deltas(&participants(), &resolved(OutcomeKind::Loss, -2));
        let carrier = line_of(&deltas, 1003);
        assert_eq!(carrier.rush_attempts, 1);
        assert_eq!(carrier.rushing_yards, -2);
        let tackler = line_of(&deltas, 2020);
        assert_eq!(tackler.tackles, 1);
        assert_eq!(tackler.tackles_for_loss, 1);
        assert!(deltas.iter().all(|d| d.player != PlayerId(1001)));
    }

    #[test]
    fn test_touchdown_pass_has_no_tackle() {
        let mut outcome = resolved(OutcomeKind::Touchdown, 31);
        outcome.pass_attempted = true;
        outcome.completed = true;
        let deltas = scrimmage_deltas(&participants(), &outcome);
        let passer = line_of(&deltas, 1001);
        assert_eq!((passer.completions, passer.passing_yards, passer.passing_touchdowns), (1, 31, 1));
        let receiver = line_of(&deltas, 1003);
        assert_eq!((receiver.receptions, receiver.receiving_touchdowns), (1, 1));
        assert_eq!(line_of(&deltas, 2020).tackles, 0);
    }

    #[test]
    fn test_interception_credits_defender() {
        let mut outcome = resolved(OutcomeKind::TurnoverInterception, 18);
        outcome.pass_attempted = true;
        let deltas = scrimmage_deltas(&participants(), &outcome);
        assert_eq!(line_of(&deltas, 1001).interceptions_thrown, 1);
        assert_eq!(line_of(&deltas, 1003).targets, 1);
        assert_eq!(line_of(&deltas, 1003).receptions, 0);
        let defender = deltas.iter().find(|d| d.player == PlayerId(2025)).unwrap();
        assert_eq!(defender.team, TeamSide::Away);
        assert_eq!(defender.line.interceptions, 1);
    }

    #[test]
    fn test_strip_sack() {
        let mut outcome = resolved(OutcomeKind::TurnoverFumble, -7);
        outcome.sack = true;
        outcome.fumble = true;
        let deltas = scrimmage_deltas(&participants(), &outcome);
        let passer = line_of(&deltas, 1001);
        assert_eq!((passer.sacks_taken, passer.fumbles_lost), (1, 1));
        let sacker = line_of(&deltas, 2015);
        assert_eq!((sacker.sacks, sacker.forced_fumbles), (1, 1));
    }

    #[test]
    fn test_declined_penalty_has_no_delta() {
        use crate::engine::penalty::{PenaltyKind, PenaltySide, PenaltyTiming};
        let mut instance = PenaltyInstance {
            penalty_type: PenaltyKind::FaceMask,
            penalized_side: PenaltySide::Defense,
            penalized_team: TeamSide::Away,
            penalized_player: Some(PlayerId(2020)),
            yards_assessed: 15,
            automatic_first_down: true,
            automatic_loss_of_down: false,
            negates_play: false,
            timing: PenaltyTiming::LiveBall,
            penalty_accepted: false,
            final_play_result: 30,
        };
        assert!(penalty_delta(&instance).is_none());
        instance.penalty_accepted = true;
        let delta = penalty_delta(&instance).unwrap();
        assert_eq!((delta.line.penalties, delta.line.penalty_yards), (1, 15));
    }
}
