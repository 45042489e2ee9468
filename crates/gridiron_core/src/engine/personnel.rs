//! Who is on the field for a snap, derived from formations and the depth chart.

use rand::Rng;

use crate::error::{DegenerateMatchup, DegenerateMatchupWarning};
use crate::models::play_call::{
    Coverage, DefensiveCall, DefensiveFormation, OffensiveFormation, PlayArchetype, ScrimmageCall,
};
use crate::models::player::{composites, Attribute, Player, PlayerId, Position, PositionGroup, Roster};

use super::blocking::MatchupParticipant;
use super::outcome::{CarrierProfile, DefenseProfile, PasserProfile, ReceiverProfile};
use super::rng::weighted_pick;

// ============================================================================
// Formation tables
// ============================================================================

/// Tight ends and receivers split out by each formation.
fn skill_counts(formation: OffensiveFormation) -> (usize, usize) {
    // (tight ends, wide receivers)
    match formation {
        OffensiveFormation::Singleback => (1, 3),
        OffensiveFormation::IFormation => (1, 2),
        OffensiveFormation::Shotgun => (1, 3),
        OffensiveFormation::Pistol => (1, 3),
        OffensiveFormation::Goalline => (2, 1),
        OffensiveFormation::Empty => (0, 5),
    }
}

/// Down linemen and linebackers by defensive front.
fn front_counts(formation: DefensiveFormation) -> (usize, usize) {
    match formation {
        DefensiveFormation::Base43 => (4, 3),
        DefensiveFormation::Base34 => (3, 4),
        DefensiveFormation::Nickel => (4, 2),
        DefensiveFormation::Dime => (4, 1),
        DefensiveFormation::GoalLine => (5, 3),
    }
}

fn corner_count(formation: DefensiveFormation) -> usize {
    match formation {
        DefensiveFormation::Nickel => 3,
        DefensiveFormation::Dime => 4,
        DefensiveFormation::GoalLine => 1,
        _ => 2,
    }
}

/// Positions tried in order until `count` players are found.
fn line_pattern(count: usize) -> Vec<Position> {
    match count {
        0 => Vec::new(),
        1 => vec![Position::DT],
        2 => vec![Position::DE, Position::DE],
        3 => vec![Position::DE, Position::DT, Position::DE],
        4 => vec![Position::DE, Position::DT, Position::DT, Position::DE],
        n => {
            let mut pattern = vec![Position::DE];
            pattern.extend(std::iter::repeat(Position::DT).take(n - 2));
            pattern.push(Position::DE);
            pattern
        }
    }
}

fn backer_pattern(count: usize) -> Vec<Position> {
    match count {
        1 => vec![Position::MLB],
        2 => vec![Position::OLB, Position::MLB],
        3 => vec![Position::OLB, Position::MLB, Position::OLB],
        n => {
            let mut pattern = vec![Position::OLB, Position::MLB, Position::MLB, Position::OLB];
            pattern.truncate(n);
            pattern.extend(std::iter::repeat(Position::OLB).take(n.saturating_sub(4)));
            pattern
        }
    }
}

/// Fill `pattern` from the depth chart without reusing anyone. Falls back to
/// any unused player of the same group when a position runs dry.
fn fill<'r>(roster: &'r Roster, pattern: &[Position], used: &mut Vec<PlayerId>) -> Vec<&'r Player> {
    let mut picked = Vec::with_capacity(pattern.len());
    for position in pattern {
        let next = roster
            .at(*position)
            .find(|p| !used.contains(&p.id))
            .or_else(|| {
                roster
                    .in_group(position.group())
                    .find(|p| !used.contains(&p.id))
            });
        if let Some(player) = next {
            used.push(player.id);
            picked.push(player);
        }
    }
    picked
}

// ============================================================================
// Personnel
// ============================================================================

/// Offensive players on the field for a scrimmage snap.
#[derive(Debug, Clone)]
pub struct OffensivePersonnel<'r> {
    /// Left to right, extra blockers last
    pub blockers: Vec<&'r Player>,
    pub passer: Option<&'r Player>,
    pub carrier: Option<&'r Player>,
    pub receivers: Vec<&'r Player>,
}

impl<'r> OffensivePersonnel<'r> {
    pub fn select(
        roster: &'r Roster,
        call: &ScrimmageCall,
        warnings: &mut Vec<DegenerateMatchupWarning>,
    ) -> Self {
        let mut used = Vec::new();
        let (tight_ends, wideouts) = skill_counts(call.formation);
        let is_run = call.archetype.is_run();

        let passer = fill(roster, &[Position::QB], &mut used).into_iter().next();
        let carrier = if call.archetype == PlayArchetype::QbSneak {
            passer
        } else if call.formation == OffensiveFormation::Empty && is_run {
            // Nobody in the backfield; the quarterback keeps it
            passer
        } else {
            fill(roster, &[Position::RB], &mut used).into_iter().next()
        };

        let mut blockers = fill(
            roster,
            &[Position::LT, Position::LG, Position::C, Position::RG, Position::RT],
            &mut used,
        );
        let ends = fill(roster, &vec![Position::TE; tight_ends], &mut used);
        let mut receivers = fill(roster, &vec![Position::WR; wideouts], &mut used);

        if is_run || matches!(call.formation, OffensiveFormation::Goalline) {
            for (n, end) in ends.into_iter().enumerate() {
                if n % 2 == 0 {
                    blockers.push(end);
                } else {
                    blockers.insert(0, end);
                }
            }
        } else {
            receivers.extend(ends);
        }

        if call.formation == OffensiveFormation::IFormation {
            if let Some(fullback) = fill(roster, &[Position::FB], &mut used).into_iter().next() {
                if is_run {
                    blockers.push(fullback);
                } else {
                    receivers.push(fullback);
                }
            }
        }

        if !is_run && call.formation != OffensiveFormation::Empty {
            if let Some(back) = carrier {
                receivers.push(back);
            }
        }

        if passer.is_none() && !is_run {
            warnings.push(DegenerateMatchupWarning::new(
                DegenerateMatchup::MissingPasser,
                format!("{} has no quarterback", roster.name),
            ));
        }
        if carrier.is_none() && is_run {
            warnings.push(DegenerateMatchupWarning::new(
                DegenerateMatchup::MissingBallCarrier,
                format!("{} has no ball carrier for {:?}", roster.name, call.archetype),
            ));
        }

        Self {
            blockers,
            passer,
            carrier,
            receivers,
        }
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self.blockers.iter().map(|p| p.id).collect();
        ids.extend(self.receivers.iter().map(|p| p.id));
        for p in [self.passer, self.carrier].into_iter().flatten() {
            if !ids.contains(&p.id) {
                ids.push(p.id);
            }
        }
        ids
    }

    pub fn blocking_participants(&self, is_pass: bool) -> Vec<MatchupParticipant> {
        let blend = if is_pass {
            composites::PASS_BLOCK
        } else {
            composites::RUN_BLOCK
        };
        self.blockers
            .iter()
            .map(|p| MatchupParticipant::new(p.id, p.position, p.ratings.blend(blend)))
            .collect()
    }

    /// Pick the target, favoring positions the archetype throws to.
    pub fn pick_target(&self, archetype: PlayArchetype, rng: &mut impl Rng) -> Option<&'r Player> {
        let weights: Vec<f32> = self
            .receivers
            .iter()
            .map(|p| target_bias(archetype, p.position.group()) * p.ratings.blend(composites::SEPARATION))
            .collect();
        weighted_pick(rng, &weights).map(|idx| self.receivers[idx])
    }
}

fn target_bias(archetype: PlayArchetype, group: PositionGroup) -> f32 {
    use PositionGroup as G;
    match (archetype, group) {
        (PlayArchetype::Screen, G::RunningBack) => 4.0,
        (PlayArchetype::Screen, G::Receiver) => 1.0,
        (PlayArchetype::DeepPass, G::Receiver) => 3.0,
        (PlayArchetype::DeepPass, G::TightEnd) => 0.6,
        (PlayArchetype::DeepPass, G::RunningBack) => 0.1,
        (PlayArchetype::PlayAction, G::TightEnd) => 1.5,
        (_, G::Receiver) => 2.0,
        (_, G::TightEnd) => 1.2,
        (_, G::RunningBack) => 0.6,
        _ => 0.1,
    }
}

/// Defensive players on the field for a scrimmage snap.
#[derive(Debug, Clone)]
pub struct DefensivePersonnel<'r> {
    /// Down linemen, left to right
    pub line: Vec<&'r Player>,
    pub linebackers: Vec<&'r Player>,
    pub corners: Vec<&'r Player>,
    pub safeties: Vec<&'r Player>,
    pub coverage: Coverage,
    pub blitz: bool,
}

impl<'r> DefensivePersonnel<'r> {
    pub fn select(roster: &'r Roster, call: &DefensiveCall) -> Self {
        let mut used = Vec::new();
        let (linemen, backers) = front_counts(call.formation);
        let line = fill(roster, &line_pattern(linemen), &mut used);
        let linebackers = fill(roster, &backer_pattern(backers), &mut used);
        let corners = fill(roster, &vec![Position::CB; corner_count(call.formation)], &mut used);
        let safeties = fill(roster, &[Position::SS, Position::FS], &mut used);
        Self {
            line,
            linebackers,
            corners,
            safeties,
            coverage: call.coverage,
            blitz: call.blitz,
        }
    }

    pub fn ids(&self) -> Vec<PlayerId> {
        self.line
            .iter()
            .chain(&self.linebackers)
            .chain(&self.corners)
            .chain(&self.safeties)
            .map(|p| p.id)
            .collect()
    }

    /// Run defenders in front order: line, then backers, then a box safety.
    pub fn run_front(&self) -> Vec<&'r Player> {
        let mut front: Vec<&Player> = self.line.iter().chain(&self.linebackers).copied().collect();
        if self.coverage.adds_box_safety() {
            front.extend(self.safeties.first().copied());
        }
        front
    }

    /// Pass rushers: the line, plus a backer on a blitz, plus a safety in Cover 0.
    pub fn rushers(&self) -> Vec<&'r Player> {
        let mut rushers = self.line.clone();
        if self.blitz {
            rushers.extend(self.linebackers.first().copied());
        }
        if self.coverage == Coverage::Cover0 {
            rushers.extend(self.safeties.first().copied());
        }
        rushers
    }

    /// Players dropping into coverage on a pass.
    pub fn cover_players(&self) -> Vec<&'r Player> {
        let rushing: Vec<PlayerId> = self.rushers().iter().map(|p| p.id).collect();
        self.linebackers
            .iter()
            .chain(&self.corners)
            .chain(&self.safeties)
            .copied()
            .filter(|p| !rushing.contains(&p.id))
            .collect()
    }

    pub fn blocking_participants(&self, is_pass: bool) -> Vec<MatchupParticipant> {
        let (players, blend) = if is_pass {
            (self.rushers(), composites::PASS_RUSH)
        } else {
            (self.run_front(), composites::RUN_DEFENSE)
        };
        players
            .iter()
            .map(|p| MatchupParticipant::new(p.id, p.position, p.ratings.blend(blend)))
            .collect()
    }

    pub fn profile(&self) -> DefenseProfile {
        let mean = |players: &[&Player], f: &dyn Fn(&Player) -> f32| -> Option<f32> {
            if players.is_empty() {
                None
            } else {
                Some(players.iter().map(|p| f(p)).sum::<f32>() / players.len() as f32)
            }
        };
        let everyone: Vec<&Player> = self
            .line
            .iter()
            .chain(&self.linebackers)
            .chain(&self.corners)
            .chain(&self.safeties)
            .copied()
            .collect();
        let second_level: Vec<&Player> = self
            .linebackers
            .iter()
            .chain(&self.corners)
            .chain(&self.safeties)
            .copied()
            .collect();
        let neutral = DefenseProfile::neutral();
        DefenseProfile {
            tackling: mean(&everyone, &|p| p.ratings.blend(composites::TACKLER))
                .unwrap_or(neutral.tackling),
            coverage: mean(&self.cover_players(), &|p| p.ratings.blend(composites::COVERAGE))
                .unwrap_or(neutral.coverage),
            pursuit: mean(&second_level, &|p| p.rating(Attribute::Speed) as f32)
                .unwrap_or(neutral.pursuit),
        }
    }

    /// Tackler on a play that stayed on the field, weighted by tackling.
    pub fn pick_tackler(&self, is_pass: bool, rng: &mut impl Rng) -> Option<&'r Player> {
        let pool: Vec<&Player> = if is_pass {
            self.cover_players()
        } else {
            self.run_front()
        };
        let weights: Vec<f32> = pool
            .iter()
            .map(|p| p.rating(Attribute::Tackling) as f32)
            .collect();
        weighted_pick(rng, &weights).map(|idx| pool[idx])
    }

    /// Defender credited with an interception, weighted by coverage.
    pub fn pick_interceptor(&self, rng: &mut impl Rng) -> Option<&'r Player> {
        let pool = self.cover_players();
        let weights: Vec<f32> = pool
            .iter()
            .map(|p| p.rating(Attribute::Coverage) as f32)
            .collect();
        weighted_pick(rng, &weights).map(|idx| pool[idx])
    }
}

// ============================================================================
// Profiles
// ============================================================================

pub fn carrier_profile(player: Option<&Player>) -> CarrierProfile {
    match player {
        Some(p) => CarrierProfile {
            player: Some(p.id),
            elusiveness: p.ratings.blend(composites::BALL_CARRIER),
            speed: p.rating(Attribute::Speed) as f32,
            ball_security: p.rating(Attribute::BallSecurity) as f32,
        },
        None => CarrierProfile::neutral(),
    }
}

pub fn passer_profile(player: Option<&Player>) -> PasserProfile {
    match player {
        Some(p) => PasserProfile {
            player: Some(p.id),
            passing: p.ratings.blend(composites::PASSER),
            awareness: p.rating(Attribute::Awareness) as f32,
            ball_security: p.rating(Attribute::BallSecurity) as f32,
        },
        None => PasserProfile::neutral(),
    }
}

pub fn receiver_profile(player: Option<&Player>) -> ReceiverProfile {
    match player {
        Some(p) => ReceiverProfile {
            player: Some(p.id),
            hands: p.ratings.blend(composites::RECEIVER_HANDS),
            separation: p.ratings.blend(composites::SEPARATION),
            speed: p.rating(Attribute::Speed) as f32,
            ball_security: p.rating(Attribute::BallSecurity) as f32,
        },
        None => ReceiverProfile::neutral(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::rng::seeded_rng;
    use crate::models::play_call::RunDirection;
    use crate::models::roster_builder::RosterBuilder;
    use crate::models::situation::TeamSide;

    #[test]
    fn test_i_formation_run_adds_tight_end_and_fullback() {
        let roster = RosterBuilder::new(TeamSide::Home).build();
        let call = ScrimmageCall::new(
            OffensiveFormation::IFormation,
            PlayArchetype::PowerRun,
            RunDirection::Middle,
        );
        let mut warnings = Vec::new();
        let personnel = OffensivePersonnel::select(&roster, &call, &mut warnings);
        assert_eq!(personnel.blockers.len(), 7);
        assert_eq!(personnel.blockers.last().unwrap().position, Position::FB);
        assert_eq!(personnel.carrier.unwrap().position, Position::RB);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_shotgun_pass_keeps_five_blockers() {
        let roster = RosterBuilder::new(TeamSide::Home).build();
        let call = ScrimmageCall::new(
            OffensiveFormation::Shotgun,
            PlayArchetype::ShortPass,
            RunDirection::Middle,
        );
        let mut warnings = Vec::new();
        let personnel = OffensivePersonnel::select(&roster, &call, &mut warnings);
        assert_eq!(personnel.blockers.len(), 5);
        // 3 WR + TE + RB check-down
        assert_eq!(personnel.receivers.len(), 5);
        let ids = personnel.ids();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(ids.len(), unique.len());
        assert!(ids.len() <= 11);
    }

    #[test]
    fn test_qb_sneak_carrier_is_quarterback() {
        let roster = RosterBuilder::new(TeamSide::Away).build();
        let call = ScrimmageCall::new(
            OffensiveFormation::Goalline,
            PlayArchetype::QbSneak,
            RunDirection::Middle,
        );
        let personnel = OffensivePersonnel::select(&roster, &call, &mut Vec::new());
        assert_eq!(personnel.carrier.unwrap().position, Position::QB);
    }

    #[test]
    fn test_defensive_fronts() {
        let roster = RosterBuilder::new(TeamSide::Away).build();
        let base = DefensivePersonnel::select(&roster, &DefensiveCall::default());
        assert_eq!(base.line.len(), 4);
        assert_eq!(base.linebackers.len(), 3);
        assert_eq!(base.run_front().len(), 7);
        assert_eq!(base.ids().len(), 11);

        let blitz = DefensivePersonnel::select(
            &roster,
            &DefensiveCall {
                formation: DefensiveFormation::Nickel,
                coverage: Coverage::Cover0,
                blitz: true,
            },
        );
        assert_eq!(blitz.corners.len(), 3);
        assert_eq!(blitz.rushers().len(), 6);
        assert_eq!(blitz.run_front().len(), 7);
        assert!(blitz
            .cover_players()
            .iter()
            .all(|p| !blitz.rushers().iter().any(|r| r.id == p.id)));
    }

    #[test]
    fn test_missing_quarterback_warns_on_pass() {
        let mut roster = RosterBuilder::new(TeamSide::Home).build();
        roster.players.retain(|p| p.position != Position::QB);
        let call = ScrimmageCall::new(
            OffensiveFormation::Shotgun,
            PlayArchetype::DeepPass,
            RunDirection::Middle,
        );
        let mut warnings = Vec::new();
        let personnel = OffensivePersonnel::select(&roster, &call, &mut warnings);
        assert!(personnel.passer.is_none());
        assert_eq!(warnings[0].kind, DegenerateMatchup::MissingPasser);
        assert_eq!(passer_profile(personnel.passer), PasserProfile::neutral());
    }

    #[test]
    fn test_screen_targets_favor_running_back() {
        let roster = RosterBuilder::new(TeamSide::Home).build();
        let call = ScrimmageCall::new(
            OffensiveFormation::Singleback,
            PlayArchetype::Screen,
            RunDirection::Middle,
        );
        let personnel = OffensivePersonnel::select(&roster, &call, &mut Vec::new());
        let mut rng = seeded_rng(17);
        let backs = (0..400)
            .filter(|_| {
                personnel
                    .pick_target(PlayArchetype::Screen, &mut rng)
                    .map(|p| p.position == Position::RB)
                    .unwrap_or(false)
            })
            .count();
        assert!(backs > 100);
    }
}
