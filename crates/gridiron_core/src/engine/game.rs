//! Full-contest orchestration.
//!
//! ## Loop
//! 1. Resolve a pending period boundary (continuation, halftime, overtime)
//! 2. Kick off, free kick, or snap the next play of the active drive
//! 3. Charge the clock, apply the result to the drive, update score and box
//! 4. On a drive end: try after a touchdown, then the next possession
//!
//! | Drive end | Next possession |
//! |---|---|
//! | touchdown, field goal | scoring team kicks off |
//! | safety | scored-on team free kicks from its 20 |
//! | punt, missed field goal | receiving team at the kick's spot |
//! | turnover | opponent at the spot, touchback at the 20 from the end zone |
//!
//! Every event is appended to the log in order; the SHA-256 digest of the
//! serialized log is the game fingerprint.

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::EngineConfig;
use crate::error::{
    BoundaryKind, ConfigurationError, DegenerateMatchupWarning, DriveError, EngineError, Result,
};
use crate::models::play_call::PlayCall;
use crate::models::play_result::PlayResult;
use crate::models::player::Roster;
use crate::models::situation::{SituationalContext, TeamSide, FIELD_LENGTH};
use crate::models::stat_line::BoxScore;

use super::clock::{GameClock, PeriodTransition};
use super::continuation::QuarterContinuationManager;
use super::drive::{DriveEndReason, DriveStateMachine, DriveSummary, DriveTransition};
use super::pipeline::PlayResolutionPipeline;
use super::play_caller::{PlayCaller, SituationalPlayCaller};
use super::rng::{seeded_rng, PlayRng};
use super::special_teams::{KickoffResult, SpecialTeamsResolver, TryResult};

/// Default per-game play cap.
pub const MAX_PLAYS: u32 = 400;

/// A turnover caught in the end zone comes out to the 20.
const TURNOVER_TOUCHBACK_SPOT: i32 = 20;

// ============================================================================
// Report types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum GameEvent {
    CoinToss {
        quarter: u8,
        receiving_team: TeamSide,
    },
    Kickoff {
        quarter: u8,
        result: KickoffResult,
    },
    Play {
        quarter: u8,
        clock_seconds_remaining: u32,
        situation: SituationalContext,
        call: PlayCall,
        result: PlayResult,
        two_minute_warning: bool,
    },
    Try {
        quarter: u8,
        result: TryResult,
    },
    PeriodEnd {
        quarter: u8,
        boundary: BoundaryKind,
        transition: PeriodTransition,
    },
}

impl GameEvent {
    /// Points this event put on the board, and for whom.
    pub fn points(&self) -> Option<(TeamSide, u8)> {
        match self {
            GameEvent::Play { result, .. } => result
                .scoring_team
                .filter(|_| result.points_scored > 0)
                .map(|team| (team, result.points_scored)),
            GameEvent::Try { result, .. } if result.points > 0 => Some((result.team, result.points)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub home: u32,
    pub away: u32,
}

impl Scoreboard {
    pub fn add(&mut self, team: TeamSide, points: u8) {
        match team {
            TeamSide::Home => self.home += points as u32,
            TeamSide::Away => self.away += points as u32,
        }
    }

    pub fn points(&self, team: TeamSide) -> u32 {
        match team {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    /// Margin from `team`'s perspective.
    pub fn differential(&self, team: TeamSide) -> i32 {
        self.points(team) as i32 - self.points(team.opponent()) as i32
    }

    pub fn is_tied(&self) -> bool {
        self.home == self.away
    }

    pub fn leader(&self) -> Option<TeamSide> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(TeamSide::Home),
            std::cmp::Ordering::Less => Some(TeamSide::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub seed: u64,
    pub home_team: String,
    pub away_team: String,
    pub score: Scoreboard,
    pub box_score: BoxScore,
    pub drives: Vec<DriveSummary>,
    pub log: Vec<GameEvent>,
    pub warnings: Vec<DegenerateMatchupWarning>,
    pub plays: u32,
    /// Last period played; above 4 means overtime
    pub periods: u8,
    pub overtime: bool,
    /// Stopped by the play cap before the clock ran out
    pub truncated: bool,
    pub fingerprint: String,
}

impl GameReport {
    pub fn winner(&self) -> Option<TeamSide> {
        self.score.leader()
    }
}

/// Hex SHA-256 of the serialized log.
pub fn fingerprint(log: &[GameEvent]) -> Result<String> {
    let bytes = serde_json::to_vec(log).map_err(|e| EngineError::Serialization(e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Simulator
// ============================================================================

pub struct GameSimulator<'a, C: PlayCaller = SituationalPlayCaller> {
    config: &'a EngineConfig,
    home: &'a Roster,
    away: &'a Roster,
    caller: C,
    seed: u64,
    max_plays: u32,
}

impl<'a> GameSimulator<'a> {
    pub fn new(config: &'a EngineConfig, home: &'a Roster, away: &'a Roster, seed: u64) -> Self {
        Self {
            config,
            home,
            away,
            caller: SituationalPlayCaller::new(&config.play_calling),
            seed,
            max_plays: MAX_PLAYS,
        }
    }
}

impl<'a, C: PlayCaller> GameSimulator<'a, C> {
    pub fn with_caller<D: PlayCaller>(self, caller: D) -> GameSimulator<'a, D> {
        GameSimulator {
            config: self.config,
            home: self.home,
            away: self.away,
            caller,
            seed: self.seed,
            max_plays: self.max_plays,
        }
    }

    pub fn with_play_cap(mut self, max_plays: u32) -> Self {
        self.max_plays = max_plays;
        self
    }

    pub fn run(&self) -> Result<GameReport> {
        self.run_with_observer(|_| {})
    }

    /// Run the game, handing every event to `observer` as it happens.
    pub fn run_with_observer(&self, mut observer: impl FnMut(&GameEvent)) -> Result<GameReport> {
        self.config.validate()?;
        if self.home.side != TeamSide::Home || self.away.side != TeamSide::Away {
            return Err(ConfigurationError::invalid_value(
                "rosters",
                "home roster must be on the home side and away roster on the away side",
            )
            .into());
        }
        tracing::info!(
            seed = self.seed,
            home = %self.home.name,
            away = %self.away.name,
            "game started"
        );
        let mut contest = Contest::new(self, &mut observer);
        contest.play()?;
        contest.into_report()
    }

    fn roster(&self, side: TeamSide) -> &'a Roster {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }
}

enum Possession {
    /// Kicking team
    Kickoff(TeamSide),
    /// Scored-on team after a safety
    FreeKick(TeamSide),
    Drive(DriveStateMachine),
    Final,
}

/// Mutable state of one game in progress.
struct Contest<'s, 'a, C: PlayCaller> {
    sim: &'s GameSimulator<'a, C>,
    observer: &'s mut dyn FnMut(&GameEvent),
    rng: PlayRng,
    clock: GameClock,
    continuation: QuarterContinuationManager,
    score: Scoreboard,
    box_score: BoxScore,
    drives: Vec<DriveSummary>,
    log: Vec<GameEvent>,
    warnings: Vec<DegenerateMatchupWarning>,
    plays: u32,
    overtime: bool,
    truncated: bool,
    opening_kicker: TeamSide,
}

impl<'s, 'a, C: PlayCaller> Contest<'s, 'a, C> {
    fn new(sim: &'s GameSimulator<'a, C>, observer: &'s mut dyn FnMut(&GameEvent)) -> Self {
        Self {
            sim,
            observer,
            rng: seeded_rng(sim.seed),
            clock: GameClock::new(&sim.config.clock),
            continuation: QuarterContinuationManager::new(),
            score: Scoreboard::default(),
            box_score: BoxScore::new(),
            drives: Vec::new(),
            log: Vec::new(),
            warnings: Vec::new(),
            plays: 0,
            overtime: false,
            truncated: false,
            opening_kicker: TeamSide::Home,
        }
    }

    fn emit(&mut self, event: GameEvent) {
        (self.observer)(&event);
        self.log.push(event);
    }

    fn coin_toss(&mut self) -> TeamSide {
        let receiving_team = if self.rng.gen_bool(0.5) {
            TeamSide::Home
        } else {
            TeamSide::Away
        };
        self.emit(GameEvent::CoinToss {
            quarter: self.clock.quarter(),
            receiving_team,
        });
        receiving_team
    }

    fn play(&mut self) -> Result<()> {
        self.opening_kicker = self.coin_toss().opponent();
        let mut possession = Possession::Kickoff(self.opening_kicker);
        loop {
            if self.clock.is_game_over() {
                break;
            }
            if self.plays >= self.sim.max_plays {
                tracing::warn!(plays = self.plays, quarter = self.clock.quarter(), "play cap reached; game truncated");
                self.truncated = true;
                if let Possession::Drive(drive) = &possession {
                    self.drives.push(drive.summary().clone());
                }
                break;
            }
            if self.clock.pending_boundary().is_some() {
                possession = self.resolve_boundary(possession)?;
                continue;
            }
            possession = match possession {
                Possession::Kickoff(kicking) => self.kickoff(kicking, false)?,
                Possession::FreeKick(kicking) => self.kickoff(kicking, true)?,
                Possession::Drive(drive) => self.snap(drive)?,
                Possession::Final => break,
            };
        }
        Ok(())
    }

    fn kickoff(&mut self, kicking: TeamSide, free_kick: bool) -> Result<Possession> {
        let sim = self.sim;
        let special_teams = SpecialTeamsResolver::new(&sim.config.special_teams);
        let (kicker, receiver) = (sim.roster(kicking), sim.roster(kicking.opponent()));
        let result = if free_kick {
            special_teams.safety_free_kick(kicker, receiver, &mut self.rng)
        } else {
            special_teams.kickoff(kicker, receiver, &mut self.rng)
        };
        self.box_score.apply(&result.stat_deltas);
        self.warnings.extend(result.warnings.iter().cloned());

        let quarter = self.clock.quarter();
        self.clock.consume_seconds(sim.config.clock.kickoff_seconds)?;
        let drive = DriveStateMachine::new(kicking.opponent(), result.receiving_field_position(), quarter);
        self.emit(GameEvent::Kickoff { quarter, result });
        Ok(Possession::Drive(drive))
    }

    fn snap(&mut self, mut drive: DriveStateMachine) -> Result<Possession> {
        let sim = self.sim;
        let team = drive.team();
        let (offense, defense) = (sim.roster(team), sim.roster(team.opponent()));
        let quarter = self.clock.quarter();
        let clock_seconds_remaining = self.clock.seconds_remaining();

        let situation = drive.situation(quarter, clock_seconds_remaining, self.score.differential(team))?;
        let call = sim.caller.call(&situation, offense, defense, &mut self.rng);
        let result = PlayResolutionPipeline::new(sim.config).resolve(
            offense,
            defense,
            &situation,
            &call,
            &mut self.rng,
        )?;
        let tick = self.clock.consume_play(&result, &mut self.rng)?;
        drive.record_elapsed(tick.elapsed);
        self.plays += 1;

        self.box_score.apply(&result.stat_deltas);
        self.warnings.extend(result.warnings.iter().cloned());
        if let Some(scorer) = result.scoring_team {
            self.score.add(scorer, result.points_scored);
        }
        let transition = drive.apply(&result)?;
        let receiving_spot = result.special_teams.and_then(|d| d.receiving_field_position);
        self.emit(GameEvent::Play {
            quarter,
            clock_seconds_remaining,
            situation,
            call,
            result,
            two_minute_warning: tick.two_minute_warning,
        });

        match transition {
            DriveTransition::Continue { .. } => Ok(Possession::Drive(drive)),
            DriveTransition::Ended(reason) => self.finish_drive(drive, reason, receiving_spot),
        }
    }

    fn finish_drive(
        &mut self,
        drive: DriveStateMachine,
        reason: DriveEndReason,
        receiving_spot: Option<i32>,
    ) -> Result<Possession> {
        let quarter = self.clock.quarter();
        let team = drive.team();
        self.continuation.capture_drive_end(drive.end_state(quarter)?);
        self.drives.push(drive.summary().clone());

        if reason.is_score() && self.clock.is_overtime() {
            tracing::info!(?team, ?reason, "sudden-death score");
            self.clock.end_game();
            return Ok(Possession::Final);
        }

        let end_spot = drive.spot().field_position;
        let next = match reason {
            DriveEndReason::Touchdown => {
                self.attempt_try(team);
                Possession::Kickoff(team)
            }
            DriveEndReason::FieldGoal => Possession::Kickoff(team),
            DriveEndReason::Safety => Possession::FreeKick(team),
            DriveEndReason::Punt | DriveEndReason::MissedFieldGoal => {
                let spot = receiving_spot.unwrap_or(FIELD_LENGTH - end_spot);
                Possession::Drive(DriveStateMachine::new(team.opponent(), spot, quarter))
            }
            DriveEndReason::TurnoverInterception
            | DriveEndReason::TurnoverFumble
            | DriveEndReason::TurnoverOnDowns => Possession::Drive(DriveStateMachine::new(
                team.opponent(),
                takeover_spot(end_spot),
                quarter,
            )),
            // Only `resolve_boundary` expires a drive; a snap never ends one this way
            DriveEndReason::TimeExpiration => {
                return Err(DriveError::AlreadyEnded(reason).into());
            }
        };
        Ok(next)
    }

    fn attempt_try(&mut self, team: TeamSide) {
        let sim = self.sim;
        let quarter = self.clock.quarter();
        let kind = sim.caller.choose_try(quarter, self.score.differential(team));
        let result = SpecialTeamsResolver::new(&sim.config.special_teams).try_after_touchdown(
            kind,
            sim.roster(team),
            &mut self.rng,
        );
        self.box_score.apply(&result.stat_deltas);
        self.score.add(team, result.points);
        self.emit(GameEvent::Try { quarter, result });
    }

    /// Close out the period: expire any live drive, consult the
    /// continuation manager, then start whatever comes next.
    fn resolve_boundary(&mut self, possession: Possession) -> Result<Possession> {
        let quarter = self.clock.quarter();
        let Some(boundary) = self.clock.pending_boundary() else {
            return Ok(possession);
        };

        let (carried, expired_team) = match possession {
            Possession::Drive(mut drive) => {
                drive.expire_clock()?;
                self.continuation.capture_drive_end(drive.end_state(quarter)?);
                self.drives.push(drive.summary().clone());
                (None, Some(drive.team()))
            }
            other => (Some(other), None),
        };

        let decision = self.continuation.get_next_drive_state();
        let transition = self
            .clock
            .advance_to_next_quarter(&decision, self.score.is_tied())?;
        self.emit(GameEvent::PeriodEnd {
            quarter,
            boundary,
            transition,
        });

        let next = match transition {
            PeriodTransition::NextQuarter { quarter, .. } => {
                match (decision.should_continue, decision.possessing_team, carried) {
                    (true, Some(team), _) => {
                        Possession::Drive(DriveStateMachine::resume(team, decision.spot(), quarter))
                    }
                    (_, _, Some(carried)) => carried,
                    (_, _, None) => {
                        let team = expired_team.unwrap_or(self.opening_kicker.opponent());
                        Possession::Drive(DriveStateMachine::new(team, decision.field_position, quarter))
                    }
                }
            }
            PeriodTransition::SecondHalf => Possession::Kickoff(self.opening_kicker.opponent()),
            PeriodTransition::Overtime { .. } => {
                self.overtime = true;
                Possession::Kickoff(self.coin_toss().opponent())
            }
            PeriodTransition::GameOver => Possession::Final,
        };
        Ok(next)
    }

    fn into_report(self) -> Result<GameReport> {
        let fingerprint = fingerprint(&self.log)?;
        tracing::info!(
            home = self.score.home,
            away = self.score.away,
            plays = self.plays,
            overtime = self.overtime,
            truncated = self.truncated,
            "game finished"
        );
        Ok(GameReport {
            seed: self.sim.seed,
            home_team: self.sim.home.name.clone(),
            away_team: self.sim.away.name.clone(),
            score: self.score,
            box_score: self.box_score,
            drives: self.drives,
            log: self.log,
            warnings: self.warnings,
            plays: self.plays,
            periods: self.clock.quarter(),
            overtime: self.overtime,
            truncated: self.truncated,
            fingerprint,
        })
    }
}

/// Opponent's starting spot after a turnover whose play ended at `end_spot`.
fn takeover_spot(end_spot: i32) -> i32 {
    let spot = FIELD_LENGTH - end_spot;
    if spot <= 0 {
        TURNOVER_TOUCHBACK_SPOT
    } else {
        spot.min(FIELD_LENGTH - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;
    use crate::engine::test_fixtures::{matchup, rated_matchup};
    use crate::models::roster_builder::RosterBuilder;

    fn short_game() -> EngineConfig {
        EngineConfig {
            clock: ClockConfig::short_quarters(300),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_same_seed_same_game() {
        let config = short_game();
        let (home, away) = matchup();
        let a = GameSimulator::new(&config, &home, &away, 42).run().unwrap();
        let b = GameSimulator::new(&config, &home, &away, 42).run().unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
        assert_eq!(a.score, b.score);
        assert_eq!(a.fingerprint.len(), 64);

        let c = GameSimulator::new(&config, &home, &away, 43).run().unwrap();
        assert_ne!(a.fingerprint, c.fingerprint);
    }

    #[test]
    fn test_score_matches_log() {
        let config = short_game();
        let (home, away) = matchup();
        for seed in 0..10 {
            let report = GameSimulator::new(&config, &home, &away, seed).run().unwrap();
            let mut from_log = Scoreboard::default();
            for (team, points) in report.log.iter().filter_map(GameEvent::points) {
                from_log.add(team, points);
            }
            assert_eq!(from_log, report.score, "seed {seed}");
        }
    }

    #[test]
    fn test_full_game_reaches_regulation_end() {
        let config = EngineConfig::default();
        let (home, away) = matchup();
        let report = GameSimulator::new(&config, &home, &away, 7).run().unwrap();
        assert!(!report.truncated);
        assert!(report.periods >= 4);
        assert!(report.plays > 60);
        let boundaries: Vec<BoundaryKind> = report
            .log
            .iter()
            .filter_map(|e| match e {
                GameEvent::PeriodEnd { boundary, .. } => Some(*boundary),
                _ => None,
            })
            .collect();
        assert_eq!(
            &boundaries[..4],
            &[
                BoundaryKind::EndOfQuarter,
                BoundaryKind::Halftime,
                BoundaryKind::EndOfQuarter,
                BoundaryKind::EndOfRegulation
            ]
        );
    }

    #[test]
    fn test_regulation_never_ends_tied_without_overtime() {
        let config = short_game();
        let (home, away) = matchup();
        for seed in 0..20 {
            let report = GameSimulator::new(&config, &home, &away, seed).run().unwrap();
            if !report.overtime {
                assert!(!report.score.is_tied(), "seed {seed}");
            } else {
                // Sudden death: at most one score after regulation
                let overtime_scores = report
                    .log
                    .iter()
                    .filter(|e| match e {
                        GameEvent::Play { quarter, result, .. } => *quarter > 4 && result.points_scored > 0,
                        _ => false,
                    })
                    .count();
                assert!(overtime_scores <= 1, "seed {seed}");
            }
        }
    }

    #[test]
    fn test_second_half_kicked_by_opening_receiver() {
        let config = short_game();
        let (home, away) = matchup();
        let report = GameSimulator::new(&config, &home, &away, 3).run().unwrap();
        let Some(GameEvent::CoinToss { receiving_team, .. }) = report.log.first() else {
            panic!("game must open with a coin toss");
        };
        let halftime = report
            .log
            .iter()
            .position(|e| matches!(e, GameEvent::PeriodEnd { boundary: BoundaryKind::Halftime, .. }))
            .unwrap();
        match &report.log[halftime + 1] {
            GameEvent::Kickoff { quarter, result } => {
                assert_eq!(*quarter, 3);
                assert_eq!(result.kicking_team, *receiving_team);
            }
            other => panic!("expected second-half kickoff, got {other:?}"),
        }
    }

    #[test]
    fn test_quarter_break_keeps_the_drive() {
        let config = EngineConfig::default();
        let (home, away) = matchup();
        let mut continued = 0;
        for seed in 0..12 {
            let report = GameSimulator::new(&config, &home, &away, seed).run().unwrap();
            for (i, event) in report.log.iter().enumerate() {
                let GameEvent::PeriodEnd {
                    transition: PeriodTransition::NextQuarter { continued: true, quarter },
                    ..
                } = event
                else {
                    continue;
                };
                let before = report.log[..i].iter().rev().find_map(|e| match e {
                    GameEvent::Play { situation, .. } => Some(situation.possessing_team),
                    GameEvent::Kickoff { result, .. } => Some(result.kicking_team.opponent()),
                    _ => None,
                });
                match &report.log[i + 1] {
                    GameEvent::Play { situation, .. } => {
                        assert_eq!(situation.quarter, *quarter);
                        assert_eq!(Some(situation.possessing_team), before);
                    }
                    other => panic!("expected a snap after the break, got {other:?}"),
                }
                continued += 1;
            }
        }
        assert!(continued > 0);
    }

    #[test]
    fn test_play_cap_truncates() {
        let config = EngineConfig::default();
        let (home, away) = matchup();
        let report = GameSimulator::new(&config, &home, &away, 1)
            .with_play_cap(10)
            .run()
            .unwrap();
        assert!(report.truncated);
        assert_eq!(report.plays, 10);
    }

    #[test]
    fn test_observer_sees_every_event() {
        let config = short_game();
        let (home, away) = matchup();
        let mut seen = 0;
        let report = GameSimulator::new(&config, &home, &away, 5)
            .run_with_observer(|_| seen += 1)
            .unwrap();
        assert_eq!(seen, report.log.len());
    }

    #[test]
    fn test_swapped_sides_rejected() {
        let config = EngineConfig::default();
        let home = RosterBuilder::new(TeamSide::Away).build();
        let away = RosterBuilder::new(TeamSide::Away).build();
        assert!(matches!(
            GameSimulator::new(&config, &home, &away, 1).run(),
            Err(EngineError::Configuration(ConfigurationError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_stronger_team_wins_more() {
        let config = short_game();
        let (home, away) = rated_matchup(88, 52);
        let wins = (0..30)
            .filter_map(|seed| GameSimulator::new(&config, &home, &away, seed).run().ok())
            .filter(|r| r.winner() == Some(TeamSide::Home))
            .count();
        assert!(wins >= 18, "wins {wins}");
    }

    #[test]
    fn test_takeover_spot() {
        assert_eq!(takeover_spot(100), TURNOVER_TOUCHBACK_SPOT);
        assert_eq!(takeover_spot(60), 40);
        assert_eq!(takeover_spot(1), 99);
    }
}
