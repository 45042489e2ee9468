//! Game clock: quarters, runoff and period boundaries.
//!
//! ## Runoff
//! | Play | Seconds |
//! |---|---|
//! | accepted pre-snap foul | 0 |
//! | kneel / spike | `kneel_seconds` / `spike_seconds` |
//! | punt / field goal | `punt_seconds` / `field_goal_seconds` |
//! | incompletion, score, turnover, accepted penalty | snap only |
//! | out of bounds | snap + `runoff_out_of_bounds` (snap only late in a half) |
//! | in bounds | snap + `runoff_in_bounds` ± `runoff_jitter` |
//!
//! Reaching zero raises a [`BoundaryKind`]. No snap is accepted until
//! [`GameClock::advance_to_next_quarter`] resolves it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ClockConfig;
use crate::error::{BoundaryKind, ClockError};
use crate::models::play_call::PlayKind;
use crate::models::play_result::{OutcomeKind, PlayResult};
use crate::models::situation::REGULATION_QUARTERS;

use super::continuation::ContinuationDecision;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockTick {
    pub elapsed: u32,
    pub seconds_remaining: u32,
    pub boundary: Option<BoundaryKind>,
    pub two_minute_warning: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodTransition {
    NextQuarter { quarter: u8, continued: bool },
    SecondHalf,
    Overtime { quarter: u8 },
    GameOver,
}

#[derive(Debug, Clone)]
pub struct GameClock {
    config: ClockConfig,
    quarter: u8,
    seconds_remaining: u32,
    pending: Option<BoundaryKind>,
    warning_given: bool,
    game_over: bool,
}

impl GameClock {
    pub fn new(config: &ClockConfig) -> Self {
        Self {
            config: config.clone(),
            quarter: 1,
            seconds_remaining: config.quarter_seconds,
            pending: None,
            warning_given: false,
            game_over: false,
        }
    }

    pub fn quarter(&self) -> u8 {
        self.quarter
    }

    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    pub fn pending_boundary(&self) -> Option<BoundaryKind> {
        self.pending
    }

    pub fn is_overtime(&self) -> bool {
        self.quarter > REGULATION_QUARTERS
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Inside the final window of the second or fourth quarter (or overtime).
    pub fn is_late_in_half(&self) -> bool {
        (self.quarter == 2 || self.quarter >= REGULATION_QUARTERS)
            && self.seconds_remaining <= self.config.late_half_window
    }

    fn boundary_for(quarter: u8) -> BoundaryKind {
        match quarter {
            1 | 3 => BoundaryKind::EndOfQuarter,
            2 => BoundaryKind::Halftime,
            REGULATION_QUARTERS => BoundaryKind::EndOfRegulation,
            _ => BoundaryKind::EndOfOvertime,
        }
    }

    fn ready(&self) -> Result<(), ClockError> {
        if self.game_over {
            return Err(ClockError::GameOver);
        }
        if self.pending.is_some() {
            return Err(ClockError::BoundaryPending {
                quarter: self.quarter,
            });
        }
        Ok(())
    }

    fn stops_clock(result: &PlayResult) -> bool {
        result.outcome_kind == OutcomeKind::Incomplete
            || result.outcome_kind == OutcomeKind::PenaltyEnforced
            || result.outcome_kind.is_score()
            || result.outcome_kind.changes_possession()
    }

    /// (snap seconds, runoff seconds) for a finished play.
    fn play_time(&self, result: &PlayResult, rng: &mut impl Rng) -> (u32, u32) {
        let c = &self.config;
        if result.accepted_penalty().is_some_and(|p| p.is_pre_snap()) {
            return (0, 0);
        }
        match result.kind {
            PlayKind::Kneel => return (c.kneel_seconds, 0),
            PlayKind::Spike => return (c.spike_seconds, 0),
            PlayKind::Punt => return (c.punt_seconds, 0),
            PlayKind::FieldGoal => return (c.field_goal_seconds, 0),
            PlayKind::Run | PlayKind::Pass => {}
        }
        let snap = rng.gen_range(c.play_seconds_min..=c.play_seconds_max.max(c.play_seconds_min));
        let runoff = if Self::stops_clock(result) {
            0
        } else if result.out_of_bounds {
            if self.is_late_in_half() {
                0
            } else {
                c.runoff_out_of_bounds
            }
        } else {
            let low = c.runoff_in_bounds.saturating_sub(c.runoff_jitter);
            rng.gen_range(low..=c.runoff_in_bounds + c.runoff_jitter)
        };
        (snap, runoff)
    }

    fn run_off(&mut self, snap: u32, runoff: u32) -> ClockTick {
        let before = self.seconds_remaining;
        let mut after = before.saturating_sub(snap + runoff);
        let warning_at = self.config.two_minute_warning;

        let mut two_minute_warning = false;
        if matches!(self.quarter, 2 | 4)
            && !self.warning_given
            && before > warning_at
            && after <= warning_at
        {
            // The snap counts in full; any runoff stops at the warning
            let floor = before.saturating_sub(snap).min(warning_at);
            after = after.max(floor);
            self.warning_given = true;
            two_minute_warning = true;
            tracing::info!(quarter = self.quarter, "two-minute warning");
        }

        self.seconds_remaining = after;
        if after == 0 {
            let boundary = Self::boundary_for(self.quarter);
            self.pending = Some(boundary);
            tracing::info!(quarter = self.quarter, ?boundary, "period expired");
        }
        ClockTick {
            elapsed: before - after,
            seconds_remaining: after,
            boundary: self.pending,
            two_minute_warning,
        }
    }

    /// Charge a finished play against the clock.
    pub fn consume_play(&mut self, result: &PlayResult, rng: &mut impl Rng) -> Result<ClockTick, ClockError> {
        self.ready()?;
        let (snap, runoff) = self.play_time(result, rng);
        Ok(self.run_off(snap, runoff))
    }

    /// Charge a fixed number of seconds, e.g. a kickoff.
    pub fn consume_seconds(&mut self, seconds: u32) -> Result<ClockTick, ClockError> {
        self.ready()?;
        Ok(self.run_off(seconds, 0))
    }

    /// Resolve the pending boundary and start the next period.
    ///
    /// A continuation is only legal across an intra-half break. `tied`
    /// decides whether regulation or an overtime period is followed by more
    /// overtime.
    pub fn advance_to_next_quarter(
        &mut self,
        decision: &ContinuationDecision,
        tied: bool,
    ) -> Result<PeriodTransition, ClockError> {
        if self.game_over {
            return Err(ClockError::GameOver);
        }
        let boundary = self.pending.ok_or(ClockError::NoBoundaryPending)?;
        if decision.should_continue && !boundary.is_intra_half() {
            return Err(ClockError::IllegalContinuation(boundary));
        }
        self.pending = None;
        self.warning_given = false;

        let overtime_played = self.quarter.saturating_sub(REGULATION_QUARTERS);
        let transition = match boundary {
            BoundaryKind::EndOfQuarter => {
                self.start_period(self.quarter + 1, self.config.quarter_seconds);
                PeriodTransition::NextQuarter {
                    quarter: self.quarter,
                    continued: decision.should_continue,
                }
            }
            BoundaryKind::Halftime => {
                self.start_period(self.quarter + 1, self.config.quarter_seconds);
                PeriodTransition::SecondHalf
            }
            BoundaryKind::EndOfRegulation | BoundaryKind::EndOfOvertime => {
                if tied && overtime_played < self.config.max_overtime_periods {
                    self.start_period(self.quarter + 1, self.config.overtime_seconds);
                    PeriodTransition::Overtime {
                        quarter: self.quarter,
                    }
                } else {
                    self.game_over = true;
                    PeriodTransition::GameOver
                }
            }
        };
        tracing::info!(quarter = self.quarter, ?transition, "period boundary resolved");
        Ok(transition)
    }

    fn start_period(&mut self, quarter: u8, seconds: u32) {
        self.quarter = quarter;
        self.seconds_remaining = seconds;
    }

    /// Sudden-death score: the game ends immediately.
    pub fn end_game(&mut self) {
        self.pending = None;
        self.game_over = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::penalty::{PenaltyInstance, PenaltyKind, PenaltySide, PenaltyTiming};
    use crate::engine::rng::seeded_rng;
    use crate::models::situation::TeamSide;

    fn run(outcome: OutcomeKind, out_of_bounds: bool) -> PlayResult {
        let mut result = PlayResult::basic(PlayKind::Run, outcome, 3);
        result.out_of_bounds = out_of_bounds;
        result
    }

    fn expire(clock: &mut GameClock) -> ClockTick {
        let remaining = clock.seconds_remaining();
        clock.consume_seconds(remaining).unwrap()
    }

    #[test]
    fn test_in_bounds_runs_more_than_incomplete() {
        let config = ClockConfig::default();
        let mut rng = seeded_rng(1);
        let mut clock = GameClock::new(&config);
        let in_bounds = clock.consume_play(&run(OutcomeKind::Gain, false), &mut rng).unwrap();
        let incomplete = clock
            .consume_play(&run(OutcomeKind::Incomplete, false), &mut rng)
            .unwrap();
        assert!(in_bounds.elapsed >= config.play_seconds_min + config.runoff_in_bounds - config.runoff_jitter);
        assert!(incomplete.elapsed <= config.play_seconds_max);
    }

    #[test]
    fn test_pre_snap_foul_costs_nothing() {
        let mut clock = GameClock::new(&ClockConfig::default());
        let mut result = run(OutcomeKind::PenaltyEnforced, false);
        result.penalty = Some(PenaltyInstance {
            penalty_type: PenaltyKind::FalseStart,
            penalized_side: PenaltySide::Offense,
            penalized_team: TeamSide::Home,
            penalized_player: None,
            yards_assessed: -5,
            automatic_first_down: false,
            automatic_loss_of_down: false,
            negates_play: true,
            timing: PenaltyTiming::PreSnap,
            penalty_accepted: true,
            final_play_result: -5,
        });
        let tick = clock.consume_play(&result, &mut seeded_rng(2)).unwrap();
        assert_eq!(tick.elapsed, 0);
    }

    #[test]
    fn test_kneel_runs_more_than_spike() {
        let config = ClockConfig::default();
        let mut clock = GameClock::new(&config);
        let mut rng = seeded_rng(3);
        let kneel = clock
            .consume_play(&PlayResult::basic(PlayKind::Kneel, OutcomeKind::Loss, -1), &mut rng)
            .unwrap();
        let spike = clock
            .consume_play(&PlayResult::basic(PlayKind::Spike, OutcomeKind::Incomplete, 0), &mut rng)
            .unwrap();
        assert_eq!(kneel.elapsed, config.kneel_seconds);
        assert_eq!(spike.elapsed, config.spike_seconds);
    }

    #[test]
    fn test_out_of_bounds_late_stops_runoff() {
        let config = ClockConfig::default();
        let mut clock = GameClock::new(&config);
        expire(&mut clock);
        clock
            .advance_to_next_quarter(&ContinuationDecision::fresh(), false)
            .unwrap();
        // Q2 with 100 seconds left
        clock.consume_seconds(config.quarter_seconds - 100).unwrap();
        assert!(clock.is_late_in_half());
        let tick = clock
            .consume_play(&run(OutcomeKind::Gain, true), &mut seeded_rng(4))
            .unwrap();
        assert!(tick.elapsed <= config.play_seconds_max);
    }

    #[test]
    fn test_two_minute_warning_stops_runoff() {
        let config = ClockConfig::default();
        let mut clock = GameClock::new(&config);
        expire(&mut clock);
        clock
            .advance_to_next_quarter(&ContinuationDecision::fresh(), false)
            .unwrap();
        clock.consume_seconds(config.quarter_seconds - 130).unwrap();
        let tick = clock
            .consume_play(&run(OutcomeKind::Gain, false), &mut seeded_rng(5))
            .unwrap();
        assert!(tick.two_minute_warning);
        assert_eq!(tick.seconds_remaining, 120);
        // Only once per half
        let tick = clock
            .consume_play(&run(OutcomeKind::Gain, false), &mut seeded_rng(5))
            .unwrap();
        assert!(!tick.two_minute_warning);
    }

    #[test]
    fn test_boundary_blocks_snaps_until_resolved() {
        let mut clock = GameClock::new(&ClockConfig::default());
        let tick = expire(&mut clock);
        assert_eq!(tick.boundary, Some(BoundaryKind::EndOfQuarter));
        assert_eq!(
            clock.consume_play(&run(OutcomeKind::Gain, false), &mut seeded_rng(6)),
            Err(ClockError::BoundaryPending { quarter: 1 })
        );
        let next = clock
            .advance_to_next_quarter(&ContinuationDecision::fresh(), false)
            .unwrap();
        assert_eq!(
            next,
            PeriodTransition::NextQuarter {
                quarter: 2,
                continued: false
            }
        );
        assert_eq!(
            clock.advance_to_next_quarter(&ContinuationDecision::fresh(), false),
            Err(ClockError::NoBoundaryPending)
        );
    }

    #[test]
    fn test_continuation_rejected_at_halftime() {
        let mut clock = GameClock::new(&ClockConfig::default());
        expire(&mut clock);
        clock
            .advance_to_next_quarter(&ContinuationDecision::fresh(), false)
            .unwrap();
        assert_eq!(expire(&mut clock).boundary, Some(BoundaryKind::Halftime));
        let continuing = ContinuationDecision {
            should_continue: true,
            possessing_team: Some(TeamSide::Home),
            ..ContinuationDecision::fresh()
        };
        assert_eq!(
            clock.advance_to_next_quarter(&continuing, false),
            Err(ClockError::IllegalContinuation(BoundaryKind::Halftime))
        );
        assert_eq!(
            clock.advance_to_next_quarter(&ContinuationDecision::fresh(), false),
            Ok(PeriodTransition::SecondHalf)
        );
    }

    #[test]
    fn test_overtime_then_game_over() {
        let mut clock = GameClock::new(&ClockConfig::default());
        let fresh = ContinuationDecision::fresh();
        for _ in 0..3 {
            expire(&mut clock);
            clock.advance_to_next_quarter(&fresh, true).unwrap();
        }
        assert_eq!(expire(&mut clock).boundary, Some(BoundaryKind::EndOfRegulation));
        assert_eq!(
            clock.advance_to_next_quarter(&fresh, true),
            Ok(PeriodTransition::Overtime { quarter: 5 })
        );
        assert!(clock.is_overtime());
        assert_eq!(clock.seconds_remaining(), 600);
        assert_eq!(expire(&mut clock).boundary, Some(BoundaryKind::EndOfOvertime));
        assert_eq!(
            clock.advance_to_next_quarter(&fresh, true),
            Ok(PeriodTransition::GameOver)
        );
        assert!(clock.is_game_over());
        assert_eq!(clock.consume_seconds(1), Err(ClockError::GameOver));
    }

    #[test]
    fn test_untied_regulation_ends_game() {
        let mut clock = GameClock::new(&ClockConfig::default());
        let fresh = ContinuationDecision::fresh();
        for _ in 0..3 {
            expire(&mut clock);
            clock.advance_to_next_quarter(&fresh, false).unwrap();
        }
        expire(&mut clock);
        assert_eq!(
            clock.advance_to_next_quarter(&fresh, false),
            Ok(PeriodTransition::GameOver)
        );
    }
}
