//! Play resolution and game-state machinery.
//!
//! ## Per snap
//! | Stage | Module |
//! |---|---|
//! | personnel on the field | [`personnel`] |
//! | line play | [`blocking`] |
//! | yardage and outcome | [`outcome`] |
//! | flags | [`penalty`] |
//! | stat deltas | [`stats`] |
//! | orchestration | [`pipeline`] |
//!
//! ## Between snaps
//! [`drive`] tracks down and distance, [`clock`] the period and seconds,
//! [`continuation`] carries a drive across an intra-half quarter break.
//! [`game`] ties them together with [`special_teams`] and a [`play_caller`].

pub mod batch;
pub mod blocking;
pub mod clock;
pub mod continuation;
pub mod drive;
pub mod game;
pub mod outcome;
pub mod penalty;
pub mod personnel;
pub mod pipeline;
pub mod play_caller;
pub mod rng;
pub mod special_teams;
pub mod stats;

#[cfg(test)]
pub mod test_fixtures;


pub use batch::{batch_seeds, simulate_batch, summarize, BatchSummary};
pub use blocking::{BlockingContext, BlockingOutcome, BlockingPairing, BlockingResolver, MatchupParticipant};
pub use clock::{ClockTick, GameClock, PeriodTransition};
pub use continuation::{ContinuationDecision, QuarterContinuationManager};
pub use drive::{DriveEndReason, DriveEndState, DriveStateMachine, DriveSummary, DriveTransition};
pub use game::{GameEvent, GameReport, GameSimulator, Scoreboard};
pub use outcome::{classify_yardage, PlayOutcomeResolver, ResolvedOutcome};
pub use penalty::{PenaltyEngine, PenaltyInstance, PenaltyKind, PlayContext};
pub use pipeline::PlayResolutionPipeline;
pub use play_caller::{PlayCaller, SituationalPlayCaller};
pub use rng::{seeded_rng, PlayRng};
pub use special_teams::{KickoffResult, SpecialTeamsResolver, TryKind, TryResult};
