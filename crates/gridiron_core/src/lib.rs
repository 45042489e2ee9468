//! # gridiron_core - Deterministic American football play resolution
//!
//! Resolves single snaps from two rated rosters, a situational context and
//! a play-call pair, and runs full contests on top of them.
//!
//! ## Features
//! - Same seed and inputs, same game (ChaCha8 RNG, stable hashing)
//! - Line play, yardage, penalties and stat attribution per snap
//! - Drive, clock and quarter-continuation state machines
//! - Tunable tables loaded from YAML or JSON, with named presets
//!
//! ```no_run
//! use gridiron_core::{EngineConfig, GameSimulator, RosterBuilder, TeamSide};
//!
//! let config = EngineConfig::default();
//! let home = RosterBuilder::new(TeamSide::Home).build();
//! let away = RosterBuilder::new(TeamSide::Away).build();
//! let report = GameSimulator::new(&config, &home, &away, 42).run()?;
//! println!("{} - {}", report.score.home, report.score.away);
//! # Ok::<(), gridiron_core::EngineError>(())
//! ```

#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use config::EngineConfig;
pub use engine::{
    simulate_batch, DriveEndReason, GameReport, GameSimulator, PlayCaller, PlayResolutionPipeline,
    SituationalPlayCaller,
};
pub use error::{
    ClockError, ConfigurationError, DegenerateMatchupWarning, DriveError, EngineError,
    InvalidSituationError, Result,
};
pub use models::{PlayCall, PlayResult, Roster, RosterBuilder, SituationalContext, TeamSide};
