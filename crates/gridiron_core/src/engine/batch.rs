//! Many independent games, one per seed.
//!
//! Each game owns its simulator, clock and RNG; nothing mutable is shared, so
//! the parallel path returns exactly what a sequential loop would.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::models::player::Roster;
use crate::models::situation::TeamSide;

use super::game::{GameReport, GameSimulator};
use super::rng::derive_seed;

/// Below this many games the rayon overhead is not worth it.
const PARALLEL_THRESHOLD: usize = 4;

/// `count` stable game seeds derived from `base`.
pub fn batch_seeds(base: u64, count: usize) -> Vec<u64> {
    (0..count as u64).map(|i| derive_seed(base, i)).collect()
}

/// Run one game per seed; reports come back in seed order.
pub fn simulate_batch(
    config: &EngineConfig,
    home: &Roster,
    away: &Roster,
    seeds: &[u64],
) -> Result<Vec<GameReport>> {
    config.validate()?;
    let run = |&seed: &u64| GameSimulator::new(config, home, away, seed).run();
    if seeds.len() > PARALLEL_THRESHOLD {
        seeds.par_iter().map(run).collect()
    } else {
        seeds.iter().map(run).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub games: usize,
    pub home_wins: usize,
    pub away_wins: usize,
    pub ties: usize,
    pub overtime_games: usize,
    pub truncated_games: usize,
    pub avg_home_score: f32,
    pub avg_away_score: f32,
    pub avg_plays: f32,
}

pub fn summarize(reports: &[GameReport]) -> BatchSummary {
    let mut summary = BatchSummary {
        games: reports.len(),
        ..Default::default()
    };
    if reports.is_empty() {
        return summary;
    }
    let (mut home_points, mut away_points, mut plays) = (0u64, 0u64, 0u64);
    for report in reports {
        match report.winner() {
            Some(TeamSide::Home) => summary.home_wins += 1,
            Some(TeamSide::Away) => summary.away_wins += 1,
            None => summary.ties += 1,
        }
        summary.overtime_games += report.overtime as usize;
        summary.truncated_games += report.truncated as usize;
        home_points += report.score.home as u64;
        away_points += report.score.away as u64;
        plays += report.plays as u64;
    }
    let n = reports.len() as f32;
    summary.avg_home_score = home_points as f32 / n;
    summary.avg_away_score = away_points as f32 / n;
    summary.avg_plays = plays as f32 / n;
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClockConfig;
    use crate::engine::test_fixtures::matchup;

    fn short_game() -> EngineConfig {
        EngineConfig {
            clock: ClockConfig::short_quarters(240),
            ..EngineConfig::default()
        }
    }

    #[test]
    fn test_batch_matches_sequential() {
        let config = short_game();
        let (home, away) = matchup();
        let seeds = batch_seeds(2024, 12);
        let batch = simulate_batch(&config, &home, &away, &seeds).unwrap();
        assert_eq!(batch.len(), seeds.len());
        for (report, &seed) in batch.iter().zip(&seeds) {
            let single = GameSimulator::new(&config, &home, &away, seed).run().unwrap();
            assert_eq!(report.seed, seed);
            assert_eq!(report.fingerprint, single.fingerprint);
        }
    }

    #[test]
    fn test_batch_seeds_are_stable_and_distinct() {
        let a = batch_seeds(9, 50);
        assert_eq!(a, batch_seeds(9, 50));
        let mut unique = a.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), 50);
    }

    #[test]
    fn test_summary_counts_every_game() {
        let config = short_game();
        let (home, away) = matchup();
        let reports = simulate_batch(&config, &home, &away, &batch_seeds(1, 8)).unwrap();
        let summary = summarize(&reports);
        assert_eq!(summary.games, 8);
        assert_eq!(summary.home_wins + summary.away_wins + summary.ties, 8);
        assert!(summary.avg_plays > 0.0);
        assert_eq!(summarize(&[]), BatchSummary::default());
    }
}
