//! Matchup table: `{archetype × formation}` → base yardage distribution.
//!
//! Every archetype needs a default row (`formation: None`). Formation rows
//! override the default for that formation only.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::models::play_call::{OffensiveFormation, PlayArchetype};

/// Base distribution for one archetype. For passes `mean`/`std_dev` describe
/// air yards at the catch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YardageDistribution {
    pub mean: f32,
    pub std_dev: f32,
    pub min_yards: i32,
    pub max_yards: i32,
    /// Chance of a breakaway before attribute scaling
    pub big_play_chance: f32,
    /// Mean extra yards on a breakaway (exponential)
    pub big_play_mean: f32,
    /// Completion rate before matchup modifiers (passes only)
    #[serde(default)]
    pub completion_base: f32,
    /// Mean yards after catch (passes only)
    #[serde(default)]
    pub yac_mean: f32,
    /// How long the passer holds the ball; scales sack chance
    #[serde(default = "default_exposure")]
    pub pressure_exposure: f32,
}

fn default_exposure() -> f32 {
    1.0
}

impl YardageDistribution {
    pub fn run(mean: f32, std_dev: f32, min_yards: i32, max_yards: i32, big_play_chance: f32) -> Self {
        Self {
            mean,
            std_dev,
            min_yards,
            max_yards,
            big_play_chance,
            big_play_mean: 18.0,
            completion_base: 0.0,
            yac_mean: 0.0,
            pressure_exposure: 1.0,
        }
    }

    pub fn pass(
        air_mean: f32,
        air_std_dev: f32,
        completion_base: f32,
        yac_mean: f32,
        pressure_exposure: f32,
    ) -> Self {
        Self {
            mean: air_mean,
            std_dev: air_std_dev,
            min_yards: -8,
            max_yards: 99,
            big_play_chance: 0.04,
            big_play_mean: 20.0,
            completion_base,
            yac_mean,
            pressure_exposure,
        }
    }

    fn validate(&self, label: &str) -> Result<(), ConfigurationError> {
        if self.std_dev < 0.0 || !self.mean.is_finite() {
            return Err(ConfigurationError::invalid_value(
                label,
                "distribution needs a finite mean and non-negative std_dev",
            ));
        }
        if self.min_yards > self.max_yards {
            return Err(ConfigurationError::invalid_value(
                label,
                "min_yards exceeds max_yards",
            ));
        }
        ConfigurationError::check_rate(label, self.big_play_chance)?;
        ConfigurationError::check_rate(label, self.completion_base)?;
        if self.big_play_mean < 0.0 || self.yac_mean < 0.0 || self.pressure_exposure < 0.0 {
            return Err(ConfigurationError::invalid_value(
                label,
                "means and exposure must be non-negative",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YardageTableEntry {
    pub archetype: PlayArchetype,
    /// `None` = default row for the archetype
    #[serde(default)]
    pub formation: Option<OffensiveFormation>,
    pub distribution: YardageDistribution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct YardageTables {
    pub entries: Vec<YardageTableEntry>,
}

impl YardageTables {
    pub fn lookup(
        &self,
        archetype: PlayArchetype,
        formation: OffensiveFormation,
    ) -> Result<&YardageDistribution, ConfigurationError> {
        self.entries
            .iter()
            .find(|e| e.archetype == archetype && e.formation == Some(formation))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.archetype == archetype && e.formation.is_none())
            })
            .map(|e| &e.distribution)
            .ok_or(ConfigurationError::MissingYardageEntry {
                archetype,
                formation,
            })
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for archetype in PlayArchetype::ALL {
            if !self
                .entries
                .iter()
                .any(|e| e.archetype == archetype && e.formation.is_none())
            {
                return Err(ConfigurationError::MissingArchetype { archetype });
            }
        }
        for entry in &self.entries {
            let label = format!("yardage.{:?}/{:?}", entry.archetype, entry.formation);
            entry.distribution.validate(&label)?;
        }
        Ok(())
    }

    fn row(
        archetype: PlayArchetype,
        formation: Option<OffensiveFormation>,
        distribution: YardageDistribution,
    ) -> YardageTableEntry {
        YardageTableEntry {
            archetype,
            formation,
            distribution,
        }
    }
}

impl Default for YardageTables {
    fn default() -> Self {
        use OffensiveFormation as F;
        use PlayArchetype as A;
        type D = YardageDistribution;

        let entries = vec![
            // Runs
            Self::row(A::PowerRun, None, D::run(3.9, 3.2, -5, 99, 0.03)),
            Self::row(A::PowerRun, Some(F::IFormation), D::run(4.3, 3.0, -4, 99, 0.03)),
            Self::row(A::PowerRun, Some(F::Goalline), D::run(2.4, 1.8, -3, 99, 0.01)),
            Self::row(A::PowerRun, Some(F::Shotgun), D::run(3.5, 3.4, -5, 99, 0.03)),
            Self::row(A::InsideZone, None, D::run(4.2, 3.6, -5, 99, 0.04)),
            Self::row(A::InsideZone, Some(F::Pistol), D::run(4.5, 3.6, -5, 99, 0.045)),
            Self::row(A::OutsideZone, None, D::run(4.4, 4.8, -7, 99, 0.06)),
            Self::row(A::OutsideZone, Some(F::Shotgun), D::run(4.6, 5.0, -7, 99, 0.065)),
            Self::row(A::Draw, None, D::run(4.6, 4.4, -4, 99, 0.05)),
            Self::row(A::QbSneak, None, D::run(1.6, 1.1, -2, 99, 0.0)),
            // Passes: air mean, air sd, completion base, yac mean, exposure
            Self::row(A::Screen, None, D::pass(-1.5, 1.5, 0.80, 6.5, 0.4)),
            Self::row(A::QuickPass, None, D::pass(4.0, 2.0, 0.74, 3.5, 0.5)),
            Self::row(A::ShortPass, None, D::pass(6.5, 3.0, 0.67, 4.0, 0.8)),
            Self::row(A::ShortPass, Some(F::Empty), D::pass(6.5, 3.0, 0.70, 4.2, 0.9)),
            Self::row(A::MediumPass, None, D::pass(12.0, 4.0, 0.56, 3.5, 1.0)),
            Self::row(A::DeepPass, None, D::pass(26.0, 7.0, 0.38, 3.0, 1.35)),
            Self::row(A::DeepPass, Some(F::Shotgun), D::pass(26.0, 7.0, 0.40, 3.0, 1.3)),
            Self::row(A::PlayAction, None, D::pass(15.0, 6.0, 0.58, 4.0, 1.25)),
            Self::row(A::PlayAction, Some(F::IFormation), D::pass(16.0, 6.0, 0.61, 4.0, 1.2)),
        ];
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables_cover_every_archetype() {
        assert!(YardageTables::default().validate().is_ok());
    }

    #[test]
    fn test_formation_row_overrides_default() {
        let tables = YardageTables::default();
        let i_form = tables
            .lookup(PlayArchetype::PowerRun, OffensiveFormation::IFormation)
            .unwrap();
        let empty = tables
            .lookup(PlayArchetype::PowerRun, OffensiveFormation::Empty)
            .unwrap();
        assert!((i_form.mean - 4.3).abs() < 1e-6);
        assert!((empty.mean - 3.9).abs() < 1e-6);
    }

    #[test]
    fn test_missing_archetype_is_configuration_error() {
        let mut tables = YardageTables::default();
        tables
            .entries
            .retain(|e| e.archetype != PlayArchetype::Draw);
        assert_eq!(
            tables.validate(),
            Err(ConfigurationError::MissingArchetype {
                archetype: PlayArchetype::Draw
            })
        );
        assert_eq!(
            tables.lookup(PlayArchetype::Draw, OffensiveFormation::Singleback),
            Err(ConfigurationError::MissingYardageEntry {
                archetype: PlayArchetype::Draw,
                formation: OffensiveFormation::Singleback,
            })
        );
    }
}
