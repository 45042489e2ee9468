//! Penalty catalogue: rates, yardage, enforcement flags and who can commit them.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::curves::ModifierCurve;
use crate::engine::penalty::{PenaltyKind, PenaltySide, PenaltyTiming, PlayFilter};
use crate::error::ConfigurationError;
use crate::models::player::PositionGroup;

/// Position group allowed to commit a penalty, with its attribution weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EligibleGroup {
    pub group: PositionGroup,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PenaltyDefinition {
    pub kind: PenaltyKind,
    pub penalized: PenaltySide,
    pub timing: PenaltyTiming,
    pub applies_to: PlayFilter,
    /// Per-play rate before modifiers
    pub base_rate: f32,
    pub yards: i32,
    /// Enforced from the spot of the foul (air yards) instead of a fixed distance
    #[serde(default)]
    pub spot_foul: bool,
    #[serde(default)]
    pub automatic_first_down: bool,
    #[serde(default)]
    pub loss_of_down: bool,
    #[serde(default)]
    pub negates_play: bool,
    /// Pre-snap fouls the road offense commits more often in a loud stadium
    #[serde(default)]
    pub crowd_noise_sensitive: bool,
    #[serde(default = "unit")]
    pub third_down_multiplier: f32,
    #[serde(default = "unit")]
    pub red_zone_multiplier: f32,
    pub eligible: Vec<EligibleGroup>,
}

fn unit() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PenaltyConfig {
    pub definitions: Vec<PenaltyDefinition>,
    /// Rate multiplier by average discipline of the eligible groups
    pub discipline_curve: ModifierCurve,
    pub discipline_multiplier_min: f32,
    pub discipline_multiplier_max: f32,
    /// Cap on the summed per-play rate; rates are scaled down to fit
    pub max_total_rate: f32,
    /// Multiplier on crowd-noise fouls by the away offense
    pub crowd_noise_multiplier: f32,
    /// Multiplier on every foul by the home team
    pub home_team_discount: f32,
    /// Distance to goal that counts as red zone for rate modifiers
    pub red_zone_threshold: i32,
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        Self {
            definitions: default_definitions(),
            discipline_curve: ModifierCurve::new(&[
                (40.0, 1.6),
                (60.0, 1.2),
                (75.0, 1.0),
                (90.0, 0.8),
                (99.0, 0.65),
            ]),
            discipline_multiplier_min: 0.5,
            discipline_multiplier_max: 2.0,
            max_total_rate: 0.35,
            crowd_noise_multiplier: 1.2,
            home_team_discount: 0.95,
            red_zone_threshold: 20,
        }
    }
}

impl PenaltyConfig {
    /// Configuration that never draws a penalty.
    pub fn disabled() -> Self {
        Self {
            definitions: Vec::new(),
            ..Self::default()
        }
    }

    /// Every base rate multiplied by `factor`.
    pub fn scaled(mut self, factor: f32) -> Self {
        for def in &mut self.definitions {
            def.base_rate = (def.base_rate * factor).clamp(0.0, 1.0);
        }
        self
    }

    pub fn definition(&self, kind: PenaltyKind) -> Result<&PenaltyDefinition, ConfigurationError> {
        self.definitions
            .iter()
            .find(|d| d.kind == kind)
            .ok_or(ConfigurationError::UnknownPenalty(kind))
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen = HashSet::new();
        for def in &self.definitions {
            if !seen.insert(def.kind) {
                return Err(ConfigurationError::DuplicatePenalty(def.kind));
            }
            if def.eligible.is_empty() || def.eligible.iter().all(|g| g.weight <= 0.0) {
                return Err(ConfigurationError::PenaltyWithoutEligibleGroups(def.kind));
            }
            ConfigurationError::check_rate(&format!("penalties.{:?}.base_rate", def.kind), def.base_rate)?;
            if def.yards < 0 {
                return Err(ConfigurationError::invalid_value(
                    format!("penalties.{:?}.yards", def.kind),
                    "yardage is unsigned; the side decides the direction",
                ));
            }
            if def.third_down_multiplier < 0.0 || def.red_zone_multiplier < 0.0 {
                return Err(ConfigurationError::invalid_value(
                    format!("penalties.{:?}", def.kind),
                    "situational multipliers must be non-negative",
                ));
            }
        }
        ConfigurationError::check_rate("penalties.max_total_rate", self.max_total_rate)?;
        if self.discipline_multiplier_min > self.discipline_multiplier_max {
            return Err(ConfigurationError::invalid_value(
                "penalties.discipline_multiplier_min",
                "must not exceed discipline_multiplier_max",
            ));
        }
        if self.crowd_noise_multiplier < 0.0 || self.home_team_discount < 0.0 {
            return Err(ConfigurationError::invalid_value(
                "penalties.home_field",
                "multipliers must be non-negative",
            ));
        }
        self.discipline_curve.validate("penalties.discipline_curve")
    }
}

fn default_definitions() -> Vec<PenaltyDefinition> {
    use PenaltyKind as K;
    use PenaltySide::{Defense, Offense};
    use PenaltyTiming::{LiveBall, PreSnap};
    use PlayFilter::{AnyScrimmage, PassOnly};
    use PositionGroup as G;

    let g = |group, weight| EligibleGroup { group, weight };
    let def = |kind, penalized, timing, applies_to, base_rate, yards, eligible| PenaltyDefinition {
        kind,
        penalized,
        timing,
        applies_to,
        base_rate,
        yards,
        spot_foul: false,
        automatic_first_down: false,
        loss_of_down: false,
        negates_play: false,
        crowd_noise_sensitive: false,
        third_down_multiplier: 1.0,
        red_zone_multiplier: 1.0,
        eligible,
    };

    vec![
        PenaltyDefinition {
            negates_play: true,
            crowd_noise_sensitive: true,
            third_down_multiplier: 1.15,
            ..def(
                K::FalseStart,
                Offense,
                PreSnap,
                AnyScrimmage,
                0.018,
                5,
                vec![g(G::OffensiveLine, 4.0), g(G::TightEnd, 1.0), g(G::Receiver, 0.6)],
            )
        },
        PenaltyDefinition {
            negates_play: true,
            crowd_noise_sensitive: true,
            ..def(K::DelayOfGame, Offense, PreSnap, AnyScrimmage, 0.004, 5, vec![g(G::Quarterback, 1.0)])
        },
        PenaltyDefinition {
            negates_play: true,
            red_zone_multiplier: 1.1,
            ..def(
                K::OffensiveHolding,
                Offense,
                LiveBall,
                AnyScrimmage,
                0.020,
                10,
                vec![g(G::OffensiveLine, 5.0), g(G::TightEnd, 1.5), g(G::Receiver, 0.5)],
            )
        },
        PenaltyDefinition {
            negates_play: true,
            ..def(
                K::IllegalFormation,
                Offense,
                PreSnap,
                AnyScrimmage,
                0.003,
                5,
                vec![g(G::Receiver, 1.0), g(G::TightEnd, 1.0), g(G::OffensiveLine, 0.5)],
            )
        },
        PenaltyDefinition {
            negates_play: true,
            ..def(
                K::OffensivePassInterference,
                Offense,
                LiveBall,
                PassOnly,
                0.004,
                10,
                vec![g(G::Receiver, 3.0), g(G::TightEnd, 1.0)],
            )
        },
        PenaltyDefinition {
            negates_play: true,
            loss_of_down: true,
            ..def(K::IntentionalGrounding, Offense, LiveBall, PassOnly, 0.002, 10, vec![g(G::Quarterback, 1.0)])
        },
        PenaltyDefinition {
            third_down_multiplier: 1.2,
            ..def(
                K::DefensiveOffside,
                Defense,
                LiveBall,
                AnyScrimmage,
                0.008,
                5,
                vec![g(G::DefensiveLine, 4.0), g(G::Linebacker, 1.0)],
            )
        },
        PenaltyDefinition {
            negates_play: true,
            ..def(
                K::Encroachment,
                Defense,
                PreSnap,
                AnyScrimmage,
                0.004,
                5,
                vec![g(G::DefensiveLine, 3.0), g(G::Linebacker, 1.0)],
            )
        },
        PenaltyDefinition {
            automatic_first_down: true,
            ..def(
                K::DefensiveHolding,
                Defense,
                LiveBall,
                PassOnly,
                0.008,
                5,
                vec![g(G::Cornerback, 3.0), g(G::Safety, 1.5), g(G::Linebacker, 1.0)],
            )
        },
        PenaltyDefinition {
            spot_foul: true,
            automatic_first_down: true,
            third_down_multiplier: 1.2,
            ..def(
                K::DefensivePassInterference,
                Defense,
                LiveBall,
                PassOnly,
                0.008,
                15,
                vec![g(G::Cornerback, 3.0), g(G::Safety, 2.0), g(G::Linebacker, 0.5)],
            )
        },
        PenaltyDefinition {
            automatic_first_down: true,
            ..def(
                K::RoughingThePasser,
                Defense,
                LiveBall,
                PassOnly,
                0.003,
                15,
                vec![g(G::DefensiveLine, 3.0), g(G::Linebacker, 1.0)],
            )
        },
        PenaltyDefinition {
            automatic_first_down: true,
            ..def(
                K::UnnecessaryRoughness,
                Defense,
                LiveBall,
                AnyScrimmage,
                0.004,
                15,
                vec![
                    g(G::Linebacker, 1.5),
                    g(G::Safety, 1.5),
                    g(G::DefensiveLine, 1.0),
                    g(G::Cornerback, 1.0),
                ],
            )
        },
        PenaltyDefinition {
            automatic_first_down: true,
            ..def(
                K::FaceMask,
                Defense,
                LiveBall,
                AnyScrimmage,
                0.003,
                15,
                vec![g(G::Linebacker, 1.5), g(G::DefensiveLine, 1.0), g(G::Safety, 1.0)],
            )
        },
        PenaltyDefinition {
            automatic_first_down: true,
            ..def(K::IllegalContact, Defense, LiveBall, PassOnly, 0.002, 5, vec![g(G::Cornerback, 2.0), g(G::Safety, 1.0)])
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(PenaltyConfig::default().validate().is_ok());
        assert!(PenaltyConfig::disabled().validate().is_ok());
    }

    #[test]
    fn test_duplicate_definition_rejected() {
        let mut cfg = PenaltyConfig::default();
        let dup = cfg.definitions[0].clone();
        cfg.definitions.push(dup);
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::DuplicatePenalty(PenaltyKind::FalseStart))
        );
    }

    #[test]
    fn test_missing_eligible_groups_rejected() {
        let mut cfg = PenaltyConfig::default();
        cfg.definitions[2].eligible.clear();
        assert_eq!(
            cfg.validate(),
            Err(ConfigurationError::PenaltyWithoutEligibleGroups(
                PenaltyKind::OffensiveHolding
            ))
        );
    }

    #[test]
    fn test_unknown_penalty_lookup() {
        let cfg = PenaltyConfig::disabled();
        assert_eq!(
            cfg.definition(PenaltyKind::FaceMask),
            Err(ConfigurationError::UnknownPenalty(PenaltyKind::FaceMask))
        );
    }

    #[test]
    fn test_offensive_live_ball_fouls_negate() {
        let cfg = PenaltyConfig::default();
        for def in &cfg.definitions {
            if def.penalized == PenaltySide::Offense {
                assert!(def.negates_play, "{:?} should negate", def.kind);
            }
        }
    }
}
