//! Play outcome tuning: situational multipliers, turnover and sack rates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::curves::ModifierCurve;
use crate::error::ConfigurationError;
use crate::models::play_call::{Coverage, PlayArchetype};

/// Completion-rate adjustment for one coverage against one archetype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CoverageModifier {
    pub coverage: Coverage,
    pub archetype: PlayArchetype,
    pub completion_delta: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OutcomeConfig {
    /// Gain multiplier at blocking grade 0
    pub blocking_multiplier_floor: f32,
    /// Gain multiplier at blocking grade 1
    pub blocking_multiplier_ceiling: f32,
    /// Rating points per 100% of attribute multiplier
    pub attribute_scale: f32,
    pub attribute_multiplier_min: f32,
    pub attribute_multiplier_max: f32,
    /// Gain multiplier applied once per unblocked defender
    pub unblocked_gain_factor: f32,
    /// Chance per unblocked defender that a run is stuffed
    pub unblocked_stuff_chance: f32,
    pub stuff_loss_max: i32,
    /// Gain multiplier by down
    pub down_pressure: ModifierCurve,
    /// Distance to goal at which the field compresses
    pub red_zone_threshold: i32,
    pub red_zone_compression: f32,
    /// Base fumble chance per touch
    pub fumble_base: f32,
    /// Fumble multiplier by ball security rating
    pub ball_security_curve: ModifierCurve,
    /// Interception chance on an incompletion before modifiers
    pub interception_on_incompletion: f32,
    pub sack_base: f32,
    pub sack_per_unblocked: f32,
    /// Extra sack chance at blocking grade 0
    pub sack_grade_weight: f32,
    pub sack_yards_mean: f32,
    pub sack_yards_std_dev: f32,
    /// Fumble chance on a sack before ball security
    pub sack_fumble_chance: f32,
    /// Rating points per 100% completion swing
    pub completion_scale: f32,
    /// Completion penalty at full pressure
    pub pressure_completion_penalty: f32,
    pub completion_min: f32,
    pub completion_max: f32,
    pub coverage_modifiers: Vec<CoverageModifier>,
    pub out_of_bounds_outside_run: f32,
    pub out_of_bounds_inside_run: f32,
    pub out_of_bounds_completion: f32,
    /// Yards lost on a kneel-down
    pub kneel_yards: i32,
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        use Coverage as C;
        use PlayArchetype as A;
        let cm = |coverage, archetype, completion_delta| CoverageModifier {
            coverage,
            archetype,
            completion_delta,
        };
        Self {
            blocking_multiplier_floor: 0.45,
            blocking_multiplier_ceiling: 1.55,
            attribute_scale: 200.0,
            attribute_multiplier_min: 0.75,
            attribute_multiplier_max: 1.25,
            unblocked_gain_factor: 0.85,
            unblocked_stuff_chance: 0.10,
            stuff_loss_max: 3,
            down_pressure: ModifierCurve::new(&[(2.0, 1.0), (3.0, 0.94), (4.0, 0.9)]),
            red_zone_threshold: 20,
            red_zone_compression: 0.85,
            fumble_base: 0.012,
            ball_security_curve: ModifierCurve::new(&[
                (40.0, 1.8),
                (60.0, 1.3),
                (75.0, 1.0),
                (90.0, 0.7),
                (99.0, 0.5),
            ]),
            interception_on_incompletion: 0.07,
            sack_base: 0.04,
            sack_per_unblocked: 0.12,
            sack_grade_weight: 0.10,
            sack_yards_mean: 6.5,
            sack_yards_std_dev: 2.0,
            sack_fumble_chance: 0.08,
            completion_scale: 250.0,
            pressure_completion_penalty: 0.15,
            completion_min: 0.05,
            completion_max: 0.95,
            coverage_modifiers: vec![
                cm(C::Cover2, A::DeepPass, -0.08),
                cm(C::Cover4, A::DeepPass, -0.10),
                cm(C::Cover0, A::DeepPass, 0.06),
                cm(C::Cover1, A::DeepPass, 0.03),
                cm(C::Cover3, A::ShortPass, 0.03),
                cm(C::Cover3, A::MediumPass, -0.03),
                cm(C::Cover2, A::MediumPass, 0.04),
                cm(C::Man, A::QuickPass, -0.04),
                cm(C::Cover0, A::Screen, 0.05),
                cm(C::Cover4, A::PlayAction, -0.05),
            ],
            out_of_bounds_outside_run: 0.25,
            out_of_bounds_inside_run: 0.05,
            out_of_bounds_completion: 0.18,
            kneel_yards: -1,
        }
    }
}

impl OutcomeConfig {
    pub fn coverage_delta(&self, coverage: Coverage, archetype: PlayArchetype) -> f32 {
        self.coverage_modifiers
            .iter()
            .filter(|m| m.coverage == coverage && m.archetype == archetype)
            .map(|m| m.completion_delta)
            .sum()
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.blocking_multiplier_floor > self.blocking_multiplier_ceiling {
            return Err(ConfigurationError::invalid_value(
                "outcome.blocking_multiplier_floor",
                "must not exceed blocking_multiplier_ceiling",
            ));
        }
        if self.attribute_multiplier_min > self.attribute_multiplier_max {
            return Err(ConfigurationError::invalid_value(
                "outcome.attribute_multiplier_min",
                "must not exceed attribute_multiplier_max",
            ));
        }
        if self.attribute_scale <= 0.0 || self.completion_scale <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "outcome.scale",
                "attribute_scale and completion_scale must be positive",
            ));
        }
        if self.completion_min > self.completion_max {
            return Err(ConfigurationError::invalid_value(
                "outcome.completion_min",
                "must not exceed completion_max",
            ));
        }
        for (field, value) in [
            ("outcome.unblocked_stuff_chance", self.unblocked_stuff_chance),
            ("outcome.fumble_base", self.fumble_base),
            (
                "outcome.interception_on_incompletion",
                self.interception_on_incompletion,
            ),
            ("outcome.sack_base", self.sack_base),
            ("outcome.sack_fumble_chance", self.sack_fumble_chance),
            ("outcome.completion_min", self.completion_min),
            ("outcome.completion_max", self.completion_max),
            ("outcome.out_of_bounds_outside_run", self.out_of_bounds_outside_run),
            ("outcome.out_of_bounds_inside_run", self.out_of_bounds_inside_run),
            ("outcome.out_of_bounds_completion", self.out_of_bounds_completion),
        ] {
            ConfigurationError::check_rate(field, value)?;
        }
        self.down_pressure.validate("outcome.down_pressure")?;
        self.ball_security_curve
            .validate("outcome.ball_security_curve")
    }
}
