//! Blocking matchup tuning.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::curves::ModifierCurve;
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockingConfig {
    /// Rating points per logistic unit; larger = flatter win curve
    pub logistic_scale: f32,
    /// Minimum single-block win probability
    pub win_floor: f32,
    /// Maximum single-block win probability
    pub win_ceiling: f32,
    /// Margin added for the second blocker on a double team
    pub double_team_bonus: f32,
    /// Run-blocking margin bonus by yards to go
    pub short_yardage_run_bonus: ModifierCurve,
    /// Margin handed to rushers on obvious passing downs
    pub obvious_pass_rush_bonus: f32,
    /// Margin handed to rushers when the defense blitzes
    pub blitz_rush_bonus: f32,
    /// Weight of point-of-attack pairings in the grade
    pub point_of_attack_weight: f32,
    /// Lateral window (0-1) around the run direction counted as point of attack
    pub point_of_attack_window: f32,
    /// Grade deducted per unblocked defender
    pub unblocked_grade_penalty: f32,
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            logistic_scale: 12.0,
            win_floor: 0.05,
            win_ceiling: 0.95,
            double_team_bonus: 10.0,
            short_yardage_run_bonus: ModifierCurve::new(&[(1.0, 8.0), (2.0, 5.0), (3.0, 2.0), (f32::MAX, 0.0)]),
            obvious_pass_rush_bonus: 6.0,
            blitz_rush_bonus: 4.0,
            point_of_attack_weight: 1.5,
            point_of_attack_window: 0.34,
            unblocked_grade_penalty: 0.12,
        }
    }
}

impl BlockingConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.logistic_scale <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "blocking.logistic_scale",
                "must be positive",
            ));
        }
        ConfigurationError::check_rate("blocking.win_floor", self.win_floor)?;
        ConfigurationError::check_rate("blocking.win_ceiling", self.win_ceiling)?;
        if self.win_floor >= self.win_ceiling {
            return Err(ConfigurationError::invalid_value(
                "blocking.win_floor",
                "must be below win_ceiling",
            ));
        }
        ConfigurationError::check_rate(
            "blocking.unblocked_grade_penalty",
            self.unblocked_grade_penalty,
        )?;
        self.short_yardage_run_bonus
            .validate("blocking.short_yardage_run_bonus")
    }
}
