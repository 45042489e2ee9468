//! Tendencies for the default situational play caller.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PlayCallingConfig {
    /// Pass rate on standard downs
    pub base_pass_rate: f32,
    /// Pass rate on obvious passing downs
    pub long_yardage_pass_rate: f32,
    /// Pass rate with two yards or less to go
    pub short_yardage_pass_rate: f32,
    /// Pass rate when trailing late in the second half
    pub trailing_late_pass_rate: f32,
    /// Go for it on 4th down with this many yards or fewer to go...
    pub go_for_it_max_distance: i32,
    /// ...from at least this field position
    pub go_for_it_min_field_position: i32,
    /// Attempt a field goal on 4th down from at least this field position
    pub field_goal_min_field_position: i32,
    /// Kneel when leading with this many seconds or fewer left in the game
    pub kneel_seconds: u32,
    /// Spike when trailing with this many seconds or fewer left in a half
    pub spike_seconds: u32,
    pub blitz_rate: f32,
    /// Trailing margins (before the try) that call for a two-point attempt
    pub two_point_margins: Vec<i32>,
    /// Two-point logic only applies from this quarter on
    pub two_point_from_quarter: u8,
}

impl Default for PlayCallingConfig {
    fn default() -> Self {
        Self {
            base_pass_rate: 0.55,
            long_yardage_pass_rate: 0.72,
            short_yardage_pass_rate: 0.30,
            trailing_late_pass_rate: 0.80,
            go_for_it_max_distance: 2,
            go_for_it_min_field_position: 55,
            field_goal_min_field_position: 62,
            kneel_seconds: 100,
            spike_seconds: 20,
            blitz_rate: 0.20,
            two_point_margins: vec![2, 5, 9, 10],
            two_point_from_quarter: 4,
        }
    }
}

impl PlayCallingConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [
            ("play_calling.base_pass_rate", self.base_pass_rate),
            ("play_calling.long_yardage_pass_rate", self.long_yardage_pass_rate),
            ("play_calling.short_yardage_pass_rate", self.short_yardage_pass_rate),
            ("play_calling.trailing_late_pass_rate", self.trailing_late_pass_rate),
            ("play_calling.blitz_rate", self.blitz_rate),
        ] {
            ConfigurationError::check_rate(field, value)?;
        }
        if !(0..=100).contains(&self.field_goal_min_field_position)
            || !(0..=100).contains(&self.go_for_it_min_field_position)
        {
            return Err(ConfigurationError::invalid_value(
                "play_calling.field_position",
                "thresholds must be within 0-100",
            ));
        }
        Ok(())
    }
}
