//! Game clock timing.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClockConfig {
    pub quarter_seconds: u32,
    pub overtime_seconds: u32,
    /// 0 = games end tied after regulation
    pub max_overtime_periods: u8,
    /// Snap-to-whistle duration range
    pub play_seconds_min: u32,
    pub play_seconds_max: u32,
    /// Clock running between whistle and next snap when the ball stays in bounds
    pub runoff_in_bounds: u32,
    pub runoff_jitter: u32,
    pub runoff_out_of_bounds: u32,
    pub kneel_seconds: u32,
    pub spike_seconds: u32,
    /// Seconds left in quarters 2 and 4 at which the clock stops once
    pub two_minute_warning: u32,
    /// Window in which out-of-bounds plays stop the clock outright
    pub late_half_window: u32,
    pub kickoff_seconds: u32,
    pub punt_seconds: u32,
    pub field_goal_seconds: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            quarter_seconds: 900,
            overtime_seconds: 600,
            max_overtime_periods: 1,
            play_seconds_min: 4,
            play_seconds_max: 8,
            runoff_in_bounds: 28,
            runoff_jitter: 3,
            runoff_out_of_bounds: 8,
            kneel_seconds: 40,
            spike_seconds: 3,
            two_minute_warning: 120,
            late_half_window: 120,
            kickoff_seconds: 6,
            punt_seconds: 8,
            field_goal_seconds: 5,
        }
    }
}

impl ClockConfig {
    /// Short quarters for fast test games.
    pub fn short_quarters(quarter_seconds: u32) -> Self {
        Self {
            quarter_seconds,
            overtime_seconds: quarter_seconds.min(600),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.quarter_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "clock.quarter_seconds",
                "must be positive",
            ));
        }
        if self.max_overtime_periods > 0 && self.overtime_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "clock.overtime_seconds",
                "must be positive when overtime is enabled",
            ));
        }
        if self.play_seconds_min > self.play_seconds_max {
            return Err(ConfigurationError::invalid_value(
                "clock.play_seconds_min",
                "must not exceed play_seconds_max",
            ));
        }
        if self.runoff_jitter > self.runoff_in_bounds {
            return Err(ConfigurationError::invalid_value(
                "clock.runoff_jitter",
                "must not exceed runoff_in_bounds",
            ));
        }
        Ok(())
    }
}
