//! Kicking game tuning.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::curves::ModifierCurve;
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SpecialTeamsConfig {
    /// Receiving team's spot after a kickoff touchback
    pub kickoff_touchback_spot: i32,
    pub kickoff_touchback_chance: f32,
    /// Touchback chance added per kick power point above 50
    pub kickoff_power_factor: f32,
    /// Kickoff lands this deep (from the receiving goal line) on average
    pub kickoff_landing_mean: f32,
    pub kickoff_return_mean: f32,
    pub kickoff_return_std_dev: f32,
    pub punt_gross_mean: f32,
    pub punt_gross_std_dev: f32,
    /// Gross yards per kick power point above 50
    pub punt_power_factor: f32,
    pub punt_return_mean: f32,
    pub punt_return_std_dev: f32,
    pub punt_touchback_spot: i32,
    /// Added to the line-of-scrimmage distance for the kick distance
    pub field_goal_snap_distance: i32,
    /// Make probability by kick distance
    pub field_goal_make_curve: ModifierCurve,
    /// Make probability per kick accuracy point above 50
    pub field_goal_accuracy_factor: f32,
    pub field_goal_make_min: f32,
    pub field_goal_make_max: f32,
    /// Defense never takes over closer to its own goal than this after a miss
    pub missed_field_goal_min_spot: i32,
    pub extra_point_success: f32,
    pub two_point_success: f32,
    /// Spot the scored-on team kicks from after a safety
    pub safety_free_kick_spot: i32,
}

impl Default for SpecialTeamsConfig {
    fn default() -> Self {
        Self {
            kickoff_touchback_spot: 25,
            kickoff_touchback_chance: 0.55,
            kickoff_power_factor: 0.006,
            kickoff_landing_mean: 2.0,
            kickoff_return_mean: 23.0,
            kickoff_return_std_dev: 7.0,
            punt_gross_mean: 45.0,
            punt_gross_std_dev: 6.0,
            punt_power_factor: 0.15,
            punt_return_mean: 8.0,
            punt_return_std_dev: 5.0,
            punt_touchback_spot: 20,
            field_goal_snap_distance: 17,
            field_goal_make_curve: ModifierCurve::new(&[
                (30.0, 0.97),
                (40.0, 0.90),
                (50.0, 0.78),
                (55.0, 0.62),
                (60.0, 0.42),
                (65.0, 0.20),
                (f32::MAX, 0.0),
            ]),
            field_goal_accuracy_factor: 0.004,
            field_goal_make_min: 0.0,
            field_goal_make_max: 0.99,
            missed_field_goal_min_spot: 20,
            extra_point_success: 0.94,
            two_point_success: 0.48,
            safety_free_kick_spot: 20,
        }
    }
}

impl SpecialTeamsConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (field, value) in [
            ("special_teams.kickoff_touchback_chance", self.kickoff_touchback_chance),
            ("special_teams.field_goal_make_min", self.field_goal_make_min),
            ("special_teams.field_goal_make_max", self.field_goal_make_max),
            ("special_teams.extra_point_success", self.extra_point_success),
            ("special_teams.two_point_success", self.two_point_success),
        ] {
            ConfigurationError::check_rate(field, value)?;
        }
        for (field, spot) in [
            ("special_teams.kickoff_touchback_spot", self.kickoff_touchback_spot),
            ("special_teams.punt_touchback_spot", self.punt_touchback_spot),
            ("special_teams.missed_field_goal_min_spot", self.missed_field_goal_min_spot),
            ("special_teams.safety_free_kick_spot", self.safety_free_kick_spot),
        ] {
            if !(1..=99).contains(&spot) {
                return Err(ConfigurationError::invalid_value(field, "spot must be within 1-99"));
            }
        }
        if self.punt_gross_mean <= 0.0 {
            return Err(ConfigurationError::invalid_value(
                "special_teams.punt_gross_mean",
                "must be positive",
            ));
        }
        self.field_goal_make_curve
            .validate("special_teams.field_goal_make_curve")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SpecialTeamsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_make_curve_drops_with_distance() {
        let cfg = SpecialTeamsConfig::default();
        let curve = &cfg.field_goal_make_curve;
        assert!(curve.lookup(25.0) > curve.lookup(45.0));
        assert!(curve.lookup(45.0) > curve.lookup(58.0));
        assert_eq!(curve.lookup(70.0), 0.0);
    }

    #[test]
    fn test_spot_outside_field_rejected() {
        let cfg = SpecialTeamsConfig {
            punt_touchback_spot: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
