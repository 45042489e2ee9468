//! Bucketed lookup tables (input bucket → modifier).
//!
//! Replaces hand-written if/else ladders so designers can retune a curve
//! from configuration alone.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CurvePoint {
    /// Inclusive upper bound of the bucket
    pub up_to: f32,
    pub value: f32,
}

/// Step function over ascending buckets. Inputs above the last bucket take
/// the last value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModifierCurve {
    pub points: Vec<CurvePoint>,
}

impl ModifierCurve {
    pub fn new(points: &[(f32, f32)]) -> Self {
        Self {
            points: points
                .iter()
                .map(|&(up_to, value)| CurvePoint { up_to, value })
                .collect(),
        }
    }

    /// Curve that returns `value` everywhere.
    pub fn flat(value: f32) -> Self {
        Self::new(&[(f32::MAX, value)])
    }

    pub fn lookup(&self, input: f32) -> f32 {
        self.points
            .iter()
            .find(|p| input <= p.up_to)
            .or_else(|| self.points.last())
            .map(|p| p.value)
            .unwrap_or(1.0)
    }

    pub fn validate(&self, name: &str) -> Result<(), ConfigurationError> {
        if self.points.is_empty() {
            return Err(ConfigurationError::InvalidCurve {
                name: name.to_string(),
                reason: "no buckets".to_string(),
            });
        }
        if self
            .points
            .windows(2)
            .any(|pair| pair[0].up_to >= pair[1].up_to)
        {
            return Err(ConfigurationError::InvalidCurve {
                name: name.to_string(),
                reason: "bucket bounds must be strictly ascending".to_string(),
            });
        }
        if self.points.iter().any(|p| !p.value.is_finite()) {
            return Err(ConfigurationError::InvalidCurve {
                name: name.to_string(),
                reason: "bucket values must be finite".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_picks_first_matching_bucket() {
        let curve = ModifierCurve::new(&[(40.0, 1.8), (60.0, 1.3), (80.0, 1.0)]);
        assert_eq!(curve.lookup(10.0), 1.8);
        assert_eq!(curve.lookup(40.0), 1.8);
        assert_eq!(curve.lookup(41.0), 1.3);
        assert_eq!(curve.lookup(99.0), 1.0);
    }

    #[test]
    fn test_flat_curve() {
        let curve = ModifierCurve::flat(0.5);
        assert_eq!(curve.lookup(-100.0), 0.5);
        assert_eq!(curve.lookup(1.0e9), 0.5);
    }

    #[test]
    fn test_validate_rejects_unsorted_and_empty() {
        assert!(ModifierCurve::new(&[(10.0, 1.0), (5.0, 2.0)])
            .validate("x")
            .is_err());
        assert!(ModifierCurve { points: vec![] }.validate("x").is_err());
        assert!(ModifierCurve::new(&[(1.0, 1.0), (2.0, 2.0)])
            .validate("x")
            .is_ok());
    }
}
