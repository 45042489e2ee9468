//! # Engine Configuration
//!
//! Every tuning constant the resolvers use lives here: blocking curves,
//! yardage tables, outcome branches, the penalty catalogue, clock timing,
//! the kicking game and play-calling tendencies.
//!
//! ## Presets
//!
//! | Preset | Description |
//! |--------|-------------|
//! | `realistic` | Default tables |
//! | `arcade` | Bigger plays, fewer flags, shorter kicks miss less |
//! | `penalty_free` | Default tables with the penalty catalogue emptied |
//!
//! ## Usage
//!
//! ```rust
//! use gridiron_core::config::EngineConfig;
//!
//! let config = EngineConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let arcade = EngineConfig::arcade();
//! let yaml = arcade.to_yaml().unwrap();
//! let parsed = EngineConfig::from_yaml_str(&yaml).unwrap();
//! assert_eq!(parsed, arcade);
//! ```
//!
//! ## Environment Variables
//!
//! - `GRIDIRON_CONFIG_PROFILE`: Select preset (realistic, arcade, penalty_free)

mod blocking_config;
mod clock_config;
mod curves;
mod outcome_config;
mod penalty_config;
mod play_calling_config;
mod special_teams_config;
mod yardage_tables;

pub use blocking_config::BlockingConfig;
pub use clock_config::ClockConfig;
pub use curves::{CurvePoint, ModifierCurve};
pub use outcome_config::{CoverageModifier, OutcomeConfig};
pub use penalty_config::{EligibleGroup, PenaltyConfig, PenaltyDefinition};
pub use play_calling_config::PlayCallingConfig;
pub use special_teams_config::SpecialTeamsConfig;
pub use yardage_tables::{YardageDistribution, YardageTableEntry, YardageTables};

use std::env;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Environment variable naming the preset used by [`EngineConfig::from_env_or_default`].
pub const PROFILE_ENV_VAR: &str = "GRIDIRON_CONFIG_PROFILE";

/// All tables the engine reads. Loaded once, validated at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub outcome: OutcomeConfig,
    #[serde(default)]
    pub yardage: YardageTables,
    #[serde(default)]
    pub penalties: PenaltyConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub special_teams: SpecialTeamsConfig,
    #[serde(default)]
    pub play_calling: PlayCallingConfig,
}

impl EngineConfig {
    pub fn realistic() -> Self {
        Self::default()
    }

    /// Looser blocking, more breakaways, fewer flags.
    pub fn arcade() -> Self {
        let mut cfg = Self::default();
        cfg.blocking.logistic_scale = 10.0;
        cfg.outcome.blocking_multiplier_ceiling = 1.8;
        cfg.outcome.fumble_base = 0.008;
        cfg.outcome.interception_on_incompletion = 0.05;
        for entry in &mut cfg.yardage.entries {
            entry.distribution.big_play_chance = (entry.distribution.big_play_chance * 1.6).min(1.0);
        }
        cfg.penalties = PenaltyConfig::default().scaled(0.6);
        cfg.special_teams.field_goal_accuracy_factor = 0.006;
        cfg.play_calling.base_pass_rate = 0.62;
        cfg
    }

    pub fn penalty_free() -> Self {
        Self {
            penalties: PenaltyConfig::disabled(),
            ..Self::default()
        }
    }

    /// Preset by name; `None` for unknown names.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "realistic" | "default" => Some(Self::realistic()),
            "arcade" => Some(Self::arcade()),
            "penalty_free" | "penalty-free" => Some(Self::penalty_free()),
            _ => None,
        }
    }

    /// Load from environment variable GRIDIRON_CONFIG_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        env::var(PROFILE_ENV_VAR)
            .ok()
            .and_then(|name| Self::preset(&name))
            .unwrap_or_default()
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigurationError> {
        let cfg: Self = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load a `.json` file as JSON and anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| ConfigurationError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        tracing::info!(path = %path.display(), json = is_json, "loading engine config");
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn to_yaml(&self) -> Result<String, ConfigurationError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigurationError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// JSON schema describing the configuration file format.
    pub fn json_schema() -> serde_json::Value {
        let schema = schemars::schema_for!(EngineConfig);
        serde_json::to_value(schema).unwrap_or(serde_json::Value::Null)
    }

    /// Check every table. Fatal at startup.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.blocking.validate()?;
        self.outcome.validate()?;
        self.yardage.validate()?;
        self.penalties.validate()?;
        self.clock.validate()?;
        self.special_teams.validate()?;
        self.play_calling.validate()
    }
}
