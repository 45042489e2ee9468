//! Offensive and defensive play calls.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Named play style; selects the base yardage distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PlayArchetype {
    PowerRun,
    InsideZone,
    OutsideZone,
    Draw,
    QbSneak,
    Screen,
    QuickPass,
    ShortPass,
    MediumPass,
    DeepPass,
    PlayAction,
}

impl PlayArchetype {
    pub const ALL: [PlayArchetype; 11] = [
        PlayArchetype::PowerRun,
        PlayArchetype::InsideZone,
        PlayArchetype::OutsideZone,
        PlayArchetype::Draw,
        PlayArchetype::QbSneak,
        PlayArchetype::Screen,
        PlayArchetype::QuickPass,
        PlayArchetype::ShortPass,
        PlayArchetype::MediumPass,
        PlayArchetype::DeepPass,
        PlayArchetype::PlayAction,
    ];

    pub fn is_run(&self) -> bool {
        matches!(
            self,
            PlayArchetype::PowerRun
                | PlayArchetype::InsideZone
                | PlayArchetype::OutsideZone
                | PlayArchetype::Draw
                | PlayArchetype::QbSneak
        )
    }

    pub fn is_pass(&self) -> bool {
        !self.is_run()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum OffensiveFormation {
    Singleback,
    IFormation,
    Shotgun,
    Pistol,
    Goalline,
    Empty,
}

impl OffensiveFormation {
    pub const ALL: [OffensiveFormation; 6] = [
        OffensiveFormation::Singleback,
        OffensiveFormation::IFormation,
        OffensiveFormation::Shotgun,
        OffensiveFormation::Pistol,
        OffensiveFormation::Goalline,
        OffensiveFormation::Empty,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunDirection {
    Left,
    Middle,
    Right,
}

impl RunDirection {
    /// Lateral anchor of the point of attack, 0.0 = far left, 1.0 = far right.
    pub fn anchor(&self) -> f32 {
        match self {
            RunDirection::Left => 0.0,
            RunDirection::Middle => 0.5,
            RunDirection::Right => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DefensiveFormation {
    Base43,
    Base34,
    Nickel,
    Dime,
    GoalLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Coverage {
    Cover0,
    Cover1,
    Cover2,
    Cover3,
    Cover4,
    Man,
}

impl Coverage {
    /// Coverages that drop a safety into the box.
    pub fn adds_box_safety(&self) -> bool {
        matches!(self, Coverage::Cover0 | Coverage::Cover1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrimmageCall {
    pub formation: OffensiveFormation,
    pub archetype: PlayArchetype,
    pub direction: RunDirection,
}

impl ScrimmageCall {
    pub fn new(
        formation: OffensiveFormation,
        archetype: PlayArchetype,
        direction: RunDirection,
    ) -> Self {
        Self {
            formation,
            archetype,
            direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OffensiveCall {
    Scrimmage(ScrimmageCall),
    Punt,
    FieldGoal,
    Kneel,
    Spike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefensiveCall {
    pub formation: DefensiveFormation,
    pub coverage: Coverage,
    pub blitz: bool,
}

impl Default for DefensiveCall {
    fn default() -> Self {
        Self {
            formation: DefensiveFormation::Base43,
            coverage: Coverage::Cover3,
            blitz: false,
        }
    }
}

/// What actually happens on the snap, used by penalties and the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayKind {
    Run,
    Pass,
    Punt,
    FieldGoal,
    Kneel,
    Spike,
}

impl PlayKind {
    pub fn is_scrimmage(&self) -> bool {
        matches!(self, PlayKind::Run | PlayKind::Pass)
    }
}

/// Offense/defense call pair for one snap. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCall {
    pub offense: OffensiveCall,
    pub defense: DefensiveCall,
}

impl PlayCall {
    pub fn new(offense: OffensiveCall, defense: DefensiveCall) -> Self {
        Self { offense, defense }
    }

    pub fn scrimmage(
        formation: OffensiveFormation,
        archetype: PlayArchetype,
        direction: RunDirection,
        defense: DefensiveCall,
    ) -> Self {
        Self::new(
            OffensiveCall::Scrimmage(ScrimmageCall::new(formation, archetype, direction)),
            defense,
        )
    }

    pub fn kind(&self) -> PlayKind {
        match self.offense {
            OffensiveCall::Scrimmage(call) if call.archetype.is_run() => PlayKind::Run,
            OffensiveCall::Scrimmage(_) => PlayKind::Pass,
            OffensiveCall::Punt => PlayKind::Punt,
            OffensiveCall::FieldGoal => PlayKind::FieldGoal,
            OffensiveCall::Kneel => PlayKind::Kneel,
            OffensiveCall::Spike => PlayKind::Spike,
        }
    }
}
