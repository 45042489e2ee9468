//! Player ratings, positions and the read-only rating lookup.

use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::situation::TeamSide;

/// Rating returned for attributes a player has no value for.
pub const NEUTRAL_RATING: u8 = 50;
/// Upper bound of the rating scale.
pub const MAX_RATING: u8 = 99;

/// Named player attribute (0-99 scale).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Power,
    Vision,
    Speed,
    Agility,
    Strength,
    Discipline,
    PassRush,
    PassBlock,
    RunBlock,
    BlockShedding,
    Tackling,
    Coverage,
    Accuracy,
    ArmStrength,
    Catching,
    RouteRunning,
    BallSecurity,
    Awareness,
    KickPower,
    KickAccuracy,
}

impl Attribute {
    pub const ALL: [Attribute; 20] = [
        Attribute::Power,
        Attribute::Vision,
        Attribute::Speed,
        Attribute::Agility,
        Attribute::Strength,
        Attribute::Discipline,
        Attribute::PassRush,
        Attribute::PassBlock,
        Attribute::RunBlock,
        Attribute::BlockShedding,
        Attribute::Tackling,
        Attribute::Coverage,
        Attribute::Accuracy,
        Attribute::ArmStrength,
        Attribute::Catching,
        Attribute::RouteRunning,
        Attribute::BallSecurity,
        Attribute::Awareness,
        Attribute::KickPower,
        Attribute::KickAccuracy,
    ];
}

/// Weighted attribute blends used wherever a single matchup number is needed.
pub mod composites {
    use super::Attribute::{self, *};

    pub type Blend = &'static [(Attribute, f32)];

    pub const RUN_BLOCK: Blend = &[(RunBlock, 0.6), (Strength, 0.3), (Awareness, 0.1)];
    pub const PASS_BLOCK: Blend = &[(PassBlock, 0.7), (Strength, 0.15), (Awareness, 0.15)];
    pub const RUN_DEFENSE: Blend = &[(BlockShedding, 0.5), (Strength, 0.3), (Tackling, 0.2)];
    pub const PASS_RUSH: Blend = &[(PassRush, 0.7), (Speed, 0.2), (Strength, 0.1)];
    pub const BALL_CARRIER: Blend = &[(Speed, 0.3), (Agility, 0.25), (Vision, 0.25), (Power, 0.2)];
    pub const TACKLER: Blend = &[(Tackling, 0.6), (Speed, 0.2), (Strength, 0.2)];
    pub const PASSER: Blend = &[(Accuracy, 0.6), (ArmStrength, 0.2), (Awareness, 0.2)];
    pub const RECEIVER_HANDS: Blend = &[(Catching, 0.7), (Awareness, 0.3)];
    pub const SEPARATION: Blend = &[(RouteRunning, 0.6), (Speed, 0.3), (Agility, 0.1)];
    pub const COVERAGE: Blend = &[(Coverage, 0.6), (Speed, 0.25), (Awareness, 0.15)];
}

/// A player's attribute map. Immutable for the duration of a play.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerRating {
    values: FxHashMap<Attribute, u8>,
}

impl PlayerRating {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every attribute set to the same value.
    pub fn uniform(value: u8) -> Self {
        let mut rating = Self::new();
        for attr in Attribute::ALL {
            rating.set(attr, value);
        }
        rating
    }

    pub fn with(mut self, attr: Attribute, value: u8) -> Self {
        self.set(attr, value);
        self
    }

    pub fn set(&mut self, attr: Attribute, value: u8) {
        self.values.insert(attr, value.min(MAX_RATING));
    }

    pub fn get(&self, attr: Attribute) -> u8 {
        self.values.get(&attr).copied().unwrap_or(NEUTRAL_RATING)
    }

    /// Weighted blend of several attributes, normalized by total weight.
    pub fn blend(&self, weights: &[(Attribute, f32)]) -> f32 {
        let total: f32 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            return NEUTRAL_RATING as f32;
        }
        weights
            .iter()
            .map(|(attr, w)| self.get(*attr) as f32 * w)
            .sum::<f32>()
            / total
    }

    /// Mean over every attribute on the 0-99 scale.
    pub fn overall(&self) -> f32 {
        Attribute::ALL.iter().map(|a| self.get(*a) as f32).sum::<f32>() / Attribute::ALL.len() as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    FB,
    WR,
    TE,
    LT,
    LG,
    C,
    RG,
    RT,
    DE,
    DT,
    OLB,
    MLB,
    CB,
    FS,
    SS,
    K,
    P,
}

/// Coarse position grouping used by penalty attribution and personnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PositionGroup {
    Quarterback,
    RunningBack,
    Receiver,
    TightEnd,
    OffensiveLine,
    DefensiveLine,
    Linebacker,
    Cornerback,
    Safety,
    Specialist,
}

impl Position {
    pub fn group(&self) -> PositionGroup {
        match self {
            Position::QB => PositionGroup::Quarterback,
            Position::RB | Position::FB => PositionGroup::RunningBack,
            Position::WR => PositionGroup::Receiver,
            Position::TE => PositionGroup::TightEnd,
            Position::LT | Position::LG | Position::C | Position::RG | Position::RT => {
                PositionGroup::OffensiveLine
            }
            Position::DE | Position::DT => PositionGroup::DefensiveLine,
            Position::OLB | Position::MLB => PositionGroup::Linebacker,
            Position::CB => PositionGroup::Cornerback,
            Position::FS | Position::SS => PositionGroup::Safety,
            Position::K | Position::P => PositionGroup::Specialist,
        }
    }

    pub fn is_offense(&self) -> bool {
        matches!(
            self.group(),
            PositionGroup::Quarterback
                | PositionGroup::RunningBack
                | PositionGroup::Receiver
                | PositionGroup::TightEnd
                | PositionGroup::OffensiveLine
        )
    }

    pub fn is_defense(&self) -> bool {
        matches!(
            self.group(),
            PositionGroup::DefensiveLine
                | PositionGroup::Linebacker
                | PositionGroup::Cornerback
                | PositionGroup::Safety
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub ratings: PlayerRating,
}

impl Player {
    pub fn rating(&self, attr: Attribute) -> u8 {
        self.ratings.get(attr)
    }
}

/// Read-only access to player attributes.
///
/// Implemented by [`Roster`] and by plain id → rating maps, so resolvers can
/// be driven either from a full roster or from a hand-built table.
pub trait RatingLookup {
    fn ratings(&self, player: PlayerId) -> Option<&PlayerRating>;

    fn attribute(&self, player: PlayerId, attr: Attribute) -> u8 {
        self.ratings(player)
            .map(|r| r.get(attr))
            .unwrap_or(NEUTRAL_RATING)
    }

    fn blend(&self, player: PlayerId, weights: &[(Attribute, f32)]) -> f32 {
        self.ratings(player)
            .map(|r| r.blend(weights))
            .unwrap_or(NEUTRAL_RATING as f32)
    }
}

impl RatingLookup for FxHashMap<PlayerId, PlayerRating> {
    fn ratings(&self, player: PlayerId) -> Option<&PlayerRating> {
        self.get(&player)
    }
}

/// One team's players in depth-chart order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub side: TeamSide,
    pub name: String,
    pub players: Vec<Player>,
}

impl Roster {
    pub fn new(side: TeamSide, name: impl Into<String>) -> Self {
        Self {
            side,
            name: name.into(),
            players: Vec::new(),
        }
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Players at a position, starters first.
    pub fn at(&self, position: Position) -> impl Iterator<Item = &Player> + '_ {
        self.players.iter().filter(move |p| p.position == position)
    }

    pub fn starter(&self, position: Position) -> Option<&Player> {
        self.at(position).next()
    }

    /// First player found at any of the positions, in the given preference order.
    pub fn first_of(&self, positions: &[Position]) -> Option<&Player> {
        positions.iter().find_map(|pos| self.starter(*pos))
    }

    pub fn in_group(&self, group: PositionGroup) -> impl Iterator<Item = &Player> + '_ {
        self.players
            .iter()
            .filter(move |p| p.position.group() == group)
    }

    /// Mean of one attribute across a set of position groups.
    pub fn group_average(&self, groups: &[PositionGroup], attr: Attribute) -> Option<f32> {
        let values: Vec<f32> = self
            .players
            .iter()
            .filter(|p| groups.contains(&p.position.group()))
            .map(|p| p.rating(attr) as f32)
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f32>() / values.len() as f32)
        }
    }
}

impl RatingLookup for Roster {
    fn ratings(&self, player: PlayerId) -> Option<&PlayerRating> {
        self.get(player).map(|p| &p.ratings)
    }
}
