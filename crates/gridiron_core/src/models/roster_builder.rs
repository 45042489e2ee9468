//! Typed builders for players and full rosters.
//!
//! Used by tests, benchmarks and the CLI to produce concrete rosters
//! without hand-writing every attribute.

use super::player::{Attribute, Player, PlayerId, PlayerRating, Position, PositionGroup, Roster};
use super::situation::TeamSide;

/// Depth chart produced by [`RosterBuilder::build`], in depth order.
pub const STANDARD_DEPTH: &[(Position, usize)] = &[
    (Position::QB, 2),
    (Position::RB, 2),
    (Position::FB, 1),
    (Position::WR, 5),
    (Position::TE, 2),
    (Position::LT, 1),
    (Position::LG, 1),
    (Position::C, 1),
    (Position::RG, 1),
    (Position::RT, 1),
    (Position::DE, 3),
    (Position::DT, 3),
    (Position::OLB, 3),
    (Position::MLB, 2),
    (Position::CB, 4),
    (Position::FS, 1),
    (Position::SS, 1),
    (Position::K, 1),
    (Position::P, 1),
];

pub struct PlayerBuilder {
    id: PlayerId,
    name: Option<String>,
    position: Position,
    ratings: PlayerRating,
}

impl PlayerBuilder {
    pub fn new(id: u32, position: Position) -> Self {
        Self {
            id: PlayerId(id),
            name: None,
            position,
            ratings: PlayerRating::uniform(super::player::NEUTRAL_RATING),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn overall(mut self, value: u8) -> Self {
        self.ratings = PlayerRating::uniform(value);
        self
    }

    pub fn rating(mut self, attr: Attribute, value: u8) -> Self {
        self.ratings.set(attr, value);
        self
    }

    pub fn build(self) -> Player {
        let name = self
            .name
            .unwrap_or_else(|| format!("{:?} #{}", self.position, self.id.0));
        Player {
            id: self.id,
            name,
            position: self.position,
            ratings: self.ratings,
        }
    }
}

/// Builds a full roster with uniform ratings and optional overrides.
pub struct RosterBuilder {
    side: TeamSide,
    name: String,
    overall: u8,
    group_overall: Vec<(PositionGroup, u8)>,
    attribute_overrides: Vec<(Option<PositionGroup>, Attribute, u8)>,
}

impl RosterBuilder {
    pub fn new(side: TeamSide) -> Self {
        let name = match side {
            TeamSide::Home => "Home",
            TeamSide::Away => "Away",
        };
        Self {
            side,
            name: name.to_string(),
            overall: 70,
            group_overall: Vec::new(),
            attribute_overrides: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn overall(mut self, value: u8) -> Self {
        self.overall = value;
        self
    }

    /// Overall rating for every player in one position group.
    pub fn group_overall(mut self, group: PositionGroup, value: u8) -> Self {
        self.group_overall.push((group, value));
        self
    }

    /// Set an attribute on every player.
    pub fn attribute(mut self, attr: Attribute, value: u8) -> Self {
        self.attribute_overrides.push((None, attr, value));
        self
    }

    /// Set an attribute on every player of one group.
    pub fn group_attribute(mut self, group: PositionGroup, attr: Attribute, value: u8) -> Self {
        self.attribute_overrides.push((Some(group), attr, value));
        self
    }

    pub fn build(self) -> Roster {
        let id_base = match self.side {
            TeamSide::Home => 1000,
            TeamSide::Away => 2000,
        };
        let mut roster = Roster::new(self.side, self.name.clone());
        let mut next_id = id_base;

        for &(position, count) in STANDARD_DEPTH {
            for depth in 0..count {
                next_id += 1;
                let group = position.group();
                let overall = self
                    .group_overall
                    .iter()
                    .rev()
                    .find(|(g, _)| *g == group)
                    .map(|(_, v)| *v)
                    .unwrap_or(self.overall);

                let mut builder = PlayerBuilder::new(next_id, position)
                    .name(format!("{} {:?}{}", self.name, position, depth + 1))
                    .overall(overall);
                for (target, attr, value) in &self.attribute_overrides {
                    if target.map_or(true, |g| g == group) {
                        builder = builder.rating(*attr, *value);
                    }
                }
                roster.players.push(builder.build());
            }
        }
        roster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_roster_has_full_depth() {
        let roster = RosterBuilder::new(TeamSide::Home).overall(75).build();
        let expected: usize = STANDARD_DEPTH.iter().map(|(_, n)| n).sum();
        assert_eq!(roster.players.len(), expected);
        assert_eq!(roster.at(Position::WR).count(), 5);
        assert_eq!(roster.starter(Position::QB).unwrap().rating(Attribute::Accuracy), 75);
    }

    #[test]
    fn test_ids_do_not_collide_between_sides() {
        let home = RosterBuilder::new(TeamSide::Home).build();
        let away = RosterBuilder::new(TeamSide::Away).build();
        for p in &home.players {
            assert!(away.get(p.id).is_none());
        }
    }

    #[test]
    fn test_group_overrides() {
        let roster = RosterBuilder::new(TeamSide::Away)
            .overall(60)
            .group_overall(PositionGroup::OffensiveLine, 90)
            .group_attribute(PositionGroup::DefensiveLine, Attribute::Discipline, 20)
            .build();
        assert_eq!(roster.starter(Position::C).unwrap().rating(Attribute::RunBlock), 90);
        assert_eq!(roster.starter(Position::QB).unwrap().rating(Attribute::RunBlock), 60);
        assert_eq!(roster.starter(Position::DT).unwrap().rating(Attribute::Discipline), 20);
        assert_eq!(roster.starter(Position::CB).unwrap().rating(Attribute::Discipline), 60);
    }

    #[test]
    fn test_player_builder_defaults_name() {
        let player = PlayerBuilder::new(9, Position::K)
            .rating(Attribute::KickPower, 88)
            .build();
        assert_eq!(player.name, "K #9");
        assert_eq!(player.rating(Attribute::KickPower), 88);
        assert_eq!(player.rating(Attribute::Speed), 50);
    }
}
