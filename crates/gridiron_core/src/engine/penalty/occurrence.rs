//! Which penalty (if any) happens on a snap, and who committed it.

use rand::Rng;

use crate::config::{PenaltyConfig, PenaltyDefinition};
use crate::models::player::{Attribute, Player, PlayerId, PositionGroup, Roster, NEUTRAL_RATING};
use crate::models::situation::SituationalContext;

use super::types::PenaltySide;
use crate::engine::rng::weighted_pick;

/// A penalty type with its adjusted per-play rate.
#[derive(Debug, Clone, Copy)]
pub struct PenaltyCandidate<'c> {
    pub definition: &'c PenaltyDefinition,
    pub rate: f32,
}

/// Which players are on the field for each side. Empty = whole roster.
#[derive(Debug, Clone, Copy)]
pub struct OnFieldPersonnel<'p> {
    pub offense: &'p [PlayerId],
    pub defense: &'p [PlayerId],
}

fn on_field<'r>(roster: &'r Roster, personnel: &'r [PlayerId]) -> impl Iterator<Item = &'r Player> + 'r {
    roster
        .players
        .iter()
        .filter(move |p| personnel.is_empty() || personnel.contains(&p.id))
}

fn in_groups(groups: &[PositionGroup], player: &Player) -> bool {
    groups.contains(&player.position.group())
}

/// Bounded rate multiplier from the average discipline of the eligible groups.
pub fn discipline_multiplier(
    config: &PenaltyConfig,
    roster: &Roster,
    personnel: &[PlayerId],
    groups: &[PositionGroup],
) -> f32 {
    let values: Vec<f32> = on_field(roster, personnel)
        .filter(|p| in_groups(groups, p))
        .map(|p| p.rating(Attribute::Discipline) as f32)
        .collect();
    let average = if values.is_empty() {
        NEUTRAL_RATING as f32
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    };
    config
        .discipline_curve
        .lookup(average)
        .clamp(config.discipline_multiplier_min, config.discipline_multiplier_max)
}

/// Adjusted rate for every penalty that can occur on this snap.
///
/// `base_rate × discipline × situational × home_field`, then scaled down
/// together if the sum exceeds `max_total_rate`.
pub fn candidate_rates<'c>(
    config: &'c PenaltyConfig,
    offense: &Roster,
    defense: &Roster,
    personnel: OnFieldPersonnel<'_>,
    situation: &SituationalContext,
    is_pass: bool,
) -> Vec<PenaltyCandidate<'c>> {
    let offense_is_home = offense.side.is_home();
    let mut candidates: Vec<PenaltyCandidate<'c>> = config
        .definitions
        .iter()
        .filter(|def| def.applies_to.allows(is_pass))
        .map(|def| {
            let (roster, on_field_ids, team_is_home) = match def.penalized {
                PenaltySide::Offense => (offense, personnel.offense, offense_is_home),
                PenaltySide::Defense => (defense, personnel.defense, !offense_is_home),
            };
            let groups: Vec<PositionGroup> = def.eligible.iter().map(|g| g.group).collect();
            let mut rate =
                def.base_rate * discipline_multiplier(config, roster, on_field_ids, &groups);

            if situation.down == 3 {
                rate *= def.third_down_multiplier;
            }
            if situation.is_red_zone(config.red_zone_threshold) {
                rate *= def.red_zone_multiplier;
            }
            if def.crowd_noise_sensitive && def.penalized == PenaltySide::Offense && !offense_is_home {
                rate *= config.crowd_noise_multiplier;
            }
            if team_is_home {
                rate *= config.home_team_discount;
            }
            PenaltyCandidate {
                definition: def,
                rate: rate.clamp(0.0, 1.0),
            }
        })
        .collect();

    let total: f32 = candidates.iter().map(|c| c.rate).sum();
    if total > config.max_total_rate && total > 0.0 {
        let scale = config.max_total_rate / total;
        for candidate in &mut candidates {
            candidate.rate *= scale;
        }
    }
    candidates
}

/// One uniform draw over the cumulative rates: at most one penalty per snap.
pub fn draw_penalty<'c>(
    candidates: &[PenaltyCandidate<'c>],
    rng: &mut impl Rng,
) -> Option<&'c PenaltyDefinition> {
    if candidates.is_empty() {
        return None;
    }
    let roll: f32 = rng.gen();
    let mut cumulative = 0.0;
    for candidate in candidates {
        cumulative += candidate.rate;
        if roll < cumulative {
            return Some(candidate.definition);
        }
    }
    None
}

/// Weighted pick among eligible on-field players; worse discipline weighs more.
pub fn pick_offender(
    definition: &PenaltyDefinition,
    roster: &Roster,
    personnel: &[PlayerId],
    rng: &mut impl Rng,
) -> Option<PlayerId> {
    let (ids, weights): (Vec<PlayerId>, Vec<f32>) = on_field(roster, personnel)
        .filter_map(|p| {
            let group_weight = definition
                .eligible
                .iter()
                .find(|g| g.group == p.position.group())?
                .weight;
            let discipline = p.rating(Attribute::Discipline) as f32;
            Some((p.id, group_weight * (100.0 - discipline).max(1.0) / 50.0))
        })
        .unzip();
    weighted_pick(rng, &weights).map(|idx| ids[idx])
}
