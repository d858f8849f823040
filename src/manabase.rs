//! Land count and land selection for a finished non-land slate.

use std::collections::HashSet;

use log::{debug, info};

use crate::card::{BasicLand, Card, Commander, Role, ScoredCard};
use crate::color::{Color, ColorSet};
use crate::ranking::{self, CurveProfile};

const LAND_BASE: f64 = 31.42;
const LAND_PER_MANA_VALUE: f64 = 3.13;
const LAND_PER_ACCELERANT: f64 = 0.28;
const MIN_LANDS: f64 = 30.0;
const MAX_LANDS: f64 = 42.0;

/// `round(clamp(31.42 + 3.13 * avg_mv - 0.28 * accelerants, 30, 42))`
///
/// Accelerants are the cards tagged as mana producers, cantrips or
/// library searchers.
pub fn land_count(non_lands: &[ScoredCard]) -> usize {
    let avg_mana_value = if non_lands.is_empty() {
        0.0
    } else {
        non_lands.iter().map(|c| c.card.mana_value as f64).sum::<f64>() / non_lands.len() as f64
    };
    let accelerants = non_lands
        .iter()
        .map(|c| {
            [Role::Ramp, Role::Cantrip, Role::Tutor]
                .into_iter()
                .filter(|role| c.has_role(*role))
                .count()
        })
        .sum::<usize>();
    let raw = LAND_BASE + LAND_PER_MANA_VALUE * avg_mana_value - LAND_PER_ACCELERANT * accelerants as f64;
    let count = raw.clamp(MIN_LANDS, MAX_LANDS).round() as usize;
    debug!(
        target: "deckgen::manabase",
        "manabase.land_count avg_mv={:.2} accelerants={} lands={}",
        avg_mana_value,
        accelerants,
        count
    );
    count
}

/// Colored pip demand per color (WUBRG), hybrid pips counting half per
/// color, rounded after summation. Colors outside `identity` are zero.
pub fn color_demand(non_lands: &[ScoredCard], identity: ColorSet) -> [f64; 5] {
    let mut demand = [0.0; 5];
    for card in non_lands {
        if let Some(cost) = &card.card.mana_cost {
            for (total, pip) in demand.iter_mut().zip(cost.color_demand()) {
                *total += pip;
            }
        }
    }
    for color in Color::ALL {
        let slot = &mut demand[color.index()];
        *slot = if identity.contains(color) { slot.round() } else { 0.0 };
    }
    demand
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManabaseConstraints {
    pub land_count: usize,
    /// Requested non-basic slots; capped by the eligible pool.
    pub nonbasic_slots: usize,
    pub curve: CurveProfile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Manabase {
    /// Non-basic lands best-first, then basics in WUBRG order, Wastes last.
    pub lands: Vec<Card>,
    pub basics: Vec<(BasicLand, usize)>,
    pub demand: [f64; 5],
}

impl Manabase {
    pub fn nonbasic_count(&self) -> usize {
        self.lands.iter().filter(|l| !l.is_basic_land()).count()
    }

    pub fn basic_count(&self) -> usize {
        self.basics.iter().map(|(_, n)| n).sum()
    }
}

/// Builds exactly `constraints.land_count` lands for `commander`.
///
/// Non-basic lands come from `land_pool` (identity-checked, deduplicated,
/// best-ranked first); the remaining slots are basics split by pip demand.
pub fn build_manabase(
    commander: &Commander,
    non_lands: &[ScoredCard],
    land_pool: &[ScoredCard],
    constraints: &ManabaseConstraints,
) -> Manabase {
    let identity = commander.color_identity();
    let demand = color_demand(non_lands, identity);

    let mut seen = HashSet::new();
    let mut nonbasics: Vec<ScoredCard> = land_pool
        .iter()
        .filter(|c| c.card.is_land() && !c.card.is_basic_land())
        .filter(|c| identity.contains_all(c.card.color_identity))
        .filter(|c| seen.insert(c.name().to_string()))
        .cloned()
        .collect();
    ranking::rank(&mut nonbasics, &constraints.curve);
    let slots = constraints
        .nonbasic_slots
        .min(constraints.land_count)
        .min(nonbasics.len());
    nonbasics.truncate(slots);

    let basic_total = constraints.land_count - slots;
    let basics = allocate_basics(identity, &demand, basic_total);

    let mut lands: Vec<Card> = nonbasics.into_iter().map(|c| c.card).collect();
    for (basic, count) in &basics {
        lands.extend(std::iter::repeat_n(Card::basic_land(*basic), *count));
    }

    info!(
        target: "deckgen::manabase",
        "manabase.done identity={} lands={} nonbasic={} basic={}",
        identity,
        lands.len(),
        slots,
        basic_total
    );
    Manabase {
        lands,
        basics,
        demand,
    }
}

/// Largest-remainder split of `total` basics over the identity colors.
/// No pip demand at all splits evenly; a colorless identity gets Wastes.
pub fn allocate_basics(identity: ColorSet, demand: &[f64; 5], total: usize) -> Vec<(BasicLand, usize)> {
    if identity.is_empty() {
        return if total == 0 {
            Vec::new()
        } else {
            vec![(BasicLand::Wastes, total)]
        };
    }

    let colors: Vec<Color> = identity.iter().collect();
    let demand_sum: f64 = colors.iter().map(|c| demand[c.index()]).sum();
    let weight = |color: Color| {
        if demand_sum > 0.0 {
            demand[color.index()] / demand_sum
        } else {
            1.0 / colors.len() as f64
        }
    };

    let exact: Vec<f64> = colors.iter().map(|c| weight(*c) * total as f64).collect();
    let mut counts: Vec<usize> = exact.iter().map(|x| x.floor() as usize).collect();
    let mut remainder = total - counts.iter().sum::<usize>();

    let mut order: Vec<usize> = (0..colors.len()).collect();
    // Stable sort keeps WUBRG order among equal fractions.
    order.sort_by(|a, b| {
        let frac = |i: usize| exact[i] - exact[i].floor();
        frac(*b).total_cmp(&frac(*a))
    });
    for i in order {
        if remainder == 0 {
            break;
        }
        counts[i] += 1;
        remainder -= 1;
    }

    colors
        .into_iter()
        .zip(counts)
        .filter(|(_, n)| *n > 0)
        .map(|(color, n)| (BasicLand::for_color(color), n))
        .collect()
}

/// The basic land whose color is furthest below its demand share of
/// `lands`. Used when a non-basic land is swapped out for a basic.
pub fn neediest_basic(identity: ColorSet, demand: &[f64; 5], lands: &[Card]) -> BasicLand {
    let colors: Vec<Color> = identity.iter().collect();
    if colors.is_empty() {
        return BasicLand::Wastes;
    }
    let demand_sum: f64 = colors.iter().map(|c| demand[c.index()]).sum();
    let total = lands.len() as f64;

    let mut best: Option<(Color, f64)> = None;
    for color in colors.iter().copied() {
        let share = if demand_sum > 0.0 {
            demand[color.index()] / demand_sum
        } else {
            1.0 / colors.len() as f64
        };
        let basic = BasicLand::for_color(color);
        let have = lands
            .iter()
            .filter(|l| l.is_basic_land() && l.name == basic.name())
            .count() as f64;
        let deficit = share * total - have;
        if best.is_none_or(|(_, d)| deficit > d) {
            best = Some((color, deficit));
        }
    }
    best.map_or(BasicLand::Wastes, |(color, _)| BasicLand::for_color(color))
}
