//! Per-category best-first selection against quota targets.

use std::collections::{BTreeMap, HashSet};

use log::{info, warn};

use crate::card::ScoredCard;
use crate::quota::QuotaPlan;
use crate::ranking::{self, CurveProfile};
use crate::types::Category;

/// A category whose candidate pool could not cover its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortfall {
    pub category: Category,
    pub target: usize,
    pub available: usize,
}

impl Shortfall {
    pub fn message(&self) -> String {
        format!(
            "{}: target {} adjusted to {} due to pool scarcity",
            self.category, self.target, self.available
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Chosen cards in canonical category order, best first within each.
    pub cards: Vec<ScoredCard>,
    pub shortfalls: Vec<Shortfall>,
}

/// Takes `min(target, available)` best-ranked cards per weighted category.
///
/// Lands belong to the manabase and `Other` cards carry no weight, so
/// neither is selected here. A short category is left short; it never
/// borrows from another category at this stage.
pub fn select(pool: &[ScoredCard], plan: &QuotaPlan, curve: &CurveProfile) -> Selection {
    let mut by_category: BTreeMap<Category, Vec<ScoredCard>> = BTreeMap::new();
    for card in pool {
        let category = card.category();
        if plan.target(category) > 0 {
            by_category.entry(category).or_default().push(card.clone());
        }
    }

    let mut selection = Selection::default();
    let mut seen: HashSet<String> = HashSet::new();
    for category in Category::WEIGHTED {
        let target = plan.target(category);
        if target == 0 {
            continue;
        }
        let mut candidates = by_category.remove(&category).unwrap_or_default();
        ranking::rank(&mut candidates, curve);
        candidates.retain(|c| seen.insert(c.name().to_string()));

        let available = candidates.len();
        if available < target {
            let shortfall = Shortfall {
                category,
                target,
                available,
            };
            warn!(
                target: "deckgen::select",
                "select.shortfall category={} target={} available={}",
                category,
                target,
                available
            );
            selection.shortfalls.push(shortfall);
        }
        candidates.truncate(target);
        selection.cards.extend(candidates);
    }

    info!(
        target: "deckgen::select",
        "select.done selected={} budget={} shortfalls={}",
        selection.cards.len(),
        plan.slot_budget(),
        selection.shortfalls.len()
    );
    selection
}
