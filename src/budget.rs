//! Soft budget enforcement over a finished slate.
//!
//! Price is never a hard constraint: whatever cannot be brought under the
//! caps is reported as a warning, and the card count is preserved
//! whenever the pool allows it.

use std::collections::{BTreeMap, HashSet};

use log::{debug, info, warn};

use crate::card::{Card, ScoredCard};
use crate::color::ColorSet;
use crate::deck::DeckSlate;
use crate::manabase::neediest_basic;
use crate::normalizer::normalize;
use crate::pricing::PriceBook;
use crate::quota::QuotaPlan;
use crate::ranking::{self, CurveProfile};
use crate::types::Category;

const PRICE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetPolicy {
    pub per_card_cap: Option<f64>,
    pub total_cap: Option<f64>,
    /// Over-cap cards without a substitute stay when their total score
    /// exceeds this.
    pub keep_threshold: f64,
}

impl Default for BudgetPolicy {
    fn default() -> Self {
        Self {
            per_card_cap: None,
            total_cap: None,
            keep_threshold: 9.0,
        }
    }
}

impl BudgetPolicy {
    pub fn is_active(&self) -> bool {
        self.per_card_cap.is_some() || self.total_cap.is_some()
    }
}

/// One replaced or dropped card.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub category: Category,
    pub removed: String,
    pub removed_price: f64,
    /// `None` when the card was dropped for backfill.
    pub added: Option<String>,
    pub added_price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub slate: DeckSlate,
    pub total_price: f64,
    pub warnings: Vec<String>,
    pub substitutions: Vec<Substitution>,
}

/// Everything reconciliation reads besides the slate itself.
#[derive(Debug, Clone, Copy)]
pub struct BudgetContext<'a> {
    /// Scored non-land candidates, the source of substitutes and backfill.
    pub pool: &'a [ScoredCard],
    pub prices: &'a PriceBook,
    pub plan: &'a QuotaPlan,
    pub identity: ColorSet,
    pub demand: [f64; 5],
    pub non_land_target: usize,
    pub curve: &'a CurveProfile,
}

pub fn reconcile(slate: DeckSlate, policy: &BudgetPolicy, ctx: &BudgetContext<'_>) -> Reconciled {
    let mut warnings = Vec::new();
    let mut substitutions = Vec::new();
    let DeckSlate {
        mut non_lands,
        mut lands,
    } = slate;

    if let Some(cap) = policy.per_card_cap {
        non_lands = enforce_card_cap(non_lands, cap, policy, ctx, &mut warnings, &mut substitutions);
        for index in 0..lands.len() {
            let price = ctx.prices.price_of(&lands[index]);
            if lands[index].is_basic_land() || price <= cap + PRICE_EPSILON {
                continue;
            }
            let basic = Card::basic_land(neediest_basic(ctx.identity, &ctx.demand, &lands));
            let removed = replace_land(&mut lands[index], basic, price, ctx, &mut substitutions);
            debug!(
                target: "deckgen::budget",
                "budget.land_swap removed={:?} added={:?} price={:.2}",
                removed,
                lands[index].name,
                price
            );
        }
    }

    let mut total = ctx.prices.total(non_lands.iter().map(|c| &c.card).chain(lands.iter()));
    if let Some(cap) = policy.total_cap
        && total > cap + PRICE_EPSILON
    {
        let mut order: Vec<usize> = (0..lands.len())
            .filter(|i| !lands[*i].is_basic_land())
            .collect();
        order.sort_by(|a, b| {
            ctx.prices
                .price_of(&lands[*b])
                .total_cmp(&ctx.prices.price_of(&lands[*a]))
                .then_with(|| lands[*a].name.cmp(&lands[*b].name))
        });
        for index in order {
            if total <= cap + PRICE_EPSILON {
                break;
            }
            let price = ctx.prices.price_of(&lands[index]);
            let basic = Card::basic_land(neediest_basic(ctx.identity, &ctx.demand, &lands));
            replace_land(&mut lands[index], basic, price, ctx, &mut substitutions);
            total -= price;
        }

        total = ctx.prices.total(non_lands.iter().map(|c| &c.card).chain(lands.iter()));
        if total > cap + PRICE_EPSILON {
            warn!(
                target: "deckgen::budget",
                "budget.over total={:.2} cap={:.2}",
                total,
                cap
            );
            warnings.push(format!(
                "total price {total:.2} exceeds the budget of {cap:.2} after reconciliation"
            ));
        }
    }

    info!(
        target: "deckgen::budget",
        "budget.done total={:.2} substitutions={} warnings={}",
        total,
        substitutions.len(),
        warnings.len()
    );
    Reconciled {
        slate: DeckSlate::new(non_lands, lands),
        total_price: total,
        warnings,
        substitutions,
    }
}

/// Swaps `land` for `basic` in place and records it. Returns the old name.
fn replace_land(
    land: &mut Card,
    basic: Card,
    price: f64,
    ctx: &BudgetContext<'_>,
    substitutions: &mut Vec<Substitution>,
) -> String {
    let added_price = ctx.prices.price_of(&basic);
    let removed = std::mem::replace(land, basic);
    substitutions.push(Substitution {
        category: Category::Land,
        removed: removed.name.clone(),
        removed_price: price,
        added: Some(land.name.clone()),
        added_price,
    });
    removed.name
}

fn enforce_card_cap(
    non_lands: Vec<ScoredCard>,
    cap: f64,
    policy: &BudgetPolicy,
    ctx: &BudgetContext<'_>,
    warnings: &mut Vec<String>,
    substitutions: &mut Vec<Substitution>,
) -> Vec<ScoredCard> {
    let affordable: Vec<ScoredCard> = ctx
        .pool
        .iter()
        .filter(|c| !c.card.is_land() && ctx.prices.price_of(&c.card) <= cap + PRICE_EPSILON)
        .cloned()
        .collect();
    let mut by_category: BTreeMap<Category, Vec<ScoredCard>> = BTreeMap::new();
    for card in &affordable {
        by_category.entry(card.category()).or_default().push(card.clone());
    }
    for cards in by_category.values_mut() {
        ranking::rank(cards, ctx.curve);
    }

    let mut used: HashSet<String> = non_lands.iter().map(|c| c.name().to_string()).collect();
    let mut kept = Vec::with_capacity(non_lands.len());
    let mut dropped = 0usize;

    for card in non_lands {
        let price = ctx.prices.price_of(&card.card);
        if price <= cap + PRICE_EPSILON {
            kept.push(card);
            continue;
        }
        let category = card.category();
        let substitute = by_category
            .get(&category)
            .and_then(|cands| cands.iter().find(|c| !used.contains(c.name())))
            .cloned();

        match substitute {
            Some(substitute) => {
                let added_price = ctx.prices.price_of(&substitute.card);
                debug!(
                    target: "deckgen::budget",
                    "budget.swap removed={:?} added={:?} saved={:.2}",
                    card.name(),
                    substitute.name(),
                    price - added_price
                );
                used.insert(substitute.name().to_string());
                substitutions.push(Substitution {
                    category,
                    removed: card.name().to_string(),
                    removed_price: price,
                    added: Some(substitute.name().to_string()),
                    added_price,
                });
                kept.push(substitute);
            }
            None if card.total_score() > policy.keep_threshold => {
                warnings.push(format!(
                    "kept {} at {price:.2} over the per-card cap of {cap:.2}: no cheaper {category} available",
                    card.name()
                ));
                kept.push(card);
            }
            None => {
                dropped += 1;
                substitutions.push(Substitution {
                    category,
                    removed: card.name().to_string(),
                    removed_price: price,
                    added: None,
                    added_price: 0.0,
                });
            }
        }
    }

    if dropped == 0 {
        return kept;
    }
    let filled = normalize(&kept, &affordable, ctx.plan, ctx.non_land_target, ctx.curve);
    debug!(
        target: "deckgen::budget",
        "budget.backfill dropped={} refilled={}",
        dropped,
        filled.cards.len() - kept.len()
    );
    warnings.extend(filled.warnings);
    filled.cards
}
