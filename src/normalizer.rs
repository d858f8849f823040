//! Trim-or-fill to an exact non-land count.
//!
//! The one exact-count corrector in the engine. It is used for the
//! initial slot budget, again once the land count is known, and for
//! budget backfill. Running it on a slate that already has the target size
//! returns that slate unchanged, so applying it twice equals applying it
//! once.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet, VecDeque};

use log::{debug, info, warn};

use crate::card::ScoredCard;
use crate::quota::{CategoryCounts, QuotaPlan};
use crate::ranking::{self, CurveProfile};
use crate::types::Category;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub cards: Vec<ScoredCard>,
    pub warnings: Vec<String>,
}

/// Counts cards per category.
pub fn category_counts(cards: &[ScoredCard]) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    for card in cards {
        *counts.entry(card.category()).or_default() += 1;
    }
    counts
}

/// Brings `slate` to exactly `target` cards when possible.
///
/// Over target, each category keeps `floor(share * budget)` of its current
/// cards, the remainder going one each to the largest categories; the
/// protected category is kept whole. Under target, unused `pool`
/// candidates are added, categories furthest below their quota target
/// first, then best-ranked overall. Excluded categories are never added.
/// Running out of candidates returns a short slate with a warning.
pub fn normalize(
    slate: &[ScoredCard],
    pool: &[ScoredCard],
    plan: &QuotaPlan,
    target: usize,
    curve: &CurveProfile,
) -> Normalized {
    let normalized = match slate.len().cmp(&target) {
        Ordering::Equal => Normalized {
            cards: slate.to_vec(),
            warnings: Vec::new(),
        },
        Ordering::Greater => trim(slate, plan.protected(), target, curve),
        Ordering::Less => fill(slate, pool, plan, target, curve),
    };
    info!(
        target: "deckgen::normalize",
        "normalize.done before={} target={} after={}",
        slate.len(),
        target,
        normalized.cards.len()
    );
    normalized
}

fn trim(
    slate: &[ScoredCard],
    protected: Option<Category>,
    target: usize,
    curve: &CurveProfile,
) -> Normalized {
    let mut groups: BTreeMap<Category, Vec<ScoredCard>> = BTreeMap::new();
    for card in slate {
        groups.entry(card.category()).or_default().push(card.clone());
    }

    let protected_size = protected
        .and_then(|p| groups.get(&p))
        .map_or(0, Vec::len);
    let mut keep: BTreeMap<Category, usize> = BTreeMap::new();

    if protected_size >= target {
        // The protected category alone fills the deck.
        if let Some(p) = protected {
            keep.insert(p, target);
        }
    } else {
        if let Some(p) = protected.filter(|_| protected_size > 0) {
            keep.insert(p, protected_size);
        }
        let budget = target - protected_size;
        let unprotected: Vec<(Category, usize)> = groups
            .iter()
            .filter(|(c, _)| Some(**c) != protected)
            .map(|(c, cards)| (*c, cards.len()))
            .collect();
        let total: usize = unprotected.iter().map(|(_, n)| n).sum();

        let mut kept = 0;
        for (category, size) in &unprotected {
            let share = size * budget / total;
            keep.insert(*category, share);
            kept += share;
        }

        // Rounding remainder: one each to the largest categories.
        let mut by_size = unprotected.clone();
        by_size.sort_by(|a, b| b.1.cmp(&a.1));
        for (category, size) in by_size.iter().cycle().take(by_size.len() * 2) {
            if kept >= budget {
                break;
            }
            let slot = keep.entry(*category).or_default();
            if *slot < *size {
                *slot += 1;
                kept += 1;
            }
        }
    }

    let mut cards = Vec::with_capacity(target);
    for (category, mut group) in groups {
        let count = keep.get(&category).copied().unwrap_or(0);
        ranking::rank(&mut group, curve);
        debug!(
            target: "deckgen::normalize",
            "normalize.trim category={} had={} keep={}",
            category,
            group.len(),
            count
        );
        group.truncate(count);
        cards.extend(group);
    }

    Normalized {
        cards,
        warnings: Vec::new(),
    }
}

fn fill(
    slate: &[ScoredCard],
    pool: &[ScoredCard],
    plan: &QuotaPlan,
    target: usize,
    curve: &CurveProfile,
) -> Normalized {
    let mut used: HashSet<&str> = slate.iter().map(|c| c.name()).collect();
    let mut queues: BTreeMap<Category, Vec<ScoredCard>> = BTreeMap::new();
    for card in pool {
        let category = card.category();
        if card.card.is_land() || plan.is_excluded(category) || !used.insert(card.name()) {
            continue;
        }
        queues.entry(category).or_default().push(card.clone());
    }
    let mut queues: BTreeMap<Category, VecDeque<ScoredCard>> = queues
        .into_iter()
        .map(|(category, mut cards)| {
            ranking::rank(&mut cards, curve);
            (category, VecDeque::from(cards))
        })
        .collect();

    let mut counts = category_counts(slate);
    let mut cards = slate.to_vec();
    let protected = plan.protected();

    while cards.len() < target {
        let Some(category) = next_fill_category(&queues, &counts, plan, protected, curve) else {
            break;
        };
        let Some(card) = queues.get_mut(&category).and_then(VecDeque::pop_front) else {
            break;
        };
        debug!(
            target: "deckgen::normalize",
            "normalize.fill category={} card={:?} score={:.3}",
            category,
            card.name(),
            card.total_score()
        );
        *counts.entry(category).or_default() += 1;
        cards.push(card);
    }

    let mut warnings = Vec::new();
    if cards.len() < target {
        let message = format!(
            "unable to reach target size: {} of {} non-land cards after exhausting candidates",
            cards.len(),
            target
        );
        warn!(target: "deckgen::normalize", "normalize.short have={} target={}", cards.len(), target);
        warnings.push(message);
    }
    Normalized { cards, warnings }
}

/// Largest quota deficit first; then the best head among categories below
/// their max; then the best head anywhere except the protected category.
fn next_fill_category(
    queues: &BTreeMap<Category, VecDeque<ScoredCard>>,
    counts: &CategoryCounts,
    plan: &QuotaPlan,
    protected: Option<Category>,
    curve: &CurveProfile,
) -> Option<Category> {
    let count = |c: Category| counts.get(&c).copied().unwrap_or(0);
    let available: Vec<Category> = Category::WEIGHTED
        .into_iter()
        .filter(|c| queues.get(c).is_some_and(|q| !q.is_empty()))
        .collect();

    let mut best_deficit: Option<(Category, usize)> = None;
    for category in &available {
        let deficit = plan.target(*category).saturating_sub(count(*category));
        if deficit > 0 && best_deficit.is_none_or(|(_, best)| deficit > best) {
            best_deficit = Some((*category, deficit));
        }
    }
    if let Some((category, _)) = best_deficit {
        return Some(category);
    }

    let best_head = |eligible: &dyn Fn(Category) -> bool| {
        available
            .iter()
            .copied()
            .filter(|c| eligible(*c))
            .filter_map(|c| queues.get(&c).and_then(|q| q.front()).map(|head| (c, head)))
            .min_by(|a, b| ranking::compare(a.1, b.1, curve))
            .map(|(c, _)| c)
    };
    best_head(&|c| Some(c) != protected && count(c) < plan.quota(c).max)
        .or_else(|| best_head(&|c| Some(c) != protected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::CardBuilder;
    use crate::quota::{CategoryWeights, QuotaOptions, allocate};

    fn scored(name: &str, type_line: &str, synergy: f64) -> ScoredCard {
        let card = CardBuilder::new(name, name)
            .type_line(type_line)
            .mana_value(3)
            .build()
            .unwrap();
        ScoredCard::new(card, synergy)
    }

    fn batch(prefix: &str, type_line: &str, n: usize, base: f64) -> Vec<ScoredCard> {
        (0..n)
            .map(|i| scored(&format!("{prefix} {i:02}"), type_line, base + i as f64))
            .collect()
    }

    fn plan(weights: [u8; 6], budget: usize, absolute: Option<Category>) -> QuotaPlan {
        allocate(
            &CategoryWeights::new(weights).unwrap(),
            budget,
            &QuotaOptions {
                absolute,
                availability: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_exact_size_is_noop() {
        let slate = batch("creature", "Creature — Elf", 10, 0.0);
        let plan = plan([10, 0, 0, 0, 0, 0], 10, None);
        let out = normalize(&slate, &[], &plan, 10, &CurveProfile::default());
        assert_eq!(out.cards, slate);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_trim_is_proportional_to_current_sizes() {
        let mut slate = batch("creature", "Creature — Elf", 40, 0.0);
        slate.extend(batch("instant", "Instant", 20, 0.0));
        slate.extend(batch("artifact", "Artifact", 10, 0.0));
        let plan = plan([5, 5, 0, 5, 0, 0], 70, None);

        let out = normalize(&slate, &[], &plan, 63, &CurveProfile::default());
        assert_eq!(out.cards.len(), 63);
        let counts = category_counts(&out.cards);
        // floor(40*63/70)=36, floor(20*63/70)=18, floor(10*63/70)=9 -> 63
        assert_eq!(counts[&Category::Creature], 36);
        assert_eq!(counts[&Category::Instant], 18);
        assert_eq!(counts[&Category::Artifact], 9);
        // Lowest scorers dropped.
        assert!(!out.cards.iter().any(|c| c.name() == "creature 00"));
        assert!(out.cards.iter().any(|c| c.name() == "creature 39"));
    }

    #[test]
    fn test_trim_remainder_goes_to_largest_categories() {
        let mut slate = batch("creature", "Creature — Elf", 31, 0.0);
        slate.extend(batch("sorcery", "Sorcery", 30, 0.0));
        slate.extend(batch("artifact", "Artifact", 5, 0.0));
        let plan = plan([5, 5, 0, 0, 5, 0], 66, None);

        let out = normalize(&slate, &[], &plan, 60, &CurveProfile::default());
        let counts = category_counts(&out.cards);
        // floors: 28, 27, 4 = 59; remainder 1 -> creatures
        assert_eq!(counts[&Category::Creature], 29);
        assert_eq!(counts[&Category::Sorcery], 27);
        assert_eq!(counts[&Category::Artifact], 4);
    }

    #[test]
    fn test_trim_never_touches_protected_category() {
        let mut slate = batch("creature", "Creature — Elf", 60, 0.0);
        slate.extend(batch("walker", "Legendary Planeswalker — Nissa", 5, 0.0));
        let plan = plan([10, 0, 0, 0, 0, 5], 65, Some(Category::Planeswalker));

        let out = normalize(&slate, &[], &plan, 61, &CurveProfile::default());
        let counts = category_counts(&out.cards);
        assert_eq!(counts[&Category::Planeswalker], 5);
        assert_eq!(counts[&Category::Creature], 56);
    }

    #[test]
    fn test_fill_prefers_quota_deficits_then_score() {
        let slate = batch("creature", "Creature — Elf", 10, 0.0);
        let mut pool = batch("creature", "Creature — Elf", 30, 0.0);
        pool.extend(batch("instant", "Instant", 10, 100.0));
        pool.extend(batch("enchantment", "Enchantment", 10, 500.0));
        let plan = plan([5, 0, 0, 5, 0, 0], 20, None);

        let out = normalize(&slate, &pool, &plan, 20, &CurveProfile::default());
        assert_eq!(out.cards.len(), 20);
        let counts = category_counts(&out.cards);
        assert_eq!(counts[&Category::Creature], 10);
        assert_eq!(counts[&Category::Instant], 10);
        // Enchantments have weight 0: never added, however high they score.
        assert!(!counts.contains_key(&Category::Enchantment));
    }

    #[test]
    fn test_fill_exhaustion_warns_and_returns_short() {
        let pool = batch("creature", "Creature — Elf", 40, 0.0);
        let plan = plan([10, 0, 0, 0, 0, 0], 65, None);

        let out = normalize(&[], &pool, &plan, 65, &CurveProfile::default());
        assert_eq!(out.cards.len(), 40);
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].starts_with("unable to reach target size"));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut slate = batch("creature", "Creature — Elf", 50, 0.0);
        slate.extend(batch("artifact", "Artifact", 25, 0.0));
        let mut pool = slate.clone();
        pool.extend(batch("instant", "Instant", 30, 0.0));
        let plan = plan([6, 3, 0, 2, 0, 0], 64, None);
        let curve = CurveProfile::default();

        for target in [40, 64, 75, 90, 200] {
            let once = normalize(&slate, &pool, &plan, target, &curve);
            let twice = normalize(&once.cards, &pool, &plan, target, &curve);
            assert_eq!(once.cards, twice.cards, "target {target}");
        }
    }
}
