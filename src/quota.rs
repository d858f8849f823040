//! Converts 0-10 category weights into per-category card quotas.
//!
//! Targets always sum to the requested slot budget exactly. Independent
//! rounding is corrected one card at a time: under budget, the largest
//! proportional target grows; over budget, the smallest one above 1
//! shrinks.

use std::collections::BTreeMap;

use log::{debug, info};

use crate::error::{EngineError, Result};
use crate::types::Category;

/// Per-category card counts, keyed in canonical category order.
pub type CategoryCounts = BTreeMap<Category, usize>;

/// User weights for the six weighted categories. 0 excludes a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryWeights {
    weights: [u8; 6],
}

impl CategoryWeights {
    pub const MAX_WEIGHT: u8 = 10;

    /// Weights in `Category::WEIGHTED` order.
    pub fn new(weights: [u8; 6]) -> Result<Self> {
        for (category, value) in Category::WEIGHTED.iter().zip(weights) {
            check_weight(*category, value)?;
        }
        Ok(Self { weights })
    }

    pub fn uniform(weight: u8) -> Result<Self> {
        Self::new([weight; 6])
    }

    /// Weight for a category; Land and Other are never weighted.
    pub fn get(&self, category: Category) -> u8 {
        category
            .weighted_index()
            .map_or(0, |index| self.weights[index])
    }

    pub fn set(&mut self, category: Category, weight: u8) -> Result<()> {
        check_weight(category, weight)?;
        let Some(index) = category.weighted_index() else {
            return Err(EngineError::Config(format!(
                "{category} cannot be weighted"
            )));
        };
        self.weights[index] = weight;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, u8)> + '_ {
        Category::WEIGHTED.into_iter().zip(self.weights)
    }
}

fn check_weight(category: Category, value: u8) -> Result<()> {
    if value > CategoryWeights::MAX_WEIGHT {
        return Err(EngineError::InvalidWeight {
            category: category.to_string(),
            value,
        });
    }
    Ok(())
}

/// Card count bounds for one category. `min <= target <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Quota {
    pub min: usize,
    pub max: usize,
    pub target: usize,
}

impl Quota {
    fn proportional(target: usize) -> Self {
        Self {
            min: target.saturating_sub(2),
            max: target + 3,
            target,
        }
    }

    fn exact(target: usize) -> Self {
        Self {
            min: target,
            max: target,
            target,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuotaOptions {
    /// Category counted in absolute cards rather than proportionally.
    /// Its weight is the requested card count and it is protected from
    /// trimming later on.
    pub absolute: Option<Category>,
    /// Candidate counts per category; clamps the absolute category.
    pub availability: Option<CategoryCounts>,
}

/// Allocation result consumed by the selector and normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuotaPlan {
    quotas: BTreeMap<Category, Quota>,
    weights: CategoryWeights,
    slot_budget: usize,
    protected: Option<Category>,
    warnings: Vec<String>,
}

impl QuotaPlan {
    pub fn quota(&self, category: Category) -> Quota {
        self.quotas.get(&category).copied().unwrap_or_default()
    }

    pub fn target(&self, category: Category) -> usize {
        self.quota(category).target
    }

    pub fn total_target(&self) -> usize {
        self.quotas.values().map(|q| q.target).sum()
    }

    pub fn weight(&self, category: Category) -> u8 {
        self.weights.get(category)
    }

    /// Weight 0, or a category that is never weighted (lands, other).
    pub fn is_excluded(&self, category: Category) -> bool {
        self.weight(category) == 0
    }

    /// The absolute category, which trimming never touches.
    pub fn protected(&self) -> Option<Category> {
        self.protected
    }

    pub fn slot_budget(&self) -> usize {
        self.slot_budget
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, Quota)> + '_ {
        self.quotas.iter().map(|(c, q)| (*c, *q))
    }
}

/// Allocates `slot_budget` non-land slots across the weighted categories.
pub fn allocate(
    weights: &CategoryWeights,
    slot_budget: usize,
    options: &QuotaOptions,
) -> Result<QuotaPlan> {
    let mut warnings = Vec::new();
    let absolute = options.absolute.filter(|c| c.weighted_index().is_some());

    let absolute_target = match absolute {
        Some(category) => {
            let requested = weights.get(category) as usize;
            let available = options
                .availability
                .as_ref()
                .map_or(requested, |counts| {
                    counts.get(&category).copied().unwrap_or(0)
                });
            let target = requested.min(available).min(slot_budget);
            if target < requested {
                warnings.push(format!(
                    "{category}: requested {requested}, only {target} could be allotted"
                ));
            }
            target
        }
        None => 0,
    };

    let proportional: Vec<Category> = Category::WEIGHTED
        .into_iter()
        .filter(|c| Some(*c) != absolute && weights.get(*c) > 0)
        .collect();
    let remaining = slot_budget - absolute_target;

    if proportional.is_empty() && remaining > 0 {
        return Err(EngineError::NoWeightedCategories {
            budget: slot_budget,
        });
    }

    let total_weight: u32 = proportional.iter().map(|c| weights.get(*c) as u32).sum();
    let mut targets: BTreeMap<Category, usize> = proportional
        .iter()
        .map(|c| {
            let share = weights.get(*c) as f64 / total_weight as f64;
            // Every weighted category keeps at least one slot.
            (*c, ((share * remaining as f64).round() as usize).max(1))
        })
        .collect();

    let mut sum: usize = targets.values().sum();
    while sum < remaining {
        let Some(largest) = pick(&proportional, &targets, |t, best| t > best, |_| true) else {
            break;
        };
        *targets.entry(largest).or_default() += 1;
        sum += 1;
    }
    while sum > remaining {
        let shrinkable = pick(&proportional, &targets, |t, best| t < best, |t| t >= 2)
            .or_else(|| pick(&proportional, &targets, |t, best| t < best, |t| t >= 1));
        let Some(category) = shrinkable else {
            break;
        };
        let target = targets.entry(category).or_default();
        *target -= 1;
        if *target == 0 {
            warnings.push(format!(
                "{category}: budget of {slot_budget} slots is too small to include it"
            ));
        }
        sum -= 1;
    }

    let mut quotas = BTreeMap::new();
    for category in Category::WEIGHTED {
        let quota = if Some(category) == absolute {
            Quota::exact(absolute_target)
        } else if let Some(target) = targets.get(&category) {
            Quota::proportional(*target)
        } else {
            Quota::default()
        };
        quotas.insert(category, quota);
    }

    let plan = QuotaPlan {
        quotas,
        weights: *weights,
        slot_budget,
        protected: absolute,
        warnings,
    };
    debug_assert_eq!(plan.total_target(), slot_budget);

    debug!(
        target: "deckgen::quota",
        "quota.raw total_weight={} remaining={} absolute_target={}",
        total_weight,
        remaining,
        absolute_target
    );
    info!(
        target: "deckgen::quota",
        "quota.allocated budget={} targets={}",
        slot_budget,
        plan.iter()
            .map(|(c, q)| format!("{c}:{}", q.target))
            .collect::<Vec<_>>()
            .join(",")
    );
    Ok(plan)
}

/// First category (canonical order) whose target is strictly preferred by
/// `better` over every earlier candidate, among those passing `eligible`.
fn pick(
    categories: &[Category],
    targets: &BTreeMap<Category, usize>,
    better: impl Fn(usize, usize) -> bool,
    eligible: impl Fn(usize) -> bool,
) -> Option<Category> {
    let mut best: Option<(Category, usize)> = None;
    for category in categories {
        let target = targets.get(category).copied().unwrap_or(0);
        if !eligible(target) {
            continue;
        }
        if best.is_none_or(|(_, best_target)| better(target, best_target)) {
            best = Some((*category, target));
        }
    }
    best.map(|(category, _)| category)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weights(values: [u8; 6]) -> CategoryWeights {
        CategoryWeights::new(values).unwrap()
    }

    #[test]
    fn test_single_category_takes_everything() {
        let plan = allocate(&weights([10, 0, 0, 0, 0, 0]), 60, &QuotaOptions::default()).unwrap();
        assert_eq!(plan.target(Category::Creature), 60);
        for category in &Category::WEIGHTED[1..] {
            assert_eq!(plan.quota(*category), Quota::default());
            assert!(plan.is_excluded(*category));
        }
    }

    #[test]
    fn test_uniform_weights_reconcile_to_budget() {
        let plan = allocate(&CategoryWeights::uniform(5).unwrap(), 65, &QuotaOptions::default())
            .unwrap();
        assert_eq!(plan.total_target(), 65);
        let targets: Vec<usize> = plan.iter().map(|(_, q)| q.target).collect();
        let max = *targets.iter().max().unwrap();
        let min = *targets.iter().min().unwrap();
        assert!(max - min <= 1, "{targets:?}");
    }

    #[test]
    fn test_quota_sum_invariant_across_inputs() {
        let samples = [0u8, 1, 3, 5, 7, 10];
        for budget in [1usize, 6, 23, 60, 61, 65, 67] {
            for a in samples {
                for b in samples {
                    for c in samples {
                        let w = weights([a, b, c, 10 - a.min(10), 2, 0]);
                        let plan = allocate(&w, budget, &QuotaOptions::default()).unwrap();
                        assert_eq!(plan.total_target(), budget, "{w:?} budget {budget}");
                        for (category, quota) in plan.iter() {
                            assert!(quota.min <= quota.target && quota.target <= quota.max);
                            if w.get(category) == 0 {
                                assert_eq!(quota.target, 0);
                            } else if budget >= 6 {
                                assert!(quota.target > 0, "{category} starved at {budget}");
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_slack_bounds() {
        let plan = allocate(&weights([10, 5, 0, 0, 0, 0]), 60, &QuotaOptions::default()).unwrap();
        let creatures = plan.quota(Category::Creature);
        assert_eq!(creatures.target, 40);
        assert_eq!(creatures.min, 38);
        assert_eq!(creatures.max, 43);
        let artifacts = plan.quota(Category::Artifact);
        assert_eq!(artifacts.target, 20);
    }

    #[test]
    fn test_absolute_category_is_exact_and_clamped() {
        let mut availability = CategoryCounts::new();
        availability.insert(Category::Planeswalker, 3);
        let options = QuotaOptions {
            absolute: Some(Category::Planeswalker),
            availability: Some(availability),
        };
        let plan = allocate(&weights([5, 5, 5, 5, 5, 6]), 62, &options).unwrap();
        let walkers = plan.quota(Category::Planeswalker);
        assert_eq!(walkers, Quota { min: 3, max: 3, target: 3 });
        assert_eq!(plan.total_target(), 62);
        assert_eq!(plan.protected(), Some(Category::Planeswalker));
        assert_eq!(plan.warnings().len(), 1);
    }

    #[test]
    fn test_absolute_category_with_no_candidates_is_zeroed_with_warning() {
        let mut availability = CategoryCounts::new();
        availability.insert(Category::Creature, 80);
        let options = QuotaOptions {
            absolute: Some(Category::Planeswalker),
            availability: Some(availability),
        };
        let plan = allocate(&weights([10, 0, 0, 0, 0, 4]), 60, &options).unwrap();
        assert_eq!(plan.quota(Category::Planeswalker), Quota::exact(0));
        assert!(!plan.is_excluded(Category::Planeswalker));
        assert_eq!(plan.target(Category::Creature), 60);
        assert_eq!(plan.total_target(), 60);
        assert_eq!(
            plan.warnings().to_vec(),
            vec!["planeswalkers: requested 4, only 0 could be allotted".to_string()]
        );
    }

    #[test]
    fn test_absolute_category_excluded_from_denominator() {
        let options = QuotaOptions {
            absolute: Some(Category::Planeswalker),
            availability: None,
        };
        let plan = allocate(&weights([10, 0, 0, 0, 0, 4]), 64, &options).unwrap();
        assert_eq!(plan.target(Category::Planeswalker), 4);
        assert_eq!(plan.target(Category::Creature), 60);
    }

    #[test]
    fn test_all_zero_weights_is_an_error() {
        let err = allocate(&CategoryWeights::default(), 60, &QuotaOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::NoWeightedCategories { budget: 60 }));
    }

    #[test]
    fn test_invalid_weight_rejected() {
        assert!(matches!(
            CategoryWeights::new([11, 0, 0, 0, 0, 0]),
            Err(EngineError::InvalidWeight { value: 11, .. })
        ));
        let mut w = CategoryWeights::default();
        assert!(w.set(Category::Land, 3).is_err());
        assert!(w.set(Category::Sorcery, 3).is_ok());
        assert_eq!(w.get(Category::Sorcery), 3);
    }
}
