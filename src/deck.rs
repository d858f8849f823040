//! Working and finished deck structures.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::card::{Card, Commander, ScoredCard};
use crate::pricing::PriceSource;
use crate::quota::CategoryCounts;

/// The selection owned by the orchestrator during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeckSlate {
    pub non_lands: Vec<ScoredCard>,
    pub lands: Vec<Card>,
}

impl DeckSlate {
    pub fn new(non_lands: Vec<ScoredCard>, lands: Vec<Card>) -> Self {
        Self { non_lands, lands }
    }

    pub fn len(&self) -> usize {
        self.non_lands.len() + self.lands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.non_lands.iter().map(|c| &c.card).chain(self.lands.iter())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cards().map(|c| c.name.as_str())
    }

    /// Counts over every card, lands included under `Category::Land`.
    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts::new();
        for card in self.cards() {
            *counts.entry(card.category).or_default() += 1;
        }
        counts
    }

    /// Non-basic names that appear more than once, sorted.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for card in self.cards().filter(|c| !c.is_basic_land()) {
            *seen.entry(card.name.as_str()).or_default() += 1;
        }
        let duplicates: BTreeSet<&str> = seen
            .into_iter()
            .filter(|(_, n)| *n > 1)
            .map(|(name, _)| name)
            .collect();
        duplicates.into_iter().map(String::from).collect()
    }
}

/// Result of one generation request. Read-only once returned.
#[derive(Debug, Clone)]
pub struct GeneratedDeck {
    commander: Commander,
    slate: DeckSlate,
    total_price: f64,
    warnings: Vec<String>,
    notes: Vec<String>,
    price_sources: BTreeMap<PriceSource, usize>,
}

impl GeneratedDeck {
    pub(crate) fn new(
        commander: Commander,
        slate: DeckSlate,
        total_price: f64,
        warnings: Vec<String>,
        notes: Vec<String>,
        price_sources: BTreeMap<PriceSource, usize>,
    ) -> Self {
        Self {
            commander,
            slate,
            total_price,
            warnings,
            notes,
            price_sources,
        }
    }

    pub fn commander(&self) -> &Commander {
        &self.commander
    }

    pub fn non_lands(&self) -> &[ScoredCard] {
        &self.slate.non_lands
    }

    pub fn lands(&self) -> &[Card] {
        &self.slate.lands
    }

    pub fn slate(&self) -> &DeckSlate {
        &self.slate
    }

    /// Cards besides the commander; 99 unless a warning says otherwise.
    pub fn card_count(&self) -> usize {
        self.slate.len()
    }

    pub fn total_price(&self) -> f64 {
        self.total_price
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn price_sources(&self) -> &BTreeMap<PriceSource, usize> {
        &self.price_sources
    }
}
