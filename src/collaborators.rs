//! Interfaces to the card database and the synergy scorer, plus the
//! in-memory implementations used by the CLI and the test suites.

use std::collections::HashMap;

use crate::card::{Card, Commander, Role};
use crate::color::ColorSet;
use crate::pricing::{PriceLookupError, PriceQuote, PriceSource};

/// Card data source. Shared by the price fetch workers, hence `Sync`.
pub trait CardRepository: Sync {
    /// Resolves a commander by name (case-insensitive) or id.
    fn find_commander(&self, ident: &str) -> Option<Card>;

    /// Cards whose color identity fits within `identity`. Legality and set
    /// exclusions are applied by the filter stage, not here.
    fn legal_candidates(&self, identity: ColorSet) -> Vec<Card>;

    fn price_of(&self, card: &Card) -> Result<PriceQuote, PriceLookupError>;
}

/// Scorer verdict for one card under one commander.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    pub value: f64,
    pub roles: Vec<Role>,
    pub tag_bonus: f64,
}

impl Score {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_tag_bonus(mut self, bonus: f64) -> Self {
        self.tag_bonus = bonus;
        self
    }
}

pub trait SynergyScorer: Sync {
    fn score(&self, card: &Card, commander: &Commander, themes: &[String]) -> Score;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    cards: Vec<Card>,
}

impl InMemoryRepository {
    pub fn new(cards: Vec<Card>) -> Self {
        Self { cards }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardRepository for InMemoryRepository {
    fn find_commander(&self, ident: &str) -> Option<Card> {
        let ident = ident.trim();
        self.cards
            .iter()
            .find(|c| c.id.as_str() == ident)
            .or_else(|| self.cards.iter().find(|c| c.name.eq_ignore_ascii_case(ident)))
            .cloned()
    }

    fn legal_candidates(&self, identity: ColorSet) -> Vec<Card> {
        self.cards
            .iter()
            .filter(|c| identity.contains_all(c.color_identity))
            .cloned()
            .collect()
    }

    fn price_of(&self, card: &Card) -> Result<PriceQuote, PriceLookupError> {
        card.price_estimate
            .map(|amount| PriceQuote {
                amount,
                source: PriceSource::Repository,
            })
            .ok_or_else(|| PriceLookupError::Unavailable(card.name.clone()))
    }
}

/// Precomputed scores keyed by card name.
///
/// Cards missing from the table get `default_score`. Each theme keyword
/// found in a card's rules text or type line (case-insensitive) adds
/// `theme_bonus` to its tag bonus, once per card.
#[derive(Debug, Clone)]
pub struct TableScorer {
    scores: HashMap<String, Score>,
    default_score: f64,
    theme_bonus: f64,
}

impl Default for TableScorer {
    fn default() -> Self {
        Self {
            scores: HashMap::new(),
            default_score: 0.0,
            theme_bonus: 1.0,
        }
    }
}

impl TableScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_score(mut self, score: f64) -> Self {
        self.default_score = score;
        self
    }

    pub fn with_theme_bonus(mut self, bonus: f64) -> Self {
        self.theme_bonus = bonus;
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, score: Score) {
        self.scores.insert(name.into(), score);
    }

    fn matches_theme(card: &Card, themes: &[String]) -> bool {
        let text = card.oracle_text.to_lowercase();
        let type_line = card.type_line.to_lowercase();
        themes
            .iter()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .any(|t| text.contains(&t) || type_line.contains(&t))
    }
}

impl SynergyScorer for TableScorer {
    fn score(&self, card: &Card, _commander: &Commander, themes: &[String]) -> Score {
        let mut score = self
            .scores
            .get(&card.name)
            .cloned()
            .unwrap_or_else(|| Score::new(self.default_score));
        if Self::matches_theme(card, themes) {
            score.tag_bonus += self.theme_bonus;
        }
        score
    }
}
