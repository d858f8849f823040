//! JSON records for card data, requests, configuration and the finished
//! deck report.

use std::collections::BTreeMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::{Card, CardBuilder, Legality, Role};
use crate::collaborators::{InMemoryRepository, Score, TableScorer};
use crate::color::ColorSet;
use crate::config::EngineConfig;
use crate::deck::GeneratedDeck;
use crate::error::{EngineError, Result};
use crate::mana::ManaCost;
use crate::pipeline::GenerationRequest;
use crate::quota::CategoryWeights;
use crate::ranking::Archetype;
use crate::types::Category;

/// Prices arrive either as numbers or as decimal strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn amount(&self) -> Option<f64> {
        match self {
            PriceValue::Number(n) => Some(*n),
            PriceValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Prices {
    usd: Option<PriceValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct Legalities {
    commander: Option<String>,
}

/// One card as found in common card-database dumps, plus optional
/// precomputed synergy data.
#[derive(Debug, Clone, Deserialize)]
pub struct CardRecord {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub mana_cost: Option<String>,
    #[serde(default)]
    pub cmc: Option<f64>,
    pub type_line: String,
    #[serde(default)]
    pub color_identity: Vec<String>,
    #[serde(default)]
    pub oracle_text: String,
    #[serde(default)]
    legalities: Legalities,
    #[serde(default)]
    pub set: Option<String>,
    #[serde(default)]
    pub edhrec_rank: Option<u32>,
    #[serde(default)]
    prices: Prices,
    #[serde(default)]
    pub synergy: Option<f64>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub tag_bonus: Option<f64>,
}

impl CardRecord {
    pub fn to_card(&self) -> Result<Card> {
        let invalid = |what: String| EngineError::Config(format!("card '{}': {what}", self.name));

        let mut builder = CardBuilder::new(self.id.clone().unwrap_or_else(|| self.name.clone()), &self.name)
            .type_line(&self.type_line)
            .oracle_text(&self.oracle_text)
            .color_identity(ColorSet::from_letters(&self.color_identity.concat()));
        if let Some(cost) = self.mana_cost.as_deref().filter(|c| !c.trim().is_empty()) {
            builder = builder.mana_cost(ManaCost::parse(cost).map_err(|e| invalid(e.to_string()))?);
        }
        if let Some(cmc) = self.cmc {
            builder = builder.mana_value(cmc.max(0.0).round() as u32);
        }
        if let Some(price) = self.prices.usd.as_ref().and_then(PriceValue::amount) {
            builder = builder.price(price);
        }
        if let Some(legality) = &self.legalities.commander {
            builder = builder.legality(legality.parse::<Legality>().map_err(invalid)?);
        }
        if let Some(set) = &self.set {
            builder = builder.set_code(set);
        }
        if let Some(rank) = self.edhrec_rank {
            builder = builder.popularity_rank(rank);
        }
        builder.build().map_err(|e| invalid(e.to_string()))
    }

    /// The precomputed score, if the record carries one.
    pub fn score(&self) -> Result<Option<Score>> {
        if self.synergy.is_none() && self.roles.is_empty() && self.tag_bonus.is_none() {
            return Ok(None);
        }
        let roles = self
            .roles
            .iter()
            .map(|r| r.parse::<Role>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| EngineError::Config(format!("card '{}': {e}", self.name)))?;
        Ok(Some(
            Score::new(self.synergy.unwrap_or(0.0))
                .with_roles(roles)
                .with_tag_bonus(self.tag_bonus.unwrap_or(0.0)),
        ))
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let file = fs::File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn load_card_records(path: &Path) -> Result<Vec<CardRecord>> {
    read_json(path)
}

/// Builds the in-memory repository and score table from card records.
pub fn build_catalog(records: &[CardRecord]) -> Result<(InMemoryRepository, TableScorer)> {
    let mut cards = Vec::with_capacity(records.len());
    let mut scorer = TableScorer::new();
    for record in records {
        cards.push(record.to_card()?);
        if let Some(score) = record.score()? {
            scorer.insert(record.name.clone(), score);
        }
    }
    Ok((InMemoryRepository::new(cards), scorer))
}

/// A generation request. Unlisted categories default to weight 5.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RequestRecord {
    pub commander: String,
    pub weights: BTreeMap<String, u8>,
    pub power_level: u8,
    pub per_card_cap: Option<f64>,
    pub total_cap: Option<f64>,
    pub themes: Vec<String>,
    pub absolute_category: Option<String>,
    pub archetype: Option<String>,
}

impl Default for RequestRecord {
    fn default() -> Self {
        Self {
            commander: String::new(),
            weights: BTreeMap::new(),
            power_level: 5,
            per_card_cap: None,
            total_cap: None,
            themes: Vec::new(),
            absolute_category: None,
            archetype: None,
        }
    }
}

impl RequestRecord {
    pub const DEFAULT_WEIGHT: u8 = 5;

    pub fn to_request(&self) -> Result<GenerationRequest> {
        if self.commander.trim().is_empty() {
            return Err(EngineError::Config("request needs a commander".into()));
        }
        let mut weights = CategoryWeights::uniform(Self::DEFAULT_WEIGHT)?;
        for (name, weight) in &self.weights {
            weights.set(parse_category(name)?, *weight)?;
        }
        let absolute_category = self.absolute_category.as_deref().map(parse_category).transpose()?;
        let archetype = self
            .archetype
            .as_deref()
            .map(|name| {
                Archetype::parse(name)
                    .ok_or_else(|| EngineError::Config(format!("unknown archetype '{name}'")))
            })
            .transpose()?;

        Ok(GenerationRequest {
            commander: self.commander.clone(),
            weights,
            power_level: self.power_level,
            per_card_cap: self.per_card_cap,
            total_cap: self.total_cap,
            themes: self.themes.clone(),
            absolute_category,
            archetype,
        })
    }
}

fn parse_category(name: &str) -> Result<Category> {
    name.parse::<Category>().map_err(EngineError::Config)
}

pub fn load_request(path: &Path) -> Result<GenerationRequest> {
    read_json::<RequestRecord>(path)?.to_request()
}

/// Engine settings file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigRecord {
    deck_size: Option<usize>,
    min_non_lands: Option<usize>,
    excluded_sets: Option<Vec<String>>,
    keep_threshold: Option<f64>,
    price_batch_size: Option<usize>,
    request_delay_ms: Option<u64>,
    base_backoff_ms: Option<u64>,
    max_retries: Option<u32>,
    nonbasic_slots: Option<[usize; 6]>,
}

impl ConfigRecord {
    fn apply(self, config: &mut EngineConfig) {
        if let Some(v) = self.deck_size {
            config.deck_size = v;
        }
        if let Some(v) = self.min_non_lands {
            config.filter.min_non_lands = v;
        }
        if let Some(v) = self.excluded_sets {
            config.filter.excluded_sets = v;
        }
        if let Some(v) = self.keep_threshold {
            config.keep_threshold = v;
        }
        if let Some(v) = self.price_batch_size {
            config.price_batch_size = v;
        }
        if let Some(v) = self.request_delay_ms {
            config.request_delay = Duration::from_millis(v);
        }
        if let Some(v) = self.base_backoff_ms {
            config.base_backoff = Duration::from_millis(v);
        }
        if let Some(v) = self.max_retries {
            config.max_retries = v;
        }
        if let Some(v) = self.nonbasic_slots {
            config.nonbasic_slots = v;
        }
    }
}

/// Parses a settings document over `EngineConfig::default()`.
pub fn parse_config(json: &str) -> Result<EngineConfig> {
    let record: ConfigRecord = serde_json::from_str(json)?;
    let mut config = EngineConfig::default();
    record.apply(&mut config);
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<EngineConfig> {
    parse_config(&fs::read_to_string(path)?)
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportCard {
    pub name: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mana_cost: Option<String>,
    pub mana_value: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
}

fn oracle_cost(card: &Card) -> Option<String> {
    card.mana_cost
        .as_ref()
        .filter(|cost| !cost.is_empty())
        .map(ManaCost::to_oracle)
}

/// JSON rendering of a `GeneratedDeck`.
#[derive(Debug, Clone, Serialize)]
pub struct DeckReport {
    pub commander: String,
    pub color_identity: String,
    pub card_count: usize,
    pub non_lands: Vec<ReportCard>,
    pub lands: Vec<ReportCard>,
    pub category_counts: BTreeMap<String, usize>,
    pub total_price: f64,
    pub price_sources: BTreeMap<String, usize>,
    pub warnings: Vec<String>,
    pub notes: Vec<String>,
}

impl DeckReport {
    pub fn from_deck(deck: &GeneratedDeck) -> Self {
        let non_lands = deck
            .non_lands()
            .iter()
            .map(|c| ReportCard {
                name: c.name().to_string(),
                category: c.category().to_string(),
                mana_cost: oracle_cost(&c.card),
                mana_value: c.card.mana_value,
                score: Some(c.total_score()),
                roles: c.roles.iter().map(|r| r.to_string()).collect(),
            })
            .collect();
        let lands = deck
            .lands()
            .iter()
            .map(|c| ReportCard {
                name: c.name.clone(),
                category: c.category.to_string(),
                mana_cost: oracle_cost(c),
                mana_value: c.mana_value,
                score: None,
                roles: Vec::new(),
            })
            .collect();
        Self {
            commander: deck.commander().name().to_string(),
            color_identity: deck.commander().color_identity().to_string(),
            card_count: deck.card_count(),
            non_lands,
            lands,
            category_counts: deck
                .slate()
                .category_counts()
                .into_iter()
                .map(|(c, n)| (c.to_string(), n))
                .collect(),
            total_price: (deck.total_price() * 100.0).round() / 100.0,
            price_sources: deck
                .price_sources()
                .iter()
                .map(|(s, n)| (s.to_string(), *n))
                .collect(),
            warnings: deck.warnings().to_vec(),
            notes: deck.notes().to_vec(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
