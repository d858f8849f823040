#![allow(dead_code)]

use std::time::Duration;

use deckgen::{
    Card, CardBuilder, ColorSet, EngineConfig, InMemoryRepository, Legality, ManaCost, Role, Score,
    TableScorer,
};

pub const TYPE_LINES: [&str; 6] = [
    "Creature — Elf Warrior",
    "Artifact",
    "Enchantment",
    "Instant",
    "Sorcery",
    "Legendary Planeswalker — Vraska",
];

/// Card with a parsed cost and a flat 1.00 price.
pub fn card(name: &str, type_line: &str, cost: &str, identity: &str) -> Card {
    let mut builder = CardBuilder::new(name, name)
        .type_line(type_line)
        .color_identity(ColorSet::from_letters(identity))
        .price(1.0);
    if !cost.is_empty() {
        builder = builder.mana_cost(ManaCost::parse(cost).expect("fixture cost should parse"));
    }
    builder.build().expect("fixture type line should parse")
}

pub fn commander(name: &str, identity: &str, cost: &str) -> Card {
    card(name, "Legendary Creature — Human Shaman", cost, identity)
}

/// Cost of `generic` plus one pip of the color at `i` in `identity`.
fn cost_for(identity: &str, i: usize) -> String {
    let generic = i % 4;
    let letters: Vec<char> = identity.chars().collect();
    match letters.get(i % letters.len().max(1)) {
        Some(letter) if generic == 0 => format!("{{{letter}}}"),
        Some(letter) => format!("{{{generic}}}{{{letter}}}"),
        None => format!("{{{}}}", generic + 1),
    }
}

/// Repository plus scorer for one commander.
pub struct Catalog {
    pub repository: InMemoryRepository,
    pub scorer: TableScorer,
}

pub struct CatalogBuilder {
    commander: Card,
    identity: String,
    cards: Vec<Card>,
    scorer: TableScorer,
}

impl CatalogBuilder {
    pub fn new(commander: Card) -> Self {
        let identity = commander.color_identity.to_string();
        let identity = if identity == "C" { String::new() } else { identity };
        Self {
            cards: vec![commander.clone()],
            commander,
            identity,
            scorer: TableScorer::new()
                .with_default_score(0.1)
                .with_theme_bonus(5.0),
        }
    }

    /// `counts` per weighted category in canonical order. Scores fall with
    /// the index; every fifth card ramps, every seventh draws.
    pub fn spells(mut self, counts: [usize; 6]) -> Self {
        for (slot, count) in counts.into_iter().enumerate() {
            let type_line = TYPE_LINES[slot];
            let label = type_line
                .trim_start_matches("Legendary ")
                .split_whitespace()
                .next()
                .unwrap_or("Card");
            for i in 0..count {
                let name = format!("{label} {i:03}");
                let card = card(&name, type_line, &cost_for(&self.identity, i), &self.identity_letter(i));
                let mut score = Score::new(10.0 - i as f64 * 0.1);
                if i % 5 == 0 {
                    score = score.with_roles([Role::Ramp]);
                } else if i % 7 == 0 {
                    score = score.with_roles([Role::Draw]);
                }
                self.scorer.insert(name, score);
                self.cards.push(card);
            }
        }
        self
    }

    /// Non-basic lands alternating colorless and on-color.
    pub fn lands(mut self, count: usize) -> Self {
        for i in 0..count {
            let identity = if i % 2 == 0 {
                String::new()
            } else {
                self.identity_letter(i)
            };
            let name = format!("Land {i:02}");
            self.scorer.insert(name.clone(), Score::new(5.0 - i as f64 * 0.1));
            self.cards.push(card(&name, "Land", "", &identity));
        }
        self
    }

    /// Cards that must never appear: off-color, banned and silver-bordered.
    pub fn noise(mut self) -> Self {
        let off_color: String = "WUBRG"
            .chars()
            .filter(|c| !self.identity.contains(*c))
            .take(1)
            .collect();
        if !off_color.is_empty() {
            for i in 0..5 {
                let name = format!("Off Color {i}");
                self.scorer.insert(name.clone(), Score::new(50.0));
                self.cards.push(card(&name, TYPE_LINES[0], &format!("{{{off_color}}}"), &off_color));
            }
        }
        let mut banned = card("Banned Relic", "Artifact", "{1}", "");
        banned.legality = Legality::Banned;
        let mut silver = card("Silver Trinket", "Artifact", "{1}", "");
        silver.set_code = Some("unf".into());
        for noisy in [banned, silver] {
            self.scorer.insert(noisy.name.clone(), Score::new(50.0));
            self.cards.push(noisy);
        }
        self
    }

    pub fn card(mut self, card: Card, score: Score) -> Self {
        self.scorer.insert(card.name.clone(), score);
        self.cards.push(card);
        self
    }

    fn identity_letter(&self, i: usize) -> String {
        self.identity
            .chars()
            .nth(i % self.identity.len().max(1))
            .map(String::from)
            .unwrap_or_default()
    }

    pub fn commander(&self) -> &Card {
        &self.commander
    }

    pub fn build(self) -> Catalog {
        Catalog {
            repository: InMemoryRepository::new(self.cards),
            scorer: self.scorer,
        }
    }
}

/// Default settings without rate-limit sleeps.
pub fn fast_config() -> EngineConfig {
    EngineConfig {
        request_delay: Duration::ZERO,
        base_backoff: Duration::ZERO,
        ..EngineConfig::default()
    }
}
