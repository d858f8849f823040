use std::fmt;
use std::str::FromStr;

use crate::color::{Color, ColorSet};
use crate::error::{EngineError, Result};
use crate::ids::CardId;
use crate::mana::ManaCost;
use crate::types::{CardType, Category, Supertype, TypeLine, TypeLineError};

/// Commander-format legality of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Legality {
    #[default]
    Legal,
    NotLegal,
    Banned,
    Restricted,
}

impl Legality {
    pub fn is_legal(self) -> bool {
        self == Legality::Legal
    }
}

impl FromStr for Legality {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legal" => Ok(Legality::Legal),
            "not_legal" | "not legal" => Ok(Legality::NotLegal),
            "banned" => Ok(Legality::Banned),
            "restricted" => Ok(Legality::Restricted),
            other => Err(format!("unknown legality '{other}'")),
        }
    }
}

/// The six basic land names, Wastes included for colorless decks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicLand {
    Plains,
    Island,
    Swamp,
    Mountain,
    Forest,
    Wastes,
}

impl BasicLand {
    pub fn for_color(color: Color) -> Self {
        match color {
            Color::White => BasicLand::Plains,
            Color::Blue => BasicLand::Island,
            Color::Black => BasicLand::Swamp,
            Color::Red => BasicLand::Mountain,
            Color::Green => BasicLand::Forest,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BasicLand::Plains => "Plains",
            BasicLand::Island => "Island",
            BasicLand::Swamp => "Swamp",
            BasicLand::Mountain => "Mountain",
            BasicLand::Forest => "Forest",
            BasicLand::Wastes => "Wastes",
        }
    }

    fn mana_letter(self) -> char {
        match self {
            BasicLand::Plains => 'W',
            BasicLand::Island => 'U',
            BasicLand::Swamp => 'B',
            BasicLand::Mountain => 'R',
            BasicLand::Forest => 'G',
            BasicLand::Wastes => 'C',
        }
    }
}

/// Static, immutable card record as supplied by the card repository.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub mana_cost: Option<ManaCost>,
    /// Converted mana cost. Taken from the repository when supplied,
    /// otherwise computed from the mana cost.
    pub mana_value: u32,
    pub type_line: String,
    pub supertypes: Vec<Supertype>,
    pub card_types: Vec<CardType>,
    /// Derived once from the type line by `CardBuilder::build`.
    pub category: Category,
    pub color_identity: ColorSet,
    pub oracle_text: String,
    pub price_estimate: Option<f64>,
    pub legality: Legality,
    pub set_code: Option<String>,
    /// Popularity rank; lower is more popular.
    pub popularity_rank: Option<u32>,
}

impl Card {
    /// Builds the synthetic record for a basic land.
    pub fn basic_land(basic: BasicLand) -> Card {
        let name = basic.name();
        let subtype = if basic == BasicLand::Wastes { "" } else { name };
        let type_line = if subtype.is_empty() {
            "Basic Land".to_string()
        } else {
            format!("Basic Land — {subtype}")
        };
        Card {
            id: CardId::new(format!("basic-{}", name.to_ascii_lowercase())),
            name: name.to_string(),
            mana_cost: None,
            mana_value: 0,
            type_line,
            supertypes: vec![Supertype::Basic],
            card_types: vec![CardType::Land],
            category: Category::Land,
            color_identity: ColorSet::from_letters(&basic.mana_letter().to_string()),
            oracle_text: format!("({{T}}: Add {{{}}}.)", basic.mana_letter()),
            price_estimate: Some(0.0),
            legality: Legality::Legal,
            set_code: None,
            popularity_rank: None,
        }
    }

    /// Returns true if this card has the given card type.
    pub fn has_card_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    /// Returns true if this card has the given supertype.
    pub fn has_supertype(&self, supertype: Supertype) -> bool {
        self.supertypes.contains(&supertype)
    }

    /// Returns true if this is a land card.
    pub fn is_land(&self) -> bool {
        self.category == Category::Land
    }

    /// Basic lands are exempt from the singleton rule.
    pub fn is_basic_land(&self) -> bool {
        self.is_land() && self.has_supertype(Supertype::Basic)
    }

    /// Returns true if this is a legendary card.
    pub fn is_legendary(&self) -> bool {
        self.has_supertype(Supertype::Legendary)
    }

    /// Parses mana symbols from rules text and returns the colors found.
    fn parse_colors_from_text(text: &str) -> ColorSet {
        let mut colors = ColorSet::COLORLESS;
        let mut rest = text;
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            // Hybrid symbols like "W/U" contribute both colors.
            colors = colors.union(ColorSet::from_letters(&rest[start + 1..start + len]));
            rest = &rest[start + len + 1..];
        }
        colors
    }
}

/// Builder for constructing Card instances.
#[derive(Debug, Default, Clone)]
pub struct CardBuilder {
    id: CardId,
    name: String,
    mana_cost: Option<ManaCost>,
    mana_value: Option<u32>,
    type_line: String,
    color_identity: Option<ColorSet>,
    oracle_text: String,
    price_estimate: Option<f64>,
    legality: Legality,
    set_code: Option<String>,
    popularity_rank: Option<u32>,
}

impl CardBuilder {
    pub fn new(id: impl Into<CardId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn mana_cost(mut self, cost: ManaCost) -> Self {
        self.mana_cost = Some(cost);
        self
    }

    /// Overrides the mana value computed from the mana cost.
    pub fn mana_value(mut self, mana_value: u32) -> Self {
        self.mana_value = Some(mana_value);
        self
    }

    pub fn type_line(mut self, type_line: impl Into<String>) -> Self {
        self.type_line = type_line.into();
        self
    }

    /// Sets the color identity explicitly instead of deriving it.
    pub fn color_identity(mut self, identity: ColorSet) -> Self {
        self.color_identity = Some(identity);
        self
    }

    pub fn oracle_text(mut self, text: impl Into<String>) -> Self {
        self.oracle_text = text.into();
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price_estimate = Some(price);
        self
    }

    pub fn legality(mut self, legality: Legality) -> Self {
        self.legality = legality;
        self
    }

    pub fn set_code(mut self, set_code: impl Into<String>) -> Self {
        self.set_code = Some(set_code.into());
        self
    }

    pub fn popularity_rank(mut self, rank: u32) -> Self {
        self.popularity_rank = Some(rank);
        self
    }

    /// Finalizes the card. Fails only when the type line has no card type.
    ///
    /// Without an explicit identity, the color identity is the union of the
    /// mana cost's colors and mana symbols in the rules text.
    pub fn build(self) -> std::result::Result<Card, TypeLineError> {
        let parsed = TypeLine::parse(&self.type_line)?;
        let category = parsed.category();

        let color_identity = self.color_identity.unwrap_or_else(|| {
            let from_cost: ColorSet = self
                .mana_cost
                .iter()
                .flat_map(|cost| cost.pips().iter().flatten())
                .filter_map(|symbol| symbol.color())
                .collect();
            from_cost.union(Card::parse_colors_from_text(&self.oracle_text))
        });
        let mana_value = self
            .mana_value
            .unwrap_or_else(|| self.mana_cost.as_ref().map_or(0, |c| c.mana_value()));

        Ok(Card {
            id: self.id,
            name: self.name,
            mana_cost: self.mana_cost,
            mana_value,
            type_line: self.type_line,
            supertypes: parsed.supertypes,
            card_types: parsed.card_types,
            category,
            color_identity,
            oracle_text: self.oracle_text,
            price_estimate: self.price_estimate,
            legality: self.legality,
            set_code: self.set_code,
            popularity_rank: self.popularity_rank,
        })
    }
}

/// Functional role tags attached by the synergy scorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Mana producer or land ramp.
    Ramp,
    Draw,
    /// Cheap draw that replaces itself.
    Cantrip,
    /// Library search.
    Tutor,
    Removal,
    Protection,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Ramp,
        Role::Draw,
        Role::Cantrip,
        Role::Tutor,
        Role::Removal,
        Role::Protection,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Role::Ramp => "ramp",
            Role::Draw => "draw",
            Role::Cantrip => "cantrip",
            Role::Tutor => "tutor",
            Role::Removal => "removal",
            Role::Protection => "protection",
        }
    }

    fn power_weight(self) -> f64 {
        match self {
            Role::Ramp | Role::Tutor => 1.0,
            Role::Draw | Role::Removal => 0.8,
            Role::Cantrip => 0.6,
            Role::Protection => 0.5,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.label() == lower)
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// A candidate card with the scorer's verdict for one commander.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCard {
    pub card: Card,
    /// Non-negative synergy score.
    pub synergy: f64,
    pub tag_bonus: f64,
    pub roles: Vec<Role>,
}

impl ScoredCard {
    /// Negative and NaN scores are clamped to zero.
    pub fn new(card: Card, synergy: f64) -> Self {
        Self {
            card,
            synergy: clamp_score(synergy),
            tag_bonus: 0.0,
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: impl IntoIterator<Item = Role>) -> Self {
        self.roles = roles.into_iter().collect();
        self.roles.sort();
        self.roles.dedup();
        self
    }

    pub fn with_tag_bonus(mut self, bonus: f64) -> Self {
        self.tag_bonus = clamp_score(bonus);
        self
    }

    pub fn name(&self) -> &str {
        &self.card.name
    }

    pub fn category(&self) -> Category {
        self.card.category
    }

    /// Score used for every "highest score first" ordering.
    pub fn total_score(&self) -> f64 {
        self.synergy + self.tag_bonus
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Rough power estimate: weighted role tags discounted by mana value.
    pub fn power_estimate(&self) -> f64 {
        let weight: f64 = self.roles.iter().map(|r| r.power_weight()).sum();
        weight / (1.0 + 0.25 * self.card.mana_value as f64)
    }
}

fn clamp_score(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.max(0.0) }
}

/// The card leading the deck; anchors both filtering and scoring.
#[derive(Debug, Clone, PartialEq)]
pub struct Commander {
    card: Card,
}

impl Commander {
    /// Validates that the card may lead a commander deck.
    pub fn new(card: Card) -> Result<Self> {
        let reason = if card.legality == Legality::Banned {
            Some("banned as a commander")
        } else if !(card.is_legendary() && card.has_card_type(CardType::Creature))
            && !card
                .oracle_text
                .to_ascii_lowercase()
                .contains("can be your commander")
        {
            Some("not a legendary creature")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(EngineError::NotACommander {
                name: card.name,
                reason: reason.to_string(),
            }),
            None => Ok(Self { card }),
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn name(&self) -> &str {
        &self.card.name
    }

    pub fn color_identity(&self) -> ColorSet {
        self.card.color_identity
    }
}
