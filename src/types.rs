use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
    World,
}

impl Supertype {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "Basic" => Some(Supertype::Basic),
            "Legendary" => Some(Supertype::Legendary),
            "Snow" => Some(Supertype::Snow),
            "World" => Some(Supertype::World),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
    Battle,
    Kindred, // Formerly Tribal
}

impl CardType {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "Land" => Some(CardType::Land),
            "Creature" => Some(CardType::Creature),
            "Artifact" => Some(CardType::Artifact),
            "Enchantment" => Some(CardType::Enchantment),
            "Planeswalker" => Some(CardType::Planeswalker),
            "Instant" => Some(CardType::Instant),
            "Sorcery" => Some(CardType::Sorcery),
            "Battle" => Some(CardType::Battle),
            "Kindred" | "Tribal" => Some(CardType::Kindred),
            _ => None,
        }
    }
}

/// Error for type lines that carry no recognizable card type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("type line '{0}' has no card type")]
pub struct TypeLineError(pub String);

/// Parsed left-hand side of a type line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TypeLine {
    pub supertypes: Vec<Supertype>,
    pub card_types: Vec<CardType>,
}

impl TypeLine {
    /// Parses supertypes and card types from a printed type line such as
    /// `"Legendary Creature — Elf Druid"`. Subtypes after the dash are
    /// ignored. For double-faced cards only the front face is read.
    pub fn parse(line: &str) -> Result<Self, TypeLineError> {
        let front = line.split("//").next().unwrap_or_default();
        let types_part = front
            .split(['—', '-'])
            .next()
            .unwrap_or_default();

        let mut parsed = TypeLine::default();
        for word in types_part.split_whitespace() {
            if let Some(supertype) = Supertype::from_word(word) {
                parsed.supertypes.push(supertype);
            } else if let Some(card_type) = CardType::from_word(word) {
                parsed.card_types.push(card_type);
            }
        }

        if parsed.card_types.is_empty() {
            return Err(TypeLineError(line.to_string()));
        }
        Ok(parsed)
    }

    /// Derives the card's single deck-building category.
    pub fn category(&self) -> Category {
        Category::from_card_types(&self.card_types)
    }
}

/// Mutually exclusive deck-building category, derived once from the type line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Creature,
    Artifact,
    Enchantment,
    Instant,
    Sorcery,
    Planeswalker,
    Land,
    Other,
}

impl Category {
    /// The six user-weighted categories in canonical order. Category
    /// tie-breaks everywhere in the engine follow this order.
    pub const WEIGHTED: [Category; 6] = [
        Category::Creature,
        Category::Artifact,
        Category::Enchantment,
        Category::Instant,
        Category::Sorcery,
        Category::Planeswalker,
    ];

    /// Precedence: Land > Creature > Planeswalker > Instant > Sorcery >
    /// Artifact > Enchantment > Other.
    pub fn from_card_types(card_types: &[CardType]) -> Self {
        let has = |t: CardType| card_types.contains(&t);
        if has(CardType::Land) {
            Category::Land
        } else if has(CardType::Creature) {
            Category::Creature
        } else if has(CardType::Planeswalker) {
            Category::Planeswalker
        } else if has(CardType::Instant) {
            Category::Instant
        } else if has(CardType::Sorcery) {
            Category::Sorcery
        } else if has(CardType::Artifact) {
            Category::Artifact
        } else if has(CardType::Enchantment) {
            Category::Enchantment
        } else {
            Category::Other
        }
    }

    /// Position in `WEIGHTED`, or `None` for Land and Other.
    pub fn weighted_index(self) -> Option<usize> {
        Category::WEIGHTED.iter().position(|c| *c == self)
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Creature => "creatures",
            Category::Artifact => "artifacts",
            Category::Enchantment => "enchantments",
            Category::Instant => "instants",
            Category::Sorcery => "sorceries",
            Category::Planeswalker => "planeswalkers",
            Category::Land => "lands",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts singular or plural labels, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        [
            Category::Creature,
            Category::Artifact,
            Category::Enchantment,
            Category::Instant,
            Category::Sorcery,
            Category::Planeswalker,
            Category::Land,
            Category::Other,
        ]
        .into_iter()
        .find(|c| {
            let label = c.label();
            lower == label
                || Some(lower.as_str()) == label.strip_suffix('s')
                || (*c == Category::Sorcery && lower == "sorcery")
        })
        .ok_or_else(|| format!("unknown category '{s}'"))
    }
}
