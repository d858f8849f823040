use crate::color::Color;

/// One alternative inside a cost pip, as printed in a card's mana cost.
///
/// Only the colored variants count toward manabase demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManaSymbol {
    White,
    Blue,
    Black,
    Red,
    Green,
    /// `{C}`: needs a colorless source, not a colored one.
    Colorless,
    Generic(u8),
    Snow,
    /// The `P` half of a Phyrexian pip.
    Life(u8),
    /// `{X}`, `{Y}` or `{Z}`; zero everywhere but on the stack.
    X,
}

impl ManaSymbol {
    pub fn mana_value(&self) -> u32 {
        match self {
            ManaSymbol::White
            | ManaSymbol::Blue
            | ManaSymbol::Black
            | ManaSymbol::Red
            | ManaSymbol::Green
            | ManaSymbol::Colorless
            | ManaSymbol::Snow => 1,
            ManaSymbol::Generic(n) => *n as u32,
            ManaSymbol::Life(_) => 0,
            ManaSymbol::X => 0,
        }
    }

    /// Returns the color this symbol demands, if any.
    pub fn color(&self) -> Option<Color> {
        match self {
            ManaSymbol::White => Some(Color::White),
            ManaSymbol::Blue => Some(Color::Blue),
            ManaSymbol::Black => Some(Color::Black),
            ManaSymbol::Red => Some(Color::Red),
            ManaSymbol::Green => Some(Color::Green),
            _ => None,
        }
    }

    pub fn from_color(color: Color) -> Self {
        match color {
            Color::White => ManaSymbol::White,
            Color::Blue => ManaSymbol::Blue,
            Color::Black => ManaSymbol::Black,
            Color::Red => ManaSymbol::Red,
            Color::Green => ManaSymbol::Green,
        }
    }

    fn parse(text: &str) -> Result<Self, ManaCostError> {
        if let Ok(n) = text.parse::<u8>() {
            return Ok(ManaSymbol::Generic(n));
        }
        let mut chars = text.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return Err(ManaCostError::UnknownSymbol(text.to_string()));
        };
        if let Some(color) = Color::from_letter(c) {
            return Ok(ManaSymbol::from_color(color));
        }
        match c.to_ascii_uppercase() {
            'C' => Ok(ManaSymbol::Colorless),
            'S' => Ok(ManaSymbol::Snow),
            'P' => Ok(ManaSymbol::Life(2)),
            'X' | 'Y' | 'Z' => Ok(ManaSymbol::X),
            _ => Err(ManaCostError::UnknownSymbol(text.to_string())),
        }
    }
}

/// Errors produced while parsing an oracle-style mana cost.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ManaCostError {
    #[error("unknown mana symbol '{{{0}}}'")]
    UnknownSymbol(String),
    #[error("unbalanced braces in mana cost '{0}'")]
    Unbalanced(String),
}

/// Represents a mana cost as a sequence of pips, where each pip is a list of
/// alternative payment options (disjunction).
///
/// Examples:
/// - `{2}{W}{W}` = `[[Generic(2)], [White], [White]]`
/// - `{W/U}` (hybrid) = `[[White, Blue]]`
/// - `{2/W}` (twobrid) = `[[Generic(2), White]]`
/// - `{W/P}` (phyrexian) = `[[White, Life(2)]]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManaCost {
    pips: Vec<Vec<ManaSymbol>>,
}

impl ManaCost {
    /// Parses an oracle-style cost such as `{2}{G}{G}` or `{1}{W/U}`.
    ///
    /// Split-card costs (`{1}{U} // {2}{R}`) are concatenated, matching the
    /// combined mana value those cards have outside the stack.
    pub fn parse(text: &str) -> Result<Self, ManaCostError> {
        let mut pips = Vec::new();
        let mut rest = text.trim();
        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix("//") {
                rest = stripped.trim_start();
                continue;
            }
            let Some(body) = rest.strip_prefix('{') else {
                return Err(ManaCostError::Unbalanced(text.to_string()));
            };
            let Some(end) = body.find('}') else {
                return Err(ManaCostError::Unbalanced(text.to_string()));
            };
            let pip = body[..end]
                .split('/')
                .map(ManaSymbol::parse)
                .collect::<Result<Vec<_>, _>>()?;
            pips.push(pip);
            rest = body[end + 1..].trim_start();
        }
        Ok(Self { pips })
    }

    /// Returns the mana value (formerly converted mana cost) of this cost.
    ///
    /// For each pip, uses the maximum mana value among its alternatives.
    pub fn mana_value(&self) -> u32 {
        self.pips
            .iter()
            .map(|pip| pip.iter().map(|s| s.mana_value()).max().unwrap_or(0))
            .sum()
    }

    /// Returns the pips in this mana cost.
    pub fn pips(&self) -> &[Vec<ManaSymbol>] {
        &self.pips
    }

    /// Per-color symbol demand, indexed by `Color::index`.
    ///
    /// A pip whose only option is a color counts 1.0 toward it. A pip with
    /// several alternatives (hybrid, twobrid, phyrexian) counts 0.5 toward
    /// each colored alternative.
    pub fn color_demand(&self) -> [f64; 5] {
        let mut demand = [0.0; 5];
        for pip in &self.pips {
            let weight = if pip.len() > 1 { 0.5 } else { 1.0 };
            for color in pip.iter().filter_map(ManaSymbol::color) {
                demand[color.index()] += weight;
            }
        }
        demand
    }

    /// Format the mana cost in oracle-style syntax (e.g., "{2}{W}{W}").
    pub fn to_oracle(&self) -> String {
        fn symbol_text(symbol: ManaSymbol) -> String {
            match symbol {
                ManaSymbol::Colorless => "C".to_string(),
                ManaSymbol::Generic(n) => n.to_string(),
                ManaSymbol::Snow => "S".to_string(),
                ManaSymbol::Life(_) => "P".to_string(),
                ManaSymbol::X => "X".to_string(),
                colored => colored
                    .color()
                    .map(|c| c.letter().to_string())
                    .unwrap_or_default(),
            }
        }

        let mut out = String::new();
        for pip in &self.pips {
            let parts: Vec<String> = pip.iter().map(|s| symbol_text(*s)).collect();
            out.push('{');
            out.push_str(&parts.join("/"));
            out.push('}');
        }
        out
    }

    /// Returns true if this mana cost is empty (costs nothing).
    pub fn is_empty(&self) -> bool {
        self.pips.is_empty()
    }
}
