use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    /// All colors in WUBRG order. Every per-color tie-break uses this order.
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Returns the single-letter mana symbol for this color.
    pub const fn letter(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    /// Parses a mana letter (case-insensitive).
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'U' => Some(Color::Blue),
            'B' => Some(Color::Black),
            'R' => Some(Color::Red),
            'G' => Some(Color::Green),
            _ => None,
        }
    }

    /// Index into `Color::ALL`, used for fixed-size per-color tables.
    pub const fn index(self) -> usize {
        match self {
            Color::White => 0,
            Color::Blue => 1,
            Color::Black => 2,
            Color::Red => 3,
            Color::Green => 4,
        }
    }
}

/// A set of colors represented as bitflags for efficient operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: Self = Self(0);
    pub const WHITE: Self = Self(1 << 0);
    pub const BLUE: Self = Self(1 << 1);
    pub const BLACK: Self = Self(1 << 2);
    pub const RED: Self = Self(1 << 3);
    pub const GREEN: Self = Self(1 << 4);

    /// Creates a new empty ColorSet.
    pub const fn new() -> Self {
        Self(0)
    }

    /// Creates a ColorSet from a single color.
    pub const fn from_color(color: Color) -> Self {
        match color {
            Color::White => Self::WHITE,
            Color::Blue => Self::BLUE,
            Color::Black => Self::BLACK,
            Color::Red => Self::RED,
            Color::Green => Self::GREEN,
        }
    }

    /// Builds a set from mana letters such as `"WUG"`. Unknown letters
    /// (including `C` for colorless) are ignored.
    pub fn from_letters(letters: &str) -> Self {
        letters.chars().filter_map(Color::from_letter).collect()
    }

    /// Returns true if this set contains no colors.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this set contains the given color.
    pub const fn contains(self, color: Color) -> bool {
        self.0 & Self::from_color(color).0 != 0
    }

    /// Returns true if this set contains all colors in the other set.
    ///
    /// This is the color-identity subset test: a card fits under a
    /// commander when `commander.contains_all(card)`.
    pub const fn contains_all(self, other: ColorSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns the union of two color sets.
    pub const fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns the number of colors in this set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Adds a color to this set, returning the new set.
    pub const fn with(self, color: Color) -> Self {
        self.union(Self::from_color(color))
    }

    /// Iterates the colors in this set in WUBRG order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |color| self.contains(*color))
    }
}

impl From<Color> for ColorSet {
    fn from(color: Color) -> Self {
        Self::from_color(color)
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<T: IntoIterator<Item = Color>>(iter: T) -> Self {
        iter.into_iter()
            .fold(ColorSet::COLORLESS, |set, color| set.with(color))
    }
}

impl fmt::Display for ColorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "C");
        }
        for color in self.iter() {
            write!(f, "{}", color.letter())?;
        }
        Ok(())
    }
}
