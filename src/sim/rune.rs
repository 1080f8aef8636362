//! Rune combinations and the colors they select
//!
//! Three toggle runes (Q, E, R) combine into one of six attack colors.
//! Exactly one or exactly two active runes select a color; none or all three
//! leave the weapon neutral and unable to fire.

/// Neutral (grey) weapon color when no valid combination is active
pub const NEUTRAL_HEX: u32 = 0x7F8C8D;

/// Color tag shared by enemies and projectiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorTag {
    Red,
    Yellow,
    Blue,
    Orange,
    Purple,
    Green,
}

impl ColorTag {
    /// Every tag, in spawn table order
    pub const ALL: [ColorTag; 6] = [
        ColorTag::Red,
        ColorTag::Yellow,
        ColorTag::Blue,
        ColorTag::Orange,
        ColorTag::Purple,
        ColorTag::Green,
    ];

    /// Neon display color (0xRRGGBB)
    pub fn hex(self) -> u32 {
        match self {
            ColorTag::Red => 0xFF0033,
            ColorTag::Yellow => 0xFFD633,
            ColorTag::Blue => 0x00FFFF,
            ColorTag::Orange => 0xFF6600,
            ColorTag::Purple => 0xBC13FE,
            ColorTag::Green => 0x00FF00,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ColorTag::Red => "red",
            ColorTag::Yellow => "yellow",
            ColorTag::Blue => "blue",
            ColorTag::Orange => "orange",
            ColorTag::Purple => "purple",
            ColorTag::Green => "green",
        }
    }
}

/// One of the three toggle runes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rune {
    Q,
    E,
    R,
}

impl Rune {
    /// Map a lowercase key name to its rune
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "q" => Some(Rune::Q),
            "e" => Some(Rune::E),
            "r" => Some(Rune::R),
            _ => None,
        }
    }
}

/// Current rune flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Runes {
    pub q: bool,
    pub e: bool,
    pub r: bool,
}

impl Runes {
    pub const fn new(q: bool, e: bool, r: bool) -> Self {
        Self { q, e, r }
    }

    pub fn toggle(&mut self, rune: Rune) {
        match rune {
            Rune::Q => self.q = !self.q,
            Rune::E => self.e = !self.e,
            Rune::R => self.r = !self.r,
        }
    }

    /// Color selected by the current flags
    pub fn color(&self) -> RuneColor {
        resolve_color(*self)
    }
}

/// Resolved weapon color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuneColor {
    pub hex: u32,
    /// `None` when the combination is neutral (firing is rejected)
    pub tag: Option<ColorTag>,
}

/// Resolve rune flags to a weapon color (exact-match truth table)
pub fn resolve_color(runes: Runes) -> RuneColor {
    let tag = match (runes.q, runes.e, runes.r) {
        (true, false, false) => Some(ColorTag::Red),
        (false, true, false) => Some(ColorTag::Yellow),
        (false, false, true) => Some(ColorTag::Blue),
        (true, true, false) => Some(ColorTag::Orange),
        (true, false, true) => Some(ColorTag::Purple),
        (false, true, true) => Some(ColorTag::Green),
        (false, false, false) | (true, true, true) => None,
    };
    RuneColor {
        hex: tag.map_or(NEUTRAL_HEX, ColorTag::hex),
        tag,
    }
}
