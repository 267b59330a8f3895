//! The fixed vocabulary of tiles the evaluator knows how to dispatch on.

use parse_display::{Display, FromStr};

/// Every tile name the evaluator gives meaning to. A library icon whose
/// derived path does not match one of these is still loaded (so it can
/// serve as a label's icon), but is stored as [`TileName::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromStr)]
pub enum KnownTile {
    #[display("canvas")]
    Canvas,

    #[display("wire_ns")]
    WireNs,
    #[display("wire_we")]
    WireWe,
    #[display("wire_ne")]
    WireNe,
    #[display("wire_nw")]
    WireNw,
    #[display("wire_se")]
    WireSe,
    #[display("wire_sw")]
    WireSw,

    #[display("end_e")]
    EndE,
    #[display("end_s")]
    EndS,

    #[display("bridge")]
    Bridge,

    #[display("join_nse")]
    JoinNse,
    #[display("join_nsw")]
    JoinNsw,
    #[display("join_nwe")]
    JoinNwe,

    #[display("app")]
    App,
    #[display("lambda")]
    Lambda,
    #[display("label")]
    Label,

    #[display("functions/entry")]
    Entry,

    #[display("functions/dot")]
    Dot,
    #[display("functions/sub")]
    Sub,
    #[display("functions/{0}")]
    Digit(u8),

    #[display("functions/slider_l")]
    SliderL,
    #[display("functions/slider_m")]
    SliderM,
    #[display("functions/slider_r")]
    SliderR,

    #[display("functions/add")]
    Add,
    #[display("functions/mul")]
    Mul,
    #[display("functions/div")]
    Div,
    #[display("functions/mod")]
    Mod,
    #[display("functions/pow")]
    Pow,
    #[display("functions/floor")]
    Floor,

    #[display("functions/equal")]
    Equal,
    #[display("functions/unequal")]
    Unequal,
    #[display("functions/greater")]
    Greater,
    #[display("functions/less")]
    Less,
    #[display("functions/greater_equal")]
    GreaterEqual,
    #[display("functions/less_equal")]
    LessEqual,

    #[display("functions/and")]
    And,
    #[display("functions/or")]
    Or,
    #[display("functions/not")]
    Not,
    #[display("functions/if")]
    If,

    #[display("functions/width")]
    Width,
    #[display("functions/height")]
    Height,
    #[display("functions/read")]
    Read,
    #[display("functions/write")]
    Write,

    #[display("extensions/cos")]
    Cos,
    #[display("extensions/sin")]
    Sin,
    #[display("extensions/atan2")]
    Atan2,
}

impl KnownTile {
    /// The character this tile contributes to a number literal.
    pub fn glyph(self) -> Option<char> {
        match self {
            Self::Digit(d) if d <= 9 => char::from_digit(u32::from(d), 10),
            Self::Dot => Some('.'),
            Self::Sub => Some('-'),
            _ => None,
        }
    }

    /// The tile that renders a given character of a formatted number.
    pub fn for_glyph(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c.to_digit(10).unwrap() as u8)),
            '.' => Some(Self::Dot),
            '-' => Some(Self::Sub),
            _ => None,
        }
    }
}

/// Symbolic identity of a classified tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileName {
    /// Matches a tile the evaluator assigns semantics to.
    Known(KnownTile),
    /// A library icon with no built-in meaning; only reachable as a
    /// label's icon bitmask, never dispatched on directly.
    Other(String),
    /// No library icon matched this block's bitmask.
    Empty,
}

impl TileName {
    pub fn from_library_name(name: &str) -> Self {
        name.parse::<KnownTile>()
            .map_or_else(|_| Self::Other(name.to_owned()), Self::Known)
    }

    pub const fn known(&self) -> Option<KnownTile> {
        match self {
            Self::Known(t) => Some(*t),
            _ => None,
        }
    }
}

impl std::fmt::Display for TileName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(t) => write!(f, "{t}"),
            Self::Other(s) => write!(f, "{s}"),
            Self::Empty => write!(f, "empty"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_known_names() {
        assert_eq!(TileName::from_library_name("wire_ns").known(), Some(KnownTile::WireNs));
        assert_eq!(
            TileName::from_library_name("functions/add").known(),
            Some(KnownTile::Add)
        );
        assert_eq!(
            TileName::from_library_name("functions/7").known(),
            Some(KnownTile::Digit(7))
        );
        assert_eq!(
            TileName::from_library_name("extensions/atan2").known(),
            Some(KnownTile::Atan2)
        );
    }

    #[test]
    fn unknown_names_are_other() {
        assert_eq!(
            TileName::from_library_name("decoration/star"),
            TileName::Other("decoration/star".to_owned())
        );
    }

    #[test]
    fn glyph_round_trip() {
        for c in ['0', '5', '9', '.', '-'] {
            let tile = KnownTile::for_glyph(c).unwrap();
            assert_eq!(tile.glyph(), Some(c));
        }
    }
}
