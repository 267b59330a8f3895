//! Compass directions used as wire-traversal arrival markers.

use parse_display::Display;

/// The edge of a tile a traversal is reading from.
///
/// `None` marks the start of an evaluation chain (entry content/return,
/// lambda body, label expression) rather than a wire arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Direction {
    #[display("n")]
    North,
    #[display("s")]
    South,
    #[display("e")]
    East,
    #[display("w")]
    West,
    #[display("none")]
    None,
}

impl Direction {
    /// Unit step `(dx, dy)` to move one tile in this direction.
    pub const fn step(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
            Self::None => (0, 0),
        }
    }
}
