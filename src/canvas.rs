//! `canvas`: a wire-framed rectangle of tiles, read as a 2-D pixel buffer.

use crate::grid::Grids;
use crate::tile::KnownTile;

/// A mutable-by-copy 2-D array of `{0, 1}` pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    /// Set only by [`recognize`]; cleared by every [`Canvas::write`].
    pub position: Option<(i64, i64)>,
    data: Vec<Vec<u8>>,
}

impl Canvas {
    /// Build a canvas directly from pixel rows, bypassing [`recognize`].
    /// Used by tests elsewhere in the crate that need a canvas value
    /// without painting a whole program image.
    #[cfg(test)]
    pub(crate) fn from_rows(position: Option<(i64, i64)>, data: Vec<Vec<u8>>) -> Self {
        Self { position, data }
    }

    pub fn width(&self) -> i64 {
        self.data.first().map_or(0, Vec::len) as i64
    }

    pub fn height(&self) -> i64 {
        self.data.len() as i64
    }

    pub fn read(&self, x: i64, y: i64) -> Option<u8> {
        let row = self.data.get(usize::try_from(y).ok()?)?;
        row.get(usize::try_from(x).ok()?).copied()
    }

    /// A functional update: returns a fresh canvas with `(x, y)` replaced
    /// and `position` cleared, leaving `self` untouched.
    pub fn write(&self, x: i64, y: i64, value: u8) -> Option<Self> {
        let yu = usize::try_from(y).ok()?;
        let xu = usize::try_from(x).ok()?;
        if yu >= self.data.len() || xu >= self.data[yu].len() {
            return None;
        }
        let mut data = self.data.clone();
        data[yu][xu] = value;
        Some(Self { position: None, data })
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.data.iter().map(Vec::as_slice)
    }
}

/// Attempt to close a `canvas` tile at `(x, y)` into a rectangle framed by
/// `wire_we`/`wire_ns`/`wire_sw`/`wire_ne`/`wire_nw`, per the spatial layout
/// in the design document. Returns `None` if the border does not close.
pub fn recognize(grids: &Grids, x: i64, y: i64) -> Option<Canvas> {
    if grids.name(x, y)?.known() != Some(KnownTile::Canvas) {
        return None;
    }

    let is = |x: i64, y: i64, t: KnownTile| grids.name(x, y).and_then(|n| n.known()) == Some(t);

    let mut max_x = x + 1;
    while is(max_x, y, KnownTile::WireWe) {
        max_x += 1;
    }
    if !is(max_x, y, KnownTile::WireSw) {
        return None;
    }

    let mut max_y = y + 1;
    while is(x, max_y, KnownTile::WireNs) {
        max_y += 1;
    }
    if !is(x, max_y, KnownTile::WireNe) {
        return None;
    }

    for tx in x + 1..max_x {
        if !is(tx, max_y, KnownTile::WireWe) {
            return None;
        }
    }
    for ty in y + 1..max_y {
        if !is(max_x, ty, KnownTile::WireNs) {
            return None;
        }
    }
    if !is(max_x, max_y, KnownTile::WireNw) {
        return None;
    }

    let base_grid = grids.base_grid as i64;
    let ch = max_y - (y + 1);
    let cw = max_x - (x + 1);
    let mut data = vec![vec![0u8; (cw * base_grid) as usize]; (ch * base_grid) as usize];

    for ty in 0..ch {
        for tx in 0..cw {
            let tile_bitmask = grids.bitmask(x + 1 + tx, y + 1 + ty)?;
            for i in 0..base_grid as usize {
                for j in 0..base_grid as usize {
                    data[(ty * base_grid) as usize + i][(tx * base_grid) as usize + j] =
                        u8::from(tile_bitmask.get(j, i));
                }
            }
        }
    }

    Some(Canvas { position: Some((x, y)), data })
}
