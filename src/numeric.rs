//! Decodes number literals and slider widgets from horizontal tile runs.

use crate::grid::Grids;
use crate::tile::KnownTile;
use crate::value::Value;

/// Consume a run of digit/dot/minus tiles eastward from `(x, y)` and parse
/// it as an integer (preferred) or float literal.
pub fn read_number(grids: &Grids, x: i64, y: i64) -> Option<Value> {
    let mut text = String::new();
    let mut cursor = x;
    while let Some(glyph) = glyph_at(grids, cursor, y) {
        text.push(glyph);
        cursor += 1;
    }

    if text.is_empty() {
        return None;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Value::Int(i));
    }
    text.parse::<f64>().ok().map(Value::Float)
}

fn glyph_at(grids: &Grids, x: i64, y: i64) -> Option<char> {
    grids.name(x, y)?.known()?.glyph()
}

/// A horizontal slider: `slider_l`, a run of `slider_m`/`wire_we`, then
/// `slider_r`, with numeric endpoints on the row above.
pub fn read_slider(grids: &Grids, x: i64, y: i64) -> Option<f64> {
    let l_pos = x;
    let mut knob = None;
    let mut cursor = x + 1;

    loop {
        match grids.name(cursor, y)?.known() {
            Some(KnownTile::SliderM) => {
                knob = Some(cursor);
                cursor += 1;
            }
            Some(KnownTile::WireWe) => cursor += 1,
            _ => break,
        }
    }
    let knob = knob?;
    if grids.name(cursor, y)?.known() != Some(KnownTile::SliderR) {
        return None;
    }
    let r_pos = cursor;

    let left = as_f64(read_number(grids, l_pos, y - 1)?)?;
    let right = as_f64(read_number(grids, r_pos, y - 1)?)?;

    let span = (r_pos - 1) - (l_pos + 1);
    let alpha = if span == 0 { 0.0 } else { (knob - (l_pos + 1)) as f64 / span as f64 };
    Some(left + alpha * (right - left))
}

fn as_f64(value: Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(i as f64),
        Value::Float(f) => Some(f),
        _ => None,
    }
}
