//! The final pass: evaluate every `entry` tile and paint its result back
//! onto the program image at the position of its return canvas.

use std::rc::Rc;

use image::{Rgba, RgbaImage};

use crate::diagnostics::DiagnosticKind;
use crate::eval::Interpreter;
use crate::tile::{KnownTile, TileName};
use crate::value::{Env, Value};

/// Paint every entry point's result onto a copy of `source` and return it.
pub fn render(interpreter: &Rc<Interpreter>, env: &Env, source: &RgbaImage) -> RgbaImage {
    let mut output = source.clone();
    let base_grid = interpreter.grids.base_grid as i64;
    let on = Rgba(interpreter.config.on_colour);
    let off = Rgba(interpreter.config.off_colour);

    let entries: Vec<(i64, i64)> = interpreter
        .grids
        .entries()
        .filter(|(_, _, name)| name.known() == Some(KnownTile::Entry))
        .map(|(x, y, _)| (x, y))
        .collect();

    for (x, y) in entries {
        let (content, ret) = interpreter.eval_entry_parts(x, y, env);
        let Some(content) = content else {
            interpreter.diagnose(x, y, DiagnosticKind::EntryInvalid, "entry point has no content");
            continue;
        };
        let Some(Value::Canvas(ret_canvas)) = ret else {
            interpreter.diagnose(x, y, DiagnosticKind::EntryInvalid, "entry point has no canvas return");
            continue;
        };
        let Some((cx, cy)) = ret_canvas.position else {
            interpreter.diagnose(x, y, DiagnosticKind::EntryInvalid, "return canvas for entry point has no position");
            continue;
        };

        let px = cx * base_grid + base_grid;
        let py = cy * base_grid + base_grid;

        match content {
            Value::Canvas(data) => paint_canvas(&mut output, px, py, &data, on, off),
            Value::Int(_) | Value::Float(_) => {
                paint_number(&mut output, interpreter, x, y, px, py, base_grid, &content, on, off);
            }
            other => {
                interpreter.diagnose(
                    x,
                    y,
                    DiagnosticKind::EntryInvalid,
                    format!("entry point evaluates to unsupported value {other:?}"),
                );
            }
        }
    }

    output
}

fn paint_canvas(output: &mut RgbaImage, px: i64, py: i64, data: &crate::canvas::Canvas, on: Rgba<u8>, off: Rgba<u8>) {
    for (ty, row) in data.rows().enumerate() {
        for (tx, &value) in row.iter().enumerate() {
            let pixel = if value == 1 { on } else { off };
            put_pixel(output, px + tx as i64, py + ty as i64, pixel);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_number(
    output: &mut RgbaImage,
    interpreter: &Rc<Interpreter>,
    entry_x: i64,
    entry_y: i64,
    px: i64,
    py: i64,
    base_grid: i64,
    value: &Value,
    on: Rgba<u8>,
    off: Rgba<u8>,
) {
    let text = match value {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        _ => return,
    };

    for (ci, c) in text.chars().enumerate() {
        let Some(glyph_tile) = KnownTile::for_glyph(c) else {
            interpreter.diagnose(entry_x, entry_y, DiagnosticKind::Shape, format!("character '{c}' has no number tile"));
            continue;
        };
        let Some(bitmask) = interpreter.library.bitmask_for(&TileName::Known(glyph_tile)) else {
            interpreter.diagnose(entry_x, entry_y, DiagnosticKind::Shape, format!("tile {glyph_tile} not found in library"));
            continue;
        };
        for ty in 0..bitmask.height() {
            for tx in 0..bitmask.width() {
                let pixel = if bitmask.get(tx, ty) { on } else { off };
                put_pixel(output, px + ci as i64 * base_grid + tx as i64, py + ty as i64, pixel);
            }
        }
    }
}

fn put_pixel(output: &mut RgbaImage, x: i64, y: i64, pixel: Rgba<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else { return };
    if x < output.width() && y < output.height() {
        output.put_pixel(x, y, pixel);
    }
}

/// A float always renders with a decimal point (`7.0`, not `7`), matching
/// the reference language's number formatting and keeping floats visually
/// distinct from integers on the output canvas. Rust's `Display` for `f64`
/// drops the point for whole numbers, so it's appended by hand.
fn format_float(f: f64) -> String {
    let s = format!("{f}");
    if s.contains('.') || s.contains('e') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::canvas::Canvas;
    use crate::config::Config;
    use crate::grid::Grids;
    use crate::library::Library;
    use crate::testutil::{paint_pattern, pattern_for};
    use image::Rgba as ImgRgba;

    #[test]
    fn paints_a_canvas_value_in_red_and_white() {
        let library = Library::empty();
        let image = RgbaImage::from_pixel(15, 15, ImgRgba([255, 255, 255, 255]));
        let grids = Grids::rasterize(&image, &library, 5).unwrap();
        let interpreter = Interpreter::new(grids, library, Config::default());

        let mut output = image.clone();
        let canvas = Canvas::from_rows(Some((0, 0)), vec![vec![1, 0], vec![0, 1]]);
        let (on, off) = (ImgRgba([255, 0, 0, 255]), ImgRgba([255, 255, 255, 255]));
        paint_canvas(&mut output, 5, 5, &canvas, on, off);

        assert_eq!(*output.get_pixel(5, 5), on);
        assert_eq!(*output.get_pixel(6, 5), off);
        assert_eq!(*output.get_pixel(5, 6), off);
        assert_eq!(*output.get_pixel(6, 6), on);
    }

    #[test]
    fn formats_floats_with_a_decimal_point() {
        assert_eq!(format_float(7.0), "7.0");
        assert_eq!(format_float(-1.5), "-1.5");
    }

    #[test]
    fn entry_point_renders_a_number_into_its_return_canvas() {
        let dir = tempfile::tempdir().unwrap();

        const ENTRY: usize = 0;
        const DIGIT7: usize = 1;
        const CANVAS: usize = 2;
        const WIRE_WE: usize = 3;
        const WIRE_NS: usize = 4;
        const WIRE_SW: usize = 5;
        const WIRE_NE: usize = 6;
        const WIRE_NW: usize = 7;

        for (name, index) in [
            ("functions/entry", ENTRY),
            ("functions/7", DIGIT7),
            ("canvas", CANVAS),
            ("wire_we", WIRE_WE),
            ("wire_ns", WIRE_NS),
            ("wire_sw", WIRE_SW),
            ("wire_ne", WIRE_NE),
            ("wire_nw", WIRE_NW),
        ] {
            let path = dir.path().join(format!("{name}.png"));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            pattern_for(index, 5).save(path).unwrap();
        }
        let library = Library::load(dir.path(), 5).unwrap();

        // entry(0,0) digit7(1,0) canvas(2,0) wire_we(3,0) wire_sw(4,0)
        //                        wire_ns(2,1) .          wire_ns(4,1)
        //                        wire_ne(2,2) wire_we(3,2) wire_nw(4,2)
        let mut image = RgbaImage::from_pixel(25, 15, ImgRgba([255, 255, 255, 255]));
        paint_pattern(&mut image, 0, 0, ENTRY, 5);
        paint_pattern(&mut image, 1, 0, DIGIT7, 5);
        paint_pattern(&mut image, 2, 0, CANVAS, 5);
        paint_pattern(&mut image, 3, 0, WIRE_WE, 5);
        paint_pattern(&mut image, 4, 0, WIRE_SW, 5);
        paint_pattern(&mut image, 2, 1, WIRE_NS, 5);
        paint_pattern(&mut image, 4, 1, WIRE_NS, 5);
        paint_pattern(&mut image, 2, 2, WIRE_NE, 5);
        paint_pattern(&mut image, 3, 2, WIRE_WE, 5);
        paint_pattern(&mut image, 4, 2, WIRE_NW, 5);

        let grids = Grids::rasterize(&image, &library, 5).unwrap();
        let interpreter = Interpreter::new(grids, library, Config::default());

        let output = render(&interpreter, &Env::default(), &image);
        assert!(interpreter.diagnostics().is_empty());

        // the return canvas' interior top-left tile is at tile (3, 1),
        // i.e. pixel (15, 5); the "7" glyph is painted there.
        let glyph = pattern_for(DIGIT7, 5);
        let expected_bitmask = crate::bitmask::Bitmask::from_block(&glyph, 0, 0, 5, 5);
        for ty in 0..5u32 {
            for tx in 0..5u32 {
                let on = expected_bitmask.get(tx as usize, ty as usize);
                let expected = if on { ImgRgba([255, 0, 0, 255]) } else { ImgRgba([255, 255, 255, 255]) };
                assert_eq!(*output.get_pixel(15 + tx, 5 + ty), expected);
            }
        }
    }
}
