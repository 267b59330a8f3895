//! The label pre-pass: every `label` tile binds the expression to its
//! west to the bitmask of the tile to its east, and every cell in the
//! grid whose bitmask matches a bound icon resolves to that value.

use std::collections::HashMap;
use std::rc::Rc;

use crate::diagnostics::DiagnosticKind;
use crate::direction::Direction;
use crate::eval::Interpreter;
use crate::tile::KnownTile;
use crate::value::{Env, Value};

/// Evaluate every `label` tile's bound expression and build the top-level
/// environment every `entry` is evaluated under. Labels are independent of
/// each other: one label's value can never see another label's binding,
/// so each is evaluated under an empty environment, matching the
/// reference evaluator.
pub fn build_environment(interpreter: &Rc<Interpreter>) -> Env {
    let grids = &interpreter.grids;
    let mut labels = Vec::new();

    for (x, y, name) in grids.entries() {
        if name.known() != Some(KnownTile::Label) {
            continue;
        }
        let Some(icon) = grids.bitmask(x + 1, y).cloned() else {
            interpreter.diagnose(x, y, DiagnosticKind::Shape, "label has no icon to its east");
            continue;
        };
        let value = interpreter.eval(x - 1, y, Direction::West, &Env::default());
        let Some(value) = value else {
            interpreter.diagnose(x, y, DiagnosticKind::Routing, "label's bound expression failed to evaluate");
            continue;
        };
        labels.push((icon, value));
    }

    let mut mapping: HashMap<(i64, i64), Value> = HashMap::new();
    for (x, y, _) in grids.entries() {
        let Some(bitmask) = grids.bitmask(x, y) else { continue };
        if let Some((_, value)) = labels.iter().find(|(icon, _)| icon == bitmask) {
            mapping.insert((x, y), value.clone());
        }
    }

    Env::from_base(mapping)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::Config;
    use crate::grid::Grids;
    use crate::library::Library;
    use crate::testutil::{paint_pattern, pattern_for};
    use image::{Rgba, RgbaImage};

    const LABEL: usize = 10;
    const STAR: usize = 11;

    #[test]
    fn label_binds_matching_icon_cells_to_its_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut make = |name: &str, index: usize| {
            let path = dir.path().join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            pattern_for(index, 5).save(path).unwrap();
        };
        make("label.png", LABEL);
        make("decoration/star.png", STAR);
        for d in 0..10usize {
            make(&format!("functions/{d}.png"), d);
        }
        let library = Library::load(dir.path(), 5).unwrap();

        // row: "7"  label  star
        let mut image = RgbaImage::from_pixel(20, 10, Rgba([255, 255, 255, 255]));
        paint_pattern(&mut image, 0, 0, 7, 5); // "7"
        paint_pattern(&mut image, 1, 0, LABEL, 5);
        paint_pattern(&mut image, 2, 0, STAR, 5); // the icon
        // a second, unrelated star elsewhere in the grid
        paint_pattern(&mut image, 0, 1, STAR, 5);

        let grids = Grids::rasterize(&image, &library, 5).unwrap();
        let interpreter = Interpreter::new(grids, library, Config::default());

        let env = build_environment(&interpreter);
        assert!(matches!(env.get((2, 0)), Some(Value::Int(7))));
        assert!(matches!(env.get((0, 1)), Some(Value::Int(7))));
        assert!(env.get((1, 0)).is_none());
    }
}
