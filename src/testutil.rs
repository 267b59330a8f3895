//! Shared test scaffolding: builds a library covering the full tile
//! vocabulary plus a blank program image, and paints named tiles onto it.
//! Only compiled under `#[cfg(test)]`; used by evaluator-level tests in
//! several modules.

use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::config::Config;
use crate::eval::Interpreter;
use crate::grid::Grids;
use crate::library::Library;
use crate::tile::KnownTile;

pub const BASE_GRID: usize = 5;

/// Every tile name the evaluator knows, paired with a distinct solid
/// colour so bitmask classification is unambiguous.
fn all_tile_names() -> Vec<String> {
    let mut names = vec![
        "canvas".to_owned(),
        "wire_ns".to_owned(),
        "wire_we".to_owned(),
        "wire_ne".to_owned(),
        "wire_nw".to_owned(),
        "wire_se".to_owned(),
        "wire_sw".to_owned(),
        "end_e".to_owned(),
        "end_s".to_owned(),
        "bridge".to_owned(),
        "join_nse".to_owned(),
        "join_nsw".to_owned(),
        "join_nwe".to_owned(),
        "app".to_owned(),
        "lambda".to_owned(),
        "label".to_owned(),
        "functions/entry".to_owned(),
        "functions/dot".to_owned(),
        "functions/sub".to_owned(),
        "functions/slider_l".to_owned(),
        "functions/slider_m".to_owned(),
        "functions/slider_r".to_owned(),
        "functions/add".to_owned(),
        "functions/mul".to_owned(),
        "functions/div".to_owned(),
        "functions/mod".to_owned(),
        "functions/pow".to_owned(),
        "functions/floor".to_owned(),
        "functions/equal".to_owned(),
        "functions/unequal".to_owned(),
        "functions/greater".to_owned(),
        "functions/less".to_owned(),
        "functions/greater_equal".to_owned(),
        "functions/less_equal".to_owned(),
        "functions/and".to_owned(),
        "functions/or".to_owned(),
        "functions/not".to_owned(),
        "functions/if".to_owned(),
        "functions/width".to_owned(),
        "functions/height".to_owned(),
        "functions/read".to_owned(),
        "functions/write".to_owned(),
        "extensions/cos".to_owned(),
        "extensions/sin".to_owned(),
        "extensions/atan2".to_owned(),
    ];
    for d in 0..10u8 {
        names.push(format!("functions/{d}"));
    }
    names
}

/// [`Bitmask`](crate::bitmask::Bitmask) only records black/non-black per
/// pixel, so two solid-colour blocks are indistinguishable unless one is
/// black and the other isn't. A library with more than one non-black tile
/// therefore can't use solid fills at all: every tile needs its own
/// black/white bit pattern. `index + 1` (not `index`) seeds the pattern so
/// index `0` never degenerates to all-white, which would collide with an
/// unpainted background cell.
pub fn pattern_for(index: usize, size: u32) -> RgbaImage {
    let mut image = RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]));
    let seed = index + 1;
    for dy in 0..size {
        for dx in 0..size {
            let bit = dy * size + dx;
            if (seed >> bit) & 1 == 1 {
                image.put_pixel(dx, dy, Rgba([0, 0, 0, 255]));
            }
        }
    }
    image
}

/// Stamp [`pattern_for`]'s pattern for `index` at tile coordinate `(tx, ty)`.
pub fn paint_pattern(image: &mut RgbaImage, tx: u32, ty: u32, index: usize, size: u32) {
    let pattern = pattern_for(index, size);
    for dy in 0..size {
        for dx in 0..size {
            image.put_pixel(tx * size + dx, ty * size + dy, *pattern.get_pixel(dx, dy));
        }
    }
}

/// A program under construction: an icon library covering every known
/// tile plus a pixel canvas to paint tiles onto by grid coordinate.
pub struct Program {
    image: RgbaImage,
    names: Vec<String>,
}

impl Program {
    /// `cols x rows` tiles, each `BASE_GRID x BASE_GRID` pixels, starting
    /// blank (unmatched, classifies as `empty`).
    pub fn new(cols: u32, rows: u32) -> Self {
        let base = BASE_GRID as u32;
        let image = RgbaImage::from_pixel(cols * base, rows * base, Rgba([255, 255, 255, 255]));
        Self { image, names: all_tile_names() }
    }

    fn index_of(&self, name: &str) -> usize {
        self.names.iter().position(|n| n == name).unwrap_or_else(|| panic!("unknown tile {name}"))
    }

    /// Paint the named tile (as it appears in the library, e.g. `functions/add`)
    /// at tile coordinate `(x, y)`.
    pub fn put(&mut self, x: u32, y: u32, name: &str) -> &mut Self {
        let index = self.index_of(name);
        paint_pattern(&mut self.image, x, y, index, BASE_GRID as u32);
        self
    }

    pub fn known(&mut self, x: u32, y: u32, tile: KnownTile) -> &mut Self {
        self.put(x, y, &tile.to_string())
    }

    /// Write every distinct tile icon into `root` as a `BASE_GRID x
    /// BASE_GRID` PNG, load it as a [`Library`], rasterise this program's
    /// image against it, and wrap both in a fresh [`Interpreter`].
    pub fn build(&self, root: &Path) -> (std::rc::Rc<Interpreter>, RgbaImage) {
        for (index, name) in self.names.iter().enumerate() {
            let path = root.join(format!("{name}.png"));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            pattern_for(index, BASE_GRID as u32).save(path).unwrap();
        }
        let library = Library::load(root, BASE_GRID).unwrap();
        let grids = Grids::rasterize(&self.image, &library, BASE_GRID).unwrap();
        let interpreter = Interpreter::new(grids, library, Config::default());
        (interpreter, self.image.clone())
    }
}
