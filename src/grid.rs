//! Slices a program image into a grid of classified tiles.

use image::RgbaImage;
use jane_eyre::eyre::{self, ensure};

use crate::bitmask::Bitmask;
use crate::library::Library;
use crate::tile::TileName;

/// The program as a read-only grid of tile names, paired with the raw
/// bitmask of every cell (labels key on bitmask, not name).
pub struct Grids {
    names: Vec<Vec<TileName>>,
    bitmasks: Vec<Vec<Bitmask>>,
    pub rows: usize,
    pub cols: usize,
    pub base_grid: usize,
}

impl Grids {
    pub fn rasterize(image: &RgbaImage, library: &Library, base_grid: usize) -> eyre::Result<Self> {
        let (width, height) = image.dimensions();
        ensure!(
            width as usize % base_grid == 0 && height as usize % base_grid == 0,
            "program image {width}x{height} is not a multiple of base_grid ({base_grid})"
        );

        let cols = width as usize / base_grid;
        let rows = height as usize / base_grid;

        let mut names = Vec::with_capacity(rows);
        let mut bitmasks = Vec::with_capacity(rows);

        for ty in 0..rows {
            let mut name_row = Vec::with_capacity(cols);
            let mut bitmask_row = Vec::with_capacity(cols);
            for tx in 0..cols {
                let bitmask = Bitmask::from_block(
                    image,
                    (tx * base_grid) as u32,
                    (ty * base_grid) as u32,
                    base_grid,
                    base_grid,
                );
                let name = library.classify(&bitmask);
                name_row.push(name);
                bitmask_row.push(bitmask);
            }
            names.push(name_row);
            bitmasks.push(bitmask_row);
        }

        Ok(Self { names, bitmasks, rows, cols, base_grid })
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.cols && (y as usize) < self.rows
    }

    pub fn name(&self, x: i64, y: i64) -> Option<&TileName> {
        self.in_bounds(x, y).then(|| &self.names[y as usize][x as usize])
    }

    pub fn bitmask(&self, x: i64, y: i64) -> Option<&Bitmask> {
        self.in_bounds(x, y).then(|| &self.bitmasks[y as usize][x as usize])
    }

    pub fn entries(&self) -> impl Iterator<Item = (i64, i64, &TileName)> {
        self.names.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .map(move |(x, name)| (x as i64, y as i64, name))
        })
    }
}
