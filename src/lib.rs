//! Interprets a 2-D visual programming language whose source is a PNG: a
//! grid of icon-classified tiles forms a spatial dataflow program, which
//! this crate evaluates and renders back into a copy of the source image.

pub mod bitmask;
pub mod canvas;
pub mod config;
pub mod diagnostics;
pub mod direction;
pub mod eval;
pub mod grid;
pub mod label;
pub mod library;
pub mod numeric;
pub mod render;
pub mod tile;
pub mod value;

#[cfg(test)]
pub(crate) mod testutil;

use std::path::Path;

use jane_eyre::eyre::{self, Context};

use crate::config::Config;
use crate::eval::Interpreter;
use crate::grid::Grids;
use crate::library::Library;

/// Summary of a single interpretation run, returned so the caller can log
/// or act on it without re-reading the interpreter's internals.
pub struct RunReport {
    pub diagnostics: usize,
}

/// Run the full pipeline: load the library, rasterise the program, run the
/// label pre-pass, evaluate every entry point, and write the result.
pub fn run(program_path: &Path, output_path: &Path, config: &Config, dump_tiles_path: Option<&Path>) -> eyre::Result<RunReport> {
    let image = image::open(program_path)
        .wrap_err_with(|| format!("opening program image {}", program_path.display()))?
        .to_rgba8();

    let library = Library::load(&config.library_root, config.base_grid)
        .wrap_err_with(|| format!("loading tile library from {}", config.library_root.display()))?;

    let grids = Grids::rasterize(&image, &library, config.base_grid)?;

    if let Some(dump_path) = dump_tiles_path {
        dump_tiles(&grids, dump_path)?;
    }

    let interpreter = Interpreter::new(grids, library, config.clone());
    let env = label::build_environment(&interpreter);
    let output = render::render(&interpreter, &env, &image);

    output
        .save(output_path)
        .wrap_err_with(|| format!("writing output image {}", output_path.display()))?;

    let diagnostics = interpreter.diagnostics().len();
    Ok(RunReport { diagnostics })
}

/// Serialise the classified tile grid (names only, row-major) as JSON, for
/// inspecting the classifier independently of evaluation.
fn dump_tiles(grids: &Grids, path: &Path) -> eyre::Result<()> {
    let mut rows: Vec<Vec<String>> = vec![Vec::with_capacity(grids.cols); grids.rows];
    for (_, y, name) in grids.entries() {
        rows[y as usize].push(name.to_string());
    }

    let file = std::fs::File::create(path).wrap_err_with(|| format!("creating tile dump {}", path.display()))?;
    serde_json::to_writer_pretty(file, &rows).wrap_err("writing tile dump JSON")
}
