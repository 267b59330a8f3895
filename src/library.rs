//! Loads the tile-icon library: a directory of `base_grid x base_grid`
//! PNGs whose relative path (minus extension) is the tile's name.

use std::path::Path;

use jane_eyre::eyre::{self, Context};
use tracing::warn;
use walkdir::WalkDir;

use crate::bitmask::Bitmask;
use crate::tile::TileName;

pub struct Library {
    entries: Vec<(TileName, Bitmask)>,
}

impl Library {
    /// An icon-less library, useful for tests that only exercise structural
    /// checks (dimensions, grid shape) ahead of any classification.
    pub const fn empty() -> Self {
        Self { entries: Vec::new() }
    }

    /// Recursively load every `.png` under `root`. Mis-sized icons are
    /// skipped with a warning rather than aborting the load.
    pub fn load(root: &Path, base_grid: usize) -> eyre::Result<Self> {
        let mut entries = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = entry.wrap_err_with(|| format!("walking library root {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }

            let image = image::open(path)
                .wrap_err_with(|| format!("decoding library icon {}", path.display()))?
                .to_rgba8();

            if image.width() as usize != base_grid || image.height() as usize != base_grid {
                warn!(
                    path = %path.display(),
                    width = image.width(),
                    height = image.height(),
                    base_grid,
                    "library icon is not base_grid x base_grid, skipping"
                );
                continue;
            }

            let name = tile_name_for(root, path);
            let bitmask = Bitmask::from_block(&image, 0, 0, base_grid, base_grid);
            entries.push((TileName::from_library_name(&name), bitmask));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Classify a tile-sized bitmask by linear search through the library.
    pub fn classify(&self, bitmask: &Bitmask) -> TileName {
        self.entries
            .iter()
            .find(|(_, b)| b == bitmask)
            .map_or(TileName::Empty, |(name, _)| name.clone())
    }

    /// Look up the icon bitmask for a known tile name, used when rendering
    /// digit glyphs back into the output image.
    pub fn bitmask_for(&self, name: &TileName) -> Option<&Bitmask> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, b)| b)
    }
}

/// `images/functions/add.png` -> `functions/add`, independent of host path
/// separator.
fn tile_name_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let without_ext = relative.with_extension("");
    without_ext
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
