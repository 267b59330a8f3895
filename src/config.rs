//! Runtime-tunable defaults: tile size, library location, render colours.

use std::path::{Path, PathBuf};

use jane_eyre::eyre::{self, Context};
use serde::Deserialize;

pub const DEFAULT_BASE_GRID: usize = 5;
pub const DEFAULT_LIBRARY: &str = "images";

pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const WHITE: [u8; 4] = [255, 255, 255, 255];

/// Fields as they appear in an on-disk JSON config; every field is
/// optional so a config file only needs to mention what it overrides.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    base_grid: Option<usize>,
    library: Option<PathBuf>,
    on_colour: Option<[u8; 4]>,
    off_colour: Option<[u8; 4]>,
}

/// Fully resolved configuration the rest of the interpreter reads from.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_grid: usize,
    pub library_root: PathBuf,
    pub on_colour: [u8; 4],
    pub off_colour: [u8; 4],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_grid: DEFAULT_BASE_GRID,
            library_root: PathBuf::from(DEFAULT_LIBRARY),
            on_colour: RED,
            off_colour: WHITE,
        }
    }
}

impl Config {
    /// Load defaults, then apply overrides from an optional JSON file, then
    /// apply an optional explicit library-path override (the CLI flag takes
    /// precedence over the config file).
    pub fn load(config_path: Option<&Path>, library_override: Option<&Path>) -> eyre::Result<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("reading config file {}", path.display()))?;
            let file: ConfigFile = serde_json::from_str(&text)
                .wrap_err_with(|| format!("parsing config file {}", path.display()))?;

            if let Some(base_grid) = file.base_grid {
                eyre::ensure!(base_grid > 0, "config base_grid must be positive, got {base_grid}");
                config.base_grid = base_grid;
            }
            if let Some(library) = file.library {
                config.library_root = library;
            }
            if let Some(on_colour) = file.on_colour {
                config.on_colour = on_colour;
            }
            if let Some(off_colour) = file.off_colour {
                config.off_colour = off_colour;
            }
        }

        if let Some(library) = library_override {
            config.library_root = library.to_path_buf();
        }

        Ok(config)
    }
}
