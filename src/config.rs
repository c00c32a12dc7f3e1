use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::interaction::DEFAULT_DENSITY;
use crate::palette::ColorParseError;
use crate::palette::Palette;

/// Where the binary looks for its configuration when not told otherwise.
pub const DEFAULT_PATH: &str = "lifeloop.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid {field}: {source}")]
    Color {
        field: &'static str,
        source: ColorParseError,
    },
}

/// How the terminal host shows the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Display {
    /// Composited truecolor frame, two pixels per character
    #[default]
    Blocks,

    /// Live cells as braille dots, eight cells per character
    Braille,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Grid rows. Without both `rows` and `cols` the grid is fit to the viewport.
    pub rows: Option<usize>,
    pub cols: Option<usize>,

    /// Edge length of a cell in canvas pixels
    pub cell_size: usize,

    pub steps_per_second: f64,

    pub dead_color: String,
    pub alive_color: String,
    pub mesh_color: String,

    pub mesh: bool,
    pub mesh_opacity: f64,

    /// Share of the viewport width covered when fitting the grid
    pub density: f64,

    pub seed_pattern: Option<String>,
    pub autostart: bool,

    pub display: Display,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: None,
            cols: None,
            cell_size: 2,
            steps_per_second: 60.0,
            dead_color: "#000000".to_string(),
            alive_color: "#ffffff".to_string(),
            mesh_color: "#808080".to_string(),
            mesh: false,
            mesh_opacity: crate::compositor::MESH_OPACITY,
            density: DEFAULT_DENSITY,
            seed_pattern: Some("glider".to_string()),
            autostart: true,
            display: Display::Blocks,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Parse the three configured colors.
    pub fn palette(&self) -> Result<Palette, ConfigError> {
        let parse = |field: &'static str, value: &str| {
            value
                .parse()
                .map_err(|source| ConfigError::Color { field, source })
        };

        Ok(Palette::new(
            parse("dead_color", &self.dead_color)?,
            parse("alive_color", &self.alive_color)?,
            parse("mesh_color", &self.mesh_color)?,
        ))
    }
}

/// Read the config at `path`, falling back to defaults when it is missing or unreadable.
pub fn load(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match Config::read(path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), "{e}; using defaults");
            Config::default()
        }
    }
}
