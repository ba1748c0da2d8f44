use anyhow::{Context, Result};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
    pub data: DataConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for arrows and markers
    pub use_glyphs: bool,

    /// Number of cards side by side
    pub cards_per_row: usize,

    /// Show the status line at the bottom
    pub show_status_bar: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Reapply the last sort after switching clinic
    pub keep_sort_on_switch: bool,
}

/// Files that replace the bundled sources
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinics_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_patients_file: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_patients_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Card border color
    pub card_border: String,

    /// Highlight for the focused field
    pub focused_field: String,

    /// Title color
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            cards_per_row: 3,
            show_status_bar: true,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            card_border: "gray".to_string(),
            focused_field: "yellow".to_string(),
            title: "cyan".to_string(),
        }
    }
}

/// Widest grid the card layout supports
pub const MAX_CARDS_PER_ROW: usize = 12;

impl DisplayConfig {
    /// Cards per row, between 1 and `MAX_CARDS_PER_ROW`
    pub fn columns(&self) -> usize {
        self.cards_per_row.clamp(1, MAX_CARDS_PER_ROW)
    }
}

/// Map a color name from the config to a terminal color. Unknown names fall back to `fallback`.
pub fn parse_color(name: &str, fallback: Color) -> Color {
    match name.trim().to_lowercase().as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "gray" | "grey" => Color::Gray,
        "darkgray" | "dark_gray" | "darkgrey" => Color::DarkGray,
        "white" => Color::White,
        _ => fallback,
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Cannot parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load the config the user named, or the default one.
    ///
    /// A named file must load. Problems with the default location only cost
    /// the user their settings, so those fall back to defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        Ok(Self::load().unwrap_or_else(|e| {
            warn!(target: "config", "Using default config: {:#}", e);
            Self::default()
        }))
    }

    /// Save config to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("salve").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Salve patient viewer configuration
# Location: ~/.config/salve/config.toml (Linux)
#           ~/Library/Application Support/salve/config.toml (macOS)
#           %APPDATA%\salve\config.toml (Windows)

[display]
# Use Unicode arrows and markers; set to false for plain ASCII
use_glyphs = true

# Number of patient cards per row (1 to 12)
cards_per_row = 3

# Show the status line with dataset, record count and sort direction
show_status_bar = true

[behavior]
# Switching clinic shows the new patients in their original order.
# Set to true to reapply the last column sort instead.
keep_sort_on_switch = false

[data]
# Replace the bundled CSV files (leave commented to use the bundled data)
# clinics_file = "/path/to/clinics.csv"
# primary_patients_file = "/path/to/patients-1.csv"
# secondary_patients_file = "/path/to/patients-2.csv"

[theme]
# Colors: "black", "red", "green", "yellow", "blue", "magenta", "cyan",
#         "gray", "darkgray", "white"
card_border = "gray"
focused_field = "yellow"
title = "cyan"
"#
        .to_string()
    }
}
