use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;

use ratatui::style::Color;
use serde::Deserialize;

static CONFIG: OnceLock<CalgraphConfig> = OnceLock::new();

/// Optional user overrides from `~/.calgraph` (TOML). Lets users repaint
/// individual heat levels or bring their own intensity thresholds without
/// defining a whole theme:
///
/// ```toml
/// [colors.levels]
/// 4 = "#ff0000"
///
/// [intensity]
/// thresholds = [45, 90, 150]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalgraphConfig {
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub intensity: IntensityConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColorsConfig {
    #[serde(default)]
    pub levels: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntensityConfig {
    #[serde(default)]
    pub thresholds: Vec<i64>,
}

impl CalgraphConfig {
    fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".calgraph"))
    }

    pub fn load() -> &'static CalgraphConfig {
        CONFIG.get_or_init(|| {
            Self::config_path()
                .and_then(|path| fs::read_to_string(path).ok())
                .and_then(|content| toml::from_str(&content).ok())
                .unwrap_or_default()
        })
    }

    pub fn get_level_color(&self, level_index: usize) -> Option<Color> {
        self.colors
            .levels
            .get(&level_index.to_string())
            .and_then(|hex| parse_hex_color(hex))
    }

    pub fn custom_thresholds(&self) -> Option<Vec<i64>> {
        if self.intensity.thresholds.is_empty() {
            None
        } else {
            Some(self.intensity.thresholds.clone())
        }
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
