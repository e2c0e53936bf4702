use ratatui::style::Color;

use super::config::CalgraphConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeName {
    Green,
    Teal,
    Blue,
    Orange,
    Monochrome,
}

impl ThemeName {
    pub fn all() -> &'static [ThemeName] {
        &[
            ThemeName::Green,
            ThemeName::Teal,
            ThemeName::Blue,
            ThemeName::Orange,
            ThemeName::Monochrome,
        ]
    }

    pub fn next(self) -> ThemeName {
        let themes = Self::all();
        let idx = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(idx + 1) % themes.len()]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeName::Green => "green",
            ThemeName::Teal => "teal",
            ThemeName::Blue => "blue",
            ThemeName::Orange => "orange",
            ThemeName::Monochrome => "monochrome",
        }
    }
}

impl std::str::FromStr for ThemeName {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "green" => Ok(ThemeName::Green),
            "teal" => Ok(ThemeName::Teal),
            "blue" => Ok(ThemeName::Blue),
            "orange" => Ok(ThemeName::Orange),
            "monochrome" => Ok(ThemeName::Monochrome),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: ThemeName,
    /// Level ramp from empty (index 0) to hottest (index 4).
    pub colors: [Color; 5],
    pub background: Color,
    pub foreground: Color,
    pub border: Color,
    pub highlight: Color,
    pub muted: Color,
}

impl Theme {
    pub fn from_name(name: ThemeName) -> Self {
        let colors = match name {
            ThemeName::Green => [
                Color::Rgb(22, 27, 34),
                Color::Rgb(14, 68, 41),
                Color::Rgb(0, 109, 50),
                Color::Rgb(38, 166, 65),
                Color::Rgb(57, 211, 83),
            ],
            ThemeName::Teal => [
                Color::Rgb(22, 27, 34),
                Color::Rgb(0, 66, 66),
                Color::Rgb(0, 110, 110),
                Color::Rgb(36, 164, 152),
                Color::Rgb(58, 214, 198),
            ],
            ThemeName::Blue => [
                Color::Rgb(22, 27, 34),
                Color::Rgb(13, 42, 70),
                Color::Rgb(13, 65, 116),
                Color::Rgb(36, 98, 168),
                Color::Rgb(88, 146, 216),
            ],
            ThemeName::Orange => [
                Color::Rgb(22, 27, 34),
                Color::Rgb(94, 41, 10),
                Color::Rgb(150, 70, 12),
                Color::Rgb(219, 109, 40),
                Color::Rgb(250, 152, 82),
            ],
            ThemeName::Monochrome => [
                Color::Rgb(22, 27, 34),
                Color::Rgb(70, 70, 70),
                Color::Rgb(120, 120, 120),
                Color::Rgb(175, 175, 175),
                Color::Rgb(235, 235, 235),
            ],
        };

        let highlight = colors[4];

        let mut theme = Self {
            name,
            colors,
            background: Color::Rgb(13, 17, 23),
            foreground: Color::Rgb(230, 237, 243),
            border: Color::Rgb(48, 54, 61),
            highlight,
            muted: Color::Rgb(125, 133, 144),
        };
        theme.apply_overrides();
        theme
    }

    fn apply_overrides(&mut self) {
        let config = CalgraphConfig::load();
        for (i, slot) in self.colors.iter_mut().enumerate() {
            if let Some(color) = config.get_level_color(i) {
                *slot = color;
            }
        }
    }

    /// Map a scheme level onto the 5-color ramp. Schemes can have more
    /// levels than the ramp has colors, so scale proportionally.
    pub fn level_color(&self, level: u8, max_level: u8) -> Color {
        if level == 0 || max_level == 0 {
            return self.colors[0];
        }
        if max_level == 1 {
            return self.colors[4];
        }
        let idx = 1 + (level.min(max_level) as usize - 1) * 3 / (max_level as usize - 1);
        self.colors[idx.min(4)]
    }
}
