//! Heat-level classification for daily totals.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::str::FromStr;

/// Maps a day's total minutes to a discrete heat level.
///
/// Level 0 means no activity. Any positive total lands on level 1 up to the
/// first threshold inclusive; each threshold strictly exceeded bumps the
/// level by one.
#[derive(Debug, Clone, Serialize)]
pub struct IntensityScheme {
    pub name: &'static str,
    pub thresholds: Vec<i64>,
}

impl IntensityScheme {
    pub fn level(&self, total_minutes: i64) -> u8 {
        if total_minutes <= 0 {
            return 0;
        }
        let above = self
            .thresholds
            .iter()
            .filter(|&&t| total_minutes > t)
            .count();
        (above + 1) as u8
    }

    /// Highest level this scheme can produce.
    pub fn max_level(&self) -> u8 {
        (self.thresholds.len() + 1) as u8
    }

    /// User-supplied thresholds. Rejected unless non-empty, positive, and
    /// strictly ascending.
    pub fn custom(thresholds: Vec<i64>) -> Option<Self> {
        if thresholds.is_empty() || thresholds[0] <= 0 {
            return None;
        }
        if !thresholds.windows(2).all(|w| w[0] < w[1]) {
            return None;
        }
        Some(IntensityScheme {
            name: "custom",
            thresholds,
        })
    }
}

/// Default hour-based buckets: 0, (0..=60], (60..=120], (120..=180], 180+.
static COARSE: Lazy<IntensityScheme> = Lazy::new(|| IntensityScheme {
    name: "coarse",
    thresholds: vec![60, 120, 180],
});

/// Half-hour-grained buckets for dense calendars.
static FINE: Lazy<IntensityScheme> = Lazy::new(|| IntensityScheme {
    name: "fine",
    thresholds: vec![30, 60, 90, 120, 180, 240, 300],
});

pub fn coarse_scheme() -> IntensityScheme {
    COARSE.clone()
}

pub fn fine_scheme() -> IntensityScheme {
    FINE.clone()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemeKind {
    #[default]
    Coarse,
    Fine,
}

impl SchemeKind {
    pub fn scheme(self) -> IntensityScheme {
        match self {
            SchemeKind::Coarse => coarse_scheme(),
            SchemeKind::Fine => fine_scheme(),
        }
    }
}

impl FromStr for SchemeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "coarse" => Ok(SchemeKind::Coarse),
            "fine" => Ok(SchemeKind::Fine),
            other => Err(format!(
                "unknown intensity scheme '{}', expected 'coarse' or 'fine'",
                other
            )),
        }
    }
}
