//! Wind level and point-feature category definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::OverlayError;

/// Atmospheric level selecting which wind field to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelKey {
    #[serde(rename = "10m")]
    Surface10m,
    #[serde(rename = "900hPa")]
    Hpa900,
    #[serde(rename = "400hPa")]
    Hpa400,
    #[serde(rename = "150hPa")]
    Hpa150,
}

impl LevelKey {
    /// Every published level, lowest first.
    pub const ALL: [LevelKey; 4] = [
        LevelKey::Surface10m,
        LevelKey::Hpa900,
        LevelKey::Hpa400,
        LevelKey::Hpa150,
    ];

    /// Key used in dataset paths and payload metadata.
    pub fn as_str(&self) -> &'static str {
        match self {
            LevelKey::Surface10m => "10m",
            LevelKey::Hpa900 => "900hPa",
            LevelKey::Hpa400 => "400hPa",
            LevelKey::Hpa150 => "150hPa",
        }
    }

    /// Overlay title shown in the layer control.
    pub fn display_name(&self) -> &'static str {
        match self {
            LevelKey::Surface10m => "Wind (10 m)",
            LevelKey::Hpa900 => "Wind (~1 km, 900 hPa)",
            LevelKey::Hpa400 => "Wind (~7 km, 400 hPa)",
            LevelKey::Hpa150 => "Wind (~15 km, 150 hPa)",
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LevelKey {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LevelKey::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| OverlayError::InvalidLevel(s.to_string()))
    }
}

/// Display category of a point feature with a bound label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// Volcanoes in the monitored reference collection.
    Monitored,
    /// Every other volcano.
    Other,
    /// Industrial smelters.
    Smelter,
}

impl FeatureCategory {
    pub const ALL: [FeatureCategory; 3] = [
        FeatureCategory::Monitored,
        FeatureCategory::Other,
        FeatureCategory::Smelter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCategory::Monitored => "monitored",
            FeatureCategory::Other => "other",
            FeatureCategory::Smelter => "smelter",
        }
    }

    /// Title used when a feature carries no usable name.
    pub fn fallback_title(&self) -> &'static str {
        match self {
            FeatureCategory::Monitored | FeatureCategory::Other => "Volcano",
            FeatureCategory::Smelter => "Smelter",
        }
    }

    /// Where the permanent label sits relative to the marker.
    pub fn label_anchor(&self) -> LabelAnchor {
        match self {
            FeatureCategory::Monitored => LabelAnchor::top(-12),
            FeatureCategory::Other => LabelAnchor::top(-10),
            FeatureCategory::Smelter => LabelAnchor::right(8),
        }
    }
}

impl fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label placement relative to its marker, with a pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelAnchor {
    pub direction: LabelDirection,
    pub offset: [i32; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelDirection {
    Top,
    Right,
}

impl LabelAnchor {
    fn top(dy: i32) -> Self {
        Self {
            direction: LabelDirection::Top,
            offset: [0, dy],
        }
    }

    fn right(dx: i32) -> Self {
        Self {
            direction: LabelDirection::Right,
            offset: [dx, 0],
        }
    }
}
