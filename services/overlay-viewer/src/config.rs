//! Viewer configuration loading and types.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use features::{CountryFilter, NameNormalizer, NameResolver};
use overlay_common::{ImageryTimeFormat, LevelKey, OverlayResult};
use renderer::labels::{GroundScalePolicy, ZoomBandPolicy};
use renderer::sampling::StrideStep;
use renderer::{ArrowConfig, GroupingLocale, LabelPolicy, PolylineStyle, StrideTable};

/// Viewer configuration loaded from YAML with environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub map: MapConfig,
    pub data: DataConfig,
    pub wind: WindConfig,
    /// Label visibility policy, selected by `mode`.
    pub labels: LabelPolicy,
    pub names: NamesConfig,
    pub imagery: ImageryConfig,
    pub readout: ReadoutConfig,
    /// Quiet period before a viewport change triggers a render.
    pub debounce_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            data: DataConfig::default(),
            wind: WindConfig::default(),
            labels: LabelPolicy::default(),
            names: NamesConfig::default(),
            imagery: ImageryConfig::default(),
            readout: ReadoutConfig::default(),
            debounce_ms: 250,
        }
    }
}

impl ViewerConfig {
    /// Load from a YAML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Viewer config file does not exist, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse: {:?}", path))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `OVERLAY_*` environment overrides.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("OVERLAY_DATA_BASE_URL") {
            self.data.base_url = Some(url);
        }

        if let Some(mode) = lookup("OVERLAY_LABEL_POLICY") {
            self.labels = match (mode.trim().to_lowercase().as_str(), self.labels) {
                ("zoom_band", current @ LabelPolicy::ZoomBand(_)) => current,
                ("zoom_band", _) => LabelPolicy::ZoomBand(ZoomBandPolicy::default()),
                ("ground_scale", current @ LabelPolicy::GroundScale(_)) => current,
                ("ground_scale", _) => LabelPolicy::GroundScale(GroundScalePolicy::default()),
                (other, _) => anyhow::bail!("Unknown OVERLAY_LABEL_POLICY: {}", other),
            };
        }

        if let Some(minutes) = lookup("OVERLAY_FRESHNESS_THRESHOLD_MINUTES") {
            self.wind.freshness_threshold_minutes = minutes
                .trim()
                .parse()
                .with_context(|| format!("Invalid OVERLAY_FRESHNESS_THRESHOLD_MINUTES: {}", minutes))?;
        }

        if let Some(ms) = lookup("OVERLAY_DEBOUNCE_MS") {
            self.debounce_ms = ms
                .trim()
                .parse()
                .with_context(|| format!("Invalid OVERLAY_DEBOUNCE_MS: {}", ms))?;
        }

        Ok(())
    }
}

/// Initial map view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: u8,
    pub max_zoom: u8,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center_lat: -30.0,
            center_lon: -71.0,
            zoom: 4,
            max_zoom: 10,
        }
    }
}

/// Where datasets and feature collections come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Base URL relative paths resolve against. Takes precedence over `base_dir`.
    pub base_url: Option<String>,
    /// Local directory laid out like the hosted site.
    pub base_dir: PathBuf,
    pub monitored_volcanoes: String,
    pub all_volcanoes: String,
    pub smelters: String,
    /// Absolute URL or local path of a world countries collection.
    pub countries: Option<String>,
    pub border: CountryFilter,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            base_dir: PathBuf::from("."),
            monitored_volcanoes: "data/volcanoes_ovdas.geojson".to_string(),
            all_volcanoes: "data/volcanoes.geojson".to_string(),
            smelters: "data/smelters_13.geojson".to_string(),
            countries: Some(
                "https://raw.githubusercontent.com/datasets/geo-countries/master/data/countries.geojson"
                    .to_string(),
            ),
            border: CountryFilter::default(),
        }
    }
}

/// Wind overlay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Levels active at startup. Wind overlays are off unless listed.
    pub levels: Vec<LevelKey>,
    /// Model time offsets above this raise an advisory.
    pub freshness_threshold_minutes: f64,
    pub arrows: ArrowConfig,
    pub stride: StrideConfig,
    pub style: PolylineStyle,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            levels: Vec::new(),
            freshness_threshold_minutes: 90.0,
            arrows: ArrowConfig::default(),
            stride: StrideConfig::default(),
            style: PolylineStyle::default(),
        }
    }
}

/// Stride table as written in YAML; validated by [`StrideConfig::table`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StrideConfig {
    pub steps: Vec<StrideStep>,
    pub finest: usize,
}

impl Default for StrideConfig {
    fn default() -> Self {
        let table = StrideTable::default();
        Self {
            steps: table.steps().to_vec(),
            finest: table.finest(),
        }
    }
}

impl StrideConfig {
    pub fn table(&self) -> OverlayResult<StrideTable> {
        StrideTable::new(self.steps.clone(), self.finest)
    }
}

/// Name handling for point features.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    /// Leading words dropped from canonical keys.
    pub type_words: Vec<String>,
    #[serde(flatten)]
    pub resolver: NameResolver,
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            type_words: vec!["volcan".to_string(), "volcano".to_string()],
            resolver: NameResolver::default(),
        }
    }
}

impl NamesConfig {
    pub fn normalizer(&self) -> NameNormalizer {
        NameNormalizer::new(&self.type_words)
    }
}

/// Imagery (WMS) layer parameters forwarded to the surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageryConfig {
    pub url: String,
    pub layers: String,
    pub version: String,
    pub format: String,
    pub transparent: bool,
    pub styles: String,
    pub attribution: String,
    pub time_format: ImageryTimeFormat,
    /// Initial opacity, clamped to [0, 1] when applied.
    pub opacity: f64,
}

impl Default for ImageryConfig {
    fn default() -> Self {
        Self {
            url: "https://geoservice.dlr.de/eoc/atmosphere/wms".to_string(),
            layers: "S5P_TROPOMI_L3_P1D_SO2_v2".to_string(),
            version: "1.3.0".to_string(),
            format: "image/png".to_string(),
            transparent: true,
            styles: String::new(),
            attribution: "EOC Geoservice (DLR)".to_string(),
            time_format: ImageryTimeFormat::IsoZ,
            opacity: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadoutConfig {
    pub locale: GroupingLocale,
}
