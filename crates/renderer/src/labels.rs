//! Label visibility for bound point-feature labels.
//!
//! Two policies are available and selected by configuration:
//! - zoom band: a minimum zoom per feature category
//! - ground scale: a maximum "1:N" denominator per feature category
//!
//! A [`LabelBoard`] owns the bound labels and their open state. Updating
//! the board only toggles state; labels are bound once and never rebuilt.

use overlay_common::{FeatureCategory, ViewportWindow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::scale::GroundScale;

/// Decides whether labels of a category are shown for a viewport.
pub trait LabelVisibility {
    fn is_visible(&self, category: FeatureCategory, viewport: &ViewportWindow) -> bool;
}

/// Minimum zoom at which each category shows its permanent label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomBandPolicy {
    pub smelter: u8,
    pub monitored: u8,
    pub other: u8,
}

impl Default for ZoomBandPolicy {
    fn default() -> Self {
        Self {
            smelter: 5,
            monitored: 7,
            other: 9,
        }
    }
}

impl ZoomBandPolicy {
    pub fn min_zoom(&self, category: FeatureCategory) -> u8 {
        match category {
            FeatureCategory::Smelter => self.smelter,
            FeatureCategory::Monitored => self.monitored,
            FeatureCategory::Other => self.other,
        }
    }
}

impl LabelVisibility for ZoomBandPolicy {
    fn is_visible(&self, category: FeatureCategory, viewport: &ViewportWindow) -> bool {
        viewport.zoom >= self.min_zoom(category)
    }
}

/// Maximum scale denominator at which each category shows its label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundScalePolicy {
    pub smelter: f64,
    pub monitored: f64,
    pub other: f64,
    pub scale: GroundScale,
}

impl Default for GroundScalePolicy {
    fn default() -> Self {
        Self {
            smelter: 20_000_000.0,
            monitored: 5_000_000.0,
            other: 1_500_000.0,
            scale: GroundScale::default(),
        }
    }
}

impl GroundScalePolicy {
    pub fn max_denominator(&self, category: FeatureCategory) -> f64 {
        match category {
            FeatureCategory::Smelter => self.smelter,
            FeatureCategory::Monitored => self.monitored,
            FeatureCategory::Other => self.other,
        }
    }
}

impl LabelVisibility for GroundScalePolicy {
    fn is_visible(&self, category: FeatureCategory, viewport: &ViewportWindow) -> bool {
        let denominator = self.scale.denominator(viewport);
        denominator.is_finite() && denominator <= self.max_denominator(category)
    }
}

/// Configured label policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum LabelPolicy {
    ZoomBand(ZoomBandPolicy),
    GroundScale(GroundScalePolicy),
}

impl Default for LabelPolicy {
    fn default() -> Self {
        LabelPolicy::ZoomBand(ZoomBandPolicy::default())
    }
}

impl LabelPolicy {
    pub fn mode(&self) -> &'static str {
        match self {
            LabelPolicy::ZoomBand(_) => "zoom_band",
            LabelPolicy::GroundScale(_) => "ground_scale",
        }
    }
}

impl LabelVisibility for LabelPolicy {
    fn is_visible(&self, category: FeatureCategory, viewport: &ViewportWindow) -> bool {
        match self {
            LabelPolicy::ZoomBand(p) => p.is_visible(category, viewport),
            LabelPolicy::GroundScale(p) => p.is_visible(category, viewport),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct BoundLabel {
    pub id: LabelId,
    pub category: FeatureCategory,
    pub text: String,
    pub open: bool,
}

/// Open state change for one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelToggle {
    pub id: LabelId,
    pub open: bool,
}

/// Labels bound to features, with their current open state.
#[derive(Debug, Default)]
pub struct LabelBoard {
    labels: Vec<BoundLabel>,
}

impl LabelBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a label. New labels start closed until the next update.
    pub fn bind(&mut self, category: FeatureCategory, text: impl Into<String>) -> LabelId {
        let id = LabelId(self.labels.len());
        self.labels.push(BoundLabel {
            id,
            category,
            text: text.into(),
            open: false,
        });
        id
    }

    pub fn get(&self, id: LabelId) -> Option<&BoundLabel> {
        self.labels.get(id.0)
    }

    pub fn is_open(&self, id: LabelId) -> bool {
        self.get(id).map(|l| l.open).unwrap_or(false)
    }

    pub fn labels(&self) -> &[BoundLabel] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.labels.iter().filter(|l| l.open).count()
    }

    /// Re-evaluate every bound label and return the ones whose state changed.
    pub fn update(
        &mut self,
        policy: &dyn LabelVisibility,
        viewport: &ViewportWindow,
    ) -> Vec<LabelToggle> {
        let mut toggles = Vec::new();
        for label in &mut self.labels {
            let open = policy.is_visible(label.category, viewport);
            if open != label.open {
                label.open = open;
                toggles.push(LabelToggle { id: label.id, open });
            }
        }

        debug!(
            zoom = viewport.zoom,
            bound = self.labels.len(),
            changed = toggles.len(),
            "Label visibility updated"
        );

        toggles
    }
}
