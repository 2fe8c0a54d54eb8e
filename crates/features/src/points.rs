//! Point features ready for marker and label binding.

use serde::Serialize;
use tracing::warn;

use overlay_common::{FeatureCategory, GeoPoint, LabelAnchor};

use crate::geojson::Feature;
use crate::names::{NameResolver, PopupText};

/// A point feature with its resolved label and popup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFeature {
    pub position: GeoPoint,
    pub category: FeatureCategory,
    pub label: String,
    pub anchor: LabelAnchor,
    pub popup: PopupText,
}

/// Resolve label and popup text for every Point feature.
///
/// Features without a usable point position are skipped.
pub fn point_features(
    features: &[Feature],
    category: FeatureCategory,
    resolver: &NameResolver,
) -> Vec<PointFeature> {
    let points: Vec<PointFeature> = features
        .iter()
        .filter_map(|feature| {
            let position = feature.point_position()?;
            Some(PointFeature {
                position,
                category,
                label: resolver.display_name(feature, category),
                anchor: category.label_anchor(),
                popup: resolver.popup(feature, category),
            })
        })
        .collect();

    let skipped = features.len() - points.len();
    if skipped > 0 {
        warn!(
            category = category.as_str(),
            skipped,
            "Skipped features without a point position"
        );
    }
    points
}
