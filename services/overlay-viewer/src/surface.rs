//! Collaborators the session draws through.
//!
//! A map widget implements [`RenderSurface`] and [`StatusSink`]. The viewer
//! ships [`GeoJsonSurface`], which records every draw call and can export the
//! result as a GeoJSON snapshot, and [`StatusLog`], which keeps every message.

use std::collections::BTreeMap;

use features::{Feature, FeatureCollection, PointFeature};
use overlay_common::{GeoPoint, LevelKey};
use renderer::{LabelId, PolylineStyle};
use serde::Serialize;

/// Imagery layer parameters for the current date and opacity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageryState {
    pub url: String,
    pub layers: String,
    pub version: String,
    pub format: String,
    pub transparent: bool,
    pub styles: String,
    pub attribution: String,
    /// TIME parameter for the selected date.
    pub time: String,
    pub opacity: f64,
}

/// Drawing layer of the map.
pub trait RenderSurface {
    /// Remove every polyline from a wind level's layer.
    fn clear_layer(&mut self, level: LevelKey);

    fn add_polyline(&mut self, level: LevelKey, points: &[GeoPoint], style: &PolylineStyle);

    /// Attach a permanent label to a point feature. Called once per label.
    fn bind_label(&mut self, id: LabelId, feature: &PointFeature);

    fn set_label_open(&mut self, id: LabelId, open: bool);

    fn set_imagery(&mut self, imagery: &ImageryState);
}

/// Receives user-visible status text.
pub trait StatusSink {
    fn set_status(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<GeoPoint>,
    pub style: PolylineStyle,
}

#[derive(Debug, Clone)]
struct BoundMarker {
    feature: PointFeature,
    open: bool,
}

/// Surface that records draw calls in memory.
#[derive(Debug, Default)]
pub struct GeoJsonSurface {
    layers: BTreeMap<LevelKey, Vec<Polyline>>,
    clears: BTreeMap<LevelKey, usize>,
    labels: BTreeMap<LabelId, BoundMarker>,
    imagery: Option<ImageryState>,
}

impl GeoJsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn polylines(&self, level: LevelKey) -> &[Polyline] {
        self.layers.get(&level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of times a level's layer was cleared.
    pub fn clear_count(&self, level: LevelKey) -> usize {
        self.clears.get(&level).copied().unwrap_or(0)
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_label_open(&self, id: LabelId) -> Option<bool> {
        self.labels.get(&id).map(|m| m.open)
    }

    pub fn imagery(&self) -> Option<&ImageryState> {
        self.imagery.as_ref()
    }

    /// Export polylines and labels as a FeatureCollection.
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut collection = FeatureCollection::new();

        for (level, polylines) in &self.layers {
            for (i, polyline) in polylines.iter().enumerate() {
                // Glyphs are drawn as shaft then head.
                let part = if i % 2 == 0 { "shaft" } else { "head" };
                collection.features.push(
                    Feature::line_string(&polyline.points)
                        .with_property("layer", level.as_str())
                        .with_property("part", part)
                        .with_property("color", polyline.style.color.clone())
                        .with_property("weight", polyline.style.weight)
                        .with_property("opacity", polyline.style.opacity),
                );
            }
        }

        for (id, marker) in &self.labels {
            let f = &marker.feature;
            collection.features.push(
                Feature::point(f.position.lon, f.position.lat)
                    .with_property("label_id", id.0)
                    .with_property("category", f.category.as_str())
                    .with_property("label", f.label.clone())
                    .with_property("label_open", marker.open)
                    .with_property("popup", f.popup.to_plain_text()),
            );
        }

        collection
    }
}

impl RenderSurface for GeoJsonSurface {
    fn clear_layer(&mut self, level: LevelKey) {
        self.layers.entry(level).or_default().clear();
        *self.clears.entry(level).or_default() += 1;
    }

    fn add_polyline(&mut self, level: LevelKey, points: &[GeoPoint], style: &PolylineStyle) {
        self.layers.entry(level).or_default().push(Polyline {
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn bind_label(&mut self, id: LabelId, feature: &PointFeature) {
        self.labels.insert(
            id,
            BoundMarker {
                feature: feature.clone(),
                open: false,
            },
        );
    }

    fn set_label_open(&mut self, id: LabelId, open: bool) {
        if let Some(marker) = self.labels.get_mut(&id) {
            marker.open = open;
        }
    }

    fn set_imagery(&mut self, imagery: &ImageryState) {
        self.imagery = Some(imagery.clone());
    }
}

/// Status sink that keeps every message.
#[derive(Debug, Default, Clone)]
pub struct StatusLog {
    messages: Vec<String>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

impl StatusSink for StatusLog {
    fn set_status(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}
