//! GeoJSON types for feature collections.
//!
//! Input collections (volcanoes, smelters, country borders) are read with
//! arbitrary properties; output collections (snapshots) use the same types.

use overlay_common::GeoPoint;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FeatureError, FeatureResult};

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Type identifier (always "FeatureCollection").
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default)]
    pub features: Vec<Feature>,

    /// Collection-level metadata (a foreign member in GeoJSON terms).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl FeatureCollection {
    /// Create a new empty FeatureCollection.
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
            properties: None,
        }
    }

    /// Decode a FeatureCollection document.
    pub fn from_slice(bytes: &[u8]) -> FeatureResult<Self> {
        let collection: FeatureCollection = serde_json::from_slice(bytes)?;
        if collection.type_ != "FeatureCollection" {
            return Err(FeatureError::NotFeatureCollection(collection.type_));
        }
        Ok(collection)
    }

    /// Add a feature to the collection.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features.push(feature);
        self
    }

    /// Add multiple features to the collection.
    pub fn with_features(mut self, features: impl IntoIterator<Item = Feature>) -> Self {
        self.features.extend(features);
        self
    }

    /// Set a collection-level property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Null geometries are allowed by GeoJSON.
    #[serde(default)]
    pub geometry: Option<Geometry>,

    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry: Some(geometry),
            properties: Some(Map::new()),
        }
    }

    /// Create a new feature with a point geometry.
    pub fn point(lon: f64, lat: f64) -> Self {
        Self::new(Geometry::point(lon, lat))
    }

    /// Create a new feature with a LineString geometry through `points`.
    pub fn line_string(points: &[GeoPoint]) -> Self {
        Self::new(Geometry::line_string(points))
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// Property rendered as text: strings as-is, numbers and booleans
    /// formatted, blank strings and other values treated as absent.
    pub fn text_property(&self, key: &str) -> Option<String> {
        match self.property(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Position of a Point feature.
    pub fn point_position(&self) -> Option<GeoPoint> {
        match self.geometry.as_ref()? {
            Geometry::Point { coordinates } if coordinates.len() >= 2 => {
                let point = GeoPoint::new(coordinates[1], coordinates[0]);
                point.is_finite().then_some(point)
            }
            _ => None,
        }
    }
}

/// GeoJSON geometry types. Positions keep any extra ordinates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point {
        coordinates: Vec<f64>,
    },
    MultiPoint {
        coordinates: Vec<Vec<f64>>,
    },
    LineString {
        coordinates: Vec<Vec<f64>>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    GeometryCollection {
        geometries: Vec<Geometry>,
    },
}

impl Geometry {
    /// Create a point geometry.
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: vec![lon, lat],
        }
    }

    /// Create a line string geometry.
    pub fn line_string(points: &[GeoPoint]) -> Self {
        Geometry::LineString {
            coordinates: points.iter().map(|p| p.to_lon_lat().to_vec()).collect(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }
}
