//! Geographic bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 degrees.
///
/// `min_lon > max_lon` after normalization means the box crosses the
/// antimeridian, which happens when the map view wraps around ±180°.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Longitude extent in degrees, accounting for antimeridian crossing.
    pub fn width(&self) -> f64 {
        let raw = self.max_lon - self.min_lon;
        if raw >= 0.0 {
            raw
        } else {
            raw + 360.0
        }
    }

    /// Latitude extent in degrees.
    pub fn height(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Centre of the box as (lat, lon).
    pub fn center(&self) -> (f64, f64) {
        let lat = (self.min_lat + self.max_lat) / 2.0;
        let lon = normalize_lon(self.min_lon + self.width() / 2.0);
        (lat, lon)
    }

    /// Check if a point is contained within this bbox (edges inclusive).
    pub fn contains_point(&self, lat: f64, lon: f64) -> bool {
        if !lat.is_finite() || !lon.is_finite() {
            return false;
        }
        if lat < self.min_lat || lat > self.max_lat {
            return false;
        }
        if self.width() >= 360.0 {
            return true;
        }

        let west = normalize_lon(self.min_lon);
        let east = normalize_lon(self.max_lon);
        let lon = normalize_lon(lon);

        if west <= east {
            lon >= west && lon <= east
        } else {
            lon >= west || lon <= east
        }
    }
}

/// Wrap a longitude into [-180, 180).
pub fn normalize_lon(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == 180.0 {
        -180.0
    } else {
        wrapped
    }
}
