//! Viewport snapshots taken from the map surface.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::BoundingBox;

/// Tile size of the slippy-map pyramid in pixels.
const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the Web Mercator projection.
const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A (lat, lon) pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// GeoJSON coordinate order: [lon, lat].
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Read-only snapshot of what the map currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportWindow {
    pub bounds: BoundingBox,
    pub zoom: u8,
    pub center_lat: f64,
}

impl ViewportWindow {
    pub fn new(bounds: BoundingBox, zoom: u8, center_lat: f64) -> Self {
        Self {
            bounds,
            zoom,
            center_lat,
        }
    }

    /// Build the viewport a Web Mercator map of `width` x `height` pixels shows
    /// when centred on (`center_lat`, `center_lon`) at `zoom`.
    pub fn from_center(center_lat: f64, center_lon: f64, zoom: u8, width: u32, height: u32) -> Self {
        let world = TILE_SIZE * 2f64.powi(i32::from(zoom));
        let center_lat = center_lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);

        let cx = (center_lon + 180.0) / 360.0 * world;
        let cy = (1.0 - center_lat.to_radians().tan().asinh() / PI) / 2.0 * world;

        let half_w = f64::from(width) / 2.0;
        let half_h = f64::from(height) / 2.0;

        let min_lon = (cx - half_w) / world * 360.0 - 180.0;
        let max_lon = (cx + half_w) / world * 360.0 - 180.0;
        let max_lat = pixel_y_to_lat((cy - half_h).max(0.0), world);
        let min_lat = pixel_y_to_lat((cy + half_h).min(world), world);

        Self {
            bounds: BoundingBox::new(min_lon, min_lat, max_lon, max_lat),
            zoom,
            center_lat,
        }
    }

    pub fn center_lat_rad(&self) -> f64 {
        self.center_lat.to_radians()
    }
}

fn pixel_y_to_lat(y: f64, world: f64) -> f64 {
    (PI * (1.0 - 2.0 * y / world)).sinh().atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center_is_centred() {
        let vp = ViewportWindow::from_center(-30.0, -71.0, 4, 1024, 768);
        let (_, lon) = vp.bounds.center();
        assert!((lon - (-71.0)).abs() < 1e-9);
        assert!(vp.bounds.contains_point(-30.0, -71.0));
        assert_eq!(vp.zoom, 4);
    }

    #[test]
    fn test_higher_zoom_shows_less() {
        let wide = ViewportWindow::from_center(-30.0, -71.0, 4, 800, 600);
        let close = ViewportWindow::from_center(-30.0, -71.0, 8, 800, 600);
        assert!(close.bounds.width() < wide.bounds.width());
        assert!(close.bounds.height() < wide.bounds.height());
        // Each zoom step halves the longitude span.
        assert!((wide.bounds.width() / close.bounds.width() - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_zero_spans_the_world_width() {
        let vp = ViewportWindow::from_center(0.0, 0.0, 0, 256, 256);
        assert!((vp.bounds.width() - 360.0).abs() < 1e-9);
        assert!((vp.bounds.max_lat - MAX_MERCATOR_LAT).abs() < 1e-6);
    }
}
