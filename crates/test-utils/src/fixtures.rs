//! Common test fixtures for wind overlay tests.
//!
//! Viewports, dates and JSON payloads shaped like the hosted data files.

use overlay_common::{BoundingBox, DateKey, LevelKey, ViewportWindow};
use serde_json::{json, Value};

/// Common bounding box definitions for testing, as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Continental Chile and the adjacent Pacific
    pub const CHILE: (f64, f64, f64, f64) = (-80.0, -56.0, -66.0, -17.0);

    /// Araucanía region (Llaima, Villarrica)
    pub const ARAUCANIA: (f64, f64, f64, f64) = (-73.5, -39.8, -71.0, -37.5);

    /// Crosses antimeridian (Pacific-centric)
    pub const PACIFIC: (f64, f64, f64, f64) = (160.0, -50.0, -140.0, 50.0);

    /// Single point (degenerate bbox)
    pub const POINT: (f64, f64, f64, f64) = (0.0, 0.0, 0.0, 0.0);
}

/// Build a [`BoundingBox`] from one of the [`bbox`] tuples.
pub fn bounds(b: (f64, f64, f64, f64)) -> BoundingBox {
    BoundingBox::new(b.0, b.1, b.2, b.3)
}

/// Viewport over `b` at `zoom`, centred on the box.
pub fn viewport(b: (f64, f64, f64, f64), zoom: u8) -> ViewportWindow {
    let bounds = bounds(b);
    let (center_lat, _) = bounds.center();
    ViewportWindow::new(bounds, zoom, center_lat)
}

/// The default map view: Chile at zoom 5.
pub fn chile_viewport() -> ViewportWindow {
    viewport(bbox::CHILE, 5)
}

/// A fixed date for dataset paths.
pub fn sample_date() -> DateKey {
    "2025-03-14".parse().expect("valid fixture date")
}

/// A second fixed date, one day after [`sample_date`].
pub fn next_date() -> DateKey {
    "2025-03-15".parse().expect("valid fixture date")
}

/// Named volcano positions used across tests, as (name, lat, lon).
pub mod volcanoes {
    pub const LLAIMA: (&str, f64, f64) = ("Volcán Llaima", -38.692, -71.729);
    pub const VILLARRICA: (&str, f64, f64) = ("Villarrica", -39.42, -71.93);
    pub const LASCAR: (&str, f64, f64) = ("Láscar", -23.37, -67.73);
    pub const OSORNO: (&str, f64, f64) = ("Volcán Osorno", -41.10, -72.49);
}

/// Wind payload as served under `data/wind/{date}/{level}.json`.
pub fn wind_payload(level: LevelKey, points: &[(f64, f64, f64, f64)], delta_minutes: f64) -> Value {
    let points: Vec<Value> = points
        .iter()
        .map(|(lat, lon, u, v)| json!({ "lat": lat, "lon": lon, "u": u, "v": v }))
        .collect();

    json!({
        "points": points,
        "meta": {
            "source": "GFS 0.25",
            "run_date": "20250314",
            "cycle_utc": "00",
            "forecast_hour": 12,
            "t_target_utc": "2025-03-14T12:00:00Z",
            "t_gfs_valid_utc": "2025-03-14T12:00:00Z",
            "delta_minutes": delta_minutes,
            "level_key": level.as_str(),
        }
    })
}

/// Payload written when the producer could not build a field.
pub fn error_payload(level: LevelKey, message: &str) -> Value {
    json!({
        "points": [],
        "meta": {
            "level_key": level.as_str(),
            "error": message,
        }
    })
}

/// GeoJSON point feature with arbitrary properties.
pub fn point_feature(lat: f64, lon: f64, properties: Value) -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [lon, lat] },
        "properties": properties,
    })
}

/// GeoJSON point feature named with the `name` property.
pub fn named_point(name: &str, lat: f64, lon: f64) -> Value {
    point_feature(lat, lon, json!({ "name": name }))
}

/// Wrap features into a FeatureCollection document.
pub fn feature_collection(features: Vec<Value>) -> Value {
    json!({ "type": "FeatureCollection", "features": features })
}

/// Country polygon feature with an `ADMIN` name.
pub fn country_feature(admin: &str, ring: &[(f64, f64)]) -> Value {
    let ring: Vec<Value> = ring.iter().map(|(lon, lat)| json!([lon, lat])).collect();
    json!({
        "type": "Feature",
        "geometry": { "type": "Polygon", "coordinates": [ring] },
        "properties": { "ADMIN": admin },
    })
}
