//! Great-circle geometry on a spherical Earth.
//!
//! The small error of the spherical model against WGS84 is accepted; glyph
//! lengths are a visual encoding, not a measurement.

use overlay_common::GeoPoint;

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Point reached by travelling `distance_km` from (`lat`, `lon`) along the
/// initial compass bearing `bearing_deg`.
///
/// Non-finite input yields NaN coordinates; callers filter those first.
pub fn destination(lat: f64, lon: f64, bearing_deg: f64, distance_km: f64) -> GeoPoint {
    let brng = bearing_deg.to_radians();
    let phi1 = lat.to_radians();
    let lambda1 = lon.to_radians();
    let delta = distance_km / EARTH_RADIUS_KM;

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let (sin_delta, cos_delta) = delta.sin_cos();

    let sin_phi2 = sin_phi1 * cos_delta + cos_phi1 * sin_delta * brng.cos();
    let phi2 = sin_phi2.asin();
    let y = brng.sin() * sin_delta * cos_phi1;
    let x = cos_delta - sin_phi1 * sin_phi2;
    let lambda2 = lambda1 + y.atan2(x);

    GeoPoint::new(phi2.to_degrees(), lambda2.to_degrees())
}

/// Initial compass bearing in [0, 360) from `from` towards `to`.
pub fn initial_bearing(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_lambda = (to.lon - from.lon).to_radians();

    let y = d_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * d_lambda.cos();
    normalize_bearing(y.atan2(x).to_degrees())
}

/// Great-circle distance in kilometres (haversine).
pub fn distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_phi = phi2 - phi1;
    let d_lambda = (to.lon - from.lon).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Wrap a bearing into [0, 360).
pub fn normalize_bearing(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}
