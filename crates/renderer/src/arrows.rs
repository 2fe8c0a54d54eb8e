//! Wind arrow glyphs built from U/V components.
//!
//! Each glyph is a shaft from the sample position along the direction the
//! wind blows towards, plus a two-segment chevron head at the tip. Shaft length
//! scales linearly with speed and saturates at both ends so calm and very fast
//! cells stay legible; the head length never changes.

use overlay_common::{GeoPoint, OverlayError, OverlayResult, WindSample};
use serde::{Deserialize, Serialize};

use crate::geodesic::{destination, normalize_bearing};

/// Angle between the shaft bearing and each head wing, in degrees.
pub const HEAD_WING_ANGLE_DEG: f64 = 150.0;

/// Configuration for arrow glyph geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowConfig {
    /// Speed that maps to `base_length_km` (m/s).
    pub reference_speed_mps: f64,
    /// Shaft length at the reference speed (km).
    pub base_length_km: f64,
    /// Shortest shaft drawn (km).
    pub min_length_km: f64,
    /// Longest shaft drawn (km).
    pub max_length_km: f64,
    /// Length of each chevron wing (km).
    pub head_length_km: f64,
}

impl Default for ArrowConfig {
    fn default() -> Self {
        Self {
            reference_speed_mps: 10.0,
            base_length_km: 120.0,
            min_length_km: 30.0,
            max_length_km: 220.0,
            head_length_km: 10.0,
        }
    }
}

impl ArrowConfig {
    /// Reject parameters that break monotonic scaling with saturation.
    pub fn validate(&self) -> OverlayResult<()> {
        let all_finite = [
            self.reference_speed_mps,
            self.base_length_km,
            self.min_length_km,
            self.max_length_km,
            self.head_length_km,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !all_finite {
            return Err(OverlayError::InvalidConfig(
                "arrow parameters must be finite".to_string(),
            ));
        }
        if self.reference_speed_mps <= 0.0 || self.base_length_km <= 0.0 {
            return Err(OverlayError::InvalidConfig(format!(
                "arrow reference speed and base length must be positive, got {} m/s and {} km",
                self.reference_speed_mps, self.base_length_km
            )));
        }
        if self.min_length_km < 0.0 || self.min_length_km > self.max_length_km {
            return Err(OverlayError::InvalidConfig(format!(
                "arrow length range {}..{} km is empty or negative",
                self.min_length_km, self.max_length_km
            )));
        }
        if self.head_length_km <= 0.0 {
            return Err(OverlayError::InvalidConfig(format!(
                "arrow head length must be positive, got {} km",
                self.head_length_km
            )));
        }
        Ok(())
    }

    /// Speed at and above which the shaft stops growing.
    pub fn saturation_speed_mps(&self) -> f64 {
        self.reference_speed_mps * self.max_length_km / self.base_length_km
    }
}

/// Stroke style applied to every arrow polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolylineStyle {
    /// Stroke colour (hex format, e.g., "#555555")
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub interactive: bool,
}

impl Default for PolylineStyle {
    fn default() -> Self {
        Self {
            color: "#555".to_string(),
            weight: 1.4,
            opacity: 0.75,
            interactive: false,
        }
    }
}

/// Geometry of one arrow: shaft `tail -> tip`, head `left -> tip -> right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowGlyph {
    pub tail: GeoPoint,
    pub tip: GeoPoint,
    pub left: GeoPoint,
    pub right: GeoPoint,
    /// Compass bearing of the shaft in [0, 360).
    pub bearing_deg: f64,
    /// Shaft length in kilometres.
    pub length_km: f64,
}

impl ArrowGlyph {
    pub fn shaft(&self) -> [GeoPoint; 2] {
        [self.tail, self.tip]
    }

    pub fn head(&self) -> [GeoPoint; 3] {
        [self.left, self.tip, self.right]
    }
}

/// Compass bearing in [0, 360) of the direction the wind blows towards.
pub fn wind_bearing(u: f64, v: f64) -> f64 {
    normalize_bearing(u.atan2(v).to_degrees())
}

/// Builds arrow glyphs from wind samples.
#[derive(Debug, Clone, Default)]
pub struct ArrowGlyphBuilder {
    config: ArrowConfig,
}

impl ArrowGlyphBuilder {
    pub fn new(config: ArrowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ArrowConfig {
        &self.config
    }

    /// Shaft length for a wind speed, clamped to the configured range.
    pub fn shaft_length_km(&self, speed_mps: f64) -> f64 {
        let c = &self.config;
        let raw = c.base_length_km * speed_mps / c.reference_speed_mps;
        raw.max(c.min_length_km).min(c.max_length_km)
    }

    /// Build the glyph for one sample, or `None` when any component is not finite.
    pub fn build(&self, sample: &WindSample) -> Option<ArrowGlyph> {
        if !sample.is_finite() {
            return None;
        }

        let bearing = wind_bearing(sample.u, sample.v);
        let length_km = self.shaft_length_km(sample.speed());
        let head = self.config.head_length_km;

        let tail = GeoPoint::new(sample.lat, sample.lon);
        let tip = destination(sample.lat, sample.lon, bearing, length_km);
        let left = destination(tip.lat, tip.lon, bearing + HEAD_WING_ANGLE_DEG, head);
        let right = destination(tip.lat, tip.lon, bearing - HEAD_WING_ANGLE_DEG, head);

        Some(ArrowGlyph {
            tail,
            tip,
            left,
            right,
            bearing_deg: bearing,
            length_km,
        })
    }
}
