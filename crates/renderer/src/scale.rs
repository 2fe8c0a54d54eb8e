//! Approximate cartographic scale at the viewport centre.

use overlay_common::ViewportWindow;
use serde::{Deserialize, Serialize};

/// Web Mercator ground resolution at the equator at zoom 0 (m/px).
pub const EQUATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

/// Converts zoom and latitude into a unitless "1:N" scale denominator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundScale {
    pub screen_dpi: f64,
    pub inches_per_meter: f64,
}

impl Default for GroundScale {
    fn default() -> Self {
        Self {
            screen_dpi: 96.0,
            inches_per_meter: 39.37,
        }
    }
}

impl GroundScale {
    /// Ground metres covered by one screen pixel.
    pub fn meters_per_pixel(center_lat: f64, zoom: u8) -> f64 {
        EQUATOR_METERS_PER_PIXEL * center_lat.to_radians().cos() / 2f64.powi(i32::from(zoom))
    }

    /// Scale denominator N for a latitude and zoom.
    pub fn denominator_at(&self, center_lat: f64, zoom: u8) -> f64 {
        Self::meters_per_pixel(center_lat, zoom) * self.screen_dpi * self.inches_per_meter
    }

    /// Scale denominator N at the centre of a viewport.
    pub fn denominator(&self, viewport: &ViewportWindow) -> f64 {
        self.denominator_at(viewport.center_lat, viewport.zoom)
    }
}

/// Thousands grouping convention for the scale readout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingLocale {
    #[default]
    En,
    Es,
    De,
    Fr,
}

impl GroupingLocale {
    pub fn separator(&self) -> char {
        match self {
            GroupingLocale::En => ',',
            GroupingLocale::Es | GroupingLocale::De => '.',
            GroupingLocale::Fr => '\u{202F}',
        }
    }

    /// Fewest integer digits that get grouped. Spanish leaves four-digit
    /// values ungrouped ("1234", "12.345").
    pub fn min_grouping_digits(&self) -> usize {
        match self {
            GroupingLocale::Es => 5,
            _ => 4,
        }
    }

    /// Round and group an integer part, e.g. 4003123.4 -> "4,003,123".
    pub fn group(&self, value: f64) -> String {
        let rounded = value.round().max(0.0) as u64;
        let digits = rounded.to_string();
        if digits.len() < self.min_grouping_digits() {
            return digits;
        }
        let sep = self.separator();

        let mut out = String::with_capacity(digits.len() + digits.len() / 3 * sep.len_utf8());
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(sep);
            }
            out.push(ch);
        }
        out
    }

    /// "1:N" readout for a scale denominator.
    pub fn format_scale(&self, denominator: f64) -> String {
        format!("1:{}", self.group(denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_zoom_zero() {
        let mpp = GroundScale::meters_per_pixel(0.0, 0);
        assert!((mpp - EQUATOR_METERS_PER_PIXEL).abs() < 1e-9);
    }

    #[test]
    fn test_each_zoom_halves_the_denominator() {
        let scale = GroundScale::default();
        let z5 = scale.denominator_at(-30.0, 5);
        let z6 = scale.denominator_at(-30.0, 6);
        assert!((z5 / z6 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_latitude_shrinks_the_denominator() {
        let scale = GroundScale::default();
        assert!(scale.denominator_at(60.0, 5) < scale.denominator_at(0.0, 5));
        let ratio = scale.denominator_at(60.0, 5) / scale.denominator_at(0.0, 5);
        assert!((ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_grouping() {
        assert_eq!(GroupingLocale::En.group(0.0), "0");
        assert_eq!(GroupingLocale::En.group(999.0), "999");
        assert_eq!(GroupingLocale::En.group(1000.0), "1,000");
        assert_eq!(GroupingLocale::En.group(4_003_123.4), "4,003,123");
        assert_eq!(GroupingLocale::Es.group(1_234_567.0), "1.234.567");
        assert_eq!(GroupingLocale::Es.group(1_234.0), "1234");
        assert_eq!(GroupingLocale::Es.group(12_345.0), "12.345");
        assert_eq!(GroupingLocale::De.group(1_234.0), "1.234");
        assert_eq!(GroupingLocale::Fr.group(12_345.0), "12\u{202F}345");
    }

    #[test]
    fn test_format_scale() {
        assert_eq!(GroupingLocale::En.format_scale(591_657_527.6), "1:591,657,528");
    }
}
