//! Tests for the scale denominator and its readout.

use renderer::scale::{GroundScale, GroupingLocale};
use test_utils::{assert_approx_eq, bbox, viewport};

#[test]
fn test_denominator_formula() {
    let scale = GroundScale::default();
    let expected = 156_543.033_92 * (-40.0_f64).to_radians().cos() / 2f64.powi(7) * 96.0 * 39.37;
    assert_approx_eq!(scale.denominator_at(-40.0, 7), expected, 1e-6);
}

#[test]
fn test_denominator_for_viewport_uses_center_latitude() {
    let scale = GroundScale::default();
    let vp = viewport(bbox::ARAUCANIA, 8);
    assert_approx_eq!(scale.denominator(&vp), scale.denominator_at(vp.center_lat, 8), 1e-9);
}

#[test]
fn test_custom_dpi_scales_linearly() {
    let default = GroundScale::default();
    let retina = GroundScale {
        screen_dpi: 192.0,
        ..GroundScale::default()
    };
    assert_approx_eq!(
        retina.denominator_at(-33.0, 6),
        default.denominator_at(-33.0, 6) * 2.0,
        1e-6
    );
}

#[test]
fn test_readout_per_locale() {
    let n = 3_642_468.6;
    assert_eq!(GroupingLocale::En.format_scale(n), "1:3,642,469");
    assert_eq!(GroupingLocale::Es.format_scale(n), "1:3.642.469");
    assert_eq!(GroupingLocale::De.format_scale(n), "1:3.642.469");
    assert_eq!(GroupingLocale::Fr.format_scale(n), "1:3\u{202F}642\u{202F}469");
}

#[test]
fn test_readout_small_values_have_no_separator() {
    assert_eq!(GroupingLocale::En.format_scale(512.4), "1:512");
    assert_eq!(GroupingLocale::Es.format_scale(0.0), "1:0");
}

#[test]
fn test_locale_from_config_string() {
    let locale: GroupingLocale = serde_json::from_str(r#""es""#).unwrap();
    assert_eq!(locale, GroupingLocale::Es);
}
