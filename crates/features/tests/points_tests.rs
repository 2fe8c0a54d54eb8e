//! Tests for label text, popups and the country border filter.

use features::{point_features, CountryFilter, Feature, FeatureCollection, NameResolver};
use overlay_common::{FeatureCategory, LabelDirection};
use serde_json::json;
use test_utils::{country_feature, feature_collection, named_point, point_feature};

fn feature(value: serde_json::Value) -> Feature {
    serde_json::from_value(value).unwrap()
}

// ============================================================================
// Names and popups
// ============================================================================

#[test]
fn test_name_key_order() {
    let resolver = NameResolver::default();
    let f = feature(point_feature(
        -33.0,
        -70.0,
        json!({ "NOMBRE": "Tercero", "Name": "Segundo", "name": "Primero" }),
    ));
    assert_eq!(resolver.raw_name(&f).as_deref(), Some("Primero"));

    let f = feature(point_feature(-33.0, -70.0, json!({ "name": "", "NOMBRE": "Tercero" })));
    assert_eq!(resolver.raw_name(&f).as_deref(), Some("Tercero"));
}

#[test]
fn test_fallback_title_per_category() {
    let resolver = NameResolver::default();
    let f = feature(point_feature(-33.0, -70.0, json!({})));
    assert_eq!(resolver.display_name(&f, FeatureCategory::Smelter), "Smelter");
    assert_eq!(resolver.display_name(&f, FeatureCategory::Other), "Volcano");

    let mut resolver = NameResolver::default();
    resolver.fallback_titles.other = String::new();
    assert_eq!(resolver.display_name(&f, FeatureCategory::Other), "Unnamed");
}

#[test]
fn test_popup_extras() {
    let resolver = NameResolver::default();
    let f = feature(point_feature(
        -34.09,
        -70.45,
        json!({ "name": "Caletones", "type": "Fundición", "empresa": "Codelco" }),
    ));
    let popup = resolver.popup(&f, FeatureCategory::Smelter);
    assert_eq!(popup.title, "Caletones");
    assert_eq!(popup.lines, vec!["Type: Fundición", "Company: Codelco"]);
    assert_eq!(popup.to_plain_text(), "Caletones\nType: Fundición\nCompany: Codelco");

    let bare = resolver.popup(&feature(named_point("Llaima", -38.7, -71.7)), FeatureCategory::Monitored);
    assert!(bare.lines.is_empty());
    assert_eq!(bare.to_plain_text(), "Llaima");
}

#[test]
fn test_point_features_skip_non_points() {
    let features = vec![
        feature(named_point("Llaima", -38.69, -71.73)),
        feature(country_feature("Chile", &[(-70.0, -30.0), (-69.0, -30.0), (-69.0, -29.0), (-70.0, -30.0)])),
        feature(json!({ "type": "Feature", "geometry": null, "properties": { "name": "Ghost" } })),
    ];
    let points = point_features(&features, FeatureCategory::Monitored, &NameResolver::default());
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].label, "Llaima");
    assert_eq!(points[0].position.lat, -38.69);
    assert_eq!(points[0].anchor.direction, LabelDirection::Top);
}

// ============================================================================
// Country border
// ============================================================================

#[test]
fn test_country_filter_candidates() {
    let ring = [(-70.0, -30.0), (-69.0, -30.0), (-69.0, -29.0), (-70.0, -30.0)];
    let collection: FeatureCollection = serde_json::from_value(feature_collection(vec![
        country_feature("Chile", &ring),
        country_feature("Argentina", &ring),
        json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "ADMIN": null, "SOVEREIGNT": "CHILE" }
        }),
        json!({ "type": "Feature", "geometry": null, "properties": { "name": "chile" } }),
    ]))
    .unwrap();

    let chile = CountryFilter::default().filter(collection);
    assert_eq!(chile.len(), 3);
    assert_eq!(chile.type_, "FeatureCollection");
}

#[test]
fn test_country_filter_other_country() {
    let ring = [(-70.0, -30.0), (-69.0, -30.0), (-69.0, -29.0), (-70.0, -30.0)];
    let collection: FeatureCollection = serde_json::from_value(feature_collection(vec![
        country_feature("Chile", &ring),
        country_feature("Argentina", &ring),
    ]))
    .unwrap();
    let argentina = CountryFilter::new("argentina").filter(collection);
    assert_eq!(argentina.len(), 1);
}

#[test]
fn test_empty_collection() {
    let empty = CountryFilter::default().filter(FeatureCollection::new());
    assert!(empty.is_empty());
}
