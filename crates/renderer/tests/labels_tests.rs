//! Tests for label visibility policies and the label board.

use overlay_common::FeatureCategory;
use renderer::labels::{
    GroundScalePolicy, LabelBoard, LabelPolicy, LabelVisibility, ZoomBandPolicy,
};
use test_utils::{bbox, viewport};

fn araucania(zoom: u8) -> overlay_common::ViewportWindow {
    viewport(bbox::ARAUCANIA, zoom)
}

fn board() -> LabelBoard {
    let mut board = LabelBoard::new();
    board.bind(FeatureCategory::Smelter, "Fundición Caletones");
    board.bind(FeatureCategory::Monitored, "Llaima");
    board.bind(FeatureCategory::Other, "Sollipulli");
    board
}

// ============================================================================
// Zoom band
// ============================================================================

#[test]
fn test_zoom_band_thresholds() {
    let policy = ZoomBandPolicy::default();
    assert!(!policy.is_visible(FeatureCategory::Smelter, &araucania(4)));
    assert!(policy.is_visible(FeatureCategory::Smelter, &araucania(5)));
    assert!(!policy.is_visible(FeatureCategory::Monitored, &araucania(6)));
    assert!(policy.is_visible(FeatureCategory::Monitored, &araucania(7)));
    assert!(!policy.is_visible(FeatureCategory::Other, &araucania(8)));
    assert!(policy.is_visible(FeatureCategory::Other, &araucania(9)));
}

#[test]
fn test_zoom_band_board_walk() {
    let mut board = board();
    let policy = LabelPolicy::ZoomBand(ZoomBandPolicy::default());

    let toggles = board.update(&policy, &araucania(6));
    assert_eq!(toggles.len(), 1);
    assert!(toggles[0].open);
    assert_eq!(board.open_count(), 1);

    let toggles = board.update(&policy, &araucania(9));
    assert_eq!(toggles.len(), 2);
    assert_eq!(board.open_count(), 3);

    let toggles = board.update(&policy, &araucania(3));
    assert_eq!(toggles.len(), 3);
    assert!(toggles.iter().all(|t| !t.open));
    assert_eq!(board.open_count(), 0);
}

// ============================================================================
// Ground scale
// ============================================================================

#[test]
fn test_ground_scale_thresholds() {
    let policy = GroundScalePolicy::default();
    // ~1:14.6M at -38.6° z5, ~1:3.6M at z7, ~1:0.9M at z9
    assert!(policy.is_visible(FeatureCategory::Smelter, &araucania(5)));
    assert!(!policy.is_visible(FeatureCategory::Monitored, &araucania(5)));
    assert!(policy.is_visible(FeatureCategory::Monitored, &araucania(7)));
    assert!(!policy.is_visible(FeatureCategory::Other, &araucania(7)));
    assert!(policy.is_visible(FeatureCategory::Other, &araucania(9)));
    assert!(!policy.is_visible(FeatureCategory::Smelter, &araucania(4)));
}

#[test]
fn test_ground_scale_depends_on_latitude() {
    let policy = GroundScalePolicy {
        monitored: 6_000_000.0,
        ..GroundScalePolicy::default()
    };
    // Same zoom: about 1:9.2M near the equator, about 1:4.6M at 60°S
    let equator = viewport((-80.0, -2.0, -76.0, 2.0), 6);
    let south = viewport((-75.0, -62.0, -71.0, -58.0), 6);
    assert!(!policy.is_visible(FeatureCategory::Monitored, &equator));
    assert!(policy.is_visible(FeatureCategory::Monitored, &south));
}

// ============================================================================
// Board semantics
// ============================================================================

#[test]
fn test_update_never_rebinds() {
    let mut board = board();
    let ids: Vec<_> = board.labels().iter().map(|l| (l.id, l.text.clone())).collect();
    let policy = LabelPolicy::GroundScale(GroundScalePolicy::default());

    for zoom in [3, 6, 9, 12, 4] {
        board.update(&policy, &araucania(zoom));
    }

    assert_eq!(board.len(), 3);
    let after: Vec<_> = board.labels().iter().map(|l| (l.id, l.text.clone())).collect();
    assert_eq!(ids, after);
}

#[test]
fn test_repeated_update_reports_no_changes() {
    let mut board = board();
    let policy = LabelPolicy::default();
    assert!(!board.update(&policy, &araucania(8)).is_empty());
    assert!(board.update(&policy, &araucania(8)).is_empty());
}

#[test]
fn test_new_labels_start_closed() {
    let mut board = LabelBoard::new();
    let id = board.bind(FeatureCategory::Smelter, "Chagres");
    assert!(!board.is_open(id));
    board.update(&LabelPolicy::default(), &araucania(12));
    assert!(board.is_open(id));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_policy_from_json() {
    let policy: LabelPolicy =
        serde_json::from_str(r#"{"mode": "ground_scale", "monitored": 4000000.0}"#).unwrap();
    match policy {
        LabelPolicy::GroundScale(p) => {
            assert_eq!(p.monitored, 4_000_000.0);
            assert_eq!(p.other, 1_500_000.0);
            assert_eq!(p.scale.screen_dpi, 96.0);
        }
        other => panic!("unexpected policy {:?}", other),
    }

    let policy: LabelPolicy = serde_json::from_str(r#"{"mode": "zoom_band"}"#).unwrap();
    assert_eq!(policy, LabelPolicy::ZoomBand(ZoomBandPolicy::default()));
    assert_eq!(policy.mode(), "zoom_band");
}
