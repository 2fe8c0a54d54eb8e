//! Point features shown over the wind overlay.
//!
//! Covers GeoJSON decoding, label and popup text, canonical name keys,
//! monitored/other volcano classification and the country border filter.

pub mod border;
pub mod classify;
pub mod error;
pub mod geojson;
pub mod names;
pub mod points;

pub use border::CountryFilter;
pub use classify::{Classification, VolcanoClassifier};
pub use error::{FeatureError, FeatureResult};
pub use geojson::{Feature, FeatureCollection, Geometry};
pub use names::{normalize, FallbackTitles, NameNormalizer, NameResolver, PopupText};
pub use points::{point_features, PointFeature};
