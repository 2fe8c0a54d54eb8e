//! Common types and utilities shared across the wind overlay crates.

pub mod bbox;
pub mod error;
pub mod layer;
pub mod time;
pub mod viewport;
pub mod wind;

pub use bbox::BoundingBox;
pub use error::{OverlayError, OverlayResult};
pub use layer::{FeatureCategory, LabelAnchor, LabelDirection, LevelKey};
pub use time::{DateKey, ImageryTimeFormat};
pub use viewport::{GeoPoint, ViewportWindow};
pub use wind::{WindField, WindSample};
