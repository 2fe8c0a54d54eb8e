//! Error types for feature loading.

use overlay_common::OverlayError;
use thiserror::Error;

pub type FeatureResult<T> = Result<T, FeatureError>;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Invalid GeoJSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Expected a FeatureCollection, found {0}")]
    NotFeatureCollection(String),
}

impl From<FeatureError> for OverlayError {
    fn from(err: FeatureError) -> Self {
        OverlayError::MalformedPayload(err.to_string())
    }
}
