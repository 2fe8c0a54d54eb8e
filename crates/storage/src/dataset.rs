//! Published wind dataset payloads.
//!
//! Datasets live at `data/wind/{date}/{level}.json` relative to the viewer's
//! base location:
//!
//! ```json
//! { "points": [{"lat": -33.0, "lon": -70.0, "u": 5.0, "v": 5.0}],
//!   "meta": {"level_key": "10m", "delta_minutes": 30} }
//! ```

use overlay_common::{DateKey, LevelKey, OverlayResult, WindField, WindSample};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Relative address of one wind dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DatasetAddress {
    pub date: DateKey,
    pub level: LevelKey,
}

impl DatasetAddress {
    pub fn new(date: DateKey, level: LevelKey) -> Self {
        Self { date, level }
    }

    /// Path relative to the base location. Never starts with `/`.
    pub fn relative_path(&self) -> String {
        format!(
            "data/wind/{}/{}.json",
            self.date.as_path_component(),
            self.level.as_str()
        )
    }
}

/// Metadata written alongside the points by the dataset producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMeta {
    #[serde(default)]
    pub level_key: Option<String>,
    /// Minutes between the model valid time and the target time.
    #[serde(default)]
    pub delta_minutes: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub run_date: Option<String>,
    #[serde(default)]
    pub cycle_utc: Option<String>,
    #[serde(default)]
    pub forecast_hour: Option<u32>,
    #[serde(default)]
    pub t_target_utc: Option<String>,
    #[serde(default)]
    pub t_gfs_valid_utc: Option<String>,
    /// Set when the producer failed to build the field.
    #[serde(default)]
    pub error: Option<String>,
}

/// One raw point. Missing or null components decode as NaN so a single bad
/// point is skipped at glyph time instead of failing the field.
#[derive(Debug, Deserialize)]
struct RawPoint {
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    u: Option<f64>,
    #[serde(default)]
    v: Option<f64>,
}

impl RawPoint {
    fn into_sample(self) -> WindSample {
        let nan = f64::NAN;
        WindSample::new(
            self.lat.unwrap_or(nan),
            self.lon.unwrap_or(nan),
            self.u.unwrap_or(nan),
            self.v.unwrap_or(nan),
        )
    }
}

#[derive(Debug, Deserialize)]
struct WindPayload {
    #[serde(default)]
    points: Vec<RawPoint>,
    #[serde(default)]
    meta: DatasetMeta,
}

/// A decoded dataset: the field plus its metadata.
#[derive(Debug, Clone)]
pub struct DecodedDataset {
    pub field: WindField,
    pub meta: DatasetMeta,
}

impl DecodedDataset {
    /// Producer-side failure message, if the payload reports one.
    pub fn build_error(&self) -> Option<&str> {
        self.meta.error.as_deref()
    }
}

/// Decode a payload fetched for `address`.
pub fn decode_payload(bytes: &[u8], address: DatasetAddress) -> OverlayResult<DecodedDataset> {
    let payload: WindPayload = serde_json::from_slice(bytes)?;

    if let Some(key) = payload.meta.level_key.as_deref() {
        if key != address.level.as_str() {
            warn!(
                requested = %address.level,
                reported = %key,
                date = %address.date,
                "Dataset level_key does not match the requested level"
            );
        }
    }

    let samples: Vec<WindSample> = payload
        .points
        .into_iter()
        .map(RawPoint::into_sample)
        .collect();
    let delta = payload.meta.delta_minutes.filter(|d| d.is_finite());

    Ok(DecodedDataset {
        field: WindField::new(address.level, address.date, delta, samples),
        meta: payload.meta,
    })
}
