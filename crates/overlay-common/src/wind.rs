//! Wind samples and fields.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{DateKey, LevelKey};

/// One raw field entry: position plus eastward (`u`) and northward (`v`)
/// wind components in m/s.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    pub lat: f64,
    pub lon: f64,
    pub u: f64,
    pub v: f64,
}

impl WindSample {
    pub fn new(lat: f64, lon: f64, u: f64, v: f64) -> Self {
        Self { lat, lon, u, v }
    }

    /// All four components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite() && self.u.is_finite() && self.v.is_finite()
    }

    /// Wind speed in m/s.
    pub fn speed(&self) -> f64 {
        (self.u * self.u + self.v * self.v).sqrt()
    }
}

/// A complete wind field for one (date, level).
///
/// Samples are shared behind an `Arc` so a cache swap hands readers either the
/// old sequence or the new one, never a mix.
#[derive(Debug, Clone)]
pub struct WindField {
    pub level: LevelKey,
    pub date: DateKey,
    /// Minutes between the model valid time and the displayed date, if known.
    pub delta_minutes: Option<f64>,
    pub samples: Arc<[WindSample]>,
}

impl WindField {
    pub fn new(
        level: LevelKey,
        date: DateKey,
        delta_minutes: Option<f64>,
        samples: Vec<WindSample>,
    ) -> Self {
        Self {
            level,
            date,
            delta_minutes,
            samples: samples.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether the model time is further from the displayed date than allowed.
    pub fn exceeds_freshness(&self, threshold_minutes: f64) -> bool {
        self.delta_minutes
            .map(|delta| delta > threshold_minutes)
            .unwrap_or(false)
    }
}
