//! Date keys addressing daily wind datasets and imagery time values.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::OverlayError;

/// A UTC calendar day in `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateKey(NaiveDate);

impl DateKey {
    const FORMAT: &'static str = "%Y-%m-%d";

    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// The current day in UTC.
    pub fn today_utc() -> Self {
        Self(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Path component used in dataset addresses.
    pub fn as_path_component(&self) -> String {
        self.0.format(Self::FORMAT).to_string()
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), Self::FORMAT)
            .map(Self)
            .map_err(|_| OverlayError::InvalidDate(s.to_string()))
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// How the imagery layer expects its TIME parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageryTimeFormat {
    /// The bare date, `2024-01-15`.
    Date,
    /// The daily composite instant, `2024-01-15T05:00:00Z`.
    #[default]
    #[serde(alias = "isoZ")]
    IsoZ,
}

impl ImageryTimeFormat {
    /// Hour of the daily composite the imagery service files each day under.
    const COMPOSITE_TIME: &'static str = "T05:00:00Z";

    /// TIME parameter value for a given day.
    pub fn time_param(&self, date: &DateKey) -> String {
        match self {
            ImageryTimeFormat::Date => date.to_string(),
            ImageryTimeFormat::IsoZ => format!("{}{}", date, Self::COMPOSITE_TIME),
        }
    }
}
