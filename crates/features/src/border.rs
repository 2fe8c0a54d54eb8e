//! Country border selection from a world countries collection.

use serde::{Deserialize, Serialize};

use crate::geojson::{Feature, FeatureCollection};

/// Keeps features whose country name property equals `country`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountryFilter {
    pub country: String,
    /// Property keys tried in order.
    pub name_keys: Vec<String>,
}

impl Default for CountryFilter {
    fn default() -> Self {
        Self {
            country: "Chile".to_string(),
            name_keys: ["ADMIN", "name", "NAME", "COUNTRY", "SOVEREIGNT"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl CountryFilter {
    pub fn new(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            ..Self::default()
        }
    }

    /// Case-insensitive match on any candidate key.
    pub fn matches(&self, feature: &Feature) -> bool {
        let wanted = self.country.to_lowercase();
        self.name_keys.iter().any(|key| {
            feature
                .text_property(key)
                .map(|value| value.to_lowercase() == wanted)
                .unwrap_or(false)
        })
    }

    pub fn filter(&self, collection: FeatureCollection) -> FeatureCollection {
        FeatureCollection::new().with_features(
            collection
                .features
                .into_iter()
                .filter(|f| self.matches(f)),
        )
    }
}
