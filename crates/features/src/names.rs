//! Feature names: display text and canonical keys.
//!
//! The same volcano appears as "Volcán Llaima" in one collection and "LLAIMA"
//! in another. [`normalize`] maps both to `"llaima"` so collections can be
//! matched by name.

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use overlay_common::FeatureCategory;

use crate::geojson::Feature;

/// Builds canonical name keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameNormalizer {
    /// Leading generic words dropped from keys, already folded.
    type_words: Vec<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(["volcan", "volcano"])
    }
}

impl NameNormalizer {
    pub fn new<I, S>(type_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let type_words = type_words
            .into_iter()
            .map(|w| fold(w.as_ref()).trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();
        Self { type_words }
    }

    /// Canonical key for a name.
    ///
    /// Lowercases, strips diacritics, drops a leading generic type word when
    /// another token follows it, and collapses whitespace.
    pub fn normalize(&self, name: &str) -> String {
        let folded = fold(name);
        let mut tokens: Vec<&str> = folded.split_whitespace().collect();
        if tokens.len() > 1 && self.type_words.iter().any(|w| w == tokens[0]) {
            tokens.remove(0);
        }
        tokens.join(" ")
    }
}

/// Lowercase and strip combining marks after canonical decomposition.
fn fold(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// Canonical key with the default type words.
pub fn normalize(name: &str) -> String {
    NameNormalizer::default().normalize(name)
}

/// Popup contents for a feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopupText {
    pub title: String,
    pub lines: Vec<String>,
}

impl PopupText {
    /// Title and detail lines joined with newlines.
    pub fn to_plain_text(&self) -> String {
        std::iter::once(self.title.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Titles used for features without a name, per category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackTitles {
    pub monitored: String,
    pub other: String,
    pub smelter: String,
}

impl Default for FallbackTitles {
    fn default() -> Self {
        Self {
            monitored: FeatureCategory::Monitored.fallback_title().to_string(),
            other: FeatureCategory::Other.fallback_title().to_string(),
            smelter: FeatureCategory::Smelter.fallback_title().to_string(),
        }
    }
}

impl FallbackTitles {
    pub fn get(&self, category: FeatureCategory) -> &str {
        match category {
            FeatureCategory::Monitored => &self.monitored,
            FeatureCategory::Other => &self.other,
            FeatureCategory::Smelter => &self.smelter,
        }
    }
}

/// Reads names and popup details out of feature properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NameResolver {
    /// Property keys tried in order for the display name.
    pub name_keys: Vec<String>,
    pub fallback_titles: FallbackTitles,
    /// Used when neither the feature nor its category title gives a name.
    pub unnamed: String,
    pub type_key: String,
    pub type_label: String,
    pub company_key: String,
    pub company_label: String,
}

impl Default for NameResolver {
    fn default() -> Self {
        Self {
            name_keys: vec!["name".to_string(), "Name".to_string(), "NOMBRE".to_string()],
            fallback_titles: FallbackTitles::default(),
            unnamed: "Unnamed".to_string(),
            type_key: "type".to_string(),
            type_label: "Type".to_string(),
            company_key: "empresa".to_string(),
            company_label: "Company".to_string(),
        }
    }
}

impl NameResolver {
    /// First non-blank value among the name keys.
    pub fn raw_name(&self, feature: &Feature) -> Option<String> {
        self.name_keys
            .iter()
            .find_map(|key| feature.text_property(key))
    }

    /// Display name, falling back to the category title.
    pub fn display_name(&self, feature: &Feature, category: FeatureCategory) -> String {
        self.raw_name(feature)
            .or_else(|| {
                let title = self.fallback_titles.get(category).trim();
                (!title.is_empty()).then(|| title.to_string())
            })
            .unwrap_or_else(|| self.unnamed.clone())
    }

    pub fn popup(&self, feature: &Feature, category: FeatureCategory) -> PopupText {
        let mut lines = Vec::new();
        if let Some(kind) = feature.text_property(&self.type_key) {
            lines.push(format!("{}: {}", self.type_label, kind));
        }
        if let Some(company) = feature.text_property(&self.company_key) {
            lines.push(format!("{}: {}", self.company_label, company));
        }
        PopupText {
            title: self.display_name(feature, category),
            lines,
        }
    }
}
