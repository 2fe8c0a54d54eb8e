//! Monitored/other partition of volcano features.

use std::collections::HashSet;
use tracing::info;

use crate::geojson::Feature;
use crate::names::{NameNormalizer, NameResolver};

/// Result of [`VolcanoClassifier::classify`].
///
/// Every candidate lands in exactly one of `monitored` or `other`, in input order.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub monitored: Vec<Feature>,
    pub other: Vec<Feature>,
    /// Canonical keys of the monitored reference collection.
    pub monitored_keys: HashSet<String>,
}

impl Classification {
    pub fn total(&self) -> usize {
        self.monitored.len() + self.other.len()
    }
}

/// Partitions a combined volcano set by canonical name.
#[derive(Debug, Clone, Default)]
pub struct VolcanoClassifier {
    normalizer: NameNormalizer,
    resolver: NameResolver,
}

impl VolcanoClassifier {
    pub fn new(normalizer: NameNormalizer, resolver: NameResolver) -> Self {
        Self {
            normalizer,
            resolver,
        }
    }

    /// Canonical key of a feature's name; empty when it has none.
    pub fn key_of(&self, feature: &Feature) -> String {
        self.resolver
            .raw_name(feature)
            .map(|name| self.normalizer.normalize(&name))
            .unwrap_or_default()
    }

    /// Split `candidates` into those named like a `monitored` feature and the rest.
    pub fn classify(&self, monitored: &[Feature], candidates: Vec<Feature>) -> Classification {
        let monitored_keys: HashSet<String> = monitored
            .iter()
            .map(|f| self.key_of(f))
            .filter(|key| !key.is_empty())
            .collect();

        let (monitored_out, other): (Vec<Feature>, Vec<Feature>) = candidates
            .into_iter()
            .partition(|f| monitored_keys.contains(&self.key_of(f)));

        info!(
            reference = monitored.len(),
            keys = monitored_keys.len(),
            monitored = monitored_out.len(),
            other = other.len(),
            "Classified volcanoes"
        );

        Classification {
            monitored: monitored_out,
            other,
            monitored_keys,
        }
    }
}
