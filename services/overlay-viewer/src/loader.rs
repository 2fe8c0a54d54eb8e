//! Startup loading of point features and the country border.
//!
//! A collection that fails to load is logged and skipped; the others and
//! the wind overlay keep working.

use std::sync::Arc;
use tracing::{info, warn};

use features::{point_features, FeatureCollection, PointFeature, VolcanoClassifier};
use overlay_common::{FeatureCategory, OverlayError, OverlayResult};
use storage::{DatasetFetcher, HttpDatasetFetcher};

use crate::config::ViewerConfig;

/// Point features ready for label binding, plus the border outline.
#[derive(Debug, Default)]
pub struct LoadedFeatures {
    pub points: Vec<PointFeature>,
    pub border: Option<FeatureCollection>,
    /// Collections that could not be loaded, with the reason.
    pub failures: Vec<String>,
}

impl LoadedFeatures {
    pub fn count(&self, category: FeatureCategory) -> usize {
        self.points.iter().filter(|p| p.category == category).count()
    }
}

async fn fetch_collection(
    fetcher: &dyn DatasetFetcher,
    relative_path: &str,
) -> OverlayResult<FeatureCollection> {
    let bytes = fetcher.fetch(relative_path).await?;
    Ok(FeatureCollection::from_slice(&bytes)?)
}

/// Load a countries collection from an absolute URL or a local path.
async fn fetch_countries(location: &str) -> OverlayResult<FeatureCollection> {
    let bytes = if location.starts_with("http://") || location.starts_with("https://") {
        HttpDatasetFetcher::new(location)?.fetch("").await?
    } else {
        tokio::fs::read(location).await.map_err(OverlayError::from)?.into()
    };
    Ok(FeatureCollection::from_slice(&bytes)?)
}

/// Load, classify and resolve every configured feature collection.
pub async fn load_features(config: &ViewerConfig, fetcher: Arc<dyn DatasetFetcher>) -> LoadedFeatures {
    let mut loaded = LoadedFeatures::default();
    let resolver = &config.names.resolver;
    let data = &config.data;

    let mut load = |label: &str, result: OverlayResult<FeatureCollection>| match result {
        Ok(collection) => Some(collection),
        Err(e) => {
            warn!(collection = label, error = %e, "Feature collection unavailable");
            loaded.failures.push(format!("{}: {}", label, e));
            None
        }
    };

    let monitored = load(
        &data.monitored_volcanoes,
        fetch_collection(fetcher.as_ref(), &data.monitored_volcanoes).await,
    );
    let all = load(
        &data.all_volcanoes,
        fetch_collection(fetcher.as_ref(), &data.all_volcanoes).await,
    );
    let smelters = load(
        &data.smelters,
        fetch_collection(fetcher.as_ref(), &data.smelters).await,
    );
    let countries = match data.countries.as_deref() {
        Some(location) => load(location, fetch_countries(location).await),
        None => None,
    };

    let classifier = VolcanoClassifier::new(config.names.normalizer(), resolver.clone());
    let reference = monitored.map(|c| c.features).unwrap_or_default();
    let candidates = all.map(|c| c.features).unwrap_or_default();
    let classification = classifier.classify(&reference, candidates);

    loaded.points.extend(point_features(
        &classification.monitored,
        FeatureCategory::Monitored,
        resolver,
    ));
    loaded.points.extend(point_features(
        &classification.other,
        FeatureCategory::Other,
        resolver,
    ));
    if let Some(smelters) = smelters {
        loaded.points.extend(point_features(
            &smelters.features,
            FeatureCategory::Smelter,
            resolver,
        ));
    }
    loaded.border = countries.map(|c| data.border.filter(c));

    info!(
        monitored = loaded.count(FeatureCategory::Monitored),
        other = loaded.count(FeatureCategory::Other),
        smelters = loaded.count(FeatureCategory::Smelter),
        border_features = loaded.border.as_ref().map(|b| b.len()).unwrap_or(0),
        "Loaded point features"
    );

    loaded
}
