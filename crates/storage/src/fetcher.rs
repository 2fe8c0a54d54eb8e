//! Dataset fetchers.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::{Client, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

use overlay_common::{OverlayError, OverlayResult};

/// Loads dataset bytes addressed by a base-relative path.
#[async_trait]
pub trait DatasetFetcher: Send + Sync {
    /// Fetch the document at `relative_path`.
    async fn fetch(&self, relative_path: &str) -> OverlayResult<Bytes>;

    /// Human-readable base location for log lines.
    fn describe(&self) -> String;
}

/// Fetches datasets over HTTP relative to a base URL.
///
/// Relative paths resolve with URL `join` semantics, so a base of
/// `https://host/viewer/` maps `data/wind/...` under `/viewer/` and a viewer
/// served from a sub-path keeps working.
pub struct HttpDatasetFetcher {
    client: Client,
    base: Url,
}

impl HttpDatasetFetcher {
    pub fn new(base_url: &str) -> OverlayResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| OverlayError::InvalidConfig(format!("base URL {}: {}", base_url, e)))?;

        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| OverlayError::Fetch(format!("HTTP client: {}", e)))?;

        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Absolute URL for a relative dataset path.
    pub fn resolve(&self, relative_path: &str) -> OverlayResult<Url> {
        self.base
            .join(relative_path)
            .map_err(|e| OverlayError::Fetch(format!("cannot resolve {}: {}", relative_path, e)))
    }
}

#[async_trait]
impl DatasetFetcher for HttpDatasetFetcher {
    #[instrument(skip(self), fields(base = %self.base))]
    async fn fetch(&self, relative_path: &str) -> OverlayResult<Bytes> {
        let url = self.resolve(relative_path)?;
        debug!(url = %url, "Fetching dataset");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| OverlayError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(OverlayError::Fetch(format!("HTTP {} for {}", response.status(), url)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| OverlayError::Fetch(e.to_string()))?;
        debug!(size = bytes.len(), "Fetched dataset");
        Ok(bytes)
    }

    fn describe(&self) -> String {
        self.base.to_string()
    }
}

/// Reads datasets from a local directory laid out like the hosted one.
pub struct FsDatasetFetcher {
    root: PathBuf,
}

impl FsDatasetFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl DatasetFetcher for FsDatasetFetcher {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    async fn fetch(&self, relative_path: &str) -> OverlayResult<Bytes> {
        let path = self.root.join(relative_path.trim_start_matches('/'));
        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!(path = %path.display(), size = data.len(), "Read dataset");
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(OverlayError::Fetch(
                format!("not found: {}", path.display()),
            )),
            Err(e) => Err(e.into()),
        }
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
