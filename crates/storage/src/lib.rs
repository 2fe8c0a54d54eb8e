//! Wind dataset access for the overlay.
//!
//! Provides:
//! - Payload decoding for published wind datasets
//! - Fetchers over HTTP (base-relative URLs) and a local directory
//! - A per-level cache with generation tokens and lazy activation

pub mod dataset;
pub mod fetcher;
pub mod wind_cache;

pub use dataset::{decode_payload, DatasetAddress, DatasetMeta, DecodedDataset};
pub use fetcher::{DatasetFetcher, FsDatasetFetcher, HttpDatasetFetcher};
pub use wind_cache::{CachedDataset, RefreshOutcome, WindCacheStats, WindDatasetCache};
