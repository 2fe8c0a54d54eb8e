//! Temporary dataset trees for fetcher and cache tests.

use std::fs;
use std::path::{Path, PathBuf};

use overlay_common::{DateKey, LevelKey};
use serde_json::Value;
use tempfile::TempDir;

/// A temporary directory laid out as `data/wind/{date}/{level}.json`.
///
/// The directory is removed when the tree is dropped.
pub struct DatasetTree {
    dir: TempDir,
}

impl DatasetTree {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    /// Root the relative dataset addresses resolve against.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write a JSON wind payload and return its path.
    pub fn write_wind(&self, date: DateKey, level: LevelKey, payload: &Value) -> PathBuf {
        let body = serde_json::to_vec(payload).expect("serialize payload");
        self.write_raw(
            &format!("data/wind/{}/{}.json", date.as_path_component(), level.as_str()),
            &body,
        )
    }

    /// Write arbitrary bytes at a relative path.
    pub fn write_raw(&self, relative: &str, body: &[u8]) -> PathBuf {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create dataset dirs");
        }
        fs::write(&path, body).expect("write dataset file");
        path
    }
}

impl Default for DatasetTree {
    fn default() -> Self {
        Self::new()
    }
}
