//! Versioned on-disk memoization.
//!
//! A cached value lives in `<dir>/<name>:<version>:<key>`. Bumping `version`
//! invalidates the previous entry, which is removed on the next lookup. A cache
//! file that cannot be read back is treated as missing.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::store::records::{read_single_record, write_single_record};
use crate::store::StoreError;

#[derive(Debug, Clone)]
pub struct ReadThroughCache {
    dir: PathBuf,
}

impl ReadThroughCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `(name, version, key)`.
    pub fn entry_path(&self, name: &str, version: u32, key: &str) -> PathBuf {
        let key = key.replace('/', "|");
        self.dir.join(format!("{name}:{version}:{key}"))
    }

    /// Return the cached value, or run `compute` and cache its result.
    pub fn get_or_compute<T, E, F>(&self, name: &str, version: u32, key: &str, compute: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<StoreError>,
        F: FnOnce() -> Result<T, E>,
    {
        fs::create_dir_all(&self.dir).map_err(StoreError::from)?;

        if let Some(prev) = version.checked_sub(1) {
            let stale = self.entry_path(name, prev, key);
            if stale.exists() {
                debug!("removing stale cache entry {}", stale.display());
                fs::remove_file(&stale).map_err(StoreError::from)?;
            }
        }

        let path = self.entry_path(name, version, key);
        if path.exists() {
            match read_single_record::<T>(&path) {
                Ok(value) => {
                    debug!("cache hit {}", path.display());
                    return Ok(value);
                }
                Err(e) => warn!("ignoring unreadable cache entry {}: {}", path.display(), e),
            }
        }

        let value = compute()?;
        write_single_record(&path, &value)?;
        Ok(value)
    }
}
