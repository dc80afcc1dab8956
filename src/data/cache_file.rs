use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config::{PERSISTENCE, straddle_cache_filename};
use crate::domain::StraddleSelection;
use crate::errors::FetchError;
use crate::models::StraddleHistory;
use crate::utils::time_utils::how_many_seconds_ago;

use super::source::HistoricalDataSource;

/// Serialized cache wrapper for one fetched selection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CacheFile {
    pub version: f64,
    pub timestamp_ms: i64,
    pub selection: StraddleSelection,
    pub data: StraddleHistory,
}

impl CacheFile {
    pub fn new(selection: StraddleSelection, data: StraddleHistory, version: f64) -> Self {
        Self {
            version,
            timestamp_ms: Utc::now().timestamp_millis(),
            selection,
            data,
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {}", parent.display()))?;
        }
        let file =
            File::create(path).context(format!("Failed to create file: {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        bincode::serialize_into(&mut writer, self)
            .context(format!("Failed to serialize cache to: {}", path.display()))
    }

    pub fn default_cache_path(selection: &StraddleSelection) -> PathBuf {
        PathBuf::from(PERSISTENCE.cache.directory)
            .join(straddle_cache_filename(&selection.index, &selection.strike_label()))
    }

    pub fn age_sec(&self) -> i64 {
        how_many_seconds_ago(self.timestamp_ms)
    }

    /// Reject caches written by another format version, for another selection, or too long ago.
    pub fn validate_for(&self, selection: &StraddleSelection, max_age_sec: i64) -> Result<()> {
        if self.version != PERSISTENCE.cache.version {
            bail!(
                "version mismatch (file {}, expected {})",
                self.version,
                PERSISTENCE.cache.version
            );
        }
        if &self.selection != selection {
            bail!("cache holds {} not {}", self.selection, selection);
        }
        let age = self.age_sec();
        if age > max_age_sec {
            bail!("cache is {}s old (limit {}s)", age, max_age_sec);
        }
        Ok(())
    }
}

/// Serves previously fetched history from disk.
pub struct CacheFileSource {
    directory: PathBuf,
    max_age_sec: i64,
}

impl CacheFileSource {
    pub fn new(directory: impl Into<PathBuf>, max_age_sec: i64) -> Self {
        Self {
            directory: directory.into(),
            max_age_sec,
        }
    }

    pub fn path_for(&self, selection: &StraddleSelection) -> PathBuf {
        self.directory
            .join(straddle_cache_filename(&selection.index, &selection.strike_label()))
    }

    async fn load(&self, selection: &StraddleSelection) -> Result<StraddleHistory> {
        let path = self.path_for(selection);
        let bytes = tokio::fs::read(&path)
            .await
            .context(format!("Failed to read cache file: {}", path.display()))?;
        let cache: CacheFile = bincode::deserialize(&bytes)
            .context(format!("Failed to deserialize cache: {}", path.display()))?;
        cache.validate_for(selection, self.max_age_sec)?;
        log::info!(
            "Using cache {} ({}s old)",
            path.display(),
            cache.age_sec()
        );
        Ok(cache.data)
    }
}

impl Default for CacheFileSource {
    fn default() -> Self {
        Self::new(PERSISTENCE.cache.directory, PERSISTENCE.cache.acceptable_age_sec)
    }
}

#[async_trait]
impl HistoricalDataSource for CacheFileSource {
    async fn fetch_historical_straddle(
        &self,
        selection: &StraddleSelection,
    ) -> Result<StraddleHistory, FetchError> {
        self.load(selection)
            .await
            .map_err(|e| FetchError::Cache(format!("{:#}", e)))
    }

    fn signature(&self) -> &'static str {
        "Local Cache"
    }
}

/// Wraps a network source and saves every history it delivers to the cache directory.
/// Only fetches write the cache; recomputing from held data never touches it.
pub struct WriteThroughCache<S> {
    inner: S,
    directory: PathBuf,
}

impl<S: HistoricalDataSource> WriteThroughCache<S> {
    pub fn new(inner: S, directory: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            directory: directory.into(),
        }
    }
}

#[async_trait]
impl<S: HistoricalDataSource> HistoricalDataSource for WriteThroughCache<S> {
    async fn fetch_historical_straddle(
        &self,
        selection: &StraddleSelection,
    ) -> Result<StraddleHistory, FetchError> {
        let history = self.inner.fetch_historical_straddle(selection).await?;

        let path = self
            .directory
            .join(straddle_cache_filename(&selection.index, &selection.strike_label()));
        let cache = CacheFile::new(selection.clone(), history.clone(), PERSISTENCE.cache.version);
        // A failed write only costs the next cold start a network fetch
        match tokio::task::spawn_blocking(move || cache.save_to_path(&path).map(|_| path)).await {
            Ok(Ok(path)) => log::info!("Cache written to {}", path.display()),
            Ok(Err(e)) => log::error!("⚠️  Failed to write cache: {:#}", e),
            Err(e) => log::error!("⚠️  Cache write task failed: {}", e),
        }
        Ok(history)
    }

    fn signature(&self) -> &'static str {
        self.inner.signature()
    }
}
