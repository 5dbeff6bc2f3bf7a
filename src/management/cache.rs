use std::{collections::BTreeMap, future::Future, io::ErrorKind, path::PathBuf};

use crate::{Res, types::AnalysisResult};

/// Persisted mapping from track id to its audio analysis.
///
/// Loaded once per run, mutated in memory, and written back in full by
/// [`AnalysisCache::persist`]. Failed analyses are stored as well so that a
/// track Spotify cannot analyze is not requested again on every run.
pub struct AnalysisCache {
    path: PathBuf,
    entries: BTreeMap<String, AnalysisResult>,
    recovered_from: Option<String>,
}

impl AnalysisCache {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            entries: BTreeMap::new(),
            recovered_from: None,
        }
    }

    /// Reads the cache file. A missing file yields an empty cache, and so does
    /// a corrupt one, with the reason kept in [`AnalysisCache::recovered_from`].
    pub async fn load(path: PathBuf) -> Self {
        let mut cache = Self::new(path);

        let content = match async_fs::read_to_string(&cache.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return cache,
            Err(e) => {
                cache.recovered_from = Some(e.to_string());
                return cache;
            }
        };

        match serde_json::from_str(&content) {
            Ok(entries) => cache.entries = entries,
            Err(e) => cache.recovered_from = Some(e.to_string()),
        }
        cache
    }

    /// Writes the whole mapping to a temporary file and moves it into place.
    pub async fn persist(&self) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read-through lookup.
    ///
    /// # Arguments
    ///
    /// * `key` - Spotify track id
    /// * `compute` - Produces the analysis on a miss; only called then
    ///
    /// # Returns
    ///
    /// - `Ok(AnalysisResult)` - The stored value on a hit, otherwise the freshly
    ///   computed one, which is stored before returning
    /// - `Err(Error)` - Whatever `compute` failed with; nothing is stored
    ///
    /// # Failed Analyses
    ///
    /// A result with `error` set is an ordinary value here: it is stored and
    /// served on later lookups like any other, so a track Spotify cannot
    /// analyze costs one request in total. `tempocli cache forget` removes it
    /// to try again.
    ///
    /// # Persistence
    ///
    /// Only the in-memory map changes. Nothing reaches the disk before
    /// [`AnalysisCache::persist`].
    pub async fn get_or_compute<F, Fut>(&mut self, key: &str, compute: F) -> Res<AnalysisResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Res<AnalysisResult>>,
    {
        if let Some(hit) = self.entries.get(key) {
            return Ok(hit.clone());
        }

        let result = compute().await?;
        self.entries.insert(key.to_string(), result.clone());
        Ok(result)
    }

    pub fn get(&self, key: &str) -> Option<&AnalysisResult> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn forget(&mut self, key: &str) -> Option<AnalysisResult> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.entries.values().filter(|r| r.is_failed()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnalysisResult)> {
        self.entries.iter()
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn recovered_from(&self) -> Option<&str> {
        self.recovered_from.as_deref()
    }

    /// Drops every entry and removes the file.
    pub async fn clear(&mut self) -> Res<()> {
        self.entries.clear();
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
