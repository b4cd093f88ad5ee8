//! Processed-URL bookkeeping.
//!
//! The pipeline itself never touches this store; the caller consults it
//! before handing candidates over and marks successes afterwards, so a
//! URL scraped in one run is not fetched again in the next.

use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument};

/// Errors from loading or persisting the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to access processed-URL store: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse processed-URL store: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Remembers which URLs have already been processed.
pub trait ProcessedUrlStore {
    fn is_processed(&self, url: &str) -> bool;
    fn mark_processed(&mut self, url: &str);
}

/// A JSON-file-backed store: a flat array of URL strings, loaded at
/// startup and written back on [`JsonFileStore::flush`].
pub struct JsonFileStore {
    path: PathBuf,
    urls: HashSet<String>,
    dirty: bool,
}

impl JsonFileStore {
    /// Load the store, treating a missing file as an empty store.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let urls = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => {
                let list: Vec<String> = serde_json::from_str(&raw)?;
                list.into_iter().collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };

        info!(known_urls = urls.len(), "Loaded processed-URL store");
        Ok(Self {
            path,
            urls,
            dirty: false,
        })
    }

    /// Persist the store if anything was marked since the last flush.
    pub async fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        let mut list: Vec<&String> = self.urls.iter().collect();
        list.sort();
        let json = serde_json::to_string_pretty(&list)?;
        tokio::fs::write(&self.path, json).await?;
        self.dirty = false;
        info!(known_urls = self.urls.len(), path = %self.path.display(), "Flushed processed-URL store");
        Ok(())
    }
}

impl ProcessedUrlStore for JsonFileStore {
    fn is_processed(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    fn mark_processed(&mut self, url: &str) {
        if self.urls.insert(url.to_string()) {
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::load(dir.path().join("processed.json"))
            .await
            .unwrap();
        assert!(!store.is_processed("https://example.com/a"));
    }

    #[tokio::test]
    async fn test_mark_and_query() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::load(dir.path().join("processed.json"))
            .await
            .unwrap();

        store.mark_processed("https://example.com/a");
        assert!(store.is_processed("https://example.com/a"));
        assert!(!store.is_processed("https://example.com/b"));
    }

    #[tokio::test]
    async fn test_flush_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");

        let mut store = JsonFileStore::load(&path).await.unwrap();
        store.mark_processed("https://example.com/a");
        store.mark_processed("https://example.com/b");
        store.flush().await.unwrap();

        let reloaded = JsonFileStore::load(&path).await.unwrap();
        assert!(reloaded.is_processed("https://example.com/a"));
        assert!(reloaded.is_processed("https://example.com/b"));
        assert!(!reloaded.is_processed("https://example.com/c"));
    }

    #[tokio::test]
    async fn test_flush_without_changes_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");

        let mut store = JsonFileStore::load(&path).await.unwrap();
        store.flush().await.unwrap();
        // No marks, no file.
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_corrupt_store_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("processed.json");
        std::fs::write(&path, "{broken").unwrap();

        let result = JsonFileStore::load(&path).await;
        assert!(matches!(result, Err(StoreError::Parse(_))));
    }
}
