//! Persisted "recently viewed" list.
//!
//! Wraps a [`RecentHistory`] and writes it back to local storage after every
//! change, before the mutating call returns. Mutations take `&mut self`, so
//! all writes go through one owner.

use std::collections::VecDeque;
use std::sync::Arc;

use pokefetch_domain::{HistoryItem, RecentHistory};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ports::{KeyValueStorage, StorageError};

/// Storage key the history is persisted under.
pub const HISTORY_STORAGE_KEY: &str = "pokemon-history";

/// Errors that can occur while persisting history.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The history could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Recently viewed items backed by local storage.
pub struct HistoryService<T> {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    history: RecentHistory<T>,
}

impl<T> HistoryService<T>
where
    T: HistoryItem + Serialize + DeserializeOwned,
{
    /// Loads the history stored under [`HISTORY_STORAGE_KEY`].
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend cannot be read.
    pub async fn load(
        storage: Arc<dyn KeyValueStorage>,
        max_entries: usize,
    ) -> Result<Self, HistoryError> {
        Self::load_with_key(storage, HISTORY_STORAGE_KEY, max_entries).await
    }

    /// Loads the history stored under `key`.
    ///
    /// A missing key gives an empty history. Content that cannot be decoded
    /// is discarded with a warning. The configured `max_entries` replaces the
    /// stored capacity and the stored list is normalised against it.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage backend cannot be read.
    pub async fn load_with_key(
        storage: Arc<dyn KeyValueStorage>,
        key: &str,
        max_entries: usize,
    ) -> Result<Self, HistoryError> {
        let mut history = match storage.get(key).await? {
            None => RecentHistory::new(max_entries),
            Some(raw) => serde_json::from_str::<RecentHistory<T>>(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "discarding unreadable history");
                RecentHistory::new(max_entries)
            }),
        };
        history.set_max_entries(max_entries);
        history.normalize();
        debug!(key, entries = history.len(), "history loaded");

        Ok(Self {
            storage,
            key: key.to_string(),
            history,
        })
    }

    /// Records an item at the front and persists the list.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written. The in-memory list is
    /// updated regardless.
    pub async fn record(&mut self, item: T) -> Result<(), HistoryError> {
        self.history.record(item);
        self.save().await
    }

    /// Empties the list and persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the list cannot be written.
    pub async fn clear(&mut self) -> Result<(), HistoryError> {
        self.history.clear();
        self.save().await
    }

    /// Returns the entries, newest first.
    #[must_use]
    pub const fn entries(&self) -> &VecDeque<T> {
        self.history.entries()
    }

    /// Returns the underlying history.
    #[must_use]
    pub const fn history(&self) -> &RecentHistory<T> {
        &self.history
    }

    async fn save(&self) -> Result<(), HistoryError> {
        let encoded = serde_json::to_string(&self.history)?;
        self.storage.set(&self.key, &encoded).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use pokefetch_domain::{ViewedItem, ViewedKind};
    use pretty_assertions::assert_eq;

    #[derive(Default)]
    struct MapStorage {
        values: Mutex<HashMap<String, String>>,
        writes: Mutex<usize>,
    }

    impl MapStorage {
        fn with(key: &str, value: &str) -> Self {
            let storage = Self::default();
            storage
                .values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            storage
        }

        fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().unwrap().get(key).cloned()
        }

        fn writes(&self) -> usize {
            *self.writes.lock().unwrap()
        }
    }

    #[async_trait]
    impl KeyValueStorage for MapStorage {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Ok(self.raw(key))
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            *self.writes.lock().unwrap() += 1;
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn pokemon(name: &str) -> ViewedItem {
        ViewedItem::new(name, name, ViewedKind::Pokemon)
    }

    fn ids(service: &HistoryService<ViewedItem>) -> Vec<String> {
        service.entries().iter().map(|e| e.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_record_persists_every_change() {
        let storage = Arc::new(MapStorage::default());
        let mut service = HistoryService::<ViewedItem>::load(storage.clone(), 5)
            .await
            .unwrap();

        for name in ["A", "B", "C", "A"] {
            service.record(pokemon(name)).await.unwrap();
        }

        assert_eq!(ids(&service), vec!["A", "C", "B"]);
        assert_eq!(storage.writes(), 4);

        let reloaded = HistoryService::<ViewedItem>::load(storage.clone(), 5)
            .await
            .unwrap();
        assert_eq!(ids(&reloaded), vec!["A", "C", "B"]);
    }

    #[tokio::test]
    async fn test_clear_persists_empty_list() {
        let storage = Arc::new(MapStorage::default());
        let mut service = HistoryService::<ViewedItem>::load(storage.clone(), 5)
            .await
            .unwrap();
        service.record(pokemon("eevee")).await.unwrap();

        service.clear().await.unwrap();

        let reloaded = HistoryService::<ViewedItem>::load(storage, 5).await.unwrap();
        assert!(reloaded.entries().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_content_starts_empty() {
        let storage = Arc::new(MapStorage::with(HISTORY_STORAGE_KEY, "{not json"));

        let service = HistoryService::<ViewedItem>::load(storage, 5).await.unwrap();

        assert!(service.entries().is_empty());
        assert_eq!(service.history().max_entries(), 5);
    }

    #[tokio::test]
    async fn test_configured_capacity_wins_over_stored() {
        let storage = Arc::new(MapStorage::default());
        let mut service = HistoryService::<ViewedItem>::load(storage.clone(), 5)
            .await
            .unwrap();
        for name in ["a", "b", "c", "d"] {
            service.record(pokemon(name)).await.unwrap();
        }

        let smaller = HistoryService::<ViewedItem>::load(storage, 2).await.unwrap();

        assert_eq!(ids(&smaller), vec!["d", "c"]);
        assert_eq!(smaller.history().max_entries(), 2);
    }

    #[tokio::test]
    async fn test_custom_key() {
        let storage = Arc::new(MapStorage::default());
        let mut service = HistoryService::<ViewedItem>::load_with_key(storage.clone(), "cms-history", 3)
            .await
            .unwrap();
        service.record(pokemon("post-1")).await.unwrap();

        assert!(storage.raw("cms-history").is_some());
        assert!(storage.raw(HISTORY_STORAGE_KEY).is_none());
    }
}
