//! Persisted, ordered collection of recordings

use thiserror::Error;
use tracing::debug;

use super::ports::{KeyValueStore, PersistenceError};
use crate::domain::recording::{Recording, RecordingId};

/// Key the recording list is stored under
pub const RECORDINGS_KEY: &str = "audio-recordings";

/// Errors from the recording store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Stored recordings are corrupt: {0}")]
    Corrupt(String),

    #[error("Failed to serialize recordings: {0}")]
    Serialize(String),

    #[error("A recording with id {0} already exists")]
    DuplicateId(RecordingId),
}

/// Recording repository backed by a key-value store.
///
/// Entries are kept in creation order; every mutation is written through
/// to the backend before it is reported as done. A failed write leaves the
/// in-memory list unchanged.
pub struct RecordingStore<S: KeyValueStore> {
    backend: S,
    key: String,
    recordings: Vec<Recording>,
}

impl<S: KeyValueStore> RecordingStore<S> {
    /// Load the store from the default key. No stored data means an empty list.
    pub async fn open(backend: S) -> Result<Self, StoreError> {
        Self::open_with_key(backend, RECORDINGS_KEY).await
    }

    /// Load the store from a custom key
    pub async fn open_with_key(backend: S, key: impl Into<String>) -> Result<Self, StoreError> {
        let key = key.into();
        let recordings: Vec<Recording> = match backend.get(&key).await? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))?
            }
            None => Vec::new(),
        };
        debug!(key = %key, count = recordings.len(), "recording store loaded");

        Ok(Self {
            backend,
            key,
            recordings,
        })
    }

    /// All recordings in creation order
    pub fn all(&self) -> &[Recording] {
        &self.recordings
    }

    /// Recordings most recent first, paired with their display number.
    /// Number `n` is the n-th recording ever kept, so the newest is `len()`.
    pub fn newest_first(&self) -> impl Iterator<Item = (usize, &Recording)> + '_ {
        self.recordings
            .iter()
            .enumerate()
            .rev()
            .map(|(index, recording)| (index + 1, recording))
    }

    /// Look up a recording by its display number
    pub fn by_number(&self, number: usize) -> Option<&Recording> {
        number
            .checked_sub(1)
            .and_then(|index| self.recordings.get(index))
    }

    pub fn get(&self, id: &RecordingId) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &RecordingId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Highest id currently stored
    pub fn latest_id(&self) -> Option<&RecordingId> {
        self.recordings.iter().map(Recording::id).max()
    }

    /// Backend the store writes to
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Add a recording at the end of the list
    pub async fn append(&mut self, recording: Recording) -> Result<(), StoreError> {
        if self.contains(recording.id()) {
            return Err(StoreError::DuplicateId(recording.id().clone()));
        }

        let id = recording.id().clone();
        self.recordings.push(recording);
        if let Err(e) = self.persist().await {
            self.recordings.pop();
            return Err(e);
        }

        debug!(id = %id, count = self.recordings.len(), "recording appended");
        Ok(())
    }

    /// Remove the recording with `id`.
    /// Returns the removed entry, or `None` when no such recording exists.
    pub async fn delete(&mut self, id: &RecordingId) -> Result<Option<Recording>, StoreError> {
        let Some(position) = self.recordings.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let removed = self.recordings.remove(position);
        if let Err(e) = self.persist().await {
            self.recordings.insert(position, removed);
            return Err(e);
        }

        debug!(id = %id, count = self.recordings.len(), "recording deleted");
        Ok(Some(removed))
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let raw = serde_json::to_string(&self.recordings)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.backend.set(&self.key, &raw).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{AudioData, AudioMimeType};
    use crate::infrastructure::MemoryStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn recording(id: u64, secs: u32) -> Recording {
        Recording::new(
            RecordingId::from_millis(id),
            AudioData::new(vec![id as u8; 8], AudioMimeType::Wav),
            secs,
            id,
        )
        .unwrap()
    }

    struct FlakyStore {
        fail_writes: AtomicBool,
        inner: MemoryStore,
    }

    #[async_trait]
    impl KeyValueStore for FlakyStore {
        async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
            self.inner.get(key).await
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(PersistenceError::WriteFailed {
                    key: key.to_string(),
                    message: "disk full".to_string(),
                });
            }
            self.inner.set(key, value).await
        }
    }

    #[tokio::test]
    async fn opens_empty_when_nothing_stored() {
        let store = RecordingStore::open(MemoryStore::new()).await.unwrap();
        assert!(store.is_empty());
        assert!(store.latest_id().is_none());
    }

    #[tokio::test]
    async fn append_persists_under_fixed_key() {
        let mut store = RecordingStore::open(MemoryStore::new()).await.unwrap();
        store.append(recording(10, 2)).await.unwrap();

        let raw = store.backend().get(RECORDINGS_KEY).await.unwrap().unwrap();
        assert!(raw.contains("\"10\""));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn reopen_restores_entries_in_order() {
        let backend = MemoryStore::new();
        {
            let mut store = RecordingStore::open(backend.clone()).await.unwrap();
            store.append(recording(1, 1)).await.unwrap();
            store.append(recording(2, 5)).await.unwrap();
        }

        let store = RecordingStore::open(backend).await.unwrap();
        let ids: Vec<u64> = store.all().iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.all()[1].duration_secs(), 5);
    }

    #[tokio::test]
    async fn append_rejects_duplicate_ids() {
        let mut store = RecordingStore::open(MemoryStore::new()).await.unwrap();
        store.append(recording(1, 1)).await.unwrap();
        let err = store.append(recording(1, 3)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let mut store = RecordingStore::open(MemoryStore::new()).await.unwrap();
        store.append(recording(1, 1)).await.unwrap();
        store.append(recording(2, 1)).await.unwrap();

        let id = RecordingId::from_millis(1);
        assert!(store.delete(&id).await.unwrap().is_some());
        assert!(store.delete(&id).await.unwrap().is_none());
        assert!(!store.contains(&id));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn newest_first_numbers_by_creation_order() {
        let mut store = RecordingStore::open(MemoryStore::new()).await.unwrap();
        for id in [5, 6, 7] {
            store.append(recording(id, 1)).await.unwrap();
        }

        let listed: Vec<(usize, u64)> = store
            .newest_first()
            .map(|(n, r)| (n, r.id().value()))
            .collect();
        assert_eq!(listed, vec![(3, 7), (2, 6), (1, 5)]);
        assert_eq!(store.by_number(1).unwrap().id().value(), 5);
        assert!(store.by_number(0).is_none());
        assert!(store.by_number(4).is_none());
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let backend = FlakyStore {
            fail_writes: AtomicBool::new(false),
            inner: MemoryStore::new(),
        };
        let mut store = RecordingStore::open(backend).await.unwrap();
        store.append(recording(1, 1)).await.unwrap();

        store.backend().fail_writes.store(true, Ordering::SeqCst);
        assert!(store.append(recording(2, 1)).await.is_err());
        assert!(store.delete(&RecordingId::from_millis(1)).await.is_err());

        assert_eq!(store.len(), 1);
        assert!(store.contains(&RecordingId::from_millis(1)));
    }

    #[tokio::test]
    async fn corrupt_data_is_reported() {
        let backend = MemoryStore::new();
        backend.set(RECORDINGS_KEY, "{not json").await.unwrap();
        let result = RecordingStore::open(backend).await;
        assert!(matches!(result, Err(StoreError::Corrupt(_))));
    }
}
