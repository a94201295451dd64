//! Non-interactive `list` and `delete` subcommands

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::application::{PlaybackCoordinator, StoreError};
use crate::infrastructure::{MemoryPlaybackRefs, RodioPlayerFactory, TerminalNotifier};

use super::app::open_store;
use super::presenter::Presenter;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No recording #{0}")]
    UnknownNumber(usize),
}

/// Print every stored recording, newest first
pub async fn handle_list(data_dir: &Path, presenter: &Presenter) -> Result<(), LibraryError> {
    let store = open_store(data_dir).await?;
    presenter.recording_list(store.newest_first(), None, true);
    Ok(())
}

/// Delete the recording shown as `#number`
pub async fn handle_delete(
    data_dir: &Path,
    number: usize,
    presenter: &Presenter,
) -> Result<(), LibraryError> {
    let mut store = open_store(data_dir).await?;
    let id = store
        .by_number(number)
        .map(|r| r.id().clone())
        .ok_or(LibraryError::UnknownNumber(number))?;

    // No output is opened unless something is played
    let refs = Arc::new(MemoryPlaybackRefs::new());
    let factory = RodioPlayerFactory::new(Arc::clone(&refs), Arc::new(|_| {}));
    let mut coordinator = PlaybackCoordinator::new(factory, refs, TerminalNotifier::new());

    coordinator.delete(&mut store, &id).await?;
    tracing::debug!(%id, remaining = store.len(), "deleted from the command line");
    if store.is_empty() {
        presenter.info("No recordings left.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::recording::{AudioData, AudioMimeType, Recording, RecordingId};

    async fn seed(dir: &Path, ids: &[u64]) {
        let mut store = open_store(dir).await.unwrap();
        for &id in ids {
            let recording = Recording::new(
                RecordingId::from_millis(id),
                AudioData::new(vec![0; 4], AudioMimeType::Wav),
                3,
                id,
            )
            .unwrap();
            store.append(recording).await.unwrap();
        }
    }

    #[tokio::test]
    async fn delete_removes_by_number() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[10, 20, 30]).await;

        handle_delete(dir.path(), 2, &Presenter::new()).await.unwrap();

        let store = open_store(dir.path()).await.unwrap();
        let ids: Vec<u64> = store.all().iter().map(|r| r.id().value()).collect();
        assert_eq!(ids, vec![10, 30]);
    }

    #[tokio::test]
    async fn delete_unknown_number_fails() {
        let dir = tempfile::tempdir().unwrap();
        seed(dir.path(), &[10]).await;

        let result = handle_delete(dir.path(), 5, &Presenter::new()).await;
        assert!(matches!(result, Err(LibraryError::UnknownNumber(5))));
    }

    #[tokio::test]
    async fn list_on_empty_dir_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        assert!(handle_list(dir.path(), &Presenter::new()).await.is_ok());
    }
}
