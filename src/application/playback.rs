//! Playback coordination use case
//!
//! Keeps at most one recording audible at a time. Players are created on
//! first use and kept per recording id until the recording is deleted or the
//! application shuts down.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::ports::{
    KeyValueStore, NotificationIcon, Notifier, PlaybackError, PlaybackRef, PlaybackRefs, Player,
    PlayerFactory,
};
use super::session::NOTICE_TITLE;
use super::store::{RecordingStore, StoreError};
use crate::domain::recording::{Recording, RecordingId};

pub const MSG_DELETED: &str = "Recording deleted";

/// What a toggle did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Paused,
}

struct PlayerSlot<P> {
    reference: PlaybackRef,
    player: Option<P>,
}

/// Single-stream playback coordinator
pub struct PlaybackCoordinator<F, R, N>
where
    F: PlayerFactory,
    R: PlaybackRefs,
    N: Notifier,
{
    factory: F,
    refs: Arc<R>,
    notifier: N,
    slots: HashMap<RecordingId, PlayerSlot<F::Player>>,
    playing: Option<RecordingId>,
}

impl<F, R, N> PlaybackCoordinator<F, R, N>
where
    F: PlayerFactory,
    R: PlaybackRefs,
    N: Notifier,
{
    pub fn new(factory: F, refs: Arc<R>, notifier: N) -> Self {
        Self {
            factory,
            refs,
            notifier,
            slots: HashMap::new(),
            playing: None,
        }
    }

    /// Id of the recording currently playing
    pub fn playing(&self) -> Option<&RecordingId> {
        self.playing.as_ref()
    }

    pub fn is_playing(&self, id: &RecordingId) -> bool {
        self.playing.as_ref() == Some(id)
    }

    /// Whether a player has been created for `id`
    pub fn has_player(&self, id: &RecordingId) -> bool {
        self.slots
            .get(id)
            .is_some_and(|slot| slot.player.is_some())
    }

    pub fn reference(&self, id: &RecordingId) -> Option<&PlaybackRef> {
        self.slots.get(id).map(|slot| &slot.reference)
    }

    /// Take ownership of a reference created elsewhere (normally during
    /// session finalization). A second reference for the same id is revoked.
    pub fn adopt(&mut self, id: RecordingId, reference: PlaybackRef) {
        match self.slots.entry(id) {
            Entry::Occupied(_) => self.refs.revoke(&reference),
            Entry::Vacant(slot) => {
                slot.insert(PlayerSlot {
                    reference,
                    player: None,
                });
            }
        }
    }

    /// Play `recording`, or pause it if it is the one playing.
    ///
    /// Starting a recording pauses every other player first.
    pub fn toggle(&mut self, recording: &Recording) -> Result<PlaybackStatus, PlaybackError> {
        let id = recording.id();

        if self.is_playing(id) {
            if let Some(player) = self.slots.get_mut(id).and_then(|s| s.player.as_mut()) {
                player.pause();
            }
            self.playing = None;
            debug!(%id, "playback paused");
            return Ok(PlaybackStatus::Paused);
        }

        for (other, slot) in self.slots.iter_mut() {
            if other != id {
                if let Some(player) = slot.player.as_mut() {
                    player.pause();
                }
            }
        }
        self.playing = None;

        let refs = &self.refs;
        let slot = self
            .slots
            .entry(id.clone())
            .or_insert_with(|| PlayerSlot {
                reference: refs.create(recording.audio()),
                player: None,
            });

        let player = match slot.player.take() {
            Some(player) => player,
            None => self.factory.create(id, &slot.reference)?,
        };
        let player = slot.player.insert(player);
        player.play()?;

        self.playing = Some(id.clone());
        debug!(%id, "playback started");
        Ok(PlaybackStatus::Playing)
    }

    /// Natural end of playback. Returns true if the playing id was cleared.
    pub fn on_playback_ended(&mut self, id: &RecordingId) -> bool {
        if !self.is_playing(id) {
            return false;
        }
        self.playing = None;
        debug!(%id, "playback finished");
        true
    }

    /// Pause and drop the player for `id` and revoke its reference
    pub fn release(&mut self, id: &RecordingId) {
        if let Some(mut slot) = self.slots.remove(id) {
            if let Some(player) = slot.player.as_mut() {
                player.pause();
            }
            self.refs.revoke(&slot.reference);
        }
        if self.is_playing(id) {
            self.playing = None;
        }
    }

    /// Delete a recording together with its playback resources.
    ///
    /// Deleting an unknown id is a no-op for the store; the notice is
    /// emitted either way. Returns whether an entry was removed.
    pub async fn delete<S: KeyValueStore>(
        &mut self,
        store: &mut RecordingStore<S>,
        id: &RecordingId,
    ) -> Result<bool, StoreError> {
        self.release(id);
        let removed = store.delete(id).await?.is_some();
        info!(%id, removed, "recording deleted");

        if let Err(e) = self
            .notifier
            .notify(NOTICE_TITLE, MSG_DELETED, NotificationIcon::Info)
            .await
        {
            debug!(error = %e, "notice not delivered");
        }
        Ok(removed)
    }

    /// Pause every player and revoke every reference
    pub fn teardown(&mut self) {
        for (_, mut slot) in self.slots.drain() {
            if let Some(player) = slot.player.as_mut() {
                player.pause();
            }
            self.refs.revoke(&slot.reference);
        }
        self.playing = None;
    }
}

impl<F, R, N> Drop for PlaybackCoordinator<F, R, N>
where
    F: PlayerFactory,
    R: PlaybackRefs,
    N: Notifier,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
