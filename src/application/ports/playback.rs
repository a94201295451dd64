//! Playback port interfaces

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::domain::recording::{AudioData, RecordingId};

/// Playback errors
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("Playback reference has been revoked: {0}")]
    Revoked(PlaybackRef),

    #[error("Audio output not available: {0}")]
    OutputUnavailable(String),

    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),
}

/// Revocable handle through which an audio object can be played
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlaybackRef(String);

impl PlaybackRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlaybackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Port for creating and revoking playback references
pub trait PlaybackRefs: Send + Sync {
    /// Register an audio object and hand out a reference to it
    fn create(&self, audio: &AudioData) -> PlaybackRef;

    /// Look up the audio behind a live reference
    fn resolve(&self, reference: &PlaybackRef) -> Option<Arc<AudioData>>;

    /// Invalidate a reference and free the audio it pinned.
    /// Revoking an unknown or already revoked reference is a no-op.
    fn revoke(&self, reference: &PlaybackRef);
}

/// Called with the recording id when a player reaches the end of its audio
pub type PlaybackEndedCallback = Arc<dyn Fn(RecordingId) + Send + Sync>;

/// Port for creating players
pub trait PlayerFactory {
    type Player: Player;

    /// Create a paused player for `reference`
    fn create(
        &mut self,
        id: &RecordingId,
        reference: &PlaybackRef,
    ) -> Result<Self::Player, PlaybackError>;
}

/// A single audio player. Dropping it stops playback.
pub trait Player {
    /// Start or resume playback. Starts over after natural completion.
    fn play(&mut self) -> Result<(), PlaybackError>;

    /// Pause playback. No-op when not playing.
    fn pause(&mut self);
}
