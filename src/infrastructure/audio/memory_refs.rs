//! In-memory playback reference registry

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{PlaybackRef, PlaybackRefs};
use crate::domain::recording::AudioData;

const REF_PREFIX: &str = "blob:voice-notes/";

/// Hands out revocable references to audio held in memory.
///
/// A reference pins the caller's audio buffer (no byte copy) until it is
/// revoked; players resolve the reference when they are created.
#[derive(Debug, Default)]
pub struct MemoryPlaybackRefs {
    next: AtomicU64,
    live: Mutex<HashMap<PlaybackRef, Arc<AudioData>>>,
}

impl MemoryPlaybackRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of references not yet revoked
    pub fn live_count(&self) -> usize {
        self.live.lock().map(|live| live.len()).unwrap_or(0)
    }
}

impl PlaybackRefs for MemoryPlaybackRefs {
    fn create(&self, audio: &AudioData) -> PlaybackRef {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        let reference = PlaybackRef::new(format!("{REF_PREFIX}{n}"));
        if let Ok(mut live) = self.live.lock() {
            live.insert(reference.clone(), Arc::new(audio.clone()));
        }
        reference
    }

    fn resolve(&self, reference: &PlaybackRef) -> Option<Arc<AudioData>> {
        self.live.lock().ok()?.get(reference).cloned()
    }

    fn revoke(&self, reference: &PlaybackRef) {
        if let Ok(mut live) = self.live.lock() {
            live.remove(reference);
        }
    }
}
