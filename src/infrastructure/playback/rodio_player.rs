//! Rodio-based playback adapter
//!
//! The output stream is opened on first use and kept for the lifetime of
//! the factory. Each player owns a sink; a watcher thread reports when the
//! sink runs dry so the coordinator can clear its playing state.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use tracing::debug;

use crate::application::ports::{
    PlaybackEndedCallback, PlaybackError, PlaybackRef, PlaybackRefs, Player, PlayerFactory,
};
use crate::domain::recording::{AudioData, RecordingId};

const WATCH_INTERVAL: Duration = Duration::from_millis(100);

/// Creates rodio players for playback references
pub struct RodioPlayerFactory<R: PlaybackRefs> {
    refs: Arc<R>,
    on_ended: PlaybackEndedCallback,
    output: Option<(OutputStream, OutputStreamHandle)>,
}

impl<R: PlaybackRefs> RodioPlayerFactory<R> {
    pub fn new(refs: Arc<R>, on_ended: PlaybackEndedCallback) -> Self {
        Self {
            refs,
            on_ended,
            output: None,
        }
    }

    fn output_handle(&mut self) -> Result<OutputStreamHandle, PlaybackError> {
        if let Some((_, handle)) = &self.output {
            return Ok(handle.clone());
        }
        let (stream, handle) = OutputStream::try_default()
            .map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        debug!("audio output opened");
        self.output = Some((stream, handle.clone()));
        Ok(handle)
    }
}

impl<R: PlaybackRefs> PlayerFactory for RodioPlayerFactory<R> {
    type Player = RodioPlayer;

    fn create(
        &mut self,
        id: &RecordingId,
        reference: &PlaybackRef,
    ) -> Result<RodioPlayer, PlaybackError> {
        let audio = self
            .refs
            .resolve(reference)
            .ok_or_else(|| PlaybackError::Revoked(reference.clone()))?;
        let handle = self.output_handle()?;

        Ok(RodioPlayer {
            id: id.clone(),
            audio,
            handle,
            on_ended: Arc::clone(&self.on_ended),
            current: None,
        })
    }
}

/// Shared audio bytes readable through a cursor
struct SharedAudio(Arc<AudioData>);

impl AsRef<[u8]> for SharedAudio {
    fn as_ref(&self) -> &[u8] {
        self.0.data()
    }
}

struct ActiveSink {
    sink: Arc<Sink>,
    detached: Arc<AtomicBool>,
}

impl ActiveSink {
    fn detach(self) {
        self.detached.store(true, Ordering::SeqCst);
        self.sink.stop();
    }
}

/// Player for one recording
pub struct RodioPlayer {
    id: RecordingId,
    audio: Arc<AudioData>,
    handle: OutputStreamHandle,
    on_ended: PlaybackEndedCallback,
    current: Option<ActiveSink>,
}

impl RodioPlayer {
    /// Build a fresh sink positioned at the start of the audio
    fn load(&self) -> Result<ActiveSink, PlaybackError> {
        let sink =
            Sink::try_new(&self.handle).map_err(|e| PlaybackError::OutputUnavailable(e.to_string()))?;
        let source = Decoder::new(Cursor::new(SharedAudio(Arc::clone(&self.audio))))
            .map_err(|e| PlaybackError::DecodeFailed(e.to_string()))?;
        sink.pause();
        sink.append(source);

        let sink = Arc::new(sink);
        let detached = Arc::new(AtomicBool::new(false));
        spawn_watcher(
            Arc::clone(&sink),
            Arc::clone(&detached),
            self.id.clone(),
            Arc::clone(&self.on_ended),
        );

        Ok(ActiveSink { sink, detached })
    }
}

impl Player for RodioPlayer {
    fn play(&mut self) -> Result<(), PlaybackError> {
        // A drained sink cannot be rewound; start over from the top.
        if self.current.as_ref().is_some_and(|active| active.sink.empty()) {
            if let Some(finished) = self.current.take() {
                finished.detach();
            }
        }

        if self.current.is_none() {
            self.current = Some(self.load()?);
        }
        if let Some(active) = &self.current {
            active.sink.play();
        }
        Ok(())
    }

    fn pause(&mut self) {
        if let Some(active) = &self.current {
            active.sink.pause();
        }
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        if let Some(active) = self.current.take() {
            active.detach();
        }
    }
}

fn spawn_watcher(
    sink: Arc<Sink>,
    detached: Arc<AtomicBool>,
    id: RecordingId,
    on_ended: PlaybackEndedCallback,
) {
    std::thread::spawn(move || loop {
        std::thread::sleep(WATCH_INTERVAL);
        if detached.load(Ordering::SeqCst) {
            return;
        }
        if sink.empty() {
            on_ended(id);
            return;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::AssemblyError;
    use crate::application::ports::{AudioAssembler, StreamSpec};
    use crate::infrastructure::{MemoryPlaybackRefs, WavAssembler};
    use std::sync::mpsc;

    fn tone() -> Result<AudioData, AssemblyError> {
        let samples: Vec<u8> = (0..8000i16)
            .flat_map(|i| ((i % 64) * 256).to_le_bytes())
            .collect();
        WavAssembler::new().assemble(
            &[samples],
            StreamSpec {
                sample_rate: 8000,
                channels: 1,
            },
        )
    }

    #[test]
    fn revoked_reference_is_rejected_before_opening_output() {
        let refs = Arc::new(MemoryPlaybackRefs::new());
        let reference = refs.create(&tone().unwrap());
        refs.revoke(&reference);

        let mut factory = RodioPlayerFactory::new(Arc::clone(&refs), Arc::new(|_| {}));
        let result = factory.create(&RecordingId::from_millis(1), &reference);
        assert!(matches!(result, Err(PlaybackError::Revoked(_))));
        assert!(factory.output.is_none());
    }

    #[test]
    #[ignore = "Requires audio hardware"]
    fn reports_natural_end() {
        let refs = Arc::new(MemoryPlaybackRefs::new());
        let reference = refs.create(&tone().unwrap());
        let (tx, rx) = mpsc::channel();
        let tx = std::sync::Mutex::new(tx);

        let mut factory = RodioPlayerFactory::new(
            Arc::clone(&refs),
            Arc::new(move |id| {
                let _ = tx.lock().unwrap().send(id);
            }),
        );
        let id = RecordingId::from_millis(7);
        let mut player = factory.create(&id, &reference).unwrap();
        player.play().unwrap();

        let ended = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(ended, id);
    }
}
