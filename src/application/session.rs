//! Recording session use case
//!
//! The controller drives one capture at a time through
//! idle -> requesting -> recording -> idle. It is fed discrete events by the
//! application's event loop and never blocks: the device request is handed
//! back to the caller as a [`PendingAccess`] whose result comes back through
//! [`SessionController::complete_access`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::ports::{
    AssemblyError, AudioAssembler, AudioCapture, CaptureError, CaptureStream, Clock,
    KeyValueStore, NotificationIcon, Notifier, PlaybackRef, PlaybackRefs, SessionEvent,
    SessionEventSink, StreamSpec, TickHandle, Ticker,
};
use super::store::{RecordingStore, StoreError};
use crate::domain::recording::{Duration, IdGenerator, Recording, RecordingId};
use crate::domain::session::{RecorderSession, SessionId, SessionState};
use crate::domain::TooShortRecording;

/// Title used for every notice the recorder emits
pub const NOTICE_TITLE: &str = "Voice Notes";

pub const MSG_UNSUPPORTED: &str =
    "Audio recording is not supported on this system. Connect a microphone and try again.";
pub const MSG_ACCESS_FAILED: &str =
    "Could not access the microphone. Please allow microphone access and try again.";
pub const MSG_TOO_SHORT: &str = "Recording too short. Please try again.";
pub const MSG_SAVED: &str = "Recording saved!";
pub const MSG_CANCELLED: &str = "Recording cancelled";
pub const MSG_MAX_REACHED: &str = "Maximum recording length reached, stopping";

/// Errors from the session controller
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Audio recording is not supported on this system")]
    UnsupportedDevice,

    #[error("Cannot start: recorder is {0}")]
    Busy(SessionState),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("Failed to save recording: {0}")]
    Store(#[from] StoreError),
}

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Stop automatically once this much time has been recorded
    pub max_duration: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_duration: Some(Duration::default_max_duration()),
        }
    }
}

/// Result of a transition that the caller may want to present
#[derive(Debug)]
pub enum SessionOutcome {
    /// Access was granted and capture is running
    Started(SessionId),
    /// A recording was appended to the store
    Saved {
        id: RecordingId,
        duration_secs: u32,
        /// Playback reference created during finalization; ownership passes
        /// to the caller (normally the playback coordinator).
        reference: PlaybackRef,
    },
    /// The capture was shorter than the minimum and was discarded
    TooShort,
    /// The session ended with an error; the user-visible message is in
    /// [`SessionController::last_error`]
    Failed(SessionError),
}

/// An in-flight device access request
pub struct PendingAccess<C: AudioCapture> {
    session: SessionId,
    capture: Arc<C>,
}

impl<C: AudioCapture> PendingAccess<C> {
    pub fn session(&self) -> SessionId {
        self.session
    }

    /// Wait for the platform to grant or refuse the device
    pub async fn resolve(self) -> AccessOutcome {
        let result = self.capture.request_access().await;
        AccessOutcome {
            session: self.session,
            result,
        }
    }
}

/// Resolution of a [`PendingAccess`]
pub struct AccessOutcome {
    pub session: SessionId,
    pub result: Result<Box<dyn CaptureStream>, CaptureError>,
}

/// Adapters the controller needs
pub struct SessionPorts<C, A, T, R, N> {
    pub capture: Arc<C>,
    pub assembler: A,
    pub ticker: T,
    pub refs: Arc<R>,
    pub notifier: N,
    pub clock: Box<dyn Clock>,
}

/// Recording session controller
pub struct SessionController<C, A, T, R, N>
where
    C: AudioCapture,
    A: AudioAssembler,
    T: Ticker,
    R: PlaybackRefs,
    N: Notifier,
{
    capture: Arc<C>,
    assembler: A,
    ticker: T,
    refs: Arc<R>,
    notifier: N,
    clock: Box<dyn Clock>,
    events: SessionEventSink,
    config: SessionConfig,
    session: RecorderSession,
    ids: IdGenerator,
    elapsed_secs: u32,
    chunks: Vec<Vec<u8>>,
    stream: Option<Box<dyn CaptureStream>>,
    spec: Option<StreamSpec>,
    timer: Option<Box<dyn TickHandle>>,
    stopping: bool,
    error: Option<String>,
}

impl<C, A, T, R, N> SessionController<C, A, T, R, N>
where
    C: AudioCapture,
    A: AudioAssembler,
    T: Ticker,
    R: PlaybackRefs,
    N: Notifier,
{
    /// Create an idle controller. `events` is handed to the capture stream
    /// and timer so their output reaches the event loop.
    pub fn new(
        ports: SessionPorts<C, A, T, R, N>,
        events: SessionEventSink,
        config: SessionConfig,
    ) -> Self {
        Self {
            capture: ports.capture,
            assembler: ports.assembler,
            ticker: ports.ticker,
            refs: ports.refs,
            notifier: ports.notifier,
            clock: ports.clock,
            events,
            config,
            session: RecorderSession::new(),
            ids: IdGenerator::new(),
            elapsed_secs: 0,
            chunks: Vec::new(),
            stream: None,
            spec: None,
            timer: None,
            stopping: false,
            error: None,
        }
    }

    /// Current machine state
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Seconds recorded so far in the live session
    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    /// Message describing the last failed start, cleared by the next start
    pub fn last_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a stop was requested and finalization is pending
    pub fn is_stopping(&self) -> bool {
        self.stopping
    }

    /// Begin a session: idle -> requesting.
    ///
    /// Rejected with [`SessionError::Busy`] unless idle, so a repeated start
    /// never layers a second session over the first.
    pub async fn start(&mut self) -> Result<PendingAccess<C>, SessionError> {
        if !self.session.is_idle() {
            return Err(SessionError::Busy(self.session.state()));
        }

        if !self.capture.is_supported() {
            warn!("recording requested but audio capture is not supported");
            self.error = Some(MSG_UNSUPPORTED.to_string());
            return Err(SessionError::UnsupportedDevice);
        }

        let session = self
            .session
            .request_access()
            .map_err(|e| SessionError::Busy(e.current_state))?;
        self.error = None;
        info!(%session, "requesting microphone access");

        Ok(PendingAccess {
            session,
            capture: Arc::clone(&self.capture),
        })
    }

    /// Apply the result of a device request: requesting -> recording, or
    /// requesting -> idle on failure.
    ///
    /// Results for a session that is no longer waiting (cancelled, torn
    /// down, superseded) are ignored and any granted stream is released.
    pub async fn complete_access(&mut self, outcome: AccessOutcome) -> Option<SessionOutcome> {
        let AccessOutcome { session, result } = outcome;

        if !self.session.is_current_in(session, SessionState::Requesting) {
            if let Ok(mut stream) = result {
                debug!(%session, "releasing device granted to an abandoned session");
                stream.release();
            }
            return None;
        }

        let mut stream = match result {
            Ok(stream) => stream,
            Err(e) => return Some(self.fail_access(session, e)),
        };

        self.chunks.clear();
        self.elapsed_secs = 0;
        self.stopping = false;
        self.timer = Some(self.ticker.start(session, Arc::clone(&self.events)));

        if let Err(e) = stream.begin(session, Arc::clone(&self.events)) {
            stream.release();
            self.cancel_timer();
            return Some(self.fail_access(session, e));
        }

        self.spec = Some(stream.spec());
        self.stream = Some(stream);
        if let Err(e) = self.session.grant_access(session) {
            // Unreachable in practice: the state was checked above.
            warn!(error = %e, "grant after successful begin failed");
        }
        info!(%session, "recording started");

        Some(SessionOutcome::Started(session))
    }

    /// Feed an adapter event to the controller
    pub async fn handle<S: KeyValueStore>(
        &mut self,
        event: SessionEvent,
        store: &mut RecordingStore<S>,
    ) -> Option<SessionOutcome> {
        match event {
            SessionEvent::Tick { session } => {
                if self.on_tick(session) {
                    self.notify(MSG_MAX_REACHED, NotificationIcon::Warning).await;
                }
                None
            }
            SessionEvent::Chunk { session, data } => {
                self.on_chunk(session, data);
                None
            }
            SessionEvent::CaptureEnded { session } => self.finalize(session, store).await,
        }
    }

    /// Request the end of the live recording.
    ///
    /// No-op unless recording and not already stopping. The timer stops
    /// immediately; finalization happens when the stream reports
    /// `CaptureEnded`.
    pub fn stop(&mut self) -> bool {
        if !self.session.is_recording() || self.stopping {
            return false;
        }

        self.stopping = true;
        self.cancel_timer();
        if let Some(stream) = self.stream.as_mut() {
            stream.end();
        }
        debug!(session = %self.session.current(), elapsed = self.elapsed_secs, "stop requested");
        true
    }

    /// Abandon the current session without keeping anything.
    ///
    /// From requesting, the pending grant is released when it arrives.
    /// Returns false when there was nothing to cancel.
    pub async fn cancel(&mut self) -> bool {
        match self.session.state() {
            SessionState::Idle => false,
            SessionState::Requesting => {
                self.session.abort();
                info!("device request abandoned");
                true
            }
            SessionState::Recording => {
                self.end_session();
                info!("recording cancelled");
                self.notify(MSG_CANCELLED, NotificationIcon::Warning).await;
                true
            }
        }
    }

    /// Release every resource the controller holds and return to idle
    pub fn teardown(&mut self) {
        self.end_session();
    }

    fn on_tick(&mut self, session: SessionId) -> bool {
        if !self.session.is_current_in(session, SessionState::Recording) || self.stopping {
            return false;
        }

        self.elapsed_secs += 1;
        match self.config.max_duration {
            Some(max) if u64::from(self.elapsed_secs) >= max.as_secs() => {
                info!(elapsed = self.elapsed_secs, "maximum duration reached");
                self.stop()
            }
            _ => false,
        }
    }

    fn on_chunk(&mut self, session: SessionId, data: Vec<u8>) {
        if data.is_empty() || !self.session.is_current_in(session, SessionState::Recording) {
            return;
        }
        self.chunks.push(data);
    }

    /// recording -> idle after the stream has delivered its last chunk
    async fn finalize<S: KeyValueStore>(
        &mut self,
        session: SessionId,
        store: &mut RecordingStore<S>,
    ) -> Option<SessionOutcome> {
        if !self.session.is_current_in(session, SessionState::Recording) {
            return None;
        }

        self.cancel_timer();
        let chunks = std::mem::take(&mut self.chunks);
        let elapsed = std::mem::take(&mut self.elapsed_secs);

        let Some(spec) = self.spec else {
            self.end_session();
            return Some(SessionOutcome::Failed(SessionError::Capture(
                CaptureError::DeviceUnavailable("stream format unknown".to_string()),
            )));
        };

        let audio = match self.assembler.assemble(&chunks, spec) {
            Ok(audio) => audio,
            Err(e) => {
                error!(error = %e, "failed to assemble captured audio");
                self.end_session();
                self.notify(&e.to_string(), NotificationIcon::Error).await;
                return Some(SessionOutcome::Failed(e.into()));
            }
        };
        let reference = self.refs.create(&audio);

        if let Err(short) = Recording::check_length(elapsed) {
            return Some(self.discard_short(reference, short).await);
        }

        if let Some(latest) = store.latest_id() {
            self.ids.observe(latest);
        }
        let timestamp = self.clock.now_millis();
        let id = self.ids.next(timestamp);
        let recording = match Recording::new(id.clone(), audio, elapsed, timestamp) {
            Ok(recording) => recording,
            Err(short) => return Some(self.discard_short(reference, short).await),
        };

        if let Err(e) = store.append(recording).await {
            error!(error = %e, "failed to store recording");
            self.refs.revoke(&reference);
            self.end_session();
            let err = SessionError::Store(e);
            self.notify(&err.to_string(), NotificationIcon::Error).await;
            return Some(SessionOutcome::Failed(err));
        }

        info!(%id, duration = elapsed, "recording saved");
        self.notify(MSG_SAVED, NotificationIcon::Success).await;
        self.finish_session();

        Some(SessionOutcome::Saved {
            id,
            duration_secs: elapsed,
            reference,
        })
    }

    async fn discard_short(
        &mut self,
        reference: PlaybackRef,
        short: TooShortRecording,
    ) -> SessionOutcome {
        info!(elapsed = short.elapsed_secs, "discarding short recording");
        self.refs.revoke(&reference);
        self.finish_session();
        self.notify(MSG_TOO_SHORT, NotificationIcon::Warning).await;
        SessionOutcome::TooShort
    }

    fn fail_access(&mut self, session: SessionId, e: CaptureError) -> SessionOutcome {
        warn!(%session, error = %e, "microphone access failed");
        if let Err(transition) = self.session.deny_access(session) {
            debug!(error = %transition, "deny after failed access");
        }
        self.error = Some(match e {
            CaptureError::Unsupported => MSG_UNSUPPORTED.to_string(),
            _ => MSG_ACCESS_FAILED.to_string(),
        });
        SessionOutcome::Failed(SessionError::Capture(e))
    }

    /// Normal end of a capture: recording -> idle
    fn finish_session(&mut self) {
        if let Err(e) = self.session.finish() {
            debug!(error = %e, "finish outside of a recording");
        }
        self.end_session();
    }

    /// Terminal transition shared by every exit path
    fn end_session(&mut self) {
        self.cancel_timer();
        if let Some(mut stream) = self.stream.take() {
            stream.release();
        }
        self.spec = None;
        self.chunks.clear();
        self.elapsed_secs = 0;
        self.stopping = false;
        self.session.abort();
    }

    fn cancel_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    async fn notify(&self, message: &str, icon: NotificationIcon) {
        if let Err(e) = self.notifier.notify(NOTICE_TITLE, message, icon).await {
            debug!(error = %e, "notice not delivered");
        }
    }
}

impl<C, A, T, R, N> Drop for SessionController<C, A, T, R, N>
where
    C: AudioCapture,
    A: AudioAssembler,
    T: Ticker,
    R: PlaybackRefs,
    N: Notifier,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
