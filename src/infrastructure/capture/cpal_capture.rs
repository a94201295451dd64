//! Microphone capture using cpal
//!
//! cpal streams are not `Send`, so each granted stream lives on its own
//! thread and is driven through a command channel. Samples are delivered
//! as interleaved little-endian i16 PCM in the device's native rate and
//! channel layout.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BuildStreamError, SampleFormat, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::application::ports::{
    AudioCapture, CaptureError, CaptureStream, SessionEvent, SessionEventSink, StreamSpec,
};
use crate::domain::session::SessionId;

/// How often buffered samples are handed out as a chunk
const FLUSH_INTERVAL: StdDuration = StdDuration::from_millis(250);

/// How long `begin` waits for the capture thread to confirm the start
const BEGIN_TIMEOUT: StdDuration = StdDuration::from_secs(2);

/// Capture adapter for the default input device
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalCapture;

impl CpalCapture {
    pub fn new() -> Self {
        Self
    }

    fn open_device() -> Result<(cpal::Device, StreamConfig, SampleFormat), CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::Unsupported)?;
        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

        let sample_format = supported.sample_format();
        Ok((device, supported.config(), sample_format))
    }
}

#[async_trait]
impl AudioCapture for CpalCapture {
    fn is_supported(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    async fn request_access(&self) -> Result<Box<dyn CaptureStream>, CaptureError> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (command_tx, command_rx) = mpsc::channel();
        let error_tx = command_tx.clone();

        std::thread::spawn(move || capture_thread(ready_tx, command_rx, error_tx));

        let spec = ready_rx.await.map_err(|_| {
            CaptureError::DeviceUnavailable("capture thread exited before opening".to_string())
        })??;
        debug!(rate = spec.sample_rate, channels = spec.channels, "input stream opened");

        Ok(Box::new(CpalStream {
            spec,
            commands: command_tx,
            released: false,
        }))
    }
}

enum Command {
    Begin {
        session: SessionId,
        sink: SessionEventSink,
        started: SyncSender<Result<(), CaptureError>>,
    },
    End,
    Failed(String),
    Release,
}

#[derive(Default)]
struct Buffer {
    samples: Vec<i16>,
    active: bool,
}

type SharedBuffer = Arc<StdMutex<Buffer>>;

/// Owns the cpal stream for one session
fn capture_thread(
    ready: oneshot::Sender<Result<StreamSpec, CaptureError>>,
    commands: Receiver<Command>,
    errors: Sender<Command>,
) {
    let buffer = SharedBuffer::default();
    let (stream, spec) = match build_stream(Arc::clone(&buffer), errors) {
        Ok(opened) => opened,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if ready.send(Ok(spec)).is_err() {
        // Requester went away; dropping the stream releases the device.
        return;
    }

    let mut current: Option<(SessionId, SessionEventSink)> = None;
    loop {
        match commands.recv_timeout(FLUSH_INTERVAL) {
            Ok(Command::Begin {
                session,
                sink,
                started,
            }) => {
                let result = start_delivery(&stream, &buffer);
                if result.is_ok() {
                    current = Some((session, sink));
                }
                let _ = started.send(result);
            }
            Ok(Command::End) => {
                finish(&stream, &buffer, current.take());
            }
            Ok(Command::Failed(message)) => {
                warn!(error = %message, "input stream failed");
                finish(&stream, &buffer, current.take());
            }
            Ok(Command::Release) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                if let Some((session, sink)) = current.as_ref() {
                    flush(&buffer, *session, sink);
                }
            }
        }
    }

    drop(stream);
    debug!("input stream released");
}

/// Start the device and accept samples into the buffer
fn start_delivery<S: StreamTrait>(stream: &S, buffer: &SharedBuffer) -> Result<(), CaptureError> {
    if let Err(e) = stream.play() {
        warn!(error = %e, "failed to start input stream");
        return Err(CaptureError::DeviceUnavailable(e.to_string()));
    }
    set_active(buffer, true);
    Ok(())
}

/// Stop delivery, hand out the remaining samples, then report the end
fn finish(
    stream: &cpal::Stream,
    buffer: &SharedBuffer,
    current: Option<(SessionId, SessionEventSink)>,
) {
    set_active(buffer, false);
    if let Err(e) = stream.pause() {
        debug!(error = %e, "pause not supported by backend");
    }
    if let Some((session, sink)) = current {
        flush(buffer, session, &sink);
        sink(SessionEvent::CaptureEnded { session });
    }
}

fn flush(buffer: &SharedBuffer, session: SessionId, sink: &SessionEventSink) {
    let samples = match buffer.lock() {
        Ok(mut buffer) => std::mem::take(&mut buffer.samples),
        Err(_) => return,
    };
    if samples.is_empty() {
        return;
    }
    let data = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
    sink(SessionEvent::Chunk { session, data });
}

fn set_active(buffer: &SharedBuffer, active: bool) {
    if let Ok(mut buffer) = buffer.lock() {
        buffer.active = active;
        if active {
            buffer.samples.clear();
        }
    }
}

fn push_samples(buffer: &SharedBuffer, samples: impl Iterator<Item = i16>) {
    if let Ok(mut buffer) = buffer.lock() {
        if buffer.active {
            buffer.samples.extend(samples);
        }
    }
}

fn build_stream(
    buffer: SharedBuffer,
    errors: Sender<Command>,
) -> Result<(cpal::Stream, StreamSpec), CaptureError> {
    let (device, config, sample_format) = CpalCapture::open_device()?;
    let spec = StreamSpec {
        sample_rate: config.sample_rate.0,
        channels: config.channels,
    };
    let on_error = move |err: cpal::StreamError| {
        let _ = errors.send(Command::Failed(err.to_string()));
    };

    let stream = match sample_format {
        SampleFormat::I16 => device.build_input_stream(
            &config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| {
                push_samples(&buffer, data.iter().copied());
            },
            on_error,
            None,
        ),
        SampleFormat::F32 => device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                push_samples(
                    &buffer,
                    data.iter().map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16),
                );
            },
            on_error,
            None,
        ),
        other => {
            return Err(CaptureError::DeviceUnavailable(format!(
                "unsupported sample format {other:?}"
            )))
        }
    }
    .map_err(map_build_error)?;

    // Some backends start streams on creation
    let _ = stream.pause();
    Ok((stream, spec))
}

fn map_build_error(err: BuildStreamError) -> CaptureError {
    match err {
        BuildStreamError::BackendSpecific { err } => {
            CaptureError::PermissionDenied(err.description)
        }
        other => CaptureError::DeviceUnavailable(other.to_string()),
    }
}

/// Handle to a granted input stream
struct CpalStream {
    spec: StreamSpec,
    commands: Sender<Command>,
    released: bool,
}

impl CaptureStream for CpalStream {
    fn spec(&self) -> StreamSpec {
        self.spec
    }

    /// Blocks until the capture thread reports whether the device started
    fn begin(&mut self, session: SessionId, sink: SessionEventSink) -> Result<(), CaptureError> {
        let (started_tx, started_rx) = mpsc::sync_channel(1);
        self.commands
            .send(Command::Begin {
                session,
                sink,
                started: started_tx,
            })
            .map_err(|_| CaptureError::DeviceUnavailable("input stream closed".to_string()))?;

        started_rx.recv_timeout(BEGIN_TIMEOUT).unwrap_or_else(|_| {
            Err(CaptureError::DeviceUnavailable(
                "input stream did not start".to_string(),
            ))
        })
    }

    fn end(&mut self) {
        if self.commands.send(Command::End).is_err() {
            debug!("end requested on a closed input stream");
        }
    }

    fn release(&mut self) {
        if std::mem::replace(&mut self.released, true) {
            return;
        }
        let _ = self.commands.send(Command::Release);
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpal::{PauseStreamError, PlayStreamError};

    /// Stream whose device refuses to start
    struct DeadStream;

    impl StreamTrait for DeadStream {
        fn play(&self) -> Result<(), PlayStreamError> {
            Err(PlayStreamError::DeviceNotAvailable)
        }

        fn pause(&self) -> Result<(), PauseStreamError> {
            Ok(())
        }
    }

    #[test]
    fn failed_start_is_a_device_error() {
        let buffer = SharedBuffer::default();

        let result = start_delivery(&DeadStream, &buffer);

        assert!(matches!(result, Err(CaptureError::DeviceUnavailable(_))));
        push_samples(&buffer, [5i16, 6].into_iter());
        assert!(buffer.lock().unwrap().samples.is_empty());
    }

    #[test]
    fn flush_emits_little_endian_chunk() {
        let buffer = SharedBuffer::default();
        set_active(&buffer, true);
        push_samples(&buffer, [1i16, -2].into_iter());

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let sink: SessionEventSink = Arc::new(move |e| seen_clone.lock().unwrap().push(e));
        flush(&buffer, SessionId::new(3), &sink);
        flush(&buffer, SessionId::new(3), &sink);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![SessionEvent::Chunk {
                session: SessionId::new(3),
                data: vec![1, 0, 0xFE, 0xFF],
            }]
        );
    }

    #[test]
    fn inactive_buffer_ignores_samples() {
        let buffer = SharedBuffer::default();
        push_samples(&buffer, [5i16; 4].into_iter());
        assert!(buffer.lock().unwrap().samples.is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires an audio input device
    async fn opens_default_input_device() {
        let capture = CpalCapture::new();
        assert!(capture.is_supported());
        let mut stream = capture.request_access().await.unwrap();
        assert!(stream.spec().sample_rate > 0);
        stream.release();
    }
}
