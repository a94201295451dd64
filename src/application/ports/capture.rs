//! Audio capture port interfaces

use async_trait::async_trait;
use thiserror::Error;

use super::events::SessionEventSink;
use crate::domain::session::SessionId;

/// Capture errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Audio capture is not supported on this system")]
    Unsupported,

    #[error("Microphone access denied: {0}")]
    PermissionDenied(String),

    #[error("Microphone unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Shape of the PCM data a stream delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Port for acquiring the capture device
#[async_trait]
pub trait AudioCapture: Send + Sync {
    /// Whether this system can capture audio at all
    fn is_supported(&self) -> bool;

    /// Ask for exclusive access to the input device.
    ///
    /// This is the one suspension point of a session; it may take as long
    /// as the platform needs to resolve the request.
    async fn request_access(&self) -> Result<Box<dyn CaptureStream>, CaptureError>;
}

/// An open input device granted to one session
pub trait CaptureStream: Send {
    /// Format of the chunks this stream produces
    fn spec(&self) -> StreamSpec;

    /// Start delivering `Chunk` events to `sink`, tagged with `session`
    fn begin(&mut self, session: SessionId, sink: SessionEventSink) -> Result<(), CaptureError>;

    /// Ask the stream to stop. Remaining chunks are flushed, then one
    /// `CaptureEnded` event is delivered.
    fn end(&mut self);

    /// Release the hardware. Safe to call more than once.
    fn release(&mut self);
}
