//! Events delivered back to the session controller by capture and timer adapters

use std::sync::Arc;

use crate::domain::session::SessionId;

/// Asynchronous notifications produced while a session is live.
///
/// Adapters emit these from their own threads or tasks; the event loop
/// forwards them to the controller one at a time. For a given session every
/// `Chunk` is delivered before its `CaptureEnded`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// One second of recording time has passed
    Tick { session: SessionId },
    /// A fragment of captured audio
    Chunk { session: SessionId, data: Vec<u8> },
    /// The capture stream stopped delivering data, on request or by itself
    CaptureEnded { session: SessionId },
}

impl SessionEvent {
    /// The session this event belongs to
    pub fn session(&self) -> SessionId {
        match self {
            Self::Tick { session } | Self::Chunk { session, .. } | Self::CaptureEnded { session } => {
                *session
            }
        }
    }
}

/// Callback adapters use to hand events to the event loop
pub type SessionEventSink = Arc<dyn Fn(SessionEvent) + Send + Sync>;
