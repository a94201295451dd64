//! Repeating timer port

use super::events::SessionEventSink;
use crate::domain::session::SessionId;

/// Port for the one-second recording clock
pub trait Ticker: Send + Sync {
    /// Start emitting `Tick` events for `session` once per second
    fn start(&self, session: SessionId, sink: SessionEventSink) -> Box<dyn TickHandle>;
}

/// Handle to a running timer
pub trait TickHandle: Send {
    /// Stop the timer. Ticks already in flight may still arrive and must be
    /// ignored by the receiver.
    fn cancel(&mut self);
}
