//! Event sources for the interactive recorder
//!
//! Every input the recorder reacts to (typed commands, device grants,
//! capture and timer events, playback completion, shutdown signals) is
//! funnelled into one unbounded channel and handled in arrival order.

use std::io::BufRead;
use std::sync::Arc;

use colored::Colorize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::application::ports::{PlaybackEndedCallback, SessionEvent, SessionEventSink};
use crate::application::AccessOutcome;
use crate::domain::recording::RecordingId;

/// Everything the event loop can be woken by
pub enum AppEvent {
    /// A line typed by the user
    Input(String),
    /// A device request finished
    Access(AccessOutcome),
    /// Capture or timer output
    Session(SessionEvent),
    /// A player reached the end of its audio
    PlaybackEnded(RecordingId),
    /// Ctrl-C, SIGTERM or end of input
    Shutdown,
}

/// Sending half of the event channel, cloned into every producer
#[derive(Clone)]
pub struct EventSender {
    tx: UnboundedSender<AppEvent>,
}

impl EventSender {
    pub fn send(&self, event: AppEvent) {
        if self.tx.send(event).is_err() {
            debug!("event dropped after the loop exited");
        }
    }

    /// Sink handed to capture streams and timers
    pub fn session_sink(&self) -> SessionEventSink {
        let sender = self.clone();
        Arc::new(move |event| sender.send(AppEvent::Session(event)))
    }

    /// Callback handed to players
    pub fn playback_ended(&self) -> PlaybackEndedCallback {
        let sender = self.clone();
        Arc::new(move |id| sender.send(AppEvent::PlaybackEnded(id)))
    }
}

/// Create the event channel
pub fn channel() -> (EventSender, UnboundedReceiver<AppEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}

/// Forward stdin lines; end of input becomes a shutdown
///
/// Reads on a plain thread so a pending read never holds up runtime shutdown.
pub fn spawn_stdin_reader(sender: EventSender) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => sender.send(AppEvent::Input(line)),
                Err(e) => {
                    debug!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
        sender.send(AppEvent::Shutdown);
    });
}

/// Turn SIGINT (and SIGTERM on unix) into a shutdown event
pub fn spawn_shutdown_signals(sender: EventSender) -> Result<(), std::io::Error> {
    let on_interrupt = sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            eprintln!("{} Received SIGINT (shutdown)", "↓".cyan());
            on_interrupt.send(AppEvent::Shutdown);
        }
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            sigterm.recv().await;
            eprintln!("{} Received SIGTERM (shutdown)", "↓".cyan());
            sender.send(AppEvent::Shutdown);
        });
    }
    #[cfg(not(unix))]
    drop(sender);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::SessionId;

    #[tokio::test]
    async fn sinks_forward_into_the_channel() {
        let (sender, mut rx) = channel();
        let sink = sender.session_sink();
        let ended = sender.playback_ended();

        sink(SessionEvent::Tick {
            session: SessionId::new(1),
        });
        ended(RecordingId::from_millis(5));

        assert!(matches!(
            rx.recv().await,
            Some(AppEvent::Session(SessionEvent::Tick { .. }))
        ));
        assert!(matches!(rx.recv().await, Some(AppEvent::PlaybackEnded(id)) if id.value() == 5));
    }

    #[test]
    fn send_after_close_is_silent() {
        let (sender, rx) = channel();
        drop(rx);
        sender.send(AppEvent::Shutdown);
    }
}
