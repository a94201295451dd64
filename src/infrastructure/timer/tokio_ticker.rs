//! One-second tick timer on the tokio runtime

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::application::ports::{SessionEvent, SessionEventSink, TickHandle, Ticker};
use crate::domain::session::SessionId;

/// Emits `SessionEvent::Tick` once per period until cancelled
#[derive(Debug, Clone, Copy)]
pub struct TokioTicker {
    period: Duration,
}

impl TokioTicker {
    pub fn new() -> Self {
        Self::with_period(Duration::from_secs(1))
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for TokioTicker {
    fn default() -> Self {
        Self::new()
    }
}

impl Ticker for TokioTicker {
    fn start(&self, session: SessionId, sink: SessionEventSink) -> Box<dyn TickHandle> {
        let period = self.period;
        let task = tokio::spawn(async move {
            // First tick after one full period, not immediately
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                sink(SessionEvent::Tick { session });
            }
        });
        Box::new(TokioTickHandle { task: Some(task) })
    }
}

struct TokioTickHandle {
    task: Option<JoinHandle<()>>,
}

impl TickHandle for TokioTickHandle {
    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for TokioTickHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
