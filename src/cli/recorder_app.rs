//! Interactive recorder runner

use std::process::ExitCode;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ports::Notifier;
use crate::application::{
    PlaybackCoordinator, PlaybackStatus, RecordingStore, SessionConfig, SessionController,
    SessionError, SessionOutcome, SessionPorts,
};
use crate::domain::recording::{format_clock, RecordingId};
use crate::domain::session::SessionState;
use crate::infrastructure::{
    create_notifier, CpalCapture, JsonFileStore, MemoryPlaybackRefs, RodioPlayerFactory,
    SystemClock, TokioTicker, WavAssembler,
};

use super::app::{open_store, EXIT_ERROR, EXIT_SUCCESS};
use super::args::RecorderOptions;
use super::commands::{UserCommand, HELP};
use super::events::{self, AppEvent, EventSender};
use super::presenter::Presenter;

type Controller =
    SessionController<CpalCapture, WavAssembler, TokioTicker, MemoryPlaybackRefs, Box<dyn Notifier>>;
type Coordinator =
    PlaybackCoordinator<RodioPlayerFactory<MemoryPlaybackRefs>, MemoryPlaybackRefs, Box<dyn Notifier>>;

/// Run the interactive recorder until quit, end of input or a signal
pub async fn run_recorder(options: RecorderOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let store = match open_store(&options.data_dir).await {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let (sender, mut events) = events::channel();
    if let Err(e) = events::spawn_shutdown_signals(sender.clone()) {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let mut app = RecorderApp::new(store, &options, sender.clone());
    info!(data_dir = %options.data_dir.display(), "recorder ready");

    presenter.info(&format!(
        "Voice Notes | {} stored | max {} | type 'help' for commands",
        app.store.len(),
        options.max_duration
    ));
    app.render_list(&presenter);

    events::spawn_stdin_reader(sender);
    presenter.prompt();

    while let Some(event) = events.recv().await {
        if !app.handle(event, &mut presenter).await {
            break;
        }
    }

    presenter.stop_spinner();
    app.teardown();
    debug!("recorder shut down");
    ExitCode::from(EXIT_SUCCESS)
}

/// Why `record` was refused while a session is live
fn busy_message(state: SessionState, stopping: bool) -> &'static str {
    match state {
        SessionState::Requesting => "Already waiting for the microphone",
        _ if stopping => "Still saving the last recording. Try again in a moment.",
        _ => "Already recording. Type 'stop' to finish.",
    }
}

struct RecorderApp {
    controller: Controller,
    coordinator: Coordinator,
    store: RecordingStore<JsonFileStore>,
    sender: EventSender,
    max_secs: u64,
}

impl RecorderApp {
    fn new(store: RecordingStore<JsonFileStore>, options: &RecorderOptions, sender: EventSender) -> Self {
        let refs = Arc::new(MemoryPlaybackRefs::new());

        let ports = SessionPorts {
            capture: Arc::new(CpalCapture::new()),
            assembler: WavAssembler::new(),
            ticker: TokioTicker::new(),
            refs: Arc::clone(&refs),
            notifier: create_notifier(options.notify),
            clock: Box::new(SystemClock),
        };
        let controller = SessionController::new(
            ports,
            sender.session_sink(),
            SessionConfig {
                max_duration: Some(options.max_duration),
            },
        );

        let factory = RodioPlayerFactory::new(Arc::clone(&refs), sender.playback_ended());
        let coordinator =
            PlaybackCoordinator::new(factory, refs, create_notifier(options.notify));

        Self {
            controller,
            coordinator,
            store,
            sender,
            max_secs: options.max_duration.as_secs(),
        }
    }

    /// Handle one event. Returns false when the recorder should exit.
    async fn handle(&mut self, event: AppEvent, presenter: &mut Presenter) -> bool {
        match event {
            AppEvent::Input(line) => {
                if line.trim().is_empty() {
                    presenter.prompt();
                    return true;
                }
                match line.parse::<UserCommand>() {
                    Ok(UserCommand::Quit) => return false,
                    Ok(command) => self.run_command(command, presenter).await,
                    Err(e) => presenter.warn(&e.to_string()),
                }
                presenter.prompt();
            }
            AppEvent::Access(outcome) => {
                if let Some(outcome) = self.controller.complete_access(outcome).await {
                    self.report(outcome, presenter);
                }
            }
            AppEvent::Session(event) => {
                let outcome = self.controller.handle(event, &mut self.store).await;
                match outcome {
                    Some(outcome) => {
                        self.report(outcome, presenter);
                        presenter.prompt();
                    }
                    None if self.controller.is_stopping() => {
                        presenter.update_spinner("Finishing recording...")
                    }
                    None if self.controller.state() == SessionState::Recording => {
                        presenter.show_recording(self.controller.elapsed_secs(), self.max_secs)
                    }
                    None => {}
                }
            }
            AppEvent::PlaybackEnded(id) => {
                if self.coordinator.on_playback_ended(&id) {
                    let number = self.number_of(&id);
                    presenter.info(&format!("Finished playing #{}", number));
                    presenter.prompt();
                }
            }
            AppEvent::Shutdown => return false,
        }
        true
    }

    async fn run_command(&mut self, command: UserCommand, presenter: &mut Presenter) {
        match command {
            UserCommand::Record => self.record(presenter).await,
            UserCommand::Stop => {
                if self.controller.stop() {
                    presenter.update_spinner("Finishing recording...");
                } else {
                    presenter.warn("Not recording");
                }
            }
            UserCommand::Cancel => {
                if self.controller.cancel().await {
                    presenter.stop_spinner();
                } else {
                    presenter.warn("Nothing to cancel");
                }
            }
            UserCommand::List => self.render_list(presenter),
            UserCommand::Play(number) => self.toggle(number, presenter),
            UserCommand::Delete(number) => self.delete(number, presenter).await,
            UserCommand::Help => presenter.output(HELP),
            UserCommand::Quit => {}
        }
    }

    async fn record(&mut self, presenter: &mut Presenter) {
        match self.controller.start().await {
            Ok(pending) => {
                presenter.start_spinner("Requesting microphone access...");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    sender.send(AppEvent::Access(pending.resolve().await));
                });
            }
            Err(SessionError::Busy(state)) => {
                presenter.warn(busy_message(state, self.controller.is_stopping()))
            }
            Err(e) => presenter.error(self.controller.last_error().unwrap_or(&e.to_string())),
        }
    }

    fn toggle(&mut self, number: usize, presenter: &Presenter) {
        let Some(recording) = self.store.by_number(number) else {
            presenter.warn(&format!("No recording #{}", number));
            return;
        };

        match self.coordinator.toggle(recording) {
            Ok(PlaybackStatus::Playing) => presenter.info(&format!(
                "Playing #{} ({})",
                number,
                recording.duration().clock()
            )),
            Ok(PlaybackStatus::Paused) => presenter.info(&format!("Paused #{}", number)),
            Err(e) => presenter.error(&e.to_string()),
        }
    }

    async fn delete(&mut self, number: usize, presenter: &Presenter) {
        let Some(id) = self.store.by_number(number).map(|r| r.id().clone()) else {
            presenter.warn(&format!("No recording #{}", number));
            return;
        };

        if let Err(e) = self.coordinator.delete(&mut self.store, &id).await {
            presenter.error(&e.to_string());
        }
    }

    fn report(&mut self, outcome: SessionOutcome, presenter: &mut Presenter) {
        match outcome {
            SessionOutcome::Started(_) => {
                presenter.stop_spinner();
                presenter.show_recording(0, self.max_secs);
            }
            SessionOutcome::Saved {
                id,
                duration_secs,
                reference,
            } => {
                presenter.stop_spinner();
                self.coordinator.adopt(id.clone(), reference);
                presenter.info(&format!(
                    "Saved as #{} ({})",
                    self.number_of(&id),
                    format_clock(u64::from(duration_secs))
                ));
            }
            SessionOutcome::TooShort => presenter.stop_spinner(),
            SessionOutcome::Failed(e) => {
                presenter.stop_spinner();
                match self.controller.last_error() {
                    Some(message) => presenter.error(message),
                    None => debug!(error = %e, "session failed"),
                }
            }
        }
    }

    fn render_list(&self, presenter: &Presenter) {
        presenter.recording_list(
            self.store.newest_first(),
            self.coordinator.playing(),
            self.controller.state() == SessionState::Idle,
        );
    }

    fn number_of(&self, id: &RecordingId) -> usize {
        self.store
            .newest_first()
            .find(|(_, r)| r.id() == id)
            .map_or(0, |(n, _)| n)
    }

    fn teardown(&mut self) {
        self.controller.teardown();
        self.coordinator.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_message_tells_a_pending_save_apart() {
        assert_eq!(
            busy_message(SessionState::Recording, false),
            "Already recording. Type 'stop' to finish."
        );
        assert_eq!(
            busy_message(SessionState::Recording, true),
            "Still saving the last recording. Try again in a moment."
        );
        assert_eq!(
            busy_message(SessionState::Requesting, false),
            "Already waiting for the microphone"
        );
    }
}
