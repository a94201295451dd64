//! Recorder session state machine

use std::fmt;
use thiserror::Error;

/// Recorder states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    Recording,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Recording => "recording",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identifies one start-to-finalization cycle.
///
/// Events (access grants, ticks, chunks) carry the id of the session that
/// produced them so late arrivals from an earlier session can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SessionId(u64);

impl SessionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Recorder session entity.
/// Manages state transitions for one recorder over its lifetime.
///
/// State machine:
///   IDLE -> REQUESTING (request_access)
///   REQUESTING -> RECORDING (grant_access)
///   REQUESTING -> IDLE (deny_access)
///   RECORDING -> IDLE (finish)
///   any -> IDLE (abort)
#[derive(Debug, Default)]
pub struct RecorderSession {
    state: SessionState,
    current: SessionId,
}

impl RecorderSession {
    /// Create a new recorder session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Id of the most recently started session
    pub fn current(&self) -> SessionId {
        self.current
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    /// True if `id` is the live session and it is in `state`
    pub fn is_current_in(&self, id: SessionId, state: SessionState) -> bool {
        self.current == id && self.state == state
    }

    /// Transition from IDLE to REQUESTING, opening a new session
    pub fn request_access(&mut self) -> Result<SessionId, InvalidStateTransition> {
        if self.state != SessionState::Idle {
            return Err(self.invalid("start recording"));
        }
        self.current = SessionId(self.current.0 + 1);
        self.state = SessionState::Requesting;
        Ok(self.current)
    }

    /// Transition from REQUESTING to RECORDING
    pub fn grant_access(&mut self, id: SessionId) -> Result<(), InvalidStateTransition> {
        if !self.is_current_in(id, SessionState::Requesting) {
            return Err(self.invalid("accept device access"));
        }
        self.state = SessionState::Recording;
        Ok(())
    }

    /// Transition from REQUESTING to IDLE after a denial or device error
    pub fn deny_access(&mut self, id: SessionId) -> Result<(), InvalidStateTransition> {
        if !self.is_current_in(id, SessionState::Requesting) {
            return Err(self.invalid("reject device access"));
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Transition from RECORDING to IDLE once the capture is finalized
    pub fn finish(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != SessionState::Recording {
            return Err(self.invalid("finish recording"));
        }
        self.state = SessionState::Idle;
        Ok(())
    }

    /// Return to IDLE from any state. Returns the state that was left.
    pub fn abort(&mut self) -> SessionState {
        std::mem::replace(&mut self.state, SessionState::Idle)
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = RecorderSession::new();
        assert!(session.is_idle());
        assert!(!session.is_recording());
        assert_eq!(session.current(), SessionId::new(0));
    }

    #[test]
    fn request_access_opens_new_session() {
        let mut session = RecorderSession::new();
        let first = session.request_access().unwrap();
        assert_eq!(session.state(), SessionState::Requesting);
        session.abort();
        let second = session.request_access().unwrap();
        assert!(second > first);
    }

    #[test]
    fn request_access_while_busy_fails() {
        let mut session = RecorderSession::new();
        session.request_access().unwrap();
        let err = session.request_access().unwrap_err();
        assert_eq!(err.current_state, SessionState::Requesting);

        let id = session.current();
        session.grant_access(id).unwrap();
        let err = session.request_access().unwrap_err();
        assert_eq!(err.current_state, SessionState::Recording);
    }

    #[test]
    fn grant_access_moves_to_recording() {
        let mut session = RecorderSession::new();
        let id = session.request_access().unwrap();
        session.grant_access(id).unwrap();
        assert!(session.is_recording());
    }

    #[test]
    fn grant_for_stale_session_fails() {
        let mut session = RecorderSession::new();
        let stale = session.request_access().unwrap();
        session.abort();
        session.request_access().unwrap();

        assert!(session.grant_access(stale).is_err());
        assert_eq!(session.state(), SessionState::Requesting);
    }

    #[test]
    fn deny_access_returns_to_idle() {
        let mut session = RecorderSession::new();
        let id = session.request_access().unwrap();
        session.deny_access(id).unwrap();
        assert!(session.is_idle());
    }

    #[test]
    fn finish_from_idle_fails() {
        let mut session = RecorderSession::new();
        let err = session.finish().unwrap_err();
        assert_eq!(err.current_state, SessionState::Idle);
    }

    #[test]
    fn full_cycle() {
        let mut session = RecorderSession::new();
        let id = session.request_access().unwrap();
        session.grant_access(id).unwrap();
        session.finish().unwrap();
        assert!(session.is_idle());

        // Can start another cycle
        assert!(session.request_access().is_ok());
    }

    #[test]
    fn abort_reports_previous_state() {
        let mut session = RecorderSession::new();
        assert_eq!(session.abort(), SessionState::Idle);
        session.request_access().unwrap();
        assert_eq!(session.abort(), SessionState::Requesting);
        assert!(session.is_idle());
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Requesting.to_string(), "requesting");
        assert_eq!(SessionState::Recording.to_string(), "recording");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionState::Recording,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("recording state"));
    }
}
