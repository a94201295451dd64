//! Recorder session state machine

mod machine;

pub use machine::{InvalidStateTransition, RecorderSession, SessionId, SessionState};
