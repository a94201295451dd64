//! Application layer - Use cases and port interfaces
//!
//! Contains the recorder's core operations and trait definitions
//! for platform capabilities.

pub mod playback;
pub mod ports;
pub mod session;
pub mod store;

// Re-export use cases
pub use playback::{PlaybackCoordinator, PlaybackStatus};
pub use session::{
    AccessOutcome, PendingAccess, SessionConfig, SessionController, SessionError,
    SessionOutcome, SessionPorts,
};
pub use store::{RecordingStore, StoreError, RECORDINGS_KEY};
