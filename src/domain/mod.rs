//! Domain layer - Core business logic
//!
//! Contains value objects, entities, the recorder state machine and domain errors.
//! This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod recording;
pub mod session;

// Re-export common types
pub use config::AppConfig;
pub use error::*;
pub use recording::{AudioData, AudioMimeType, Duration, IdGenerator, Recording, RecordingId};
pub use session::{InvalidStateTransition, RecorderSession, SessionId, SessionState};
