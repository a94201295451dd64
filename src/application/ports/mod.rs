//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod assembler;
pub mod capture;
pub mod clock;
pub mod config;
pub mod events;
pub mod notifier;
pub mod persistence;
pub mod playback;
pub mod timer;

// Re-export common types
pub use assembler::{AssemblyError, AudioAssembler};
pub use capture::{AudioCapture, CaptureError, CaptureStream, StreamSpec};
pub use clock::Clock;
pub use config::ConfigStore;
pub use events::{SessionEvent, SessionEventSink};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
pub use persistence::{KeyValueStore, PersistenceError};
pub use playback::{
    PlaybackEndedCallback, PlaybackError, PlaybackRef, PlaybackRefs, Player, PlayerFactory,
};
pub use timer::{TickHandle, Ticker};
