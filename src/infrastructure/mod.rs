//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, rodio, the file system and the desktop.

pub mod audio;
pub mod capture;
pub mod clock;
pub mod config;
pub mod notification;
pub mod persistence;
pub mod playback;
pub mod timer;

// Re-export adapters
pub use audio::{MemoryPlaybackRefs, WavAssembler};
pub use capture::CpalCapture;
pub use clock::SystemClock;
pub use config::XdgConfigStore;
pub use notification::{create_notifier, FanoutNotifier, NotifyRustNotifier, TerminalNotifier};
pub use persistence::{JsonFileStore, MemoryStore};
pub use playback::{RodioPlayer, RodioPlayerFactory};
pub use timer::TokioTicker;
