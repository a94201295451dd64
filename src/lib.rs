//! Voice Notes - terminal voice-note recorder
//!
//! This crate records short voice notes from the default microphone, keeps
//! them in a persistent list and plays them back on demand.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Recordings, durations, the recorder state machine and config
//! - **Application**: Session controller, recording store, playback coordinator and port traits
//! - **Infrastructure**: Adapter implementations (cpal capture, rodio playback, JSON files, notifications)
//! - **CLI**: Command-line interface, interactive command loop and output formatting

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
