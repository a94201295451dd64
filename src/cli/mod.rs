//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, the event sources
//! and the application runners.

pub mod app;
pub mod args;
pub mod commands;
pub mod config_cmd;
pub mod events;
pub mod library_cmd;
pub mod presenter;
pub mod recorder_app;

// Re-export commonly used types
pub use app::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, RecorderOptions};
pub use presenter::Presenter;
pub use recorder_app::run_recorder;
