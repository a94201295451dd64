//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::recording::Duration;

/// Voice Notes - record, keep and play back voice notes
#[derive(Parser, Debug)]
#[command(name = "voice-notes")]
#[command(version)]
#[command(about = "Record, keep and play back voice notes from the terminal")]
#[command(long_about = None)]
pub struct Cli {
    /// Directory recordings are stored in
    #[arg(long, value_name = "DIR", global = true)]
    pub data_dir: Option<String>,

    /// Stop recording automatically after this long (e.g., 90s, 5m, 1h)
    #[arg(short = 'm', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// Also show desktop notifications
    #[arg(short = 'n', long)]
    pub notify: bool,

    /// Terminal notices only, even if the config enables desktop ones
    #[arg(long, conflicts_with = "notify")]
    pub no_notify: bool,

    /// Print diagnostic logs to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List stored recordings, newest first
    List,
    /// Delete a recording by its list number
    Delete {
        /// Number shown by `list`
        number: usize,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Options for the interactive recorder, resolved from config layers
#[derive(Debug, Clone)]
pub struct RecorderOptions {
    pub data_dir: PathBuf,
    pub max_duration: Duration,
    pub notify: bool,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["max_duration", "notify", "data_dir"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
