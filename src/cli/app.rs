//! Shared runner helpers: exit codes, config layering, store setup

use std::env;
use std::path::Path;

use crate::application::ports::ConfigStore;
use crate::application::{RecordingStore, StoreError};
use crate::domain::config::AppConfig;
use crate::domain::error::DurationParseError;
use crate::domain::recording::Duration;
use crate::infrastructure::{JsonFileStore, XdgConfigStore};

use super::args::{Cli, RecorderOptions};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "VOICE_NOTES_DATA_DIR";

/// Config layer built from command-line flags
pub fn cli_config(cli: &Cli) -> AppConfig {
    AppConfig {
        max_duration: cli.max_duration.clone(),
        notify: match (cli.notify, cli.no_notify) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        },
        data_dir: cli.data_dir.clone(),
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    let env_config = AppConfig {
        data_dir: env::var(DATA_DIR_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Resolve recorder options, rejecting an unparsable max duration
pub fn recorder_options(config: &AppConfig) -> Result<RecorderOptions, DurationParseError> {
    let max_duration = match config.max_duration.as_deref() {
        Some(s) => s.parse::<Duration>()?,
        None => Duration::default_max_duration(),
    };

    Ok(RecorderOptions {
        data_dir: config.data_dir_or_default(),
        max_duration,
        notify: config.notify_or_default(),
    })
}

/// Open the recording store persisted under `data_dir`
pub async fn open_store(data_dir: &Path) -> Result<RecordingStore<JsonFileStore>, StoreError> {
    RecordingStore::open(JsonFileStore::new(data_dir)).await
}
