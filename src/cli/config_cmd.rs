//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    match key {
        "max_duration" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.max_duration = Some(duration.to_string());
        }
        "notify" => {
            let enabled = parse_bool(value)
                .ok_or_else(|| invalid(key, "Value must be 'true' or 'false'".to_string()))?;
            config.notify = Some(enabled);
        }
        _ => {
            let dir = value.trim();
            if dir.is_empty() {
                return Err(invalid(key, "Path must not be empty".to_string()));
            }
            config.data_dir = Some(dir.to_string());
        }
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    let value = match key {
        "max_duration" => config.max_duration,
        "notify" => config.notify.map(|b| b.to_string()),
        _ => config.data_dir,
    };

    presenter.output(value.as_deref().unwrap_or(NOT_SET));
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    presenter.key_value(
        "max_duration",
        config.max_duration.as_deref().unwrap_or(NOT_SET),
    );
    presenter.key_value(
        "notify",
        &config
            .notify
            .map(|b| b.to_string())
            .unwrap_or_else(|| NOT_SET.to_string()),
    );
    presenter.key_value("data_dir", config.data_dir.as_deref().unwrap_or(NOT_SET));

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    ))
}

fn invalid(key: &str, message: String) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message,
    }
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::infrastructure::XdgConfigStore;

    fn store_in(dir: &tempfile::TempDir) -> XdgConfigStore {
        XdgConfigStore::with_path(dir.path().join("config.toml"))
    }

    #[test]
    fn parse_bool_values() {
        assert_eq!(parse_bool("true"), Some(true));
        assert_eq!(parse_bool("NO"), Some(false));
        assert_eq!(parse_bool("1"), Some(true));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[tokio::test]
    async fn set_normalizes_duration() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let presenter = Presenter::new();

        handle_set(&store, &presenter, "max_duration", "90s")
            .await
            .unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(config.max_duration, Some("1m30s".to_string()));
    }

    #[tokio::test]
    async fn set_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let presenter = Presenter::new();

        for (key, value) in [
            ("max_duration", "soon"),
            ("notify", "perhaps"),
            ("data_dir", "  "),
            ("api_key", "x"),
        ] {
            let result = handle_set(&store, &presenter, key, value).await;
            assert!(
                matches!(result, Err(ConfigError::ValidationError { .. })),
                "{key}={value} should be rejected"
            );
        }
        assert_eq!(store.load().await.unwrap(), AppConfig::empty());
    }

    #[tokio::test]
    async fn set_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let presenter = Presenter::new();

        handle_set(&store, &presenter, "notify", "yes").await.unwrap();
        handle_set(&store, &presenter, "data_dir", "/srv/notes")
            .await
            .unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.notify, Some(true));
        assert_eq!(config.data_dir, Some("/srv/notes".to_string()));
    }
}
