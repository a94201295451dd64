//! Voice Notes CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use voice_notes::cli::{
    app::{cli_config, load_merged_config, recorder_options, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    library_cmd::{handle_delete, handle_list},
    presenter::Presenter,
    run_recorder,
};
use voice_notes::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let mut cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();
    let command = cli.command.take();

    if let Some(Commands::Config { action }) = command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    let config = load_merged_config(cli_config(&cli)).await;

    match command {
        Some(Commands::List) => {
            let data_dir = config.data_dir_or_default();
            finish(handle_list(&data_dir, &presenter).await, &presenter)
        }
        Some(Commands::Delete { number }) => {
            let data_dir = config.data_dir_or_default();
            finish(handle_delete(&data_dir, number, &presenter).await, &presenter)
        }
        Some(Commands::Config { .. }) => ExitCode::SUCCESS,
        None => match recorder_options(&config) {
            Ok(options) => run_recorder(options).await,
            Err(e) => {
                presenter.error(&format!("Invalid max-duration: {}", e));
                ExitCode::from(EXIT_USAGE_ERROR)
            }
        },
    }
}

fn finish<E: std::fmt::Display>(result: Result<(), E>, presenter: &Presenter) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "voice_notes=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
