// src/main.rs

use clap::Parser;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

mod ai;
mod cli;
mod documents;
mod processor;
mod settings;
mod sheets;

use cli::{AppError, Cli, Commands, RunArgs};
use settings::AppSettings;

fn main() -> ExitCode {
    // .env is optional; a real environment variable always wins
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match dispatch(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_settings() -> AppSettings {
    settings::io::load_settings_from_file().unwrap_or_else(|e| {
        warn!("Using default settings: {}", e);
        AppSettings::default()
    })
}

fn dispatch(command: Option<Commands>) -> Result<(), AppError> {
    let settings = load_settings();
    match command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => cli::run::run(args, &settings).map(|_| ()),
        Commands::ListColumns { path } => {
            let path = path.unwrap_or(settings.default_sheet);
            Ok(cli::list_columns::run(&path)?)
        }
        Commands::ListDocuments { path } => {
            let path = path.unwrap_or(settings.default_documents);
            cli::list_documents::run(&path);
            Ok(())
        }
        Commands::ShowJournal { path } => Ok(cli::show_journal::run(&path)?),
        Commands::SetApiKey { key, clear } => cli::api_key::run(key, clear),
        Commands::Settings(args) => Ok(cli::configure::run(args, settings)?),
    }
}
