// src/cli/mod.rs
// Command-line surface: the extraction run plus inspection tools

pub mod api_key;
pub mod configure;
pub mod error;
pub mod list_columns;
pub mod list_documents;
pub mod run;
pub mod show_journal;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::settings::ModelTier;

pub use error::AppError;

#[derive(Parser)]
#[command(name = "proposal-extractor")]
#[command(about = "Fill proposal review columns of a TPN worksheet from the proposal PDFs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract fields for every unprocessed row (the default command)
    Run(RunArgs),

    /// Show the worksheet header row and the extraction column mapping
    ListColumns {
        /// Path to the workbook (defaults to the configured sheet)
        path: Option<PathBuf>,
    },

    /// List discovered proposal PDFs and the TPN derived from each
    ListDocuments {
        /// Documents folder (defaults to the configured folder)
        path: Option<PathBuf>,
    },

    /// Print the row outcomes of the most recent journaled run
    ShowJournal {
        /// Path to the journal database
        path: PathBuf,
    },

    /// Store the model API key in the OS keyring
    SetApiKey {
        /// The key; read from stdin when omitted
        key: Option<String>,
        /// Remove the stored key instead
        #[arg(long)]
        clear: bool,
    },

    /// Show settings, or change them with the flags given
    Settings(SettingsArgs),
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Source workbook (never modified)
    #[arg(long)]
    pub sheet: Option<PathBuf>,
    /// Root folder holding the proposal PDFs
    #[arg(long)]
    pub documents: Option<PathBuf>,
    /// Output workbook (defaults to `<sheet stem>_updated.xlsx`)
    #[arg(long)]
    pub output: Option<PathBuf>,
    #[arg(long, value_enum)]
    pub model_tier: Option<ModelTier>,
    #[arg(long)]
    pub max_attempts: Option<u32>,
    /// Re-request responses that miss schema keys
    #[arg(long)]
    pub strict: bool,
    /// Start from the source workbook even if the output exists
    #[arg(long)]
    pub fresh: bool,
    /// Append row outcomes to this SQLite journal
    #[arg(long)]
    pub journal: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct SettingsArgs {
    #[arg(long, value_enum)]
    pub model_tier: Option<ModelTier>,
    #[arg(long)]
    pub max_attempts: Option<u32>,
    #[arg(long)]
    pub strict_schema: Option<bool>,
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,
    #[arg(long)]
    pub default_sheet: Option<PathBuf>,
    #[arg(long)]
    pub default_documents: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["proposal-extractor"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli = Cli::try_parse_from([
            "proposal-extractor",
            "run",
            "--sheet",
            "in.xlsx",
            "--model-tier",
            "pro",
            "--strict",
            "--fresh",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.sheet, Some(PathBuf::from("in.xlsx")));
                assert_eq!(args.model_tier, Some(ModelTier::Pro));
                assert!(args.strict);
                assert!(args.fresh);
                assert!(args.output.is_none());
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_settings_flags() {
        let cli = Cli::try_parse_from(["proposal-extractor", "settings", "--strict-schema", "true"]).unwrap();
        match cli.command {
            Some(Commands::Settings(args)) => assert_eq!(args.strict_schema, Some(true)),
            _ => panic!("expected settings"),
        }
    }
}
