// src/cli/run.rs
//! `run`: wire settings, workbook, document index and model client together
//! and process every row.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{info, warn};

use super::api_key::resolve_api_key;
use super::error::AppError;
use super::RunArgs;
use crate::ai::{Backoff, BackoffPolicy, ExtractionClient, GeminiService};
use crate::documents::{discover_documents, DocumentIndex};
use crate::processor::{RowProcessor, RunJournal, RunSummary};
use crate::settings::{AppSettings, ModelTier};
use crate::sheets::store::default_output_path;
use crate::sheets::{SheetStore, XlsxSheetStore};

/// Effective options for one run: CLI flags layered over saved settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub sheet: PathBuf,
    pub documents: PathBuf,
    pub output: PathBuf,
    pub model_tier: ModelTier,
    pub max_attempts: u32,
    pub strict: bool,
    pub resume: bool,
    pub journal: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl RunPlan {
    pub fn resolve(args: RunArgs, settings: &AppSettings) -> Self {
        let sheet = args.sheet.unwrap_or_else(|| settings.default_sheet.clone());
        let output = args.output.unwrap_or_else(|| default_output_path(&sheet));
        Self {
            documents: args
                .documents
                .unwrap_or_else(|| settings.default_documents.clone()),
            output,
            sheet,
            model_tier: args.model_tier.unwrap_or(settings.model_tier),
            max_attempts: args.max_attempts.unwrap_or(settings.max_attempts).max(1),
            strict: args.strict || settings.strict_schema,
            resume: !args.fresh,
            journal: args.journal,
            request_timeout: Duration::from_secs(settings.request_timeout_secs),
        }
    }
}

pub fn run(args: RunArgs, settings: &AppSettings) -> Result<RunSummary, AppError> {
    let plan = RunPlan::resolve(args, settings);
    info!(
        "Sheet: {:?} -> {:?} | Documents: {:?} | Model: {}",
        plan.sheet,
        plan.output,
        plan.documents,
        plan.model_tier.model_name()
    );

    if !plan.documents.is_dir() {
        return Err(AppError::MissingDocuments(plan.documents));
    }

    let mut store = XlsxSheetStore::new(&plan.sheet, &plan.output, plan.resume);
    let mut dataset = store.load()?;
    let api_key = resolve_api_key()?;

    let index = DocumentIndex::build(discover_documents(&plan.documents));
    info!("Found {} candidate PDF(s)", index.len());
    if index.is_empty() {
        warn!("No PDFs found under {:?}; every row will be skipped.", plan.documents);
    }

    let service = GeminiService::new(
        api_key,
        plan.model_tier.model_name().to_string(),
        plan.request_timeout,
    )?;
    let backoff = Backoff::system(BackoffPolicy::with_max_attempts(plan.max_attempts));
    let mut client = ExtractionClient::new(service, backoff, plan.strict);

    let journal = match &plan.journal {
        Some(path) => Some(RunJournal::open(path)?),
        None => None,
    };

    let mut processor = RowProcessor::new(&mut client, &mut store);
    if let Some(journal) = journal.as_ref() {
        info!("Journaling run {} to {:?}", journal.run_id(), plan.journal);
        processor = processor.with_journal(journal);
    }
    let summary = processor.process(&mut dataset, &index)?;

    print_summary(&summary, store.output_path());
    Ok(summary)
}

pub fn print_summary(summary: &RunSummary, output: &Path) {
    println!("\n=== Run complete ===");
    println!("  Processed:          {}", summary.processed());
    println!("  Already processed:  {}", summary.already_processed());
    println!("  Empty TPN:          {}", summary.empty_identifier());
    println!("  No matching PDF:    {}", summary.no_document());
    println!("  Failed:             {}", summary.failed());
    println!("  Ambiguous TPN:      {}", summary.ambiguous());
    for report in summary.reports.iter().filter(|r| r.outcome.detail().is_some()) {
        println!(
            "    row {}: {}",
            report.row,
            report.outcome.detail().unwrap_or_default()
        );
    }
    println!("Output saved to {}", output.display());
}
