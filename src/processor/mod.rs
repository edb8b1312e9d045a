// src/processor/mod.rs
//! Row Processor
//!
//! Walks the worksheet records in order and fills the schema columns of every
//! row that still needs them.
//!
//! ## Per-row steps
//!
//! 1. Skip rows whose processed-marker column is already filled
//! 2. Skip rows without an identifier
//! 3. Resolve the proposal document; skip when none matches
//! 4. Extract; a failure is logged and the run moves on
//! 5. Write all 17 fields (sentinel for missing ones) and save the workbook
//!
//! No per-row failure ends the run. The workbook is saved after every row that
//! reached extraction and once more at the end, so an interrupted run loses at
//! most the document in flight and can simply be started again.

pub mod journal;

use std::path::PathBuf;

use tracing::{error, info, warn};

use crate::ai::Extractor;
use crate::documents::DocumentIndex;
use crate::sheets::{Dataset, SheetResult, SheetStore};

pub use journal::RunJournal;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Processed,
    AlreadyProcessed,
    EmptyIdentifier,
    NoMatchingDocument,
    ExtractionFailed { kind: &'static str, message: String },
}

impl RowOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RowOutcome::Processed => "processed",
            RowOutcome::AlreadyProcessed => "already_processed",
            RowOutcome::EmptyIdentifier => "empty_identifier",
            RowOutcome::NoMatchingDocument => "no_matching_document",
            RowOutcome::ExtractionFailed { .. } => "failed",
        }
    }

    pub fn detail(&self) -> Option<String> {
        match self {
            RowOutcome::ExtractionFailed { kind, message } => Some(format!("{}: {}", kind, message)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowReport {
    pub row: u32,
    pub identifier: Option<String>,
    pub document: Option<PathBuf>,
    /// Other documents that matched the TPN and were not used
    pub passed_over: usize,
    pub outcome: RowOutcome,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub reports: Vec<RowReport>,
}

impl RunSummary {
    fn count(&self, label: &str) -> usize {
        self.reports
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }

    pub fn processed(&self) -> usize {
        self.count("processed")
    }

    pub fn already_processed(&self) -> usize {
        self.count("already_processed")
    }

    pub fn empty_identifier(&self) -> usize {
        self.count("empty_identifier")
    }

    pub fn no_document(&self) -> usize {
        self.count("no_matching_document")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Rows whose TPN matched more than one document.
    pub fn ambiguous(&self) -> usize {
        self.reports.iter().filter(|r| r.passed_over > 0).count()
    }

    #[cfg(test)]
    pub fn report(&self, row: u32) -> Option<&RowReport> {
        self.reports.iter().find(|r| r.row == row)
    }
}

pub struct RowProcessor<'a, E: Extractor, W: SheetStore> {
    extractor: &'a mut E,
    store: &'a mut W,
    journal: Option<&'a RunJournal>,
}

impl<'a, E: Extractor, W: SheetStore> RowProcessor<'a, E, W> {
    pub fn new(extractor: &'a mut E, store: &'a mut W) -> Self {
        Self {
            extractor,
            store,
            journal: None,
        }
    }

    pub fn with_journal(mut self, journal: &'a RunJournal) -> Self {
        self.journal = Some(journal);
        self
    }

    /// Process every record of `dataset` against `index`.
    ///
    /// Only workbook save failures abort the run; they are returned as errors.
    pub fn process(&mut self, dataset: &mut Dataset, index: &DocumentIndex) -> SheetResult<RunSummary> {
        let mut summary = RunSummary::default();
        let total = dataset.records.len();

        for (position, record) in dataset.records.iter_mut().enumerate() {
            let row = record.row;
            let mut report = RowReport {
                row,
                identifier: record.identifier.clone(),
                document: None,
                passed_over: 0,
                outcome: RowOutcome::AlreadyProcessed,
            };

            if record.is_processed() {
                info!("Row {}: already filled, skipping.", row);
                self.finish_row(&mut summary, report);
                continue;
            }

            let Some(identifier) = record.identifier.clone() else {
                warn!("Row {}: Empty TPN, skipping.", row);
                report.outcome = RowOutcome::EmptyIdentifier;
                self.finish_row(&mut summary, report);
                continue;
            };

            let Some(selection) = index.select(&identifier) else {
                warn!("  ⚠ Could not find PDF for TPN {} (Excel row {})", identifier, row);
                report.outcome = RowOutcome::NoMatchingDocument;
                self.finish_row(&mut summary, report);
                continue;
            };
            let document = selection.document;
            report.document = Some(document.path.clone());
            report.passed_over = selection.passed_over;

            info!(
                "Processing Excel row {} ({}/{}) - TPN {}: {}",
                row,
                position + 1,
                total,
                identifier,
                document.file_name()
            );

            match self.extractor.extract(&document.path) {
                Ok(result) => {
                    let missing = result.missing_fields();
                    if !missing.is_empty() {
                        warn!(
                            "  Response lacked {:?}; writing placeholder",
                            missing.iter().map(|f| f.key()).collect::<Vec<_>>()
                        );
                    }
                    let updates = result.cell_updates();
                    self.store.apply_field_updates(row, &updates)?;
                    record.apply_updates(&updates);
                    info!("  ✓ Updated row {} in Excel, TPN: {}", row, identifier);
                    report.outcome = RowOutcome::Processed;
                }
                Err(e) => {
                    warn!("  ⚠ Could not extract data from {}: {}", document.file_name(), e);
                    report.outcome = RowOutcome::ExtractionFailed {
                        kind: e.kind(),
                        message: e.to_string(),
                    };
                }
            }

            self.store.save()?;
            self.finish_row(&mut summary, report);
        }

        self.store.save()?;
        Ok(summary)
    }

    fn finish_row(&self, summary: &mut RunSummary, report: RowReport) {
        if let Some(journal) = self.journal {
            if let Err(e) = journal.record(&report) {
                error!("Could not journal row {}: {}", report.row, e);
            }
        }
        summary.reports.push(report);
    }
}
