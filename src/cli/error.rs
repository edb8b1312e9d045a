// src/cli/error.rs

use std::path::PathBuf;
use thiserror::Error;

use crate::ai::ServiceError;
use crate::processor::journal::JournalError;
use crate::sheets::SheetError;

/// Fatal errors surfaced by a command; each ends the process with a non-zero exit.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("No API key found. Set GENAI_API_KEY or run `proposal-extractor set-api-key`.")]
    MissingApiKey,
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error(transparent)]
    Sheet(#[from] SheetError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("Journal error: {0}")]
    Journal(#[from] JournalError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Documents folder {0:?} does not exist")]
    MissingDocuments(PathBuf),
}
