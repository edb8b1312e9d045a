// src/sheets/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Could not open workbook {path:?}: {message}")]
    Open { path: PathBuf, message: String },
    #[error("Could not save workbook {path:?}: {message}")]
    Save { path: PathBuf, message: String },
    #[error("Workbook {0:?} has no worksheet")]
    NoWorksheet(PathBuf),
    #[error("Header row {row} has no '{header}' column")]
    MissingIdentifierColumn { row: u32, header: String },
    #[error("Workbook is not loaded; call load() first")]
    NotLoaded,
    #[error("Row {0} is outside the data range")]
    RowOutOfRange(u32),
}

pub type SheetResult<T> = Result<T, SheetError>;
