// src/sheets/store.rs
//! Sheet Persistence
//!
//! The `SheetStore` port is the only way the pipeline touches the workbook.
//!
//! ## Responsibilities
//!
//! - Load the proposals worksheet into a `Dataset` (headers on `HEADER_ROW`)
//! - Apply field updates cell by cell, addressed by column letter and row
//! - Save to the output path; the source workbook is never written
//!
//! `XlsxSheetStore` keeps the whole `umya_spreadsheet` book in memory between
//! `load` and `save`, so fonts, merges and column widths survive the round trip.

use std::path::{Path, PathBuf};

use tracing::{debug, info, trace};
use umya_spreadsheet::{CellRawValue, Spreadsheet, Worksheet};

use super::error::{SheetError, SheetResult};
use super::record::{identifier_column, record_from_cells, CellValue, Dataset};
use super::schema::{Field, HEADER_ROW, IDENTIFIER_HEADER};

/// Persistence port for the proposals worksheet.
pub trait SheetStore {
    /// Read headers and data records. Fails if the identifier column is absent.
    fn load(&mut self) -> SheetResult<Dataset>;

    /// Write `updates` into worksheet row `row`.
    fn apply_field_updates(&mut self, row: u32, updates: &[(Field, String)]) -> SheetResult<()>;

    /// Persist the current state to the output location.
    fn save(&mut self) -> SheetResult<()>;
}

/// `.xlsx` workbook store backed by `umya_spreadsheet`.
pub struct XlsxSheetStore {
    source: PathBuf,
    output: PathBuf,
    resume: bool,
    book: Option<Spreadsheet>,
}

impl XlsxSheetStore {
    /// Store reading `source` and writing `output`. With `resume`, an existing
    /// `output` is loaded instead of `source` so finished rows stay finished.
    pub fn new(source: impl Into<PathBuf>, output: impl Into<PathBuf>, resume: bool) -> Self {
        Self {
            source: source.into(),
            output: output.into(),
            resume,
            book: None,
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// The workbook `load` reads from.
    pub fn load_path(&self) -> &Path {
        if self.resume && self.output.exists() {
            &self.output
        } else {
            &self.source
        }
    }

    fn worksheet_mut(&mut self) -> SheetResult<&mut Worksheet> {
        let book = self.book.as_mut().ok_or(SheetError::NotLoaded)?;
        book.get_sheet_mut(&0)
            .ok_or_else(|| SheetError::NoWorksheet(self.source.clone()))
    }
}

/// Default output path: `<stem>_updated.xlsx` next to the source.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "proposals_sheet".to_string());
    source.with_file_name(format!("{}_updated.xlsx", stem))
}

fn read_cell(sheet: &Worksheet, column: u32, row: u32) -> CellValue {
    let Some(cell) = sheet.get_cell((column, row)) else {
        return CellValue::Empty;
    };
    match cell.get_raw_value() {
        CellRawValue::Numeric(n) => CellValue::Number(*n),
        CellRawValue::Empty => CellValue::Empty,
        _ => {
            let text = cell.get_value().into_owned();
            if text.is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(text)
            }
        }
    }
}

/// Read the dataset out of a worksheet.
pub fn read_dataset(sheet: &Worksheet) -> SheetResult<Dataset> {
    let last_column = sheet.get_highest_column().max(Field::AB.column());
    let last_row = sheet.get_highest_row();

    let headers: Vec<String> = (1..=last_column)
        .map(|col| read_cell(sheet, col, HEADER_ROW).as_text().trim().to_string())
        .collect();

    let identifier_column =
        identifier_column(&headers).ok_or_else(|| SheetError::MissingIdentifierColumn {
            row: HEADER_ROW,
            header: IDENTIFIER_HEADER.to_string(),
        })?;

    let mut records = Vec::new();
    let mut blank_rows = Vec::new();
    for row in HEADER_ROW + 1..=last_row {
        let cells = (1..=last_column)
            .map(|col| read_cell(sheet, col, row))
            .collect();
        match record_from_cells(row, identifier_column, cells) {
            Some(record) => records.push(record),
            None => {
                trace!("Row {}: blank, not a record", row);
                blank_rows.push(row);
            }
        }
    }

    Ok(Dataset {
        headers,
        identifier_column,
        records,
        blank_rows,
    })
}

impl SheetStore for XlsxSheetStore {
    fn load(&mut self) -> SheetResult<Dataset> {
        let path = self.load_path().to_path_buf();
        if path == self.output {
            info!("Resuming from existing output {:?}", path);
        } else {
            info!("Loading workbook {:?}", path);
        }
        let book = umya_spreadsheet::reader::xlsx::read(&path).map_err(|e| SheetError::Open {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let sheet = book
            .get_sheet(&0)
            .ok_or_else(|| SheetError::NoWorksheet(path.clone()))?;
        let dataset = read_dataset(sheet)?;
        info!(
            "Found {} data rows, {} blank rows skipped (identifier column {})",
            dataset.records.len(),
            dataset.blank_rows.len(),
            super::schema::column_letter(dataset.identifier_column)
        );
        self.book = Some(book);
        Ok(dataset)
    }

    fn apply_field_updates(&mut self, row: u32, updates: &[(Field, String)]) -> SheetResult<()> {
        if row <= HEADER_ROW {
            return Err(SheetError::RowOutOfRange(row));
        }
        let sheet = self.worksheet_mut()?;
        for (field, value) in updates {
            let address = field.address(row);
            sheet.get_cell_mut(address.as_str()).set_value_string(value.as_str());
        }
        debug!("Wrote {} cells on row {}", updates.len(), row);
        Ok(())
    }

    fn save(&mut self) -> SheetResult<()> {
        let book = self.book.as_ref().ok_or(SheetError::NotLoaded)?;
        umya_spreadsheet::writer::xlsx::write(book, &self.output).map_err(|e| SheetError::Save {
            path: self.output.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_book() -> Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_mut(&0).unwrap();
        sheet.get_cell_mut("A5").set_value_string("S.No");
        sheet.get_cell_mut("B5").set_value_string("TPN No.");
        sheet.get_cell_mut("A6").set_value_number(1);
        sheet.get_cell_mut("B6").set_value_number(135236);
        sheet.get_cell_mut("A7").set_value_number(2);
        sheet.get_cell_mut("B7").set_value_string(" 500 ");
        sheet.get_cell_mut("U7").set_value_string("Yes");
        sheet.get_cell_mut("A9").set_value_number(4);
        sheet.get_cell_mut("B9").set_value_string("900");
        book
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/data/proposals_sheet.xlsx")),
            PathBuf::from("/data/proposals_sheet_updated.xlsx")
        );
    }

    #[test]
    fn test_read_dataset_locates_identifier() {
        let book = sample_book();
        let dataset = read_dataset(book.get_sheet(&0).unwrap()).unwrap();
        assert_eq!(dataset.identifier_column, 2);
        assert_eq!(dataset.records.len(), 3);
        assert_eq!(dataset.records[2].row, 9);
        // Row 8 is entirely blank
        assert_eq!(dataset.blank_rows, vec![8]);
        assert_eq!(dataset.records[0].row, 6);
        assert_eq!(dataset.records[0].identifier.as_deref(), Some("135236"));
        assert_eq!(dataset.records[1].identifier.as_deref(), Some("500"));
        assert!(!dataset.records[0].is_processed());
        assert!(dataset.records[1].is_processed());
    }

    #[test]
    fn test_read_dataset_without_identifier_column_fails() {
        let mut book = umya_spreadsheet::new_file();
        book.get_sheet_mut(&0)
            .unwrap()
            .get_cell_mut("A5")
            .set_value_string("Institute");
        let err = read_dataset(book.get_sheet(&0).unwrap()).unwrap_err();
        assert!(matches!(err, SheetError::MissingIdentifierColumn { row: 5, .. }));
    }

    #[test]
    fn test_round_trip_writes_to_output_only() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("sheet.xlsx");
        let output = dir.path().join("sheet_updated.xlsx");
        umya_spreadsheet::writer::xlsx::write(&sample_book(), &source).unwrap();

        let mut store = XlsxSheetStore::new(&source, &output, true);
        store.load().unwrap();
        store
            .apply_field_updates(6, &[(Field::L, "Yes".into()), (Field::AB, "4(signed letter)".into())])
            .unwrap();
        store.save().unwrap();

        let written = umya_spreadsheet::reader::xlsx::read(&output).unwrap();
        let sheet = written.get_sheet(&0).unwrap();
        assert_eq!(sheet.get_value("L6"), "Yes");
        assert_eq!(sheet.get_value("AB6"), "4(signed letter)");

        let untouched = umya_spreadsheet::reader::xlsx::read(&source).unwrap();
        assert_eq!(untouched.get_sheet(&0).unwrap().get_value("L6"), "");

        // Second store resumes from the output
        let resumed = XlsxSheetStore::new(&source, &output, true);
        assert_eq!(resumed.load_path(), output.as_path());
        let fresh = XlsxSheetStore::new(&source, &output, false);
        assert_eq!(fresh.load_path(), source.as_path());
    }

    #[test]
    fn test_header_row_is_not_writable() {
        let mut store = XlsxSheetStore::new("a.xlsx", "b.xlsx", false);
        let err = store.apply_field_updates(5, &[]).unwrap_err();
        assert!(matches!(err, SheetError::RowOutOfRange(5)));
    }
}
