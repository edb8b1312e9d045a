// src/sheets/memory.rs
//! In-memory `SheetStore` used by the pipeline tests.

use super::error::{SheetError, SheetResult};
use super::record::{CellValue, Dataset, Record};
use super::schema::{Field, IDENTIFIER_HEADER};
use super::store::SheetStore;

#[derive(Debug, Clone)]
pub struct MemorySheetStore {
    /// State as last saved
    pub saved: Option<Dataset>,
    /// Number of `save` calls
    pub saves: usize,
    working: Dataset,
}

impl MemorySheetStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            saved: None,
            saves: 0,
            working: dataset,
        }
    }

    /// Sheet with the identifier in column B and one record per entry.
    pub fn with_identifiers(identifiers: &[CellValue]) -> Self {
        let headers = vec!["S.No".to_string(), IDENTIFIER_HEADER.to_string()];
        let records = identifiers
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let cells = vec![CellValue::Number((i + 1) as f64), id.clone()];
                Record::new(
                    6 + i as u32,
                    super::record::normalize_identifier(id),
                    cells,
                )
            })
            .collect();
        Self::new(Dataset {
            headers,
            identifier_column: 2,
            records,
            blank_rows: Vec::new(),
        })
    }

    pub fn saved_record(&self, row: u32) -> Option<&Record> {
        self.saved.as_ref()?.records.iter().find(|r| r.row == row)
    }
}

impl SheetStore for MemorySheetStore {
    fn load(&mut self) -> SheetResult<Dataset> {
        Ok(self.working.clone())
    }

    fn apply_field_updates(&mut self, row: u32, updates: &[(Field, String)]) -> SheetResult<()> {
        let record = self
            .working
            .record_mut(row)
            .ok_or(SheetError::RowOutOfRange(row))?;
        record.apply_updates(updates);
        Ok(())
    }

    fn save(&mut self) -> SheetResult<()> {
        self.saves += 1;
        self.saved = Some(self.working.clone());
        Ok(())
    }
}
