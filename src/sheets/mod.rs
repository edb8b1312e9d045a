// src/sheets/mod.rs

pub mod error;
pub mod record;
pub mod schema;
pub mod store;

#[cfg(test)]
pub mod memory;

pub use error::{SheetError, SheetResult};
pub use record::{CellValue, Dataset, Record};
pub use schema::{Field, SENTINEL};
pub use store::{SheetStore, XlsxSheetStore};
