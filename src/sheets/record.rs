// src/sheets/record.rs
//! Records read from the proposals worksheet.

use unicode_normalization::UnicodeNormalization;

use super::schema::{Field, IDENTIFIER_HEADER};

/// Raw value of one worksheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Number(_) => false,
            CellValue::Text(s) => s.trim().is_empty(),
        }
    }

    /// Display form of the value, the way a reader of the sheet sees it.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Text(s) => s.clone(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Canonical identifier for a TPN cell.
///
/// Integral numbers render without a decimal point (`135236.0` -> `"135236"`);
/// text is NFKC-folded and trimmed. Empty cells yield `None`.
pub fn normalize_identifier(value: &CellValue) -> Option<String> {
    let normalized = match value {
        CellValue::Empty => return None,
        CellValue::Number(n) if !n.is_finite() => return None,
        CellValue::Number(n) => format_number(*n),
        CellValue::Text(s) => s.nfkc().collect::<String>().trim().to_string(),
    };
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// Normalize a header for comparison: whitespace collapsed, diacritics
/// stripped, lowercase.
pub fn normalize_header(header: &str) -> String {
    header
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// One data row of the proposals worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// 1-based worksheet row number
    pub row: u32,
    /// Normalized TPN, `None` when the cell is blank
    pub identifier: Option<String>,
    /// Cell values by column, index 0 is column A
    cells: Vec<CellValue>,
}

impl Record {
    pub fn new(row: u32, identifier: Option<String>, cells: Vec<CellValue>) -> Self {
        Self {
            row,
            identifier,
            cells,
        }
    }

    /// Value at a 1-based column number. Columns past the row's end are empty.
    pub fn cell(&self, column: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        column
            .checked_sub(1)
            .and_then(|idx| self.cells.get(idx as usize))
            .unwrap_or(&EMPTY)
    }

    pub fn field(&self, field: Field) -> &CellValue {
        self.cell(field.column())
    }

    /// A record whose processed-marker column is filled needs no extraction.
    pub fn is_processed(&self) -> bool {
        !self.field(Field::PROCESSED_MARKER).is_empty()
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        let idx = (field.column() - 1) as usize;
        if self.cells.len() <= idx {
            self.cells.resize(idx + 1, CellValue::Empty);
        }
        self.cells[idx] = CellValue::Text(value.into());
    }

    pub fn apply_updates(&mut self, updates: &[(Field, String)]) {
        for (field, value) in updates {
            self.set_field(*field, value.clone());
        }
    }
}

/// The worksheet as loaded: header row plus data records in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Header text by column, index 0 is column A
    pub headers: Vec<String>,
    /// 1-based column number of the identifier column
    pub identifier_column: u32,
    pub records: Vec<Record>,
    /// Rows below the header where every cell is blank; not records
    pub blank_rows: Vec<u32>,
}

impl Dataset {
    #[cfg(test)]
    pub fn record_mut(&mut self, row: u32) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| r.row == row)
    }
}

/// 1-based column of the header matching `name`, ignoring case, spacing and
/// diacritics.
pub fn find_header(headers: &[String], name: &str) -> Option<u32> {
    let wanted = normalize_header(name);
    headers
        .iter()
        .position(|h| normalize_header(h) == wanted)
        .map(|idx| idx as u32 + 1)
}

/// Build a record from a row of cells, locating the identifier by column.
/// Returns `None` for rows where every cell is blank.
pub fn record_from_cells(row: u32, identifier_column: u32, cells: Vec<CellValue>) -> Option<Record> {
    if cells.iter().all(CellValue::is_empty) {
        return None;
    }
    let mut record = Record::new(row, None, cells);
    record.identifier = normalize_identifier(record.cell(identifier_column));
    Some(record)
}

/// Column of the identifier header, if the header row declares it.
pub fn identifier_column(headers: &[String]) -> Option<u32> {
    find_header(headers, IDENTIFIER_HEADER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier_numeric_and_text_agree() {
        let numeric = normalize_identifier(&CellValue::Number(135236.0));
        let text = normalize_identifier(&CellValue::Text(" 135236 ".to_string()));
        assert_eq!(numeric.as_deref(), Some("135236"));
        assert_eq!(numeric, text);
    }

    #[test]
    fn test_normalize_identifier_keeps_other_values() {
        assert_eq!(
            normalize_identifier(&CellValue::Number(12.5)).as_deref(),
            Some("12.5")
        );
        assert_eq!(
            normalize_identifier(&CellValue::Text("135236.0".to_string())).as_deref(),
            Some("135236.0")
        );
        // Full-width digits fold to ASCII
        assert_eq!(
            normalize_identifier(&CellValue::Text("１２３".to_string())).as_deref(),
            Some("123")
        );
    }

    #[test]
    fn test_normalize_identifier_blank() {
        assert_eq!(normalize_identifier(&CellValue::Empty), None);
        assert_eq!(normalize_identifier(&CellValue::Text("   ".to_string())), None);
        assert_eq!(normalize_identifier(&CellValue::Number(f64::NAN)), None);
    }

    #[test]
    fn test_find_header_is_lenient() {
        let headers = vec![
            "S.No".to_string(),
            "  tpn   no. ".to_string(),
            "Institute".to_string(),
        ];
        assert_eq!(identifier_column(&headers), Some(2));
        assert_eq!(find_header(&headers, "institute"), Some(3));
        assert_eq!(find_header(&headers, "Missing"), None);
    }

    #[test]
    fn test_record_processed_marker() {
        let mut record = Record::new(6, Some("1".to_string()), vec![CellValue::Text("1".into())]);
        assert!(!record.is_processed());
        assert_eq!(record.field(Field::AB), &CellValue::Empty);

        record.set_field(Field::U, "Yes");
        assert!(record.is_processed());
        assert_eq!(record.cell(21), &CellValue::Text("Yes".to_string()));
    }

    #[test]
    fn test_record_from_cells_skips_blank_rows() {
        assert!(record_from_cells(9, 1, vec![CellValue::Empty, CellValue::Text(" ".into())]).is_none());

        let record = record_from_cells(
            7,
            2,
            vec![CellValue::Text("x".into()), CellValue::Number(42.0)],
        )
        .unwrap();
        assert_eq!(record.row, 7);
        assert_eq!(record.identifier.as_deref(), Some("42"));
    }

    #[test]
    fn test_identifier_column_ignores_case_and_spacing() {
        let headers = vec!["S.No".to_string(), "  tpn   NO. ".to_string()];
        assert_eq!(identifier_column(&headers), Some(2));
        assert_eq!(identifier_column(&["Institute".to_string()]), None);
    }
}
