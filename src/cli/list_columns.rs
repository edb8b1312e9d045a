// src/cli/list_columns.rs
use std::path::Path;

use crate::sheets::record::Dataset;
use crate::sheets::schema::{column_letter, Field, HEADER_ROW};
use crate::sheets::store::default_output_path;
use crate::sheets::{SheetResult, SheetStore, XlsxSheetStore};

pub fn run(path: &Path) -> SheetResult<()> {
    println!("Opening: {}\n", path.display());

    // Read-only: nothing is saved, so the output path is never touched
    let mut store = XlsxSheetStore::new(path, default_output_path(path), false);
    let dataset = store.load()?;

    print!("{}", render(&dataset));
    Ok(())
}

fn render(dataset: &Dataset) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== Header row {} ===\n\n", HEADER_ROW));
    out.push_str(&format!("{:<6} {:<8} {}\n", "Index", "Column", "Header"));
    out.push_str(&format!("{}\n", "-".repeat(60)));
    for (i, header) in dataset.headers.iter().enumerate() {
        let column = i as u32 + 1;
        if header.is_empty() {
            continue;
        }
        let marker = if column == dataset.identifier_column { "  <- identifier" } else { "" };
        out.push_str(&format!("{:<6} {:<8} {}{}\n", column, column_letter(column), header, marker));
    }

    out.push_str("\n=== Extraction columns ===\n\n");
    out.push_str(&format!(
        "{:<8} {:<8} {:<32} {:<14} {:<40} {}\n",
        "Column", "Key", "Label", "Domain", "Sheet header", "Filled"
    ));
    out.push_str(&format!("{}\n", "-".repeat(120)));
    for field in Field::ALL {
        let header = dataset
            .headers
            .get(field.column() as usize - 1)
            .map(String::as_str)
            .filter(|h| !h.is_empty())
            .unwrap_or("NULL");
        let filled = dataset
            .records
            .iter()
            .filter(|r| !r.field(field).is_empty())
            .count();
        out.push_str(&format!(
            "{:<8} {:<8} {:<32} {:<14} {:<40} {}/{}\n",
            field.letter(),
            field.key(),
            field.label(),
            format!("{:?}", field.domain()),
            header,
            filled,
            dataset.records.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::memory::MemorySheetStore;
    use crate::sheets::CellValue;

    #[test]
    fn test_render_marks_identifier_and_counts_filled() {
        let mut store = MemorySheetStore::with_identifiers(&[
            CellValue::Text("1".into()),
            CellValue::Text("2".into()),
        ]);
        let mut dataset = store.load().unwrap();
        dataset.records[0].set_field(Field::U, "Yes");

        let text = render(&dataset);
        assert!(text.contains("TPN No.  <- identifier"));
        let u_line = text.lines().find(|l| l.starts_with("U ")).unwrap();
        assert!(u_line.contains("col_u"));
        assert!(u_line.contains("80%+ admission, last 5 years"));
        assert!(u_line.ends_with("1/2"));
    }
}
