// src/cli/show_journal.rs
use std::path::Path;

use crate::processor::journal::{JournalResult, RunJournal};

pub fn run(path: &Path) -> JournalResult<()> {
    println!("Opening: {}\n", path.display());

    let entries = RunJournal::last_run(path)?;
    let Some(first) = entries.first() else {
        println!("Journal is empty.");
        return Ok(());
    };
    println!("=== Run {} ({}) ===\n", first.run_id, first.recorded_at);

    println!("{:<6} {:<10} {:<22} {:<8} {}", "Row", "TPN", "Outcome", "Others", "Detail");
    println!("{}", "-".repeat(90));
    for entry in &entries {
        println!(
            "{:<6} {:<10} {:<22} {:<8} {}",
            entry.row,
            entry.identifier.as_deref().unwrap_or("NULL"),
            entry.outcome,
            entry.passed_over,
            entry
                .detail
                .as_deref()
                .or(entry.document.as_deref())
                .unwrap_or("")
        );
    }
    Ok(())
}
