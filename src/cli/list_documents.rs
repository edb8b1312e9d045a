// src/cli/list_documents.rs
use std::path::Path;

use crate::documents::{discover_documents, DocumentIndex};

pub fn run(root: &Path) {
    println!("Scanning: {}\n", root.display());

    let index = DocumentIndex::build(discover_documents(root));
    if index.is_empty() {
        println!("No PDF files found under {}", root.display());
        return;
    }

    println!("{:<10} {}", "TPN", "Path");
    println!("{}", "-".repeat(80));
    for candidate in index.candidates() {
        println!(
            "{:<10} {}",
            candidate.identifier.as_deref().unwrap_or("NULL"),
            candidate.path.display()
        );
    }
    println!("\n{} document(s)", index.len());

    let ambiguous = index.ambiguous();
    if !ambiguous.is_empty() {
        println!("\n=== TPNs with more than one document (first one is used) ===\n");
        for (identifier, documents) in ambiguous {
            println!("  {}:", identifier);
            for doc in documents {
                println!("    {}", doc.path.display());
            }
        }
    }
}
