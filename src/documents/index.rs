// src/documents/index.rs
//! Identifier Matcher
//!
//! Maps a record's TPN to the proposal documents discovered on disk.
//!
//! ## Matching order
//!
//! 1. Exact lookup of the identifier in the index
//! 2. Otherwise every document whose file name contains the identifier
//!
//! Candidates keep discovery order (lexical path order), so the first of
//! several matches is always the same document.

use std::collections::HashMap;

use tracing::warn;

use super::DocumentCandidate;

#[derive(Debug, Clone, Default)]
pub struct DocumentIndex {
    by_identifier: HashMap<String, Vec<usize>>,
    candidates: Vec<DocumentCandidate>,
}

impl DocumentIndex {
    /// Index candidates by identifier. Candidates without an identifier are
    /// keyed by their full file name.
    pub fn build(candidates: Vec<DocumentCandidate>) -> Self {
        let mut by_identifier: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, candidate) in candidates.iter().enumerate() {
            let key = candidate
                .identifier
                .clone()
                .unwrap_or_else(|| candidate.file_name());
            by_identifier.entry(key).or_default().push(idx);
        }
        Self {
            by_identifier,
            candidates,
        }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn candidates(&self) -> &[DocumentCandidate] {
        &self.candidates
    }

    /// Identifiers shared by more than one document, with their documents.
    pub fn ambiguous(&self) -> Vec<(&str, Vec<&DocumentCandidate>)> {
        let mut shared: Vec<(&str, Vec<&DocumentCandidate>)> = self
            .by_identifier
            .iter()
            .filter(|(_, idxs)| idxs.len() > 1)
            .map(|(key, idxs)| {
                (
                    key.as_str(),
                    idxs.iter().map(|&i| &self.candidates[i]).collect(),
                )
            })
            .collect();
        shared.sort_by(|a, b| a.0.cmp(b.0));
        shared
    }

    /// All documents matching `identifier`, exact matches first.
    pub fn resolve(&self, identifier: &str) -> Vec<&DocumentCandidate> {
        if identifier.is_empty() {
            return Vec::new();
        }
        if let Some(idxs) = self.by_identifier.get(identifier) {
            return idxs.iter().map(|&i| &self.candidates[i]).collect();
        }
        self.candidates
            .iter()
            .filter(|c| c.file_name().contains(identifier))
            .collect()
    }

    /// The document to use for `identifier`: the first match, with a warning
    /// when the match is ambiguous.
    pub fn select(&self, identifier: &str) -> Option<Selection<'_>> {
        let matches = self.resolve(identifier);
        let first = matches.first().copied()?;
        if matches.len() > 1 {
            warn!(
                "Multiple documents found for TPN {} ({}), using first: {}",
                identifier,
                matches
                    .iter()
                    .map(|c| c.file_name())
                    .collect::<Vec<_>>()
                    .join(", "),
                first.file_name()
            );
        }
        Some(Selection {
            document: first,
            passed_over: matches.len() - 1,
        })
    }
}

/// The document chosen for an identifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub document: &'a DocumentCandidate,
    /// Other documents that matched too; non-zero means the match was ambiguous
    pub passed_over: usize,
}

impl Selection<'_> {
    pub fn is_ambiguous(&self) -> bool {
        self.passed_over > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn candidate(path: &str) -> DocumentCandidate {
        DocumentCandidate::new(PathBuf::from(path))
    }

    fn index(paths: &[&str]) -> DocumentIndex {
        let mut candidates: Vec<DocumentCandidate> = paths.iter().map(|p| candidate(p)).collect();
        candidates.sort_by(|a, b| a.path.cmp(&b.path));
        DocumentIndex::build(candidates)
    }

    #[test]
    fn test_exact_match() {
        let idx = index(&[
            "root/1/ProposalID_135236_finalproposal.pdf",
            "root/2/ProposalID_135237_finalproposal.pdf",
        ]);
        let found = idx.resolve("135236");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].identifier.as_deref(), Some("135236"));
    }

    #[test]
    fn test_substring_fallback() {
        // Identifier "9_88" is not a derived identifier, but appears in a name
        let idx = index(&["root/x/report_9_88.pdf", "root/y/ProposalID_1_finalproposal.pdf"]);
        let found = idx.resolve("9_88");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name(), "report_9_88.pdf");
    }

    #[test]
    fn test_single_match_is_not_ambiguous() {
        let idx = index(&["root/a/ProposalID_1_finalproposal.pdf"]);
        let selection = idx.select("1").unwrap();
        assert!(!selection.is_ambiguous());
        assert_eq!(selection.document.file_name(), "ProposalID_1_finalproposal.pdf");
    }

    #[test]
    fn test_no_match() {
        let idx = index(&["root/a/ProposalID_1_finalproposal.pdf"]);
        assert!(idx.resolve("424242").is_empty());
        assert!(idx.resolve("").is_empty());
        assert!(idx.select("424242").is_none());
    }

    #[test]
    fn test_unnamed_documents_keyed_by_file_name() {
        let idx = index(&["root/a/cover.pdf"]);
        assert_eq!(idx.resolve("cover.pdf").len(), 1);
    }

    #[test]
    fn test_ambiguous_selection_is_deterministic() {
        let paths = [
            "root/z/ProposalID_500_finalproposal.pdf",
            "root/a/ProposalID_500_finalproposal.pdf",
        ];
        let idx = index(&paths);
        let selection = idx.select("500").unwrap();
        assert!(selection.is_ambiguous());
        assert_eq!(selection.passed_over, 1);
        let first = selection.document.path.clone();
        for _ in 0..5 {
            let mut reversed = paths;
            reversed.reverse();
            assert_eq!(index(&reversed).select("500").unwrap().document.path, first);
        }
        assert_eq!(first, PathBuf::from("root/a/ProposalID_500_finalproposal.pdf"));

        let shared = idx.ambiguous();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].0, "500");
        assert_eq!(shared[0].1.len(), 2);
    }
}
