// src/documents/mod.rs
//! Proposal document discovery.
//!
//! Documents live two levels below the root (`<root>/<folder>/<file>.pdf`),
//! plus one extra level under any folder whose name contains `rop`
//! (`<root>/<folder>/Proposal/<file>.pdf`).

pub mod index;

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, trace};
use walkdir::WalkDir;

pub use index::{DocumentIndex, Selection};

/// Substring marking nested proposal folders.
const NESTED_FOLDER_MARKER: &str = "rop";

/// One discovered proposal document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCandidate {
    pub path: PathBuf,
    /// TPN derived from the file name, if any
    pub identifier: Option<String>,
}

impl DocumentCandidate {
    pub fn new(path: PathBuf) -> Self {
        let identifier = identifier_from_filename(&file_name(&path));
        Self { path, identifier }
    }

    pub fn file_name(&self) -> String {
        file_name(&self.path)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn proposal_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"ProposalID_(\d+)_finalproposal").expect("valid regex"))
}

fn digits_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").expect("valid regex"))
}

/// TPN embedded in a document file name.
///
/// `ProposalID_<digits>_finalproposal` wins; otherwise the first run of
/// digits anywhere in the name.
pub fn identifier_from_filename(name: &str) -> Option<String> {
    if let Some(caps) = proposal_id_pattern().captures(name) {
        return caps.get(1).map(|m| m.as_str().to_string());
    }
    digits_pattern().find(name).map(|m| m.as_str().to_string())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Whether a document at `depth` below the root is in a scanned location.
fn is_scanned_location(root: &Path, path: &Path, depth: usize) -> bool {
    match depth {
        2 => true,
        3 => path
            .strip_prefix(root)
            .ok()
            .and_then(|rel| rel.components().nth(1))
            .map_or(false, |c| {
                c.as_os_str()
                    .to_string_lossy()
                    .contains(NESTED_FOLDER_MARKER)
            }),
        _ => false,
    }
}

/// Find every proposal PDF under `root`, sorted by path.
pub fn discover_documents(root: &Path) -> Vec<DocumentCandidate> {
    info!("Scanning {:?} for proposal documents...", root);
    let mut paths: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(3)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_pdf(e.path()))
        .filter(|e| is_scanned_location(root, e.path(), e.depth()))
        .map(|e| e.into_path())
        .collect();

    // Lexical order keeps ambiguous-match selection stable across platforms
    paths.sort();
    trace!("Discovered documents: {:?}", paths);

    paths.into_iter().map(DocumentCandidate::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[test]
    fn test_identifier_from_filename() {
        assert_eq!(
            identifier_from_filename("ProposalID_135236_finalproposal.pdf").as_deref(),
            Some("135236")
        );
        assert_eq!(
            identifier_from_filename("v2_ProposalID_777_finalproposal.pdf").as_deref(),
            Some("777")
        );
        assert_eq!(identifier_from_filename("scan 0042 final.PDF").as_deref(), Some("0042"));
        assert_eq!(identifier_from_filename("cover.pdf"), None);
    }

    #[test]
    fn test_discovery_depths() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "top.pdf");
        touch(root, "135236/ProposalID_135236_finalproposal.pdf");
        touch(root, "135237/Proposal/ProposalID_135237_finalproposal.PDF");
        touch(root, "135238/annexures/ProposalID_135238_finalproposal.pdf");
        touch(root, "135239/notes.txt");
        touch(root, "a/b/Proposal/deep_1.pdf");

        let found = discover_documents(root);
        let names: Vec<String> = found.iter().map(|c| c.file_name()).collect();
        assert_eq!(
            names,
            vec![
                "ProposalID_135236_finalproposal.pdf".to_string(),
                "ProposalID_135237_finalproposal.PDF".to_string(),
            ]
        );
        assert_eq!(found[1].identifier.as_deref(), Some("135237"));
    }

    #[test]
    fn test_discovery_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(root, "b/ProposalID_2_finalproposal.pdf");
        touch(root, "a/ProposalID_1_finalproposal.pdf");
        touch(root, "c/ProposalID_3_finalproposal.pdf");

        let ids: Vec<Option<String>> = discover_documents(root)
            .into_iter()
            .map(|c| c.identifier)
            .collect();
        assert_eq!(
            ids,
            vec![Some("1".to_string()), Some("2".to_string()), Some("3".to_string())]
        );
    }
}
