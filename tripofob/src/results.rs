//! Search result types.
//!
//! A [`MatchRecord`] describes one occurrence, a [`FileResult`] groups the
//! occurrences found in one file, and a [`SearchReport`] is the finalized,
//! read-only outcome of a whole search. Only files with at least one match
//! ever become a `FileResult`.
//!
//! `FileResult` and `MatchRecord` serialize to the export layout:
//! `{ "file": .., "type": "text" | "spreadsheet", "matches": [{ "match": .., "context": .. }] }`.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::filters::extension_of;

/// Extensions handled by the spreadsheet extractor
pub const SPREADSHEET_EXTENSIONS: &[&str] = &[".xlsx"];

/// Which extractor handles a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Spreadsheet,
}

impl ContentKind {
    /// Picks the kind from the file extension; anything that is not a
    /// spreadsheet is read as text
    pub fn from_path(path: &Path) -> Self {
        match extension_of(path) {
            Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) => Self::Spreadsheet,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Spreadsheet => "spreadsheet",
        }
    }
}

/// A single occurrence of the pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchRecord {
    /// The text that matched
    #[serde(rename = "match")]
    pub matched: String,
    /// Surrounding text, newlines flattened to spaces
    pub context: String,
}

impl MatchRecord {
    pub fn new(matched: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            matched: matched.into(),
            context: context.into(),
        }
    }
}

/// All matches found in a single file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileResult {
    /// The path to the file
    #[serde(rename = "file")]
    pub path: PathBuf,
    /// Extractor that produced the matches
    #[serde(rename = "type")]
    pub kind: ContentKind,
    /// Matches in document order
    pub matches: Vec<MatchRecord>,
}

/// A file that could not be searched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub path: PathBuf,
    pub message: String,
}

/// The complete, finalized search results
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Results per file, sorted by path
    pub file_results: Vec<FileResult>,
    /// Files that entered the work queue
    pub files_discovered: usize,
    /// Files a worker finished with, successfully or not
    pub files_processed: usize,
    /// Files whose extraction failed
    pub files_failed: usize,
    /// Files with at least one match
    pub files_with_matches: usize,
    /// Total number of matches found
    pub total_matches: usize,
    /// Per-file failures
    pub diagnostics: Vec<Diagnostic>,
    /// Size of the worker pool that ran the search
    pub workers: usize,
    /// Wall clock time of the search
    pub elapsed: Duration,
}

impl SearchReport {
    /// Creates a new empty report
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds a file result; empty results are ignored
    pub fn add_file_result(&mut self, file_result: FileResult) {
        if file_result.matches.is_empty() {
            return;
        }
        self.total_matches += file_result.matches.len();
        self.files_with_matches += 1;
        self.file_results.push(file_result);
    }

    /// Sorts file results and diagnostics by path
    pub fn sort(&mut self) {
        self.file_results.sort_by(|a, b| a.path.cmp(&b.path));
        self.diagnostics.sort_by(|a, b| a.path.cmp(&b.path));
    }

    pub fn is_empty(&self) -> bool {
        self.file_results.is_empty()
    }
}
